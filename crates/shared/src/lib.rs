//! Wire types shared between the client core and its front ends.

pub mod domain;
pub mod protocol;
