use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorpusId(pub String);

impl fmt::Display for CorpusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declares a snake_case wire enum with `as_str`, `Display` and `FromStr`.
macro_rules! wire_enum {
    ($(#[$attr:meta])* $name:ident {
        $($(#[$vattr:meta])* $variant:ident => $wire:literal),+ $(,)?
    }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        $(#[$attr])*
        pub enum $name {
            $($(#[$vattr])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let value = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(value))
                    .ok_or_else(|| {
                        let expected = Self::ALL
                            .iter()
                            .map(|candidate| candidate.as_str())
                            .collect::<Vec<_>>()
                            .join(", ");
                        format!("unknown {}: {value} (expected one of {expected})", stringify!($name))
                    })
            }
        }
    };
}

wire_enum!(#[derive(Default)] SubscriptionState {
    Subscribed => "subscribed",
    #[default]
    Unsubscribed => "unsubscribed",
    Expired => "expired",
    Trial => "trial",
    Invalid => "invalid",
});

wire_enum!(SubscriptionOperation {
    Cancel => "cancel",
    Resubscribe => "resubscribe",
});

wire_enum!(Modality {
    Chat => "chat",
    Paint => "paint",
    Voice => "voice",
});

wire_enum!(ContentSource {
    Computer => "computer",
    Notion => "notion",
    Github => "github",
});
