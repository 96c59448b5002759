//! Phone number verification for the messaging integration.
//!
//! ```text
//! Setup | SendOtp | Verified --send_otp-->   VerifyOtp
//! VerifyOtp                  --verify_otp--> Verified
//! any                        --disconnect--> Setup
//! ```
//!
//! Every transition is backed by a backend call and only happens when that
//! call succeeds. Events that make no sense in the current state are rejected
//! before anything is sent.

use std::{fmt, sync::Arc};

use shared::protocol::UserConfig;
use tracing::{error, info};

use crate::{api::PhoneApi, error::PhoneError, notify::Notifier};

const NOTIFICATION_TITLE: &str = "Phone";
const OTP_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationState {
    /// No number on file.
    Setup,
    /// A number is on file but has not been verified.
    SendOtp,
    /// An OTP was sent and is waiting to be entered.
    VerifyOtp,
    Verified,
}

impl VerificationState {
    pub fn from_config(config: &UserConfig) -> Self {
        if config.is_phone_number_verified {
            Self::Verified
        } else if config.phone_number.is_some() {
            Self::SendOtp
        } else {
            Self::Setup
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::SendOtp => "otp",
            Self::VerifyOtp => "verify",
            Self::Verified => "verified",
        }
    }
}

impl fmt::Display for VerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneEvent {
    EditNumber,
    EnterCode,
    SendOtp,
    VerifyOtp,
    Disconnect,
}

impl fmt::Display for PhoneEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EditNumber => "edit number",
            Self::EnterCode => "enter code",
            Self::SendOtp => "send OTP",
            Self::VerifyOtp => "verify OTP",
            Self::Disconnect => "disconnect",
        };
        f.write_str(name)
    }
}

/// Caption of the send button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendLabel {
    Setup,
    SwitchNumber,
    SendOtp,
}

/// Loose E.164 check: `+`, a non-zero country digit, 8 to 15 digits in all.
pub fn is_valid_phone_number(number: &str) -> bool {
    let Some(digits) = number.trim().strip_prefix('+') else {
        return false;
    };
    (8..=15).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0')
}

pub struct PhoneVerification {
    api: Arc<dyn PhoneApi>,
    notifier: Notifier,
    state: VerificationState,
    phone_number: Option<String>,
    number_on_file: Option<String>,
    otp: String,
}

impl PhoneVerification {
    pub fn from_config(api: Arc<dyn PhoneApi>, notifier: Notifier, config: &UserConfig) -> Self {
        Self {
            api,
            notifier,
            state: VerificationState::from_config(config),
            phone_number: config.phone_number.clone(),
            number_on_file: config.phone_number.clone(),
            otp: String::new(),
        }
    }

    pub fn state(&self) -> VerificationState {
        self.state
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn otp(&self) -> Option<&str> {
        (self.state == VerificationState::VerifyOtp).then_some(self.otp.as_str())
    }

    /// The number was edited after verification and is not trusted until a
    /// new OTP round trip succeeds.
    pub fn needs_reverification(&self) -> bool {
        self.state == VerificationState::Verified && self.phone_number != self.number_on_file
    }

    pub fn can_send_otp(&self) -> bool {
        if self.state == VerificationState::VerifyOtp {
            return false;
        }
        let Some(number) = self.phone_number.as_deref() else {
            return false;
        };
        if self.state == VerificationState::Verified
            && self.number_on_file.as_deref() == Some(number)
        {
            return false;
        }
        is_valid_phone_number(number)
    }

    pub fn send_label(&self) -> SendLabel {
        if self.number_on_file.is_none() {
            SendLabel::Setup
        } else if self.can_send_otp() {
            SendLabel::SendOtp
        } else {
            SendLabel::SwitchNumber
        }
    }

    pub fn set_phone_number(&mut self, number: Option<String>) -> Result<(), PhoneError> {
        self.forbid(VerificationState::VerifyOtp, PhoneEvent::EditNumber)?;
        self.phone_number = number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(())
    }

    pub fn set_otp(&mut self, code: impl Into<String>) -> Result<(), PhoneError> {
        self.require(VerificationState::VerifyOtp, PhoneEvent::EnterCode)?;
        self.otp = code.into().trim().to_string();
        Ok(())
    }

    pub async fn send_otp(&mut self) -> Result<(), PhoneError> {
        self.forbid(VerificationState::VerifyOtp, PhoneEvent::SendOtp)?;
        if !self.can_send_otp() {
            return Err(PhoneError::SendBlocked);
        }
        let number = self.phone_number.clone().ok_or(PhoneError::SendBlocked)?;

        match self.api.send_otp(&number).await {
            Ok(()) => {
                info!(from = %self.state, "otp sent");
                self.state = VerificationState::VerifyOtp;
                self.number_on_file = Some(number);
                self.otp.clear();
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "failed to send otp");
                self.notifier.error(
                    NOTIFICATION_TITLE,
                    "Failed to send OTP. Try again or contact support.",
                );
                Err(err.into())
            }
        }
    }

    pub async fn verify_otp(&mut self) -> Result<(), PhoneError> {
        self.require(VerificationState::VerifyOtp, PhoneEvent::VerifyOtp)?;
        if self.otp.len() != OTP_LEN || !self.otp.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::InvalidCode);
        }

        match self.api.verify_otp(&self.otp).await {
            Ok(()) => {
                info!("phone number verified");
                self.state = VerificationState::Verified;
                self.number_on_file = self.phone_number.clone();
                self.otp.clear();
                self.notifier
                    .info(NOTIFICATION_TITLE, "Phone number verified");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "failed to verify otp");
                self.notifier.error(
                    NOTIFICATION_TITLE,
                    "Failed to verify OTP. Try again or contact support.",
                );
                Err(err.into())
            }
        }
    }

    /// Removes the number on file. Accepted in every state, so repeating it
    /// after a success is harmless.
    pub async fn disconnect(&mut self) -> Result<(), PhoneError> {
        match self.api.disconnect_phone().await {
            Ok(()) => {
                info!(from = %self.state, "phone number disconnected");
                self.state = VerificationState::Setup;
                self.phone_number = None;
                self.number_on_file = None;
                self.otp.clear();
                self.notifier
                    .info(NOTIFICATION_TITLE, "Phone number disconnected");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "failed to disconnect phone number");
                self.notifier.error(
                    NOTIFICATION_TITLE,
                    "Failed to disconnect phone number. Try again or contact support.",
                );
                Err(err.into())
            }
        }
    }

    fn require(&self, state: VerificationState, event: PhoneEvent) -> Result<(), PhoneError> {
        if self.state == state {
            Ok(())
        } else {
            Err(PhoneError::Rejected {
                event,
                state: self.state,
            })
        }
    }

    fn forbid(&self, state: VerificationState, event: PhoneEvent) -> Result<(), PhoneError> {
        if self.state == state {
            Err(PhoneError::Rejected {
                event,
                state: self.state,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "tests/phone_tests.rs"]
mod tests;
