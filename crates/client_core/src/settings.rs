//! Settings page actions.
//!
//! The user configuration is held as an immutable snapshot. A successful
//! action builds a modified copy and swaps it in; readers holding the previous
//! `Arc` keep seeing the old values. Failed actions never touch the snapshot.

use std::sync::Arc;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use shared::{
    domain::{ContentSource, Modality, SubscriptionOperation, SubscriptionState},
    protocol::UserConfig,
};
use tracing::{debug, error};

use crate::{
    api::{PhoneApi, SettingsApi},
    error::{ActionError, PhoneError, RequestError},
    notify::Notifier,
    phone::PhoneVerification,
};

pub struct SettingsController {
    api: Arc<dyn SettingsApi>,
    notifier: Notifier,
    config: Arc<UserConfig>,
    phone: PhoneVerification,
}

impl SettingsController {
    pub fn new(
        api: Arc<dyn SettingsApi>,
        phone_api: Arc<dyn PhoneApi>,
        config: UserConfig,
        notifier: Notifier,
    ) -> Self {
        let phone = PhoneVerification::from_config(phone_api, notifier.clone(), &config);
        Self {
            api,
            notifier,
            config: Arc::new(config),
            phone,
        }
    }

    /// Fetches the detailed user configuration and builds a controller on it.
    pub async fn load<A>(api: Arc<A>, notifier: Notifier) -> Result<Self, RequestError>
    where
        A: SettingsApi + PhoneApi + 'static,
    {
        let config = api.user_config().await?;
        Ok(Self::new(api.clone(), api, config, notifier))
    }

    pub fn snapshot(&self) -> Arc<UserConfig> {
        Arc::clone(&self.config)
    }

    pub fn phone(&self) -> &PhoneVerification {
        &self.phone
    }

    fn replace(&mut self, edit: impl FnOnce(&mut UserConfig)) {
        let mut next = UserConfig::clone(&self.config);
        edit(&mut next);
        self.config = Arc::new(next);
    }

    fn report_failure(&self, err: &RequestError, title: &str, description: &str) {
        error!(error = %err, "{title}");
        self.notifier.error(title, description);
    }

    pub async fn save_name(&mut self, name: &str) -> Result<(), ActionError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }

        if let Err(err) = self.api.update_name(name).await {
            self.report_failure(
                &err,
                "Failed to update profile",
                "Failed to update name. Try again or contact support.",
            );
            return Err(err.into());
        }

        self.replace(|config| config.given_name = Some(name.to_string()));
        self.notifier.info(
            "Updated profile",
            format!("Your name has been updated to {name}"),
        );
        Ok(())
    }

    pub async fn set_subscription(
        &mut self,
        operation: SubscriptionOperation,
    ) -> Result<(), ActionError> {
        if let Err(err) = self.api.change_subscription(operation).await {
            let description = match operation {
                SubscriptionOperation::Cancel => {
                    "Failed to cancel subscription. Try again or contact support."
                }
                SubscriptionOperation::Resubscribe => {
                    "Failed to renew subscription. Try again or contact support."
                }
            };
            self.report_failure(&err, "Subscription", description);
            return Err(err.into());
        }

        let (state, description) = match operation {
            SubscriptionOperation::Cancel => (
                SubscriptionState::Unsubscribed,
                "Your subscription was cancelled",
            ),
            SubscriptionOperation::Resubscribe => (
                SubscriptionState::Subscribed,
                "Your subscription has been renewed",
            ),
        };
        self.replace(|config| config.subscription_state = state);
        self.notifier.info("Subscription", description);
        Ok(())
    }

    pub async fn enable_free_trial(&mut self) -> Result<(), ActionError> {
        let response = match self.api.enable_trial().await {
            Ok(response) => response,
            Err(err) => {
                self.report_failure(
                    &err,
                    "Failed to enable free trial",
                    "Failed to enable free trial. Try again or contact support.",
                );
                return Err(err.into());
            }
        };

        if !response.trial_enabled {
            debug!("server declined to enable the free trial");
            return Ok(());
        }

        let now = Utc::now();
        self.replace(|config| apply_trial(config, now));
        let renewal = self
            .config
            .subscription_renewal_date
            .clone()
            .unwrap_or_default();
        self.notifier.info(
            "Trial enabled",
            format!("Your free trial will end on {renewal}"),
        );
        Ok(())
    }

    pub async fn update_model(&mut self, modality: Modality, id: i64) -> Result<(), ActionError> {
        let label = title_case(modality.as_str());
        if !self.config.is_active {
            let reason = format!("You need to be subscribed to update {modality} models");
            self.notifier.error("Model update", reason.clone());
            return Err(ActionError::Refused(reason));
        }

        if let Err(err) = self.api.select_model(modality, id).await {
            self.report_failure(
                &err,
                &format!("Failed to update {label} model"),
                &format!("Failed to update {label} model. Try again."),
            );
            return Err(err.into());
        }

        self.replace(|config| config.set_selected_model(modality, id));
        self.notifier
            .info(format!("Updated {label} model"), String::new());
        Ok(())
    }

    pub async fn save_notion_token(&mut self, token: &str) -> Result<(), ActionError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(());
        }

        if let Err(err) = self.api.save_notion_token(token).await {
            self.report_failure(
                &err,
                "Failed to save Notion settings",
                "Failed to save Notion API key. Try again or contact support.",
            );
            return Err(err.into());
        }

        self.replace(|config| config.notion_token = Some(token.to_string()));
        self.notifier.info(
            "Saved Notion settings",
            "Your Notion API key has been saved.",
        );
        Ok(())
    }

    pub async fn sync_content(&mut self, source: ContentSource) -> Result<(), ActionError> {
        if let Err(err) = self.api.sync_content(source).await {
            self.report_failure(
                &err,
                &format!("Failed to sync {source}"),
                &format!("Failed to sync {source} content. Try again or contact support."),
            );
            return Err(err.into());
        }

        self.notifier.info(
            format!("Syncing {source}"),
            format!("Your {source} content is being synced."),
        );
        Ok(())
    }

    pub async fn disconnect_content(&mut self, source: ContentSource) -> Result<(), ActionError> {
        if let Err(err) = self.api.disconnect_content(source).await {
            self.report_failure(
                &err,
                &format!("Failed to disconnect {source}"),
                &format!("Failed to disconnect from {source}. Try again or contact support."),
            );
            return Err(err.into());
        }

        self.replace(|config| {
            config.enabled_content_source.set(source, false);
            if source == ContentSource::Notion {
                config.notion_token = None;
            }
        });

        match source {
            ContentSource::Computer => self.notifier.info(
                "Deleted synced files",
                "Your synced documents have been deleted.",
            ),
            other => self.notifier.info(
                format!("Disconnected {other}"),
                format!("Your {other} integration has been disconnected."),
            ),
        }
        Ok(())
    }

    pub fn set_phone_number(&mut self, number: Option<String>) -> Result<(), PhoneError> {
        self.phone.set_phone_number(number)
    }

    pub fn set_otp(&mut self, code: impl Into<String>) -> Result<(), PhoneError> {
        self.phone.set_otp(code)
    }

    pub async fn send_otp(&mut self) -> Result<(), PhoneError> {
        self.phone.send_otp().await
    }

    pub async fn verify_otp(&mut self) -> Result<(), PhoneError> {
        self.phone.verify_otp().await?;
        let number = self.phone.phone_number().map(str::to_string);
        self.replace(|config| {
            config.phone_number = number;
            config.is_phone_number_verified = true;
        });
        Ok(())
    }

    pub async fn disconnect_phone(&mut self) -> Result<(), PhoneError> {
        self.phone.disconnect().await?;
        self.replace(|config| {
            config.phone_number = None;
            config.is_phone_number_verified = false;
        });
        Ok(())
    }
}

fn apply_trial(config: &mut UserConfig, now: DateTime<Utc>) {
    let renewal = now + Duration::days(i64::from(config.length_of_free_trial));
    config.subscription_state = SubscriptionState::Trial;
    config.subscription_renewal_date = Some(renewal.format("%b %d, %Y").to_string());
    config.subscription_enabled_trial_at = Some(now.to_rfc3339_opts(SecondsFormat::Millis, true));
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
