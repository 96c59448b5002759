//! Client-side controllers for the personal assistant web app: debounced
//! search, phone verification, settings actions, synced files and API keys.
//! Every controller talks to the backend through the trait seams in [`api`].

pub mod api;
pub mod api_keys;
pub mod config;
pub mod error;
pub mod files;
pub mod notify;
pub mod phone;
pub mod search;
pub mod settings;

pub use api::{ApiClient, ContentApi, PhoneApi, SearchApi, SettingsApi, TokenApi};
pub use api_keys::ApiKeyManager;
pub use config::{load_settings, load_settings_from, ClientSettings};
pub use error::{ActionError, PhoneError, RequestError, SearchError};
pub use files::{ContentUploader, MissingContentUploader, SyncedFileManager};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use phone::{PhoneVerification, SendLabel, VerificationState};
pub use search::{example_query, SearchController, SearchState};
pub use settings::SettingsController;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
