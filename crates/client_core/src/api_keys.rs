use std::sync::Arc;

use shared::protocol::TokenObject;
use tracing::{error, info};

use crate::{api::TokenApi, error::RequestError};

/// Personal API keys of the signed-in user.
pub struct ApiKeyManager {
    api: Arc<dyn TokenApi>,
    keys: Vec<TokenObject>,
}

impl ApiKeyManager {
    pub fn new(api: Arc<dyn TokenApi>) -> Self {
        Self {
            api,
            keys: Vec::new(),
        }
    }

    pub fn keys(&self) -> &[TokenObject] {
        &self.keys
    }

    /// Loads the key list. An empty answer leaves the known keys in place.
    pub async fn list(&mut self) -> Result<(), RequestError> {
        let keys = self.api.list_tokens().await.map_err(|err| {
            error!(error = %err, "failed to list api keys");
            err
        })?;
        if !keys.is_empty() {
            self.keys = keys;
        }
        Ok(())
    }

    pub async fn generate(&mut self) -> Result<&TokenObject, RequestError> {
        let key = self.api.create_token().await.map_err(|err| {
            error!(error = %err, "failed to create api key");
            err
        })?;
        info!(name = %key.name, "api key created");
        self.keys.push(key);
        let index = self.keys.len() - 1;
        Ok(&self.keys[index])
    }

    pub async fn delete(&mut self, token: &str) -> Result<(), RequestError> {
        self.api.delete_token(token).await.map_err(|err| {
            error!(error = %err, "failed to delete api key");
            err
        })?;
        self.keys.retain(|key| key.token != token);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_keys_tests.rs"]
mod tests;
