use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ContentSource, Modality, SubscriptionOperation},
    protocol::{
        DeleteFilesRequest, NotionTokenRequest, SearchResult, TokenObject, TrialResponse,
        UserConfig,
    },
};
use tracing::debug;

use crate::{
    config::{normalize_server_url, ClientSettings},
    error::RequestError,
};

const SEARCH_CLIENT: &str = "web";

#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, RequestError>;
}

#[async_trait]
pub trait PhoneApi: Send + Sync {
    async fn send_otp(&self, phone_number: &str) -> Result<(), RequestError>;
    async fn verify_otp(&self, code: &str) -> Result<(), RequestError>;
    async fn disconnect_phone(&self) -> Result<(), RequestError>;
}

#[async_trait]
pub trait SettingsApi: Send + Sync {
    async fn user_config(&self) -> Result<UserConfig, RequestError>;
    async fn update_name(&self, name: &str) -> Result<(), RequestError>;
    async fn change_subscription(
        &self,
        operation: SubscriptionOperation,
    ) -> Result<(), RequestError>;
    async fn enable_trial(&self) -> Result<TrialResponse, RequestError>;
    async fn select_model(&self, modality: Modality, id: i64) -> Result<(), RequestError>;
    async fn save_notion_token(&self, token: &str) -> Result<(), RequestError>;
    async fn sync_content(&self, source: ContentSource) -> Result<(), RequestError>;
    async fn disconnect_content(&self, source: ContentSource) -> Result<(), RequestError>;
}

#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn list_computer_files(&self) -> Result<Vec<String>, RequestError>;
    async fn delete_file(&self, filename: &str) -> Result<(), RequestError>;
    async fn delete_files(&self, files: &[String]) -> Result<(), RequestError>;
}

#[async_trait]
pub trait TokenApi: Send + Sync {
    async fn list_tokens(&self) -> Result<Vec<TokenObject>, RequestError>;
    async fn create_token(&self) -> Result<TokenObject, RequestError>;
    async fn delete_token(&self, token: &str) -> Result<(), RequestError>;
}

/// HTTP client for the assistant backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    server_url: String,
    api_token: Option<String>,
}

impl ApiClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url: String = server_url.into();
        Self {
            http: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
            api_token: None,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        let server_url = normalize_server_url(&settings.server_url)?;
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http,
            server_url,
            api_token: settings.api_token.clone(),
        })
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{path}", self.server_url))
            .header(CONTENT_TYPE, "application/json");
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, endpoint: &str, builder: RequestBuilder) -> Result<Response, RequestError> {
        debug!(endpoint, "sending request");
        let response = builder
            .send()
            .await
            .map_err(|source| RequestError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> Result<T, RequestError> {
        self.send(endpoint, builder)
            .await?
            .json::<T>()
            .await
            .map_err(|source| RequestError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })
    }
}

#[async_trait]
impl SearchApi for ApiClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, RequestError> {
        let builder = self
            .request(Method::GET, "/api/search")
            .query(&[("q", query), ("client", SEARCH_CLIENT)]);
        self.send_json("GET /api/search", builder).await
    }
}

#[async_trait]
impl PhoneApi for ApiClient {
    async fn send_otp(&self, phone_number: &str) -> Result<(), RequestError> {
        let builder = self
            .request(Method::POST, "/api/phone")
            .query(&[("phone_number", phone_number)]);
        self.send("POST /api/phone", builder).await?;
        Ok(())
    }

    async fn verify_otp(&self, code: &str) -> Result<(), RequestError> {
        let builder = self
            .request(Method::POST, "/api/phone/verify")
            .query(&[("code", code)]);
        self.send("POST /api/phone/verify", builder).await?;
        Ok(())
    }

    async fn disconnect_phone(&self) -> Result<(), RequestError> {
        let builder = self.request(Method::DELETE, "/api/phone");
        self.send("DELETE /api/phone", builder).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsApi for ApiClient {
    async fn user_config(&self) -> Result<UserConfig, RequestError> {
        let builder = self
            .request(Method::GET, "/api/settings")
            .query(&[("detailed", "true")]);
        self.send_json("GET /api/settings", builder).await
    }

    async fn update_name(&self, name: &str) -> Result<(), RequestError> {
        let builder = self
            .request(Method::PATCH, "/api/user/name")
            .query(&[("name", name)]);
        self.send("PATCH /api/user/name", builder).await?;
        Ok(())
    }

    async fn change_subscription(
        &self,
        operation: SubscriptionOperation,
    ) -> Result<(), RequestError> {
        let builder = self
            .request(Method::PATCH, "/api/subscription")
            .query(&[("operation", operation.as_str())]);
        self.send("PATCH /api/subscription", builder).await?;
        Ok(())
    }

    async fn enable_trial(&self) -> Result<TrialResponse, RequestError> {
        let builder = self.request(Method::POST, "/api/subscription/trial");
        self.send_json("POST /api/subscription/trial", builder).await
    }

    async fn select_model(&self, modality: Modality, id: i64) -> Result<(), RequestError> {
        let path = format!("/api/model/{modality}");
        let builder = self
            .request(Method::POST, &path)
            .query(&[("id", id)]);
        self.send(&format!("POST {path}"), builder).await?;
        Ok(())
    }

    async fn save_notion_token(&self, token: &str) -> Result<(), RequestError> {
        let builder = self
            .request(Method::POST, "/api/content/notion")
            .json(&NotionTokenRequest {
                token: token.to_string(),
            });
        self.send("POST /api/content/notion", builder).await?;
        Ok(())
    }

    async fn sync_content(&self, source: ContentSource) -> Result<(), RequestError> {
        let builder = self
            .request(Method::PATCH, "/api/content")
            .query(&[("t", source.as_str())]);
        self.send("PATCH /api/content", builder).await?;
        Ok(())
    }

    async fn disconnect_content(&self, source: ContentSource) -> Result<(), RequestError> {
        let path = format!("/api/content/{source}");
        let builder = self.request(Method::DELETE, &path);
        self.send(&format!("DELETE {path}"), builder).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentApi for ApiClient {
    async fn list_computer_files(&self) -> Result<Vec<String>, RequestError> {
        let builder = self.request(Method::GET, "/api/content/computer");
        self.send_json("GET /api/content/computer", builder).await
    }

    async fn delete_file(&self, filename: &str) -> Result<(), RequestError> {
        let builder = self
            .request(Method::DELETE, "/api/content/file")
            .query(&[("filename", filename)]);
        self.send("DELETE /api/content/file", builder).await?;
        Ok(())
    }

    async fn delete_files(&self, files: &[String]) -> Result<(), RequestError> {
        let builder = self
            .request(Method::DELETE, "/api/content/files")
            .json(&DeleteFilesRequest {
                files: files.to_vec(),
            });
        self.send("DELETE /api/content/files", builder).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenApi for ApiClient {
    async fn list_tokens(&self) -> Result<Vec<TokenObject>, RequestError> {
        let builder = self.request(Method::GET, "/auth/token");
        self.send_json("GET /auth/token", builder).await
    }

    async fn create_token(&self) -> Result<TokenObject, RequestError> {
        let builder = self.request(Method::POST, "/auth/token");
        self.send_json("POST /auth/token", builder).await
    }

    async fn delete_token(&self, token: &str) -> Result<(), RequestError> {
        let builder = self
            .request(Method::DELETE, "/auth/token")
            .query(&[("token", token)]);
        self.send("DELETE /auth/token", builder).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
