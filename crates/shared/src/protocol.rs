use serde::{Deserialize, Serialize};

use crate::domain::{ContentSource, CorpusId, Modality, SubscriptionState};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalData {
    pub file: String,
    pub source: String,
    pub compiled: String,
    pub heading: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub entry: String,
    pub score: f64,
    #[serde(rename = "corpus-id")]
    pub corpus_id: CorpusId,
    #[serde(default)]
    pub additional: AdditionalData,
}

impl SearchResult {
    /// Whether the result points at a web page rather than a synced file.
    pub fn is_web_link(&self) -> bool {
        self.additional.file.starts_with("http")
    }

    /// Title shown for the result: the heading of web pages, else the file name.
    pub fn display_name(&self) -> &str {
        if self.is_web_link() {
            return &self.additional.heading;
        }
        self.additional
            .file
            .rsplit('/')
            .next()
            .unwrap_or(&self.additional.file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOption {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnabledContentSource {
    pub computer: bool,
    pub github: bool,
    pub notion: bool,
}

impl EnabledContentSource {
    pub fn is_enabled(&self, source: ContentSource) -> bool {
        match source {
            ContentSource::Computer => self.computer,
            ContentSource::Github => self.github,
            ContentSource::Notion => self.notion,
        }
    }

    pub fn set(&mut self, source: ContentSource, enabled: bool) {
        match source {
            ContentSource::Computer => self.computer = enabled,
            ContentSource::Github => self.github = enabled,
            ContentSource::Notion => self.notion = enabled,
        }
    }
}

/// Settings snapshot served by `GET /api/settings?detailed=true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub given_name: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub is_phone_number_verified: bool,
    pub is_active: bool,
    pub subscription_state: SubscriptionState,
    pub subscription_renewal_date: Option<String>,
    pub subscription_enabled_trial_at: Option<String>,
    pub length_of_free_trial: u32,
    pub notion_token: Option<String>,
    pub enabled_content_source: EnabledContentSource,
    pub chat_model_options: Vec<ModelOption>,
    pub paint_model_options: Vec<ModelOption>,
    pub voice_model_options: Vec<ModelOption>,
    pub selected_chat_model_config: Option<i64>,
    pub selected_paint_model_config: Option<i64>,
    pub selected_voice_model_config: Option<i64>,
}

impl UserConfig {
    pub fn model_options(&self, modality: Modality) -> &[ModelOption] {
        match modality {
            Modality::Chat => &self.chat_model_options,
            Modality::Paint => &self.paint_model_options,
            Modality::Voice => &self.voice_model_options,
        }
    }

    pub fn selected_model(&self, modality: Modality) -> Option<i64> {
        match modality {
            Modality::Chat => self.selected_chat_model_config,
            Modality::Paint => self.selected_paint_model_config,
            Modality::Voice => self.selected_voice_model_config,
        }
    }

    pub fn set_selected_model(&mut self, modality: Modality, id: i64) {
        let slot = match modality {
            Modality::Chat => &mut self.selected_chat_model_config,
            Modality::Paint => &mut self.selected_paint_model_config,
            Modality::Voice => &mut self.selected_voice_model_config,
        };
        *slot = Some(id);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenObject {
    pub token: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialResponse {
    pub trial_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFilesRequest {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionTokenRequest {
    pub token: String,
}
