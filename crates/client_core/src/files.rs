//! Synced file management for the computer content source.

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::{api::ContentApi, error::RequestError};

/// Sends local files to the backend for indexing.
#[async_trait]
pub trait ContentUploader: Send + Sync {
    async fn upload(&self, paths: &[PathBuf]) -> Result<()>;
}

pub struct MissingContentUploader;

#[async_trait]
impl ContentUploader for MissingContentUploader {
    async fn upload(&self, _paths: &[PathBuf]) -> Result<()> {
        Err(anyhow!("content uploader is unavailable"))
    }
}

pub struct SyncedFileManager {
    api: Arc<dyn ContentApi>,
    uploader: Arc<dyn ContentUploader>,
    files: Vec<String>,
    selected: Vec<String>,
    filter: String,
}

impl SyncedFileManager {
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self::with_uploader(api, Arc::new(MissingContentUploader))
    }

    pub fn with_uploader(api: Arc<dyn ContentApi>, uploader: Arc<dyn ContentUploader>) -> Self {
        Self {
            api,
            uploader,
            files: Vec::new(),
            selected: Vec::new(),
            filter: String::new(),
        }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter = text.into();
    }

    /// Files whose name contains the filter text, ignoring case.
    pub fn filtered(&self) -> Vec<&str> {
        let needle = self.filter.to_lowercase();
        self.files
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    pub fn toggle_selected(&mut self, name: &str) {
        if let Some(index) = self.selected.iter().position(|s| s == name) {
            self.selected.remove(index);
        } else {
            self.selected.push(name.to_string());
        }
    }

    /// Re-fetches the synced file list. On failure the current list is kept.
    pub async fn refresh(&mut self) -> Result<(), RequestError> {
        match self.api.list_computer_files().await {
            Ok(mut files) => {
                files.sort();
                self.files = files;
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "failed to fetch synced files");
                Err(err)
            }
        }
    }

    pub async fn delete_file(&mut self, name: &str) -> Result<(), RequestError> {
        if let Err(err) = self.api.delete_file(name).await {
            error!(file = name, error = %err, "failed to delete file");
            return Err(err);
        }
        self.files.retain(|file| file != name);
        self.selected.retain(|file| file != name);
        Ok(())
    }

    /// Deletes the selection, or every filtered file when nothing is
    /// selected. Returns the names that were deleted.
    pub async fn delete_selected(&mut self) -> Result<Vec<String>, RequestError> {
        let targets: Vec<String> = if self.selected.is_empty() {
            self.filtered().into_iter().map(str::to_string).collect()
        } else {
            self.selected.clone()
        };
        if targets.is_empty() {
            return Ok(targets);
        }

        if let Err(err) = self.api.delete_files(&targets).await {
            error!(count = targets.len(), error = %err, "failed to delete files");
            return Err(err);
        }
        self.files.retain(|file| !targets.contains(file));
        self.selected.clear();
        Ok(targets)
    }

    /// Hands the paths to the uploader and re-fetches the list once it is done,
    /// whether or not every file made it.
    pub async fn upload(&mut self, paths: &[PathBuf]) -> Result<()> {
        let outcome = self.uploader.upload(paths).await;
        match &outcome {
            Ok(()) => info!(count = paths.len(), "files uploaded"),
            Err(err) => warn!(error = %err, "upload did not complete"),
        }
        // A failed refresh is already logged and keeps the old list.
        let _ = self.refresh().await;
        outcome
    }
}

#[cfg(test)]
#[path = "tests/files_tests.rs"]
mod tests;
