// src/services/key_selection.rs
use async_trait::async_trait;
use log::{info, warn};
use tokio::sync::RwLock;

use crate::errors::SocialSyncError;

/// Access to the elevated key tier needed for high-res images and video.
#[async_trait]
pub trait KeySelection: Send + Sync {
    async fn has_selected_key(&self) -> bool;
    async fn request_key_selection(&self) -> Result<(), SocialSyncError>;
}

/// Used when there is no hosting environment to pick a key from: the env key is all there is.
pub struct EnvironmentKeySelection;

#[async_trait]
impl KeySelection for EnvironmentKeySelection {
    async fn has_selected_key(&self) -> bool {
        true
    }

    async fn request_key_selection(&self) -> Result<(), SocialSyncError> {
        warn!("Please configure your API key in the environment.");
        Ok(())
    }
}

/// Keys known to the process. The selected key, if any, takes precedence over the env key.
pub struct ApiKeys {
    env_key: String,
    selected: RwLock<Option<String>>,
}

impl ApiKeys {
    pub fn new(env_key: impl Into<String>) -> Self {
        Self {
            env_key: env_key.into(),
            selected: RwLock::new(None),
        }
    }

    /// Key to use for the next remote call.
    pub async fn current(&self) -> String {
        self.selected
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.env_key.clone())
    }

    pub async fn select(&self, api_key: &str) -> Result<(), SocialSyncError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(SocialSyncError::Validation(
                "API key must not be empty".to_string(),
            ));
        }
        *self.selected.write().await = Some(api_key.to_string());
        info!("Elevated API key selected");
        Ok(())
    }
}

#[async_trait]
impl KeySelection for ApiKeys {
    async fn has_selected_key(&self) -> bool {
        self.selected.read().await.is_some()
    }

    async fn request_key_selection(&self) -> Result<(), SocialSyncError> {
        warn!("An elevated API key is required; select one via POST /api/v1/keys");
        Ok(())
    }
}
