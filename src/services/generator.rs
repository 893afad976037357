// src/services/generator.rs
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::Config;
use crate::errors::SocialSyncError;
use crate::models::*;
use crate::services::gemini_service::GeminiService;
use crate::services::key_selection::ApiKeys;

#[derive(Debug, Clone)]
pub struct GeneratedVideo {
    pub content_type: String,
    pub bytes: Bytes,
}

/// The remote generative operations the campaign workflow depends on.
#[async_trait]
pub trait MediaGenerator: Send + Sync {
    async fn generate_campaign_text(
        &self,
        idea: &str,
        tone: Tone,
    ) -> Result<Campaign, SocialSyncError>;

    /// Returns a `data:` URI.
    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        size: ImageSize,
    ) -> Result<String, SocialSyncError>;

    async fn generate_video(
        &self,
        image_url: &str,
        prompt: &str,
        aspect_ratio: VideoAspectRatio,
    ) -> Result<GeneratedVideo, SocialSyncError>;
}

pub struct GeminiGenerator {
    config: Config,
    keys: Arc<ApiKeys>,
}

impl GeminiGenerator {
    pub fn new(config: Config, keys: Arc<ApiKeys>) -> Self {
        Self { config, keys }
    }

    async fn service(&self) -> GeminiService {
        GeminiService::new(&self.config, self.keys.current().await)
    }
}

#[async_trait]
impl MediaGenerator for GeminiGenerator {
    async fn generate_campaign_text(
        &self,
        idea: &str,
        tone: Tone,
    ) -> Result<Campaign, SocialSyncError> {
        self.service().await.generate_campaign_text(idea, tone).await
    }

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        size: ImageSize,
    ) -> Result<String, SocialSyncError> {
        self.service()
            .await
            .generate_image(prompt, aspect_ratio, size)
            .await
    }

    async fn generate_video(
        &self,
        image_url: &str,
        prompt: &str,
        aspect_ratio: VideoAspectRatio,
    ) -> Result<GeneratedVideo, SocialSyncError> {
        self.service()
            .await
            .generate_video(image_url, prompt, aspect_ratio)
            .await
    }
}
