#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use tokio::sync::Notify;

use socialsync::errors::SocialSyncError;
use socialsync::models::*;
use socialsync::services::{GeneratedVideo, KeySelection, MediaGenerator};

pub fn post(platform: Platform, version: &str) -> Post {
    Post {
        platform,
        content: format!("{} {} content", version, platform.key()),
        hashtags: vec![format!("#{}", platform.key()), "#coffee".to_string()],
        image_prompt: format!("{} {} prompt", version, platform.key()),
        image_url: None,
        aspect_ratio: platform.default_aspect_ratio(),
    }
}

pub fn campaign(version: &str) -> Campaign {
    Campaign {
        linkedin: post(Platform::LinkedIn, version),
        twitter: post(Platform::Twitter, version),
        instagram: post(Platform::Instagram, version),
    }
}

/// The data URI the fake returns for a prompt, so tests can tell which prompt an image
/// came from.
pub fn image_for(prompt: &str) -> String {
    format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(prompt)
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageCall {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub size: ImageSize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoCall {
    pub image_url: String,
    pub prompt: String,
    pub aspect_ratio: VideoAspectRatio,
}

#[derive(Default)]
pub struct FakeGenerator {
    campaigns: Mutex<VecDeque<(Result<Campaign, SocialSyncError>, Option<Duration>)>>,
    image_delays: Mutex<HashMap<String, Duration>>,
    failing_prompts: Mutex<HashSet<String>>,
    pub image_calls: Mutex<Vec<ImageCall>>,
    pub video_calls: Mutex<Vec<VideoCall>>,
    video_result: Mutex<Option<Result<GeneratedVideo, SocialSyncError>>>,
    pub video_gate: Option<std::sync::Arc<Notify>>,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video_gate(gate: std::sync::Arc<Notify>) -> Self {
        Self {
            video_gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn push_campaign(&self, result: Result<Campaign, SocialSyncError>) {
        self.campaigns.lock().unwrap().push_back((result, None));
    }

    /// Queues a text result that is only returned after `delay`.
    pub fn push_campaign_after(&self, result: Result<Campaign, SocialSyncError>, delay: Duration) {
        self.campaigns
            .lock()
            .unwrap()
            .push_back((result, Some(delay)));
    }

    pub fn delay_image(&self, prompt: &str, delay: Duration) {
        self.image_delays
            .lock()
            .unwrap()
            .insert(prompt.to_string(), delay);
    }

    pub fn fail_image(&self, prompt: &str) {
        self.failing_prompts
            .lock()
            .unwrap()
            .insert(prompt.to_string());
    }

    pub fn set_video_result(&self, result: Result<GeneratedVideo, SocialSyncError>) {
        *self.video_result.lock().unwrap() = Some(result);
    }

    pub fn image_calls(&self) -> Vec<ImageCall> {
        self.image_calls.lock().unwrap().clone()
    }

    pub fn video_calls(&self) -> Vec<VideoCall> {
        self.video_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaGenerator for FakeGenerator {
    async fn generate_campaign_text(
        &self,
        _idea: &str,
        _tone: Tone,
    ) -> Result<Campaign, SocialSyncError> {
        let next = self.campaigns.lock().unwrap().pop_front();
        let (result, delay) = next.unwrap_or_else(|| (Ok(campaign("v1")), None));
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        size: ImageSize,
    ) -> Result<String, SocialSyncError> {
        self.image_calls.lock().unwrap().push(ImageCall {
            prompt: prompt.to_string(),
            aspect_ratio,
            size,
        });

        let delay = self.image_delays.lock().unwrap().get(prompt).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_prompts.lock().unwrap().contains(prompt) {
            return Err(SocialSyncError::Generation(
                "No image data found in response".to_string(),
            ));
        }
        Ok(image_for(prompt))
    }

    async fn generate_video(
        &self,
        image_url: &str,
        prompt: &str,
        aspect_ratio: VideoAspectRatio,
    ) -> Result<GeneratedVideo, SocialSyncError> {
        self.video_calls.lock().unwrap().push(VideoCall {
            image_url: image_url.to_string(),
            prompt: prompt.to_string(),
            aspect_ratio,
        });

        if let Some(gate) = &self.video_gate {
            gate.notified().await;
        }

        self.video_result.lock().unwrap().clone().unwrap_or_else(|| {
            Ok(GeneratedVideo {
                content_type: "video/mp4".to_string(),
                bytes: Bytes::from_static(b"fake-mp4"),
            })
        })
    }
}

/// Stand-in for the hosting environment's key picker.
pub struct FakeKeys {
    selected: AtomicBool,
    grant_on_request: bool,
    pub requests: AtomicUsize,
}

impl FakeKeys {
    pub fn selected() -> Self {
        Self {
            selected: AtomicBool::new(true),
            grant_on_request: false,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn unselected(grant_on_request: bool) -> Self {
        Self {
            selected: AtomicBool::new(false),
            grant_on_request,
            requests: AtomicUsize::new(0),
        }
    }

    /// Simulates the user dropping their selected key.
    pub fn revoke(&self) {
        self.selected.store(false, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySelection for FakeKeys {
    async fn has_selected_key(&self) -> bool {
        self.selected.load(Ordering::SeqCst)
    }

    async fn request_key_selection(&self) -> Result<(), SocialSyncError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.grant_on_request {
            self.selected.store(true, Ordering::SeqCst);
        }
        Ok(())
    }
}
