// src/config.rs
use std::time::Duration;

use crate::errors::SocialSyncError;
use crate::services::video_job::PollPolicy;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub bind_addr: String,
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
    pub video_model: String,
    pub video_poll: PollPolicy,
    pub require_key_selection: bool,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            bind_addr: DEFAULT_BIND.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            video_poll: PollPolicy::default(),
            require_key_selection: false,
        }
    }

    pub fn from_env() -> Result<Self, SocialSyncError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source, so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SocialSyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                SocialSyncError::Config("GEMINI_API_KEY or API_KEY must be set".to_string())
            })?;

        let mut config = Config::new(api_key.trim());

        if let Some(bind) = lookup("SOCIALSYNC_BIND") {
            config.bind_addr = bind;
        }
        if let Some(base) = lookup("GEMINI_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("GEMINI_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Some(model) = lookup("GEMINI_IMAGE_MODEL") {
            config.image_model = model;
        }
        if let Some(model) = lookup("GEMINI_VIDEO_MODEL") {
            config.video_model = model;
        }
        if let Some(secs) = lookup("VIDEO_POLL_INTERVAL_SECS") {
            let secs: u64 = parse_var("VIDEO_POLL_INTERVAL_SECS", &secs)?;
            config.video_poll.interval = Duration::from_secs(secs);
        }
        if let Some(max) = lookup("VIDEO_MAX_POLLS") {
            config.video_poll.max_attempts = parse_var("VIDEO_MAX_POLLS", &max)?;
        }
        if let Some(flag) = lookup("REQUIRE_KEY_SELECTION") {
            config.require_key_selection = parse_var("REQUIRE_KEY_SELECTION", &flag)?;
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, SocialSyncError> {
    value
        .trim()
        .parse()
        .map_err(|_| SocialSyncError::Config(format!("Invalid value for {}: {}", name, value)))
}
