// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::SocialSyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "LinkedIn")]
    LinkedIn,
    #[serde(rename = "Twitter/X")]
    Twitter,
    #[serde(rename = "Instagram")]
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::LinkedIn, Platform::Twitter, Platform::Instagram];

    /// Key used for this platform in the campaign schema.
    pub fn key(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "linkedin",
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "LinkedIn",
            Platform::Twitter => "Twitter/X",
            Platform::Instagram => "Instagram",
        }
    }

    /// Aspect ratio a freshly drafted post starts with. Never taken from model output.
    pub fn default_aspect_ratio(&self) -> AspectRatio {
        match self {
            Platform::LinkedIn => AspectRatio::Landscape4x3,
            Platform::Twitter => AspectRatio::Widescreen16x9,
            Platform::Instagram => AspectRatio::Square,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = SocialSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linkedin" => Ok(Platform::LinkedIn),
            "twitter" | "x" | "twitter/x" => Ok(Platform::Twitter),
            "instagram" => Ok(Platform::Instagram),
            other => Err(SocialSyncError::Validation(format!(
                "Unknown platform: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Professional,
    Witty,
    Urgent,
    Casual,
    Inspirational,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tone::Professional => "Professional",
            Tone::Witty => "Witty",
            Tone::Urgent => "Urgent",
            Tone::Casual => "Casual",
            Tone::Inspirational => "Inspirational",
        };
        f.write_str(name)
    }
}

/// Resolution tier for on-demand regeneration. The initial batch always uses `Standard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1K")]
    Standard,
    #[serde(rename = "2K")]
    High,
    #[serde(rename = "4K")]
    Ultra,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Standard => "1K",
            ImageSize::High => "2K",
            ImageSize::Ultra => "4K",
        }
    }

    /// Anything above standard needs an elevated key.
    pub fn requires_elevated_key(&self) -> bool {
        *self != ImageSize::Standard
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "2:3")]
    Portrait2x3,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "9:16")]
    Story9x16,
    #[serde(rename = "16:9")]
    Widescreen16x9,
    #[serde(rename = "21:9")]
    Ultrawide21x9,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Story9x16 => "9:16",
            AspectRatio::Widescreen16x9 => "16:9",
            AspectRatio::Ultrawide21x9 => "21:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only two ratios the video model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoAspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl VideoAspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoAspectRatio::Landscape => "16:9",
            VideoAspectRatio::Portrait => "9:16",
        }
    }
}

impl From<AspectRatio> for VideoAspectRatio {
    fn from(ratio: AspectRatio) -> Self {
        match ratio {
            AspectRatio::Story9x16 => VideoAspectRatio::Portrait,
            _ => VideoAspectRatio::Landscape,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub platform: Platform,
    pub content: String,
    pub hashtags: Vec<String>,
    pub image_prompt: String,
    /// `data:<mime>;base64,<payload>` once an image has been attached.
    #[serde(default)]
    pub image_url: Option<String>,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub linkedin: Post,
    pub twitter: Post,
    pub instagram: Post,
}

impl Campaign {
    pub fn post(&self, platform: Platform) -> &Post {
        match platform {
            Platform::LinkedIn => &self.linkedin,
            Platform::Twitter => &self.twitter,
            Platform::Instagram => &self.instagram,
        }
    }

    pub fn post_mut(&mut self, platform: Platform) -> &mut Post {
        match platform {
            Platform::LinkedIn => &mut self.linkedin,
            Platform::Twitter => &mut self.twitter,
            Platform::Instagram => &mut self.instagram,
        }
    }

    pub fn posts(&self) -> [&Post; 3] {
        [&self.linkedin, &self.twitter, &self.instagram]
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoState {
    pub is_generating: bool,
    pub video_url: Option<String>,
    pub error: Option<String>,
    pub progress_message: String,
}

pub type LoadingImages = BTreeMap<Platform, bool>;

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub id: Uuid,
    pub platform: Platform,
    pub post: Option<Post>,
    pub image_size: ImageSize,
    pub aspect_ratio: AspectRatio,
    pub is_regenerating_image: bool,
    pub video: VideoState,
    pub opened_at: DateTime<Utc>,
}

// Request bodies

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateCampaignRequest {
    pub idea: String,
    #[serde(default)]
    pub tone: Tone,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateCampaignQuery {
    #[serde(default)]
    pub wait_for_images: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenDetailRequest {
    pub platform: Platform,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegenerateImageRequest {
    pub image_size: Option<ImageSize>,
    pub aspect_ratio: Option<AspectRatio>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectKeyRequest {
    pub api_key: String,
}
