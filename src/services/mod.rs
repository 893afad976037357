// src/services/mod.rs
pub mod blob_store;
pub mod campaign_controller;
pub mod campaign_state;
pub mod gemini_service;
pub mod generator;
pub mod image_payload;
pub mod key_selection;
pub mod video_job;

pub use blob_store::BlobStore;
pub use campaign_controller::{CampaignController, GenerationCycle};
pub use campaign_state::{CampaignEvent, CampaignState};
pub use gemini_service::GeminiService;
pub use generator::{GeminiGenerator, GeneratedVideo, MediaGenerator};
pub use key_selection::{ApiKeys, EnvironmentKeySelection, KeySelection};
