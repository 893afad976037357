pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

use actix_web::web;
use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    ApiKeys, BlobStore, CampaignController, EnvironmentKeySelection, GeminiGenerator,
    KeySelection, MediaGenerator,
};

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<CampaignController>,
    pub keys: Arc<ApiKeys>,
    pub blobs: Arc<BlobStore>,
}

impl AppState {
    pub fn new(
        generator: Arc<dyn MediaGenerator>,
        key_selection: Arc<dyn KeySelection>,
        keys: Arc<ApiKeys>,
    ) -> Self {
        let blobs = Arc::new(BlobStore::new());
        let controller = Arc::new(CampaignController::new(
            generator,
            key_selection,
            Arc::clone(&blobs),
        ));
        Self {
            controller,
            keys,
            blobs,
        }
    }

    /// Wires the Gemini-backed generator. Without `require_key_selection` the env key counts
    /// as elevated, matching a deployment with no key picker.
    pub fn from_config(config: Config) -> Self {
        let keys = Arc::new(ApiKeys::new(config.api_key.clone()));
        let key_selection: Arc<dyn KeySelection> = if config.require_key_selection {
            Arc::clone(&keys) as Arc<dyn KeySelection>
        } else {
            Arc::new(EnvironmentKeySelection)
        };
        let generator = Arc::new(GeminiGenerator::new(config, Arc::clone(&keys)));
        Self::new(generator, key_selection, keys)
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/campaigns", web::post().to(handlers::generate_campaign))
            .route("/campaign", web::get().to(handlers::get_campaign))
            .route(
                "/campaign/posts/{platform}",
                web::put().to(handlers::update_post),
            )
            .route("/details", web::post().to(handlers::open_detail))
            .route("/details/{session_id}", web::get().to(handlers::get_detail))
            .route(
                "/details/{session_id}",
                web::delete().to(handlers::close_detail),
            )
            .route(
                "/details/{session_id}/regenerate",
                web::post().to(handlers::regenerate_image),
            )
            .route(
                "/details/{session_id}/animate",
                web::post().to(handlers::animate),
            )
            .route("/blobs/{blob_id}", web::get().to(handlers::get_blob))
            .route("/keys", web::post().to(handlers::select_key)),
    )
    .route("/health", web::get().to(handlers::health_check));
}
