// src/errors.rs
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SocialSyncError {
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API key selection required: {0}")]
    CredentialRequired(String),

    #[error("Superseded: {0}")]
    Superseded(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResponseError for SocialSyncError {
    fn error_response(&self) -> HttpResponse {
        match self {
            SocialSyncError::Generation(_) => {
                HttpResponse::ServiceUnavailable().json(serde_json::json!({
                    "error": "AI service error",
                    "message": self.to_string()
                }))
            }
            SocialSyncError::Validation(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Validation error",
                "message": self.to_string()
            })),
            SocialSyncError::CredentialRequired(_) => {
                HttpResponse::Forbidden().json(serde_json::json!({
                    "error": "API key required",
                    "message": self.to_string()
                }))
            }
            SocialSyncError::Superseded(_) => HttpResponse::Conflict().json(serde_json::json!({
                "error": "Superseded",
                "message": self.to_string()
            })),
            SocialSyncError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "Not found",
                "message": self.to_string()
            })),
            SocialSyncError::Serialization(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Data processing error",
                    "message": self.to_string()
                }))
            }
            SocialSyncError::Config(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Configuration error",
                    "message": self.to_string()
                }))
            }
        }
    }
}
