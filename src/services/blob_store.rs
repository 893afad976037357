// src/services/blob_store.rs
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::SocialSyncError;

#[derive(Debug, Clone)]
pub struct Blob {
    pub content_type: String,
    pub bytes: Bytes,
    pub created_at: DateTime<Utc>,
}

/// Process-local storage for downloaded media, addressed by `/api/v1/blobs/{id}`.
#[derive(Default)]
pub struct BlobStore {
    blobs: RwLock<HashMap<Uuid, Blob>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the bytes and returns the URL path they are served from.
    pub async fn put(&self, content_type: impl Into<String>, bytes: Bytes) -> String {
        let id = Uuid::new_v4();
        self.blobs.write().await.insert(
            id,
            Blob {
                content_type: content_type.into(),
                bytes,
                created_at: Utc::now(),
            },
        );
        Self::url_for(&id)
    }

    pub async fn get(&self, id: &Uuid) -> Result<Blob, SocialSyncError> {
        self.blobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SocialSyncError::NotFound(format!("Blob {} not found", id)))
    }

    pub fn url_for(id: &Uuid) -> String {
        format!("/api/v1/blobs/{}", id)
    }
}
