// src/services/campaign_controller.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use log::{debug, error, info, warn};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::errors::SocialSyncError;
use crate::models::*;
use crate::services::blob_store::BlobStore;
use crate::services::campaign_state::{CampaignEvent, CampaignState};
use crate::services::generator::MediaGenerator;
use crate::services::key_selection::KeySelection;

pub const PROGRESS_INITIALIZING: &str = "Initializing Veo...";
pub const PROGRESS_GENERATING: &str = "Generating video (this takes a minute)...";

/// Result of a successful text phase. The image attachment tasks keep running after it is
/// returned; `wait_for_images` joins them.
pub struct GenerationCycle {
    pub cycle: u64,
    pub campaign: Campaign,
    attachments: Vec<JoinHandle<()>>,
}

impl GenerationCycle {
    pub async fn wait_for_images(&mut self) {
        for outcome in join_all(self.attachments.drain(..)).await {
            if let Err(e) = outcome {
                error!("Image attachment task for cycle {} aborted: {}", self.cycle, e);
            }
        }
    }
}

#[derive(Debug, Clone)]
struct DetailSession {
    cycle: u64,
    platform: Platform,
    image_size: ImageSize,
    aspect_ratio: AspectRatio,
    is_regenerating_image: bool,
    video: VideoState,
    opened_at: DateTime<Utc>,
}

impl DetailSession {
    fn is_busy(&self) -> bool {
        self.is_regenerating_image || self.video.is_generating
    }
}

fn busy_error() -> SocialSyncError {
    SocialSyncError::Validation("Media generation is already in progress for this post".to_string())
}

pub struct CampaignController {
    generator: Arc<dyn MediaGenerator>,
    keys: Arc<dyn KeySelection>,
    blobs: Arc<BlobStore>,
    state: RwLock<CampaignState>,
    sessions: RwLock<HashMap<Uuid, DetailSession>>,
}

impl CampaignController {
    pub fn new(
        generator: Arc<dyn MediaGenerator>,
        keys: Arc<dyn KeySelection>,
        blobs: Arc<BlobStore>,
    ) -> Self {
        Self {
            generator,
            keys,
            blobs,
            state: RwLock::new(CampaignState::default()),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn snapshot(&self) -> CampaignState {
        self.state.read().await.clone()
    }

    /// Applies one event under the write lock, so concurrent merges never interleave.
    async fn dispatch(&self, event: CampaignEvent) -> CampaignState {
        let mut state = self.state.write().await;
        let next = std::mem::take(&mut *state).reduce(event);
        *state = next.clone();
        next
    }

    /// Drafts text for all platforms, publishes it, then attaches images in the background.
    /// A blank idea is a no-op and yields `Ok(None)`. A cycle overtaken by a newer request
    /// before its text arrives fails with `Superseded`.
    pub async fn generate(
        self: &Arc<Self>,
        idea: &str,
        tone: Tone,
    ) -> Result<Option<GenerationCycle>, SocialSyncError> {
        let idea = idea.trim();
        if idea.is_empty() {
            return Ok(None);
        }

        let cycle = self
            .dispatch(CampaignEvent::GenerationStarted {
                idea: idea.to_string(),
                tone,
            })
            .await
            .cycle;
        info!("Generation cycle {} started ({} tone)", cycle, tone);

        // Detail sessions point at the campaign that was just cleared.
        self.sessions
            .write()
            .await
            .retain(|_, session| session.cycle >= cycle);

        let campaign = match self.generator.generate_campaign_text(idea, tone).await {
            Ok(campaign) => campaign,
            Err(e) => {
                error!("Generation cycle {} failed: {}", cycle, e);
                self.dispatch(CampaignEvent::GenerationFailed {
                    cycle,
                    message: e.to_string(),
                })
                .await;
                return Err(e);
            }
        };

        let state = self
            .dispatch(CampaignEvent::TextGenerated {
                cycle,
                campaign: campaign.clone(),
            })
            .await;

        if state.cycle != cycle {
            warn!("Generation cycle {} was superseded before its text arrived", cycle);
            return Err(SocialSyncError::Superseded(format!(
                "Generation {} was replaced by generation {}",
                cycle, state.cycle
            )));
        }

        let attachments = campaign
            .posts()
            .into_iter()
            .map(|post| {
                let controller = Arc::clone(self);
                let post = post.clone();
                tokio::spawn(async move { controller.attach_image(cycle, post).await })
            })
            .collect();

        Ok(Some(GenerationCycle {
            cycle,
            campaign,
            attachments,
        }))
    }

    async fn attach_image(&self, cycle: u64, post: Post) {
        let result = self
            .generator
            .generate_image(&post.image_prompt, post.aspect_ratio, ImageSize::Standard)
            .await
            .map_err(|e| {
                error!("Image generation failed for {}: {}", post.platform, e);
                e.to_string()
            });

        let succeeded = result.is_ok();
        let state = self
            .dispatch(CampaignEvent::ImageAttached {
                cycle,
                platform: post.platform,
                result,
            })
            .await;

        if state.cycle != cycle {
            warn!(
                "Discarding {} image from superseded cycle {}",
                post.platform, cycle
            );
        } else if succeeded {
            debug!("Attached {} image for cycle {}", post.platform, cycle);
        }
    }

    /// Replaces the campaign entry for `post.platform` wholesale.
    pub async fn update_post(&self, post: Post) -> Result<Post, SocialSyncError> {
        self.replace_post(None, post).await
    }

    async fn replace_post(
        &self,
        expected_cycle: Option<u64>,
        post: Post,
    ) -> Result<Post, SocialSyncError> {
        let mut state = self.state.write().await;
        if state.campaign.is_none() {
            return Err(SocialSyncError::NotFound("No campaign has been generated".to_string()));
        }
        if expected_cycle.is_some_and(|cycle| cycle != state.cycle) {
            return Err(SocialSyncError::NotFound(
                "The campaign was replaced while the image was generating".to_string(),
            ));
        }
        let next = std::mem::take(&mut *state).reduce(CampaignEvent::PostUpdated(post.clone()));
        *state = next;
        Ok(post)
    }

    async fn current_post(&self, platform: Platform) -> Result<(u64, Post), SocialSyncError> {
        let state = self.state.read().await;
        state
            .campaign
            .as_ref()
            .map(|campaign| (state.cycle, campaign.post(platform).clone()))
            .ok_or_else(|| SocialSyncError::NotFound("No campaign has been generated".to_string()))
    }

    // Detail view sessions

    pub async fn open_detail(&self, platform: Platform) -> Result<DetailView, SocialSyncError> {
        let (cycle, post) = self.current_post(platform).await?;
        let id = Uuid::new_v4();
        let session = DetailSession {
            cycle,
            platform,
            image_size: ImageSize::Standard,
            aspect_ratio: post.aspect_ratio,
            is_regenerating_image: false,
            video: VideoState::default(),
            opened_at: Utc::now(),
        };
        self.sessions.write().await.insert(id, session.clone());
        Ok(view(id, &session, Some(post)))
    }

    pub async fn detail(&self, id: &Uuid) -> Result<DetailView, SocialSyncError> {
        let session = self.session(id).await?;
        let post = self.current_post(session.platform).await.ok().map(|(_, p)| p);
        Ok(view(*id, &session, post))
    }

    /// Stops tracking the session. A video job it started keeps running; its result is dropped.
    pub async fn close_detail(&self, id: &Uuid) -> Result<(), SocialSyncError> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| session_not_found(id))
    }

    async fn session(&self, id: &Uuid) -> Result<DetailSession, SocialSyncError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| session_not_found(id))
    }

    async fn update_session<F>(&self, id: &Uuid, update: F) -> Option<DetailSession>
    where
        F: FnOnce(&mut DetailSession),
    {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(id).map(|session| {
            update(session);
            session.clone()
        })
    }

    /// Regenerates the session's image at the requested size and ratio, replacing only the
    /// post's `image_url` and `aspect_ratio`.
    pub async fn regenerate_image(
        &self,
        id: &Uuid,
        request: RegenerateImageRequest,
    ) -> Result<DetailView, SocialSyncError> {
        let mut busy = false;
        let session = self
            .update_session(id, |session| {
                if session.is_busy() {
                    busy = true;
                    return;
                }
                if let Some(size) = request.image_size {
                    session.image_size = size;
                }
                if let Some(ratio) = request.aspect_ratio {
                    session.aspect_ratio = ratio;
                }
                session.is_regenerating_image = true;
            })
            .await
            .ok_or_else(|| session_not_found(id))?;

        if busy {
            return Err(busy_error());
        }

        let outcome = self.regenerate_for(&session).await;
        let session = self
            .update_session(id, |session| session.is_regenerating_image = false)
            .await
            .unwrap_or(session);

        match outcome {
            Ok(post) => Ok(view(*id, &session, Some(post))),
            Err(e) => {
                error!("Failed to regenerate {} image: {}", session.platform, e);
                Err(e)
            }
        }
    }

    async fn regenerate_for(&self, session: &DetailSession) -> Result<Post, SocialSyncError> {
        if session.image_size.requires_elevated_key() {
            self.ensure_elevated_key().await?;
        }

        let (cycle, post) = self.current_post(session.platform).await?;
        let image_url = self
            .generator
            .generate_image(&post.image_prompt, session.aspect_ratio, session.image_size)
            .await?;

        let updated = Post {
            image_url: Some(image_url),
            aspect_ratio: session.aspect_ratio,
            ..post
        };
        self.replace_post(Some(cycle), updated).await
    }

    /// Prompts once, then re-checks: a key that is still missing needs another user action.
    async fn ensure_elevated_key(&self) -> Result<(), SocialSyncError> {
        if self.keys.has_selected_key().await {
            return Ok(());
        }
        self.keys.request_key_selection().await?;
        if self.keys.has_selected_key().await {
            Ok(())
        } else {
            Err(SocialSyncError::CredentialRequired(
                "High resolution images need a selected API key".to_string(),
            ))
        }
    }

    /// Starts animating the session's image. Progress and the outcome land in the
    /// session's `VideoState`; the returned handle resolves when the job ends.
    pub async fn animate(
        self: &Arc<Self>,
        id: &Uuid,
    ) -> Result<(VideoState, JoinHandle<()>), SocialSyncError> {
        let session = self.session(id).await?;
        if session.is_busy() {
            return Err(busy_error());
        }
        let (_, post) = self.current_post(session.platform).await?;
        let image_url = post.image_url.clone().ok_or_else(|| {
            SocialSyncError::Validation("The post has no generated image to animate".to_string())
        })?;

        if !self.keys.has_selected_key().await {
            self.keys.request_key_selection().await?;
            return Err(SocialSyncError::CredentialRequired(
                "Video generation needs a selected API key; select one and try again".to_string(),
            ));
        }

        let mut busy = false;
        let session = self
            .update_session(id, |session| {
                if session.is_busy() {
                    busy = true;
                    return;
                }
                session.video = VideoState {
                    is_generating: true,
                    video_url: None,
                    error: None,
                    progress_message: PROGRESS_INITIALIZING.to_string(),
                };
            })
            .await
            .ok_or_else(|| session_not_found(id))?;

        if busy {
            return Err(busy_error());
        }

        let ratio = VideoAspectRatio::from(session.aspect_ratio);
        let prompt = format!("Animate this {} post image cinematically", post.platform);
        let controller = Arc::clone(self);
        let id = *id;
        let started = session.video.clone();

        let handle = tokio::spawn(async move {
            controller
                .update_session(&id, |session| {
                    session.video.progress_message = PROGRESS_GENERATING.to_string();
                })
                .await;

            let video = match controller
                .generator
                .generate_video(&image_url, &prompt, ratio)
                .await
            {
                Ok(video) => VideoState {
                    is_generating: false,
                    video_url: Some(controller.blobs.put(video.content_type, video.bytes).await),
                    error: None,
                    progress_message: String::new(),
                },
                Err(e) => {
                    error!("Video generation failed for session {}: {}", id, e);
                    VideoState {
                        is_generating: false,
                        video_url: None,
                        error: Some(e.to_string()),
                        progress_message: String::new(),
                    }
                }
            };

            if controller
                .update_session(&id, |session| session.video = video)
                .await
                .is_none()
            {
                debug!("Detail session {} closed before its video finished", id);
            }
        });

        Ok((started, handle))
    }
}

fn view(id: Uuid, session: &DetailSession, post: Option<Post>) -> DetailView {
    DetailView {
        id,
        platform: session.platform,
        post,
        image_size: session.image_size,
        aspect_ratio: session.aspect_ratio,
        is_regenerating_image: session.is_regenerating_image,
        video: session.video.clone(),
        opened_at: session.opened_at,
    }
}

fn session_not_found(id: &Uuid) -> SocialSyncError {
    SocialSyncError::NotFound(format!("Detail session {} not found", id))
}
