// src/services/gemini_service.rs
use crate::config::Config;
use crate::errors::SocialSyncError;
use crate::models::*;
use crate::services::generator::GeneratedVideo;
use crate::services::image_payload::ImagePayload;
use crate::services::video_job::{OperationStatus, PollPolicy, VideoJob};
use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

const SYSTEM_INSTRUCTION: &str = "You are an expert social media manager and content creator.";
pub const DEFAULT_VIDEO_PROMPT: &str = "Animate this image cinematically";

#[derive(Debug, Deserialize)]
struct CampaignDraft {
    linkedin: PostDraft,
    twitter: PostDraft,
    instagram: PostDraft,
}

#[derive(Debug, Deserialize)]
struct PostDraft {
    content: String,
    hashtags: Vec<String>,
    #[serde(rename = "imagePrompt")]
    image_prompt: String,
}

impl PostDraft {
    fn into_post(self, platform: Platform) -> Post {
        Post {
            platform,
            content: self.content,
            hashtags: self.hashtags,
            image_prompt: self.image_prompt,
            image_url: None,
            aspect_ratio: platform.default_aspect_ratio(),
        }
    }
}

/// Thin client over the Generative Language REST API. Cheap to build; callers make a
/// fresh one per request so a newly selected key is always picked up.
pub struct GeminiService {
    api_key: String,
    api_base: String,
    text_model: String,
    image_model: String,
    video_model: String,
    poll: PollPolicy,
    client: Client,
}

impl GeminiService {
    pub fn new(config: &Config, api_key: String) -> Self {
        Self {
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            video_model: config.video_model.clone(),
            poll: config.video_poll,
            client: Client::new(),
        }
    }

    pub async fn generate_campaign_text(
        &self,
        idea: &str,
        tone: Tone,
    ) -> Result<Campaign, SocialSyncError> {
        let prompt = format!(
            r#"
        Create a social media content campaign for the following idea: "{}".
        Tone: {}.

        1. LinkedIn: Professional, insightful, long-form.
        2. Twitter/X: Short, punchy, engaging, under 280 characters.
        3. Instagram: Casual, visual-focused, engaging hook.

        Also provide a creative image generation prompt for each that suits the platform's aesthetic.
        "#,
            idea, tone
        );

        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "systemInstruction": {
                "parts": [{ "text": SYSTEM_INSTRUCTION }]
            },
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": campaign_schema()
            }
        });

        let result = self
            .generate_content(&self.text_model, &body)
            .await
            .inspect_err(|e| error!("Text generation failed: {}", e))?;

        let text: String = candidate_parts(&result)
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect();

        if text.trim().is_empty() {
            error!("Text generation failed: no text returned from model");
            return Err(SocialSyncError::Generation(
                "No text returned from model".to_string(),
            ));
        }

        parse_campaign(&text)
    }

    pub async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        size: ImageSize,
    ) -> Result<String, SocialSyncError> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "imageConfig": {
                    "aspectRatio": aspect_ratio.as_str(),
                    "imageSize": size.as_str()
                }
            }
        });

        let result = self.generate_content(&self.image_model, &body).await?;

        for part in candidate_parts(&result) {
            let inline = &part["inlineData"];
            if let Some(data) = inline["data"].as_str().filter(|d| !d.is_empty()) {
                let payload = ImagePayload::from_inline(inline["mimeType"].as_str(), data)?;
                return Ok(payload.to_data_uri());
            }
        }

        Err(SocialSyncError::Generation(
            "No image data found in response".to_string(),
        ))
    }

    /// Submits an image-to-video job, polls it to completion and downloads the result.
    pub async fn generate_video(
        &self,
        image_url: &str,
        prompt: &str,
        aspect_ratio: VideoAspectRatio,
    ) -> Result<GeneratedVideo, SocialSyncError> {
        let seed = ImagePayload::parse_data_uri(image_url)?;
        let prompt = if prompt.trim().is_empty() {
            DEFAULT_VIDEO_PROMPT
        } else {
            prompt
        };

        let submitted = self.submit_video(&seed, prompt, aspect_ratio).await?;
        let operation = submitted["name"]
            .as_str()
            .ok_or_else(|| {
                SocialSyncError::Generation("No operation name in video response".to_string())
            })?
            .to_string();

        info!("Video operation {} submitted", operation);

        let mut job = VideoJob::Idle
            .submit(operation)
            .observe(operation_status(&submitted), &self.poll);

        while let Some(operation) = job.operation().map(str::to_string) {
            tokio::time::sleep(self.poll.interval).await;
            let status = match self.fetch_operation(&operation).await {
                Ok(status) => status,
                Err(e) => {
                    job = job.fail(e.to_string());
                    break;
                }
            };
            debug!(
                "Video operation {} poll #{}: done={}",
                operation,
                job.attempts(),
                status.done
            );
            job = job.observe(status, &self.poll);
        }

        match job {
            VideoJob::Succeeded { video_uri } => self.download_video(&video_uri).await,
            VideoJob::Failed { reason } => {
                error!("Video generation failed: {}", reason);
                Err(SocialSyncError::Generation(reason))
            }
            other => Err(SocialSyncError::Generation(format!(
                "Video operation stopped in unexpected state: {:?}",
                other
            ))),
        }
    }

    async fn submit_video(
        &self,
        seed: &ImagePayload,
        prompt: &str,
        aspect_ratio: VideoAspectRatio,
    ) -> Result<Value, SocialSyncError> {
        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.api_base, self.video_model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "instances": [{
                    "prompt": prompt,
                    "image": {
                        "bytesBase64Encoded": seed.data,
                        "mimeType": seed.mime_type
                    }
                }],
                "parameters": {
                    "aspectRatio": aspect_ratio.as_str(),
                    "resolution": "720p",
                    "sampleCount": 1
                }
            }))
            .send()
            .await
            .map_err(|e| SocialSyncError::Generation(format!("Video request failed: {}", e)))?;

        read_json(response, "Video generation").await
    }

    async fn fetch_operation(&self, operation: &str) -> Result<OperationStatus, SocialSyncError> {
        let url = format!("{}/v1beta/{}", self.api_base, operation);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                SocialSyncError::Generation(format!("Operation status request failed: {}", e))
            })?;

        let result = read_json(response, "Operation status").await?;
        Ok(operation_status(&result))
    }

    async fn download_video(&self, video_uri: &str) -> Result<GeneratedVideo, SocialSyncError> {
        let response = self
            .client
            .get(video_uri)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| SocialSyncError::Generation(format!("Video download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SocialSyncError::Generation(format!(
                "Failed to download video bytes: HTTP {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("video/mp4")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SocialSyncError::Generation(format!("Video download failed: {}", e)))?;

        Ok(GeneratedVideo {
            content_type,
            bytes,
        })
    }

    async fn generate_content(&self, model: &str, body: &Value) -> Result<Value, SocialSyncError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.api_base, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| SocialSyncError::Generation(format!("Gemini request failed: {}", e)))?;

        read_json(response, "Gemini").await
    }
}

async fn read_json(response: reqwest::Response, what: &str) -> Result<Value, SocialSyncError> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(SocialSyncError::Generation(format!(
            "{} error ({}): {}",
            what, status, error_text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| SocialSyncError::Generation(format!("Failed to parse {} response: {}", what, e)))
}

fn candidate_parts(result: &Value) -> &[Value] {
    result["candidates"][0]["content"]["parts"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn operation_status(result: &Value) -> OperationStatus {
    OperationStatus {
        done: result["done"].as_bool().unwrap_or(false),
        video_uri: result["response"]["generateVideoResponse"]["generatedSamples"][0]["video"]
            ["uri"]
            .as_str()
            .map(str::to_string),
        error: result["error"]["message"].as_str().map(str::to_string),
    }
}

/// Parses the model's JSON output and attaches each platform's default aspect ratio.
pub fn parse_campaign(text: &str) -> Result<Campaign, SocialSyncError> {
    let draft: CampaignDraft = serde_json::from_str(text.trim())
        .map_err(|e| SocialSyncError::Generation(format!("Failed to parse campaign JSON: {}", e)))?;

    Ok(Campaign {
        linkedin: draft.linkedin.into_post(Platform::LinkedIn),
        twitter: draft.twitter.into_post(Platform::Twitter),
        instagram: draft.instagram.into_post(Platform::Instagram),
    })
}

fn post_schema(content_description: &str, prompt_description: Option<&str>) -> Value {
    let mut image_prompt = json!({ "type": "STRING" });
    if let Some(description) = prompt_description {
        image_prompt["description"] = json!(description);
    }

    json!({
        "type": "OBJECT",
        "properties": {
            "content": { "type": "STRING", "description": content_description },
            "hashtags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "imagePrompt": image_prompt
        },
        "required": ["content", "hashtags", "imagePrompt"]
    })
}

fn campaign_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "linkedin": post_schema(
                "Long-form professional post content",
                Some("A detailed prompt to generate an image for this post"),
            ),
            "twitter": post_schema("Short, punchy post under 280 chars", None),
            "instagram": post_schema("Visual-focused caption with engaging hook", None)
        },
        "required": ["linkedin", "twitter", "instagram"]
    })
}
