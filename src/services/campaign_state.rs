// src/services/campaign_state.rs
use serde::Serialize;

use crate::models::*;

/// Everything the campaign screen shows, advanced only through [`CampaignState::reduce`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignState {
    /// Bumped on every generation request; results tagged with an older cycle are dropped.
    pub cycle: u64,
    pub idea: String,
    pub tone: Tone,
    pub generating: bool,
    pub campaign: Option<Campaign>,
    pub loading_images: LoadingImages,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CampaignEvent {
    GenerationStarted {
        idea: String,
        tone: Tone,
    },
    TextGenerated {
        cycle: u64,
        campaign: Campaign,
    },
    ImageAttached {
        cycle: u64,
        platform: Platform,
        result: Result<String, String>,
    },
    GenerationFailed {
        cycle: u64,
        message: String,
    },
    PostUpdated(Post),
}

impl Default for CampaignState {
    fn default() -> Self {
        Self {
            cycle: 0,
            idea: String::new(),
            tone: Tone::default(),
            generating: false,
            campaign: None,
            loading_images: all_platforms(false),
            last_error: None,
        }
    }
}

fn all_platforms(loading: bool) -> LoadingImages {
    Platform::ALL.iter().map(|p| (*p, loading)).collect()
}

impl CampaignState {
    pub fn reduce(mut self, event: CampaignEvent) -> Self {
        match event {
            CampaignEvent::GenerationStarted { idea, tone } => {
                self.cycle += 1;
                self.idea = idea;
                self.tone = tone;
                self.generating = true;
                self.campaign = None;
                self.loading_images = all_platforms(true);
                self.last_error = None;
            }
            CampaignEvent::TextGenerated { cycle, campaign } => {
                if cycle == self.cycle {
                    self.campaign = Some(campaign);
                    self.generating = false;
                }
            }
            CampaignEvent::ImageAttached {
                cycle,
                platform,
                result,
            } => {
                // A cleared flag means the slot already settled or was replaced explicitly.
                if cycle != self.cycle || !self.is_loading_image(platform) {
                    return self;
                }
                if let (Ok(image_url), Some(campaign)) = (result, self.campaign.as_mut()) {
                    campaign.post_mut(platform).image_url = Some(image_url);
                }
                self.loading_images.insert(platform, false);
            }
            CampaignEvent::GenerationFailed { cycle, message } => {
                if cycle == self.cycle {
                    self.generating = false;
                    self.campaign = None;
                    self.loading_images = all_platforms(false);
                    self.last_error = Some(message);
                }
            }
            CampaignEvent::PostUpdated(post) => {
                if let Some(campaign) = self.campaign.as_mut() {
                    let platform = post.platform;
                    *campaign.post_mut(platform) = post;
                    self.loading_images.insert(platform, false);
                }
            }
        }
        self
    }

    pub fn is_loading_image(&self, platform: Platform) -> bool {
        self.loading_images.get(&platform).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(platform: Platform) -> Post {
        Post {
            platform,
            content: format!("{} content", platform),
            hashtags: vec!["#coffee".to_string()],
            image_prompt: format!("{} prompt", platform),
            image_url: None,
            aspect_ratio: platform.default_aspect_ratio(),
        }
    }

    fn campaign() -> Campaign {
        Campaign {
            linkedin: post(Platform::LinkedIn),
            twitter: post(Platform::Twitter),
            instagram: post(Platform::Instagram),
        }
    }

    fn started() -> CampaignState {
        CampaignState::default().reduce(CampaignEvent::GenerationStarted {
            idea: "eco cups".to_string(),
            tone: Tone::Professional,
        })
    }

    fn with_text() -> CampaignState {
        let state = started();
        let cycle = state.cycle;
        state.reduce(CampaignEvent::TextGenerated {
            cycle,
            campaign: campaign(),
        })
    }

    fn attached(cycle: u64, platform: Platform, url: &str) -> CampaignEvent {
        CampaignEvent::ImageAttached {
            cycle,
            platform,
            result: Ok(url.to_string()),
        }
    }

    #[test]
    fn start_marks_everything_loading() {
        let state = started();
        assert_eq!(state.cycle, 1);
        assert!(state.generating);
        assert!(state.campaign.is_none());
        assert!(Platform::ALL.iter().all(|p| state.is_loading_image(*p)));
    }

    #[test]
    fn text_is_published_before_images() {
        let state = with_text();
        assert!(!state.generating);
        let campaign = state.campaign.as_ref().unwrap();
        assert!(campaign.posts().iter().all(|p| p.image_url.is_none()));
        assert!(Platform::ALL.iter().all(|p| state.is_loading_image(*p)));
    }

    #[test]
    fn image_merges_are_commutative() {
        let base = with_text();
        let cycle = base.cycle;

        let a = base
            .clone()
            .reduce(attached(cycle, Platform::Instagram, "data:i"))
            .reduce(attached(cycle, Platform::Twitter, "data:t"));
        let b = base
            .reduce(attached(cycle, Platform::Twitter, "data:t"))
            .reduce(attached(cycle, Platform::Instagram, "data:i"));

        assert_eq!(a, b);
        let campaign = a.campaign.unwrap();
        assert_eq!(campaign.twitter.image_url.as_deref(), Some("data:t"));
        assert_eq!(campaign.instagram.image_url.as_deref(), Some("data:i"));
        assert_eq!(campaign.linkedin.image_url, None);
        assert_eq!(campaign.twitter.content, "Twitter/X content");
    }

    #[test]
    fn image_merge_is_idempotent() {
        let base = with_text();
        let cycle = base.cycle;
        let once = base.reduce(attached(cycle, Platform::LinkedIn, "data:l"));
        let twice = once
            .clone()
            .reduce(attached(cycle, Platform::LinkedIn, "data:l"));
        assert_eq!(once, twice);
    }

    #[test]
    fn failed_image_only_clears_its_flag() {
        let base = with_text();
        let cycle = base.cycle;
        let state = base.reduce(CampaignEvent::ImageAttached {
            cycle,
            platform: Platform::LinkedIn,
            result: Err("no image".to_string()),
        });

        assert!(!state.is_loading_image(Platform::LinkedIn));
        assert!(state.is_loading_image(Platform::Twitter));
        assert_eq!(state.campaign.unwrap().linkedin.image_url, None);
    }

    #[test]
    fn stale_results_are_discarded() {
        let old = with_text();
        let old_cycle = old.cycle;
        let restarted = old.reduce(CampaignEvent::GenerationStarted {
            idea: "new idea".to_string(),
            tone: Tone::Witty,
        });

        let state = restarted
            .clone()
            .reduce(attached(old_cycle, Platform::Twitter, "data:old"))
            .reduce(CampaignEvent::TextGenerated {
                cycle: old_cycle,
                campaign: campaign(),
            });
        assert_eq!(state, restarted);
        assert!(state.is_loading_image(Platform::Twitter));
    }

    #[test]
    fn text_failure_clears_campaign_and_flags() {
        let state = with_text();
        let cycle = state.cycle + 1;
        let state = state
            .reduce(CampaignEvent::GenerationStarted {
                idea: "again".to_string(),
                tone: Tone::Urgent,
            })
            .reduce(CampaignEvent::GenerationFailed {
                cycle,
                message: "boom".to_string(),
            });

        assert!(state.campaign.is_none());
        assert!(!state.generating);
        assert!(Platform::ALL.iter().all(|p| !state.is_loading_image(*p)));
        assert_eq!(state.last_error.as_deref(), Some("boom"));
    }

    #[test]
    fn post_update_replaces_one_slot() {
        let state = with_text();
        let mut updated = post(Platform::Instagram);
        updated.content = "edited".to_string();
        updated.aspect_ratio = AspectRatio::Story9x16;

        let state = state.reduce(CampaignEvent::PostUpdated(updated.clone()));
        let campaign = state.campaign.unwrap();
        assert_eq!(campaign.instagram, updated);
        assert_eq!(campaign.linkedin, post(Platform::LinkedIn));
    }

    #[test]
    fn late_batch_image_does_not_override_an_explicit_update() {
        let base = with_text();
        let cycle = base.cycle;
        let mut story = post(Platform::Instagram);
        story.image_url = Some("data:regenerated".to_string());
        story.aspect_ratio = AspectRatio::Story9x16;

        let state = base
            .reduce(CampaignEvent::PostUpdated(story.clone()))
            .reduce(attached(cycle, Platform::Instagram, "data:batch"));

        assert!(!state.is_loading_image(Platform::Instagram));
        assert_eq!(state.campaign.unwrap().instagram, story);
    }

    #[test]
    fn post_update_without_campaign_is_ignored() {
        let state = CampaignState::default();
        let next = state
            .clone()
            .reduce(CampaignEvent::PostUpdated(post(Platform::Twitter)));
        assert_eq!(state, next);
    }
}
