// src/services/video_job.rs
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 120,
        }
    }
}

/// What one status fetch of a long-running operation reported.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationStatus {
    pub done: bool,
    pub video_uri: Option<String>,
    pub error: Option<String>,
}

/// Lifecycle of a video generation operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VideoJob {
    #[default]
    Idle,
    Submitted { operation: String },
    Polling { operation: String, attempts: u32 },
    Succeeded { video_uri: String },
    Failed { reason: String },
}

impl VideoJob {
    pub fn submit(self, operation: impl Into<String>) -> Self {
        match self {
            VideoJob::Idle => VideoJob::Submitted {
                operation: operation.into(),
            },
            other => other,
        }
    }

    /// The operation handle to poll, if the job is still in flight.
    pub fn operation(&self) -> Option<&str> {
        match self {
            VideoJob::Submitted { operation } | VideoJob::Polling { operation, .. } => {
                Some(operation)
            }
            _ => None,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            VideoJob::Polling { attempts, .. } => *attempts,
            _ => 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoJob::Succeeded { .. } | VideoJob::Failed { .. })
    }

    /// Feeds one status report (the submit response counts as one) into the machine.
    pub fn observe(self, status: OperationStatus, policy: &PollPolicy) -> Self {
        let (operation, attempts) = match self {
            VideoJob::Submitted { operation } => (operation, 0),
            VideoJob::Polling {
                operation,
                attempts,
            } => (operation, attempts),
            other => return other,
        };

        if let Some(reason) = status.error {
            return VideoJob::Failed { reason };
        }

        if status.done {
            return match status.video_uri {
                Some(video_uri) => VideoJob::Succeeded { video_uri },
                None => VideoJob::Failed {
                    reason: "Video URI not found in response".to_string(),
                },
            };
        }

        if attempts >= policy.max_attempts {
            return VideoJob::Failed {
                reason: format!(
                    "Video generation did not finish after {} status checks",
                    attempts
                ),
            };
        }

        VideoJob::Polling {
            operation,
            attempts: attempts + 1,
        }
    }

    pub fn fail(self, reason: impl Into<String>) -> Self {
        if self.is_terminal() {
            return self;
        }
        VideoJob::Failed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    fn pending() -> OperationStatus {
        OperationStatus::default()
    }

    #[test]
    fn happy_path_reaches_succeeded() {
        let p = policy(10);
        let job = VideoJob::Idle.submit("operations/abc");
        assert_eq!(job.operation(), Some("operations/abc"));

        let job = job.observe(pending(), &p);
        assert_eq!(job.attempts(), 1);
        let job = job.observe(pending(), &p);
        assert_eq!(job.attempts(), 2);

        let job = job.observe(
            OperationStatus {
                done: true,
                video_uri: Some("https://files/video".to_string()),
                error: None,
            },
            &p,
        );
        assert_eq!(
            job,
            VideoJob::Succeeded {
                video_uri: "https://files/video".to_string()
            }
        );
        assert!(job.is_terminal());
    }

    #[test]
    fn done_without_uri_fails() {
        let job = VideoJob::Idle.submit("op").observe(
            OperationStatus {
                done: true,
                ..Default::default()
            },
            &policy(3),
        );
        assert!(matches!(job, VideoJob::Failed { .. }));
    }

    #[test]
    fn operation_error_fails_immediately() {
        let job = VideoJob::Idle.submit("op").observe(
            OperationStatus {
                done: true,
                video_uri: None,
                error: Some("quota exceeded".to_string()),
            },
            &policy(3),
        );
        assert_eq!(
            job,
            VideoJob::Failed {
                reason: "quota exceeded".to_string()
            }
        );
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let p = policy(2);
        let mut job = VideoJob::Idle.submit("op");
        for _ in 0..3 {
            job = job.observe(pending(), &p);
        }
        assert!(matches!(job, VideoJob::Failed { .. }));
        assert_eq!(job.operation(), None);
    }

    #[test]
    fn terminal_states_ignore_input() {
        let done = VideoJob::Succeeded {
            video_uri: "u".to_string(),
        };
        assert_eq!(done.clone().observe(pending(), &policy(1)), done);
        assert_eq!(done.clone().fail("late"), done);
        assert_eq!(VideoJob::Idle.observe(pending(), &policy(1)), VideoJob::Idle);
    }
}
