//! Bounded poll-until-done loop

use async_trait::async_trait;
use log::info;

use super::config::PollConfig;
use crate::api::error::ApiError;

/// A status value that may or may not be final
pub trait PollStatus: Send {
    fn is_terminal(&self) -> bool;

    /// One-line description for progress logging
    fn summary(&self) -> String;
}

/// Something that can fetch the current status behind a link
#[async_trait]
pub trait StatusSource: Send + Sync {
    type Status: PollStatus;

    async fn fetch_status(&self, link: &str) -> Result<Self::Status, ApiError>;
}

/// Poll `link` until a terminal status arrives or the attempts run out
///
/// Sleeps `config.interval` between polls, never after the last one.
pub async fn poll_until_terminal<S>(
    source: &S,
    link: &str,
    config: &PollConfig,
) -> Result<S::Status, ApiError>
where
    S: StatusSource + ?Sized,
{
    poll_until_terminal_with(source, link, config, |_| Ok(())).await
}

/// Like [`poll_until_terminal`], handing every polled status to `on_status` first
///
/// An error from `on_status` ends the loop.
pub async fn poll_until_terminal_with<S, F>(
    source: &S,
    link: &str,
    config: &PollConfig,
    mut on_status: F,
) -> Result<S::Status, ApiError>
where
    S: StatusSource + ?Sized,
    F: FnMut(&S::Status) -> Result<(), ApiError>,
{
    let attempts = config.max_attempts.max(1);

    for attempt in 1..=attempts {
        let status = source.fetch_status(link).await?;
        info!("Poll {}/{} of {}: {}", attempt, attempts, link, status.summary());
        on_status(&status)?;

        if status.is_terminal() {
            return Ok(status);
        }

        if attempt < attempts && !config.interval.is_zero() {
            tokio::time::sleep(config.interval).await;
        }
    }

    Err(ApiError::Timeout {
        link: link.to_string(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Step(&'static str);

    impl PollStatus for Step {
        fn is_terminal(&self) -> bool {
            self.0 == "DONE"
        }

        fn summary(&self) -> String {
            self.0.to_string()
        }
    }

    struct Scripted {
        steps: Mutex<Vec<&'static str>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(steps: &[&'static str]) -> Self {
            let mut steps = steps.to_vec();
            steps.reverse();
            Self {
                steps: Mutex::new(steps),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl StatusSource for Scripted {
        type Status = Step;

        async fn fetch_status(&self, _link: &str) -> Result<Step, ApiError> {
            *self.calls.lock().unwrap() += 1;
            let next = self.steps.lock().unwrap().pop().unwrap_or("WAITING");
            Ok(Step(next))
        }
    }

    #[tokio::test]
    async fn test_stops_at_terminal_status() {
        let source = Scripted::new(&["WAITING", "WAITING", "DONE", "WAITING"]);
        let config = PollConfig::new(Duration::ZERO, 10);

        let status = poll_until_terminal(&source, "https://x/status", &config)
            .await
            .unwrap();

        assert_eq!(status, Step("DONE"));
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_times_out_after_max_attempts() {
        let source = Scripted::new(&[]);
        let config = PollConfig::new(Duration::ZERO, 4);

        let err = poll_until_terminal(&source, "https://x/status", &config)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Timeout { attempts: 4, .. }));
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn test_observer_error_ends_loop() {
        let source = Scripted::new(&["WAITING", "DONE"]);
        let config = PollConfig::new(Duration::ZERO, 10);
        let mut seen = Vec::new();

        let err = poll_until_terminal_with(&source, "https://x/status", &config, |status| {
            seen.push(status.clone());
            Err(ApiError::Credentials("stop".to_string()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::Credentials(_)));
        assert_eq!(seen, vec![Step("WAITING")]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_between_polls() {
        let source = Scripted::new(&["WAITING", "DONE"]);
        let config = PollConfig::new(Duration::from_secs(30), 3);

        let started = tokio::time::Instant::now();
        poll_until_terminal(&source, "https://x/status", &config)
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(60));
    }
}
