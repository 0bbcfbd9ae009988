//! Resilience configuration with builder pattern

use std::time::Duration;

/// Global resilience configuration for API operations
#[derive(Debug, Clone, PartialEq)]
pub struct ResilienceConfig {
    /// Per-request timeout
    pub request_timeout: Duration,
    pub poll: PollConfig,
}

/// Bounded polling of an asynchronous status resource
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    /// Pause between two polls
    pub interval: Duration,
    /// Number of polls before giving up, at least 1
    pub max_attempts: u32,
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Single poll, no waiting
    pub fn once() -> Self {
        Self::new(Duration::ZERO, 1)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 60)
    }
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            poll: PollConfig::default(),
        }
    }
}

impl ResilienceConfig {
    /// Create a new builder for ResilienceConfig
    pub fn builder() -> ResilienceConfigBuilder {
        ResilienceConfigBuilder::new()
    }
}

/// Builder for ResilienceConfig
#[derive(Debug)]
pub struct ResilienceConfigBuilder {
    config: ResilienceConfig,
}

impl ResilienceConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ResilienceConfig::default(),
        }
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the pause between status polls
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll.interval = interval;
        self
    }

    /// Set the maximum number of status polls
    pub fn max_poll_attempts(mut self, attempts: u32) -> Self {
        self.config.poll.max_attempts = attempts.max(1);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ResilienceConfig {
        self.config
    }
}

impl Default for ResilienceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResilienceConfig::default();

        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.poll.interval, Duration::from_secs(5));
        assert_eq!(config.poll.max_attempts, 60);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ResilienceConfig::builder()
            .request_timeout(Duration::from_secs(10))
            .poll_interval(Duration::from_millis(250))
            .max_poll_attempts(0)
            .build();

        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.poll.interval, Duration::from_millis(250));
        // Zero attempts would never poll at all
        assert_eq!(config.poll.max_attempts, 1);
    }
}
