use std::time::Duration;

use lfb_model::DEFAULT_AGENT_PREFIX;

use crate::error::CoreError;

/// Refresh cadence knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Poll interval while a build is running.
    pub running_interval: Duration,
    /// Retry interval after a failed fetch.
    pub error_retry: Duration,
    /// Successful builds younger than this are polled at `fresh_success_interval`.
    pub fresh_success_age: Duration,
    pub fresh_success_interval: Duration,
    /// Successful builds younger than this (but past `fresh_success_age`)
    /// are polled at `recent_success_interval`.
    pub recent_success_age: Duration,
    pub recent_success_interval: Duration,
    /// Everything older.
    pub stale_success_interval: Duration,
    /// Extra first-fetch delay per target when many are discovered at once.
    pub stagger_step: Duration,
    /// Period of the agent inventory sweep.
    pub inventory_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            running_interval: Duration::from_secs(15),
            error_retry: Duration::from_secs(15),
            fresh_success_age: Duration::from_secs(300),
            fresh_success_interval: Duration::from_secs(60),
            recent_success_age: Duration::from_secs(3_600),
            recent_success_interval: Duration::from_secs(300),
            stale_success_interval: Duration::from_secs(1_800),
            stagger_step: Duration::from_millis(100),
            inventory_interval: Duration::from_secs(15),
        }
    }
}

impl PollPolicy {
    /// Next poll delay for a build that finished `age_secs` ago.
    pub fn success_interval(&self, age_secs: f64) -> Duration {
        if age_secs < self.fresh_success_age.as_secs_f64() {
            self.fresh_success_interval
        } else if age_secs < self.recent_success_age.as_secs_f64() {
            self.recent_success_interval
        } else {
            self.stale_success_interval
        }
    }

    /// First-fetch delay of the `index`-th target in a discovery batch.
    pub fn stagger_delay(&self, index: usize) -> Duration {
        self.stagger_step.saturating_mul(index as u32)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.fresh_success_age > self.recent_success_age {
            return Err(CoreError::InvalidConfig(
                "fresh_success_age must not exceed recent_success_age".into(),
            ));
        }
        if self.inventory_interval.is_zero() {
            return Err(CoreError::InvalidConfig(
                "inventory_interval must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Agents not named `<agent_prefix>-<arch>` are ignored.
    pub agent_prefix: String,
    pub policy: PollPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            agent_prefix: DEFAULT_AGENT_PREFIX.to_string(),
            policy: PollPolicy::default(),
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.agent_prefix.is_empty() {
            return Err(CoreError::InvalidConfig("agent_prefix is empty".into()));
        }
        self.policy.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_tiers_follow_build_age() {
        let p = PollPolicy::default();
        assert_eq!(p.success_interval(0.0), Duration::from_millis(60_000));
        assert_eq!(p.success_interval(120.0), Duration::from_millis(60_000));
        assert_eq!(p.success_interval(299.9), Duration::from_millis(60_000));
        assert_eq!(p.success_interval(300.0), Duration::from_millis(300_000));
        assert_eq!(p.success_interval(3_599.0), Duration::from_millis(300_000));
        assert_eq!(p.success_interval(3_600.0), Duration::from_millis(1_800_000));
        assert_eq!(p.success_interval(90_000.0), Duration::from_millis(1_800_000));
    }

    #[test]
    fn stagger_grows_linearly() {
        let p = PollPolicy::default();
        assert_eq!(p.stagger_delay(0), Duration::ZERO);
        assert_eq!(p.stagger_delay(1), Duration::from_millis(100));
        assert_eq!(p.stagger_delay(25), Duration::from_millis(2_500));
    }

    #[test]
    fn defaults_are_valid() {
        assert!(DashboardConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_age_tiers_are_rejected() {
        let policy = PollPolicy {
            fresh_success_age: Duration::from_secs(7_200),
            ..Default::default()
        };
        assert!(matches!(policy.validate(), Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let cfg = DashboardConfig {
            agent_prefix: String::new(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
