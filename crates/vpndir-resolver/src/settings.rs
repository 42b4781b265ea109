//! Resolution request settings.

use crate::error::{ResolveError, Result};
use std::collections::HashSet;
use std::time::Duration;
use vpndir_core::ResolverConfig;

/// Retry budget applied to every host of one resolution call.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatSettings {
    /// Total wall-clock budget, regardless of progress
    pub max_duration: Duration,
    /// Pause before retrying hosts that failed
    pub between_duration: Duration,
    /// Consecutive rounds without a newly resolved host before stopping
    pub max_no_new: u32,
    /// Consecutive failures after which a host is abandoned
    pub max_fails: u32,
    /// Sort each host's addresses
    pub sort_ips: bool,
}

impl Default for RepeatSettings {
    fn default() -> Self {
        Self::from(&ResolverConfig::default())
    }
}

impl From<&ResolverConfig> for RepeatSettings {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            max_duration: config.max_duration(),
            between_duration: config.between_duration(),
            max_no_new: config.max_no_new,
            max_fails: config.max_fails,
            sort_ips: config.sort_ips,
        }
    }
}

/// One resolution request.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelSettings {
    /// Distinct hostnames to resolve
    pub hosts: Vec<String>,
    /// Highest tolerated fraction of hosts that never resolve, in `[0, 1]`
    pub max_fail_ratio: f64,
    /// Retry budget
    pub repeat: RepeatSettings,
}

impl ParallelSettings {
    /// Settings for `hosts` with the budget taken from the config.
    #[must_use]
    pub fn from_config(hosts: Vec<String>, config: &ResolverConfig) -> Self {
        Self {
            hosts,
            max_fail_ratio: config.max_fail_ratio,
            repeat: RepeatSettings::from(config),
        }
    }

    /// Reject settings the round loop cannot honor.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.max_fail_ratio) {
            return Err(ResolveError::InvalidSettings(format!(
                "max fail ratio {} is not between 0 and 1",
                self.max_fail_ratio
            )));
        }
        if self.repeat.max_fails == 0 {
            return Err(ResolveError::InvalidSettings(
                "max fails must be at least 1".to_string(),
            ));
        }
        if self.repeat.max_no_new == 0 {
            return Err(ResolveError::InvalidSettings(
                "max rounds without new hosts must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(self.hosts.len());
        if let Some(duplicate) = self.hosts.iter().find(|host| !seen.insert(host.as_str())) {
            return Err(ResolveError::InvalidSettings(format!(
                "host {duplicate} is listed more than once"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(hosts: &[&str]) -> ParallelSettings {
        ParallelSettings::from_config(
            hosts.iter().map(ToString::to_string).collect(),
            &ResolverConfig::default(),
        )
    }

    #[test]
    fn test_from_config() {
        let config = ResolverConfig::default();
        let settings = settings(&["a"]);
        assert_eq!(settings.repeat.max_duration, config.max_duration());
        assert_eq!(settings.repeat.max_fails, config.max_fails);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = settings(&["a", "b", "a"]).validate().expect_err("duplicate");
        assert!(err.to_string().contains("host a"));
    }

    #[test]
    fn test_rejects_bad_ratio_and_budgets() {
        let mut s = settings(&["a"]);
        s.max_fail_ratio = -0.1;
        assert!(s.validate().is_err());

        let mut s = settings(&["a"]);
        s.repeat.max_fails = 0;
        assert!(s.validate().is_err());

        let mut s = settings(&["a"]);
        s.repeat.max_no_new = 0;
        assert!(s.validate().is_err());
    }
}
