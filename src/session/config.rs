use crate::engine::Phase;
use crate::error::SessionError;

pub const DEFAULT_VERBOSITY: u32 = 0;
/// Jeroslow-Wang.
pub const DEFAULT_PHASE: i64 = 2;
/// Negative limits mean unbounded.
pub const UNBOUNDED: i64 = -1;

/// Raw session parameters as a host caller supplies them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub nvars: i64,
    pub verbosity: u32,
    /// `0` false, `1` true, `2` Jeroslow-Wang, `3` random.
    pub default_phase: i64,
    pub propagation_limit: i64,
    pub decision_limit: i64,
    /// Seed for the random phase.
    pub seed: u64,
}

impl SessionConfig {
    pub fn new(nvars: i64) -> Self {
        Self {
            nvars,
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            nvars: 0,
            verbosity: DEFAULT_VERBOSITY,
            default_phase: DEFAULT_PHASE,
            propagation_limit: UNBOUNDED,
            decision_limit: UNBOUNDED,
            seed: 0,
        }
    }
}

/// A validated [`SessionConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub nvars: u32,
    pub verbosity: u32,
    pub phase: Phase,
    pub propagation_limit: Option<u64>,
    pub decision_limit: Option<u64>,
    pub seed: u64,
}

impl TryFrom<&SessionConfig> for EngineSettings {
    type Error = SessionError;

    fn try_from(config: &SessionConfig) -> Result<Self, Self::Error> {
        if config.nvars < 0 {
            return Err(SessionError::InvalidConfiguration(format!(
                "nvars must be >= 0, got {}",
                config.nvars
            )));
        }
        // literals travel as i32
        let nvars = i32::try_from(config.nvars).map_err(|_| {
            SessionError::InvalidConfiguration(format!("nvars {} is too large", config.nvars))
        })? as u32;
        let phase = Phase::try_from(config.default_phase).map_err(|p| {
            SessionError::InvalidConfiguration(format!(
                "default_phase must be one of 0, 1, 2, 3, got {}",
                p
            ))
        })?;
        Ok(Self {
            nvars,
            verbosity: config.verbosity,
            phase,
            propagation_limit: limit(config.propagation_limit),
            decision_limit: limit(config.decision_limit),
            seed: config.seed,
        })
    }
}

/// Negative means unbounded.
pub fn limit(raw: i64) -> Option<u64> {
    u64::try_from(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let settings = EngineSettings::try_from(&SessionConfig::new(3)).expect("valid");
        assert_eq!(settings.nvars, 3);
        assert_eq!(settings.phase, Phase::JeroslowWang);
        assert_eq!(settings.propagation_limit, None);
        assert_eq!(settings.decision_limit, None);
    }

    #[test]
    fn rejects_negative_nvars_and_unknown_phase() {
        let err = EngineSettings::try_from(&SessionConfig::new(-1)).expect_err("nvars");
        assert!(matches!(err, SessionError::InvalidConfiguration(_)));

        let config = SessionConfig {
            default_phase: 4,
            ..SessionConfig::new(2)
        };
        let err = EngineSettings::try_from(&config).expect_err("phase");
        assert!(matches!(err, SessionError::InvalidConfiguration(_)));

        assert!(EngineSettings::try_from(&SessionConfig::new(1 << 40)).is_err());
    }

    #[test]
    fn non_negative_limits_are_kept() {
        assert_eq!(limit(-5), None);
        assert_eq!(limit(0), Some(0));
        assert_eq!(limit(17), Some(17));
    }
}
