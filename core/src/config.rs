use mbcrypt_backend::{Capabilities, CapabilityTier};
use thiserror::Error;

/// Caps the capability tier: `scalar`, `sse` or `sse-gfni`.
pub const FORCE_TIER_ENV: &str = "MBCRYPT_FORCE_TIER";

/// Enables or disables the SHA-extension lane layout: `0|1|true|false`.
pub const SHA_EXT_ENV: &str = "MBCRYPT_SHA_EXT";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}={value:?}: unknown capability tier (expected scalar, sse or sse-gfni)")]
    UnknownTier { var: &'static str, value: String },
    #[error("{var}={value:?}: expected 0, 1, true or false")]
    InvalidBool { var: &'static str, value: String },
}

/// Overrides applied on top of the detected capabilities.
///
/// Overrides can only take capability away: forcing a tier above the
/// detected one, or SHA extensions on a CPU without them, is ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub force_tier: Option<CapabilityTier>,
    pub sha_ext: Option<bool>,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Parses the configuration from an arbitrary variable lookup. Empty
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &'static str| lookup(var).filter(|value| !value.trim().is_empty());

        let force_tier: Option<CapabilityTier> = match read(FORCE_TIER_ENV) {
            Some(value) => Some(CapabilityTier::from_name(&value).ok_or(ConfigError::UnknownTier {
                var: FORCE_TIER_ENV,
                value,
            })?),
            None => None,
        };

        let sha_ext: Option<bool> = match read(SHA_EXT_ENV) {
            Some(value) => Some(parse_bool(&value).ok_or(ConfigError::InvalidBool { var: SHA_EXT_ENV, value })?),
            None => None,
        };

        Ok(Self { force_tier, sha_ext })
    }

    /// Effective capabilities given what the CPU reports.
    pub fn resolve(&self, detected: Capabilities) -> Capabilities {
        let mut caps: Capabilities = detected;

        if let Some(requested) = self.force_tier {
            if requested <= detected.tier {
                caps.tier = requested;
            } else {
                log::warn!(
                    "{FORCE_TIER_ENV}={requested} ignored: CPU only supports {}",
                    detected.tier
                );
            }
        }

        match self.sha_ext {
            Some(false) => caps.sha_ext = false,
            Some(true) if !detected.sha_ext => {
                log::warn!("{SHA_EXT_ENV}=1 ignored: CPU has no SHA extensions");
            }
            _ => {}
        }

        if caps != detected {
            log::debug!("capabilities overridden: {detected:?} -> {caps:?}");
        }
        caps
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}
