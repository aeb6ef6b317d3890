//! Model bridge configuration

use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_BINARY: &str = "ollama";
pub const DEFAULT_MODEL: &str = "Tohur/natsumura-storytelling-rp-llama-3.1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(5);

/// Time bounds applied to every model process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessLimits {
    /// Upper bound on one whole model call
    pub timeout: Duration,
    /// How long a process may take to exit on its own once we stop reading
    pub kill_grace: Duration,
}

impl ProcessLimits {
    /// Deadline for a call starting now. Prompt write and output drain share it.
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.timeout
    }
}

impl Default for ProcessLimits {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }
}

/// Configuration for the model process bridge
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Inference executable, invoked as `<binary> run <model>`
    pub binary: PathBuf,
    pub model: String,
    pub limits: ProcessLimits,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            model: DEFAULT_MODEL.to_string(),
            limits: ProcessLimits::default(),
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let seconds = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map_or(default, Duration::from_secs)
        };

        Self {
            binary: lookup("OLLAMA_BIN")
                .filter(|v| !v.is_empty())
                .map_or(defaults.binary, PathBuf::from),
            model: lookup("OLLAMA_MODEL")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.model),
            limits: ProcessLimits {
                timeout: seconds("LLM_TIMEOUT_SECS", defaults.limits.timeout),
                kill_grace: seconds("LLM_KILL_GRACE_SECS", defaults.limits.kill_grace),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> LlmConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        LlmConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.binary, PathBuf::from("ollama"));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.limits, ProcessLimits::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("OLLAMA_BIN", "/opt/ollama/bin/ollama"),
            ("OLLAMA_MODEL", "llama3"),
            ("LLM_TIMEOUT_SECS", "42"),
            ("LLM_KILL_GRACE_SECS", "1"),
        ]);
        assert_eq!(config.binary, PathBuf::from("/opt/ollama/bin/ollama"));
        assert_eq!(config.model, "llama3");
        assert_eq!(config.limits.timeout, Duration::from_secs(42));
        assert_eq!(config.limits.kill_grace, Duration::from_secs(1));
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = config_from(&[("LLM_TIMEOUT_SECS", "soon"), ("OLLAMA_MODEL", "")]);
        assert_eq!(config.limits.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.model, DEFAULT_MODEL);
    }
}
