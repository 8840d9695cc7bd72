//! Environment-driven runtime configuration (§6.5).
//!
//! Follows the `std::env::var(..).ok().and_then(..).unwrap_or(..)` idiom used
//! for config loading in `mofa-gateway`'s entry point, rather than pulling in
//! the `config` crate's layered-file loader — this module has no files to
//! layer, only environment variables with documented defaults.

use std::time::Duration;

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_string(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env_string(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

/// Precedence for every field below: explicit constructor argument (not
/// modeled here — callers override post-`from_env`) > specific env var >
/// generic env var > default (§6.5).
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub capability_service_url: Option<String>,
    pub capability_top_k: usize,
    pub capability_threshold: f64,
    pub tiered_min_tools: usize,

    pub redis_url: Option<String>,
    pub hitl_key_prefix: String,
    pub hitl_redis_db: Option<u32>,
    pub agent_name: Option<String>,

    pub execution_debug_store_enabled: bool,
    pub execution_ttl: Duration,
    pub execution_error_ttl: Duration,

    pub plan_retry_enabled: bool,
    pub plan_retry_max: u32,

    pub prompt_template_file: Option<String>,
    pub prompt_domain: Option<String>,
    pub prompt_type_rules: Option<String>,
    pub prompt_custom_instructions: Option<String>,

    /// Bound on simultaneously-executing steps within one plan (§4.D, §6.5, default 5).
    pub max_concurrency: usize,
    /// Per-step retry cap (§4.D, §6.5, default 3).
    pub step_max_attempts: u32,
    /// Per-attempt HTTP timeout (§5, §6.5, default 30s).
    pub step_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            capability_service_url: None,
            capability_top_k: 20,
            capability_threshold: 0.7,
            tiered_min_tools: 20,
            redis_url: None,
            hitl_key_prefix: "gomind:hitl".to_string(),
            hitl_redis_db: None,
            agent_name: None,
            execution_debug_store_enabled: false,
            execution_ttl: Duration::from_secs(24 * 60 * 60),
            execution_error_ttl: Duration::from_secs(168 * 60 * 60),
            plan_retry_enabled: false,
            plan_retry_max: 2,
            prompt_template_file: None,
            prompt_domain: None,
            prompt_type_rules: None,
            prompt_custom_instructions: None,
            max_concurrency: 5,
            step_max_attempts: 3,
            step_timeout: Duration::from_secs(30),
        }
    }
}

impl RuntimeConfig {
    /// Reads every recognized variable from the process environment,
    /// applying `GOMIND_*`-prefixed overrides after their generic
    /// counterpart (§6.5 precedence: specific env var > generic env var).
    pub fn from_env() -> Self {
        let capability_service_url = env_string("GOMIND_CAPABILITY_SERVICE_URL").or_else(|| env_string("CAPABILITY_SERVICE_URL"));

        Self {
            capability_service_url,
            capability_top_k: env_parsed("GOMIND_CAPABILITY_TOP_K", 20),
            capability_threshold: env_parsed("GOMIND_CAPABILITY_THRESHOLD", 0.7),
            tiered_min_tools: env_parsed("GOMIND_TIERED_MIN_TOOLS", 20),
            redis_url: env_string("REDIS_URL"),
            hitl_key_prefix: env_string("GOMIND_HITL_KEY_PREFIX").unwrap_or_else(|| "gomind:hitl".to_string()),
            hitl_redis_db: env_string("GOMIND_HITL_REDIS_DB").and_then(|v| v.parse().ok()),
            agent_name: env_string("GOMIND_AGENT_NAME"),
            execution_debug_store_enabled: env_bool("GOMIND_EXECUTION_DEBUG_STORE_ENABLED", false),
            execution_ttl: Duration::from_secs(env_parsed("GOMIND_EXECUTION_TTL", 24 * 60 * 60)),
            execution_error_ttl: Duration::from_secs(env_parsed("GOMIND_EXECUTION_ERROR_TTL", 168 * 60 * 60)),
            plan_retry_enabled: env_bool("GOMIND_PLAN_RETRY_ENABLED", false),
            plan_retry_max: env_parsed("GOMIND_PLAN_RETRY_MAX", 2),
            prompt_template_file: env_string("GOMIND_PROMPT_TEMPLATE_FILE"),
            prompt_domain: env_string("GOMIND_PROMPT_DOMAIN"),
            prompt_type_rules: env_string("GOMIND_PROMPT_TYPE_RULES"),
            prompt_custom_instructions: env_string("GOMIND_PROMPT_CUSTOM_INSTRUCTIONS"),
            max_concurrency: env_parsed("GOMIND_MAX_CONCURRENCY", 5),
            step_max_attempts: env_parsed("GOMIND_STEP_MAX_ATTEMPTS", 3),
            step_timeout: Duration::from_secs(env_parsed("GOMIND_STEP_TIMEOUT_SECS", 30)),
        }
    }

    /// Whether the Service/Tiered `CapabilityProvider` variants have a remote
    /// backend configured at all (§4.B).
    pub fn has_capability_service(&self) -> bool {
        self.capability_service_url.is_some()
    }

    /// Builds an [`super::executor::ExecutorConfig`] from this environment
    /// snapshot (§6.5 ambient additions feed the executor's tunables).
    pub fn executor_config(&self) -> super::executor::ExecutorConfig {
        super::executor::ExecutorConfig {
            max_concurrency: self.max_concurrency,
            max_attempts: self.step_max_attempts,
            step_timeout: self.step_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RuntimeConfig::default();
        assert_eq!(config.capability_top_k, 20);
        assert_eq!(config.capability_threshold, 0.7);
        assert_eq!(config.hitl_key_prefix, "gomind:hitl");
        assert!(!config.execution_debug_store_enabled);
        assert_eq!(config.plan_retry_max, 2);
        assert!(!config.has_capability_service());
        assert_eq!(config.max_concurrency, 5);
        assert_eq!(config.step_max_attempts, 3);
        assert_eq!(config.step_timeout, Duration::from_secs(30));
    }

    #[test]
    fn env_bool_recognizes_common_truthy_spellings() {
        // SAFETY: tests run single-threaded within this process for env vars
        // that no other test reads; scoped to this one key.
        unsafe { std::env::set_var("GOMIND_EXECUTION_DEBUG_STORE_ENABLED_TEST", "yes") };
        assert!(env_bool("GOMIND_EXECUTION_DEBUG_STORE_ENABLED_TEST", false));
        unsafe { std::env::remove_var("GOMIND_EXECUTION_DEBUG_STORE_ENABLED_TEST") };
    }

    #[test]
    fn generic_env_var_is_overridden_by_specific_one() {
        unsafe {
            std::env::set_var("CAPABILITY_SERVICE_URL", "http://generic");
            std::env::set_var("GOMIND_CAPABILITY_SERVICE_URL", "http://specific");
        }
        let config = RuntimeConfig::from_env();
        assert_eq!(config.capability_service_url.as_deref(), Some("http://specific"));
        unsafe {
            std::env::remove_var("CAPABILITY_SERVICE_URL");
            std::env::remove_var("GOMIND_CAPABILITY_SERVICE_URL");
        }
    }
}
