#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommenderConfig {
    /// Number of recommendations returned when the caller does not ask for a size.
    pub default_top_k: usize,
    /// Upper bound applied to caller-supplied sizes.
    pub max_top_k: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            default_top_k: 5,
            max_top_k: 50,
        }
    }
}

impl RecommenderConfig {
    /// Resolves a requested size against the configured default and ceiling.
    /// Negative requests collapse to zero results.
    pub fn resolve_top_k(&self, requested: Option<i64>) -> usize {
        match requested {
            None => self.default_top_k.min(self.max_top_k),
            Some(value) if value <= 0 => 0,
            Some(value) => usize::try_from(value)
                .unwrap_or(usize::MAX)
                .min(self.max_top_k),
        }
    }
}

/// Reads `ALUMNI_RECOMMEND_TOP_K` and `ALUMNI_RECOMMEND_MAX_TOP_K`, falling back
/// to the defaults for unset or unparsable values.
pub fn load_config_from_env() -> RecommenderConfig {
    let defaults = RecommenderConfig::default();

    let max_top_k = std::env::var("ALUMNI_RECOMMEND_MAX_TOP_K")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(defaults.max_top_k);

    let default_top_k = std::env::var("ALUMNI_RECOMMEND_TOP_K")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(defaults.default_top_k);

    RecommenderConfig {
        default_top_k: default_top_k.min(max_top_k),
        max_top_k,
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::sync::Mutex;

    use super::*;

    static ENV_GUARD: Mutex<()> = Mutex::new(());

    const TOP_K: &str = "ALUMNI_RECOMMEND_TOP_K";
    const MAX_TOP_K: &str = "ALUMNI_RECOMMEND_MAX_TOP_K";

    fn with_envs(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
        let _guard = ENV_GUARD.lock().unwrap();

        let previous: Vec<(&str, Option<String>)> = vars
            .iter()
            .map(|(var, value)| {
                let old = env::var(var).ok();
                match value {
                    Some(v) => unsafe { env::set_var(var, v) },
                    None => unsafe { env::remove_var(var) },
                }
                (*var, old)
            })
            .collect();

        f();

        for (var, previous_value) in previous {
            match previous_value {
                Some(v) => unsafe { env::set_var(var, v) },
                None => unsafe { env::remove_var(var) },
            }
        }
    }

    #[test]
    fn missing_request_uses_default() {
        let config = RecommenderConfig::default();
        assert_eq!(config.resolve_top_k(None), 5);
    }

    #[test]
    fn negative_and_zero_requests_yield_zero() {
        let config = RecommenderConfig::default();
        assert_eq!(config.resolve_top_k(Some(0)), 0);
        assert_eq!(config.resolve_top_k(Some(-3)), 0);
    }

    #[test]
    fn large_requests_are_capped() {
        let config = RecommenderConfig {
            default_top_k: 5,
            max_top_k: 20,
        };
        assert_eq!(config.resolve_top_k(Some(7)), 7);
        assert_eq!(config.resolve_top_k(Some(500)), 20);
    }

    #[test]
    fn env_overrides_defaults() {
        with_envs(&[(TOP_K, Some("8")), (MAX_TOP_K, Some("30"))], || {
            assert_eq!(
                load_config_from_env(),
                RecommenderConfig {
                    default_top_k: 8,
                    max_top_k: 30,
                }
            );
        });
    }

    #[test]
    fn env_default_is_capped_at_the_maximum() {
        with_envs(&[(TOP_K, Some("12")), (MAX_TOP_K, Some("4"))], || {
            let config = load_config_from_env();
            assert_eq!(config.default_top_k, 4);
            assert_eq!(config.resolve_top_k(None), 4);
        });
    }

    #[test]
    fn unset_or_garbage_env_falls_back() {
        with_envs(&[(TOP_K, Some("many")), (MAX_TOP_K, None)], || {
            assert_eq!(load_config_from_env(), RecommenderConfig::default());
        });
    }
}
