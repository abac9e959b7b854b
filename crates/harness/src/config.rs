/// Harness configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local demo run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Simulated round-trip latency of the transport link, in
    /// milliseconds (default: `25`).
    pub link_latency_ms: u64,
    /// Fraction of round trips that fail at random, `0.0..=1.0`
    /// (default: `0.0`).
    pub failure_rate: f64,
    /// Whether to seed the demo data set on startup (default: `true`).
    pub seed_demo_data: bool,
}

impl HarnessConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default |
    /// |-------------------|---------|
    /// | `LINK_LATENCY_MS` | `25`    |
    /// | `FAILURE_RATE`    | `0.0`   |
    /// | `SEED_DEMO_DATA`  | `true`  |
    pub fn from_env() -> Self {
        let link_latency_ms: u64 = std::env::var("LINK_LATENCY_MS")
            .unwrap_or_else(|_| "25".into())
            .parse()
            .expect("LINK_LATENCY_MS must be a valid u64");

        let failure_rate: f64 = std::env::var("FAILURE_RATE")
            .unwrap_or_else(|_| "0.0".into())
            .parse()
            .expect("FAILURE_RATE must be a valid f64");

        let seed_demo_data: bool = std::env::var("SEED_DEMO_DATA")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("SEED_DEMO_DATA must be true or false");

        Self {
            link_latency_ms,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            seed_demo_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_env_is_unset() {
        // Relies on the test process not exporting these vars.
        let config = HarnessConfig::from_env();
        assert_eq!(config.link_latency_ms, 25);
        assert_eq!(config.failure_rate, 0.0);
        assert!(config.seed_demo_data);
    }
}
