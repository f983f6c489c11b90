use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transport-facing timeout figures and the preprocessing expiry multiplier.
///
/// The core never performs I/O itself; these figures exist so the tag-task
/// registry can bound entry lifetime to a multiple of the longest plausible
/// request (`preproc_timeout_times` x the summed timeouts).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Connect timeout of the underlying transport.
    pub connect_timeout: Duration,
    /// Write timeout of the underlying transport.
    pub write_timeout: Duration,
    /// Read timeout of the underlying transport.
    pub read_timeout: Duration,
    /// Multiplier applied to the summed timeouts when deriving the
    /// registry expiry threshold.
    pub preproc_timeout_times: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            preproc_timeout_times: 10,
        }
    }
}

impl HttpConfig {
    /// Maximum plausible lifetime of a tracked task before it is considered
    /// expired: `preproc_timeout_times x (connect + write + read)`.
    pub fn preproc_timeout(&self) -> Duration {
        (self.connect_timeout + self.write_timeout + self.read_timeout)
            * self.preproc_timeout_times
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preproc_timeout_is_multiple_of_summed_timeouts() {
        let config = HttpConfig {
            connect_timeout: Duration::from_secs(1),
            write_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(3),
            preproc_timeout_times: 10,
        };
        assert_eq!(config.preproc_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: HttpConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.preproc_timeout_times, 10);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn deserializes_partial_override() {
        let config: HttpConfig =
            serde_json::from_str(r#"{"preproc_timeout_times": 2}"#).unwrap();
        assert_eq!(config.preproc_timeout_times, 2);
        assert_eq!(config.read_timeout, Duration::from_secs(10));
    }
}
