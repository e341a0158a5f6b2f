//! Configuration types for ipfs-batch-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Gateway fetch configuration (base URL, per-request timeout)
///
/// Groups settings related to how individual payloads are retrieved.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// IPFS gateway base URL (default: "https://ipfs.io/ipfs/")
    ///
    /// A missing trailing slash is tolerated; the resolver normalizes to
    /// exactly one `/` between the base and the CID.
    #[serde(default = "default_gateway_base")]
    pub gateway_base: String,

    /// Wall-clock timeout per fetch (default: 30 seconds)
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            gateway_base: default_gateway_base(),
            timeout: default_fetch_timeout(),
        }
    }
}

/// Batch pacing configuration (window size, inter-window pause)
///
/// Windowing exists purely for pacing and progress-log granularity — it does
/// not change which records are processed or in what order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of records per processing window (default: 50)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between windows, in milliseconds on the wire (default: 200ms)
    ///
    /// Gives the gateway breathing room between windows and serves as a
    /// cooperative suspension point.
    #[serde(default = "default_inter_batch_pause", with = "duration_ms_serde")]
    pub inter_batch_pause: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            inter_batch_pause: default_inter_batch_pause(),
        }
    }
}

/// Where fetched payloads end up
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Write each payload as an individual file under `output_dir` (default)
    #[default]
    Directory,
    /// Package payloads into one or more size-bounded ZIP parts
    Archive,
}

/// Output placement configuration (directory vs. archive, part sizing)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output placement mode
    #[serde(default)]
    pub mode: OutputMode,

    /// Directory for individual files, and for archive parts in archive mode
    /// (default: "./downloaded_images")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Filename stem for archive parts, producing `{stem}_part{n}.zip`
    /// (default: "ipfs_downloads")
    #[serde(default = "default_archive_stem")]
    pub archive_stem: String,

    /// Maximum uncompressed payload bytes per archive part (default: 80 MiB)
    ///
    /// When adding the next payload would push the current part past this
    /// threshold, the part is sealed and a new one is started. A single
    /// payload larger than the threshold still gets its own part.
    #[serde(default = "default_max_part_bytes")]
    pub max_part_bytes: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            output_dir: default_output_dir(),
            archive_stem: default_archive_stem(),
            max_part_bytes: default_max_part_bytes(),
        }
    }
}

/// Main configuration for [`crate::BatchDownloader`]
///
/// Fields are organized into logical sub-configs:
/// - [`fetch`](FetchConfig) — gateway base URL, per-request timeout
/// - [`batch`](BatchConfig) — window size, inter-window pause
/// - [`output`](OutputConfig) — directory vs. archive placement, part sizing
///
/// All sub-config fields are flattened for serialization, so the JSON/TOML
/// format stays flat (no nesting).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Gateway fetch settings
    #[serde(flatten)]
    pub fetch: FetchConfig,

    /// Batch pacing settings
    #[serde(flatten)]
    pub batch: BatchConfig,

    /// Output placement settings
    #[serde(flatten)]
    pub output: OutputConfig,
}

impl Config {
    /// Preset for resource-constrained execution contexts
    ///
    /// Smaller windows and a longer inter-window pause, for hosts where a
    /// 50-wide window would hog memory or saturate the connection (e.g. a
    /// shared web runtime fronting the library).
    pub fn constrained() -> Self {
        Self {
            batch: BatchConfig {
                batch_size: 15,
                inter_batch_pause: Duration::from_secs(1),
            },
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// Checks that the gateway base is a parseable http(s) URL and that the
    /// batch size is nonzero. Called by [`crate::BatchDownloader::new`]
    /// before any work starts.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.fetch.gateway_base).map_err(|e| Error::Config {
            message: format!(
                "gateway base '{}' is not a valid URL: {}",
                self.fetch.gateway_base, e
            ),
            key: Some("gateway_base".to_string()),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::Config {
                message: format!(
                    "gateway base '{}' must use http or https",
                    self.fetch.gateway_base
                ),
                key: Some("gateway_base".to_string()),
            });
        }

        if self.batch.batch_size == 0 {
            return Err(Error::Config {
                message: "batch size must be at least 1".to_string(),
                key: Some("batch_size".to_string()),
            });
        }

        if self.output.max_part_bytes == 0 {
            return Err(Error::Config {
                message: "max part bytes must be at least 1".to_string(),
                key: Some("max_part_bytes".to_string()),
            });
        }

        Ok(())
    }
}

fn default_gateway_base() -> String {
    "https://ipfs.io/ipfs/".to_string()
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_batch_size() -> usize {
    50
}

fn default_inter_batch_pause() -> Duration {
    Duration::from_millis(200)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./downloaded_images")
}

fn default_archive_stem() -> String {
    "ipfs_downloads".to_string()
}

fn default_max_part_bytes() -> u64 {
    80 * 1024 * 1024 // 80 MiB
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds, for sub-second pauses)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.fetch.gateway_base, "https://ipfs.io/ipfs/");
        assert_eq!(config.fetch.timeout, Duration::from_secs(30));
        assert_eq!(config.batch.batch_size, 50);
        assert_eq!(config.output.max_part_bytes, 80 * 1024 * 1024);
        assert_eq!(config.output.mode, OutputMode::Directory);
    }

    #[test]
    fn constrained_preset_shrinks_windows() {
        let config = Config::constrained();
        config.validate().unwrap();
        assert_eq!(config.batch.batch_size, 15);
        assert_eq!(config.batch.inter_batch_pause, Duration::from_secs(1));
    }

    #[test]
    fn rejects_non_http_gateway() {
        let config = Config {
            fetch: FetchConfig {
                gateway_base: "ftp://gateway.example/ipfs/".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config { key: Some(ref k), .. } if k == "gateway_base"));
    }

    #[test]
    fn rejects_unparseable_gateway() {
        let config = Config {
            fetch: FetchConfig {
                gateway_base: "not a url at all".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_batch_size() {
        let config = Config {
            batch: BatchConfig {
                batch_size: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config { key: Some(ref k), .. } if k == "batch_size"));
    }

    #[test]
    fn json_round_trip_preserves_fields() {
        let config = Config::constrained();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.batch.batch_size, 15);
        assert_eq!(back.batch.inter_batch_pause, Duration::from_secs(1));
        assert_eq!(back.fetch.gateway_base, config.fetch.gateway_base);
    }

    #[test]
    fn deserializes_from_empty_object() {
        // Every field has a serde default, so `{}` yields the default config
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.batch.batch_size, 50);
    }
}
