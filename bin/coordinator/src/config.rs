//! The coordinator configuration file.

use anyhow::{Context, Result};
use coordinator_conflation::{ConflationConfig, calculators::TimeDeadlineConfig};
use coordinator_domain::TracesCounters;
use coordinator_ingestion::BlockCreationMonitorConfig;
use serde::Deserialize;
use std::{path::Path, time::Duration};

/// The coordinator configuration, read from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Block ingestion settings.
    pub ingestion: IngestionSection,
    /// Conflation settings.
    pub conflation: ConflationSection,
}

impl CoordinatorConfig {
    /// Reads the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// The `[ingestion]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestionSection {
    /// The interval between two polls of the chain head, in milliseconds.
    pub polling_interval_ms: u64,
    /// The number of confirmations a block needs before it is fetched.
    pub blocks_to_finalization: u64,
    /// The maximum number of blocks fetched per poll.
    pub blocks_fetch_limit: u64,
}

impl Default for IngestionSection {
    fn default() -> Self {
        let defaults = BlockCreationMonitorConfig::default();
        Self {
            polling_interval_ms: defaults.polling_interval.as_millis() as u64,
            blocks_to_finalization: defaults.blocks_to_finalization,
            blocks_fetch_limit: defaults.blocks_fetch_limit,
        }
    }
}

impl From<&IngestionSection> for BlockCreationMonitorConfig {
    fn from(section: &IngestionSection) -> Self {
        Self {
            polling_interval: Duration::from_millis(section.polling_interval_ms),
            blocks_to_finalization: section.blocks_to_finalization,
            blocks_fetch_limit: section.blocks_fetch_limit,
        }
    }
}

/// The `[conflation]` section. Unset limits disable their strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConflationSection {
    /// The maximum number of blocks in a batch.
    pub blocks_limit: Option<u32>,
    /// The L1 data size limit of a batch, in bytes.
    pub data_size_limit: Option<u32>,
    /// The per module trace count limits of a batch.
    pub traces_limits: Option<TracesCounters>,
    /// Block numbers batches must end at.
    pub target_end_block_numbers: Vec<u64>,
    /// Closes batches that stay open for too long.
    pub time_deadline: Option<TimeDeadlineSection>,
}

impl From<&ConflationSection> for ConflationConfig {
    fn from(section: &ConflationSection) -> Self {
        Self {
            traces_limits: section.traces_limits.clone(),
            data_size_limit: section.data_size_limit,
            blocks_limit: section.blocks_limit,
            target_end_block_numbers: section.target_end_block_numbers.clone(),
            time_deadline: section.time_deadline.as_ref().map(Into::into),
        }
    }
}

/// The `[conflation.time_deadline]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeDeadlineSection {
    /// How long a batch may stay open, in seconds.
    pub deadline_secs: u64,
    /// How often the deadline is checked, in seconds.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    /// How long after the last block the deadline may fire, in seconds.
    #[serde(default)]
    pub last_block_confirmation_delay_secs: u64,
}

const fn default_check_interval_secs() -> u64 {
    1
}

impl From<&TimeDeadlineSection> for TimeDeadlineConfig {
    fn from(section: &TimeDeadlineSection) -> Self {
        Self {
            conflation_deadline: Duration::from_secs(section.deadline_secs),
            check_interval: Duration::from_secs(section.check_interval_secs),
            last_block_confirmation_delay: Duration::from_secs(
                section.last_block_confirmation_delay_secs,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordinator_domain::TracingModule;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: CoordinatorConfig = toml::from_str("").unwrap();
        assert_eq!(config, CoordinatorConfig::default());
        assert_eq!(
            BlockCreationMonitorConfig::from(&config.ingestion),
            BlockCreationMonitorConfig::default()
        );
        assert_eq!(ConflationConfig::from(&config.conflation), ConflationConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config: CoordinatorConfig = toml::from_str(
            r#"
            [ingestion]
            polling_interval_ms = 500
            blocks_to_finalization = 2
            blocks_fetch_limit = 20

            [conflation]
            blocks_limit = 100
            data_size_limit = 120000
            target_end_block_numbers = [10, 20]

            [conflation.traces_limits]
            ADD = 1000
            BLOCK_L1_SIZE = 2000

            [conflation.time_deadline]
            deadline_secs = 180
            last_block_confirmation_delay_secs = 12
            "#,
        )
        .unwrap();

        assert_eq!(
            BlockCreationMonitorConfig::from(&config.ingestion),
            BlockCreationMonitorConfig {
                polling_interval: Duration::from_millis(500),
                blocks_to_finalization: 2,
                blocks_fetch_limit: 20,
            }
        );
        assert_eq!(
            ConflationConfig::from(&config.conflation),
            ConflationConfig {
                traces_limits: Some(TracesCounters::from_iter([
                    (TracingModule::Add, 1000),
                    (TracingModule::BlockL1Size, 2000),
                ])),
                data_size_limit: Some(120_000),
                blocks_limit: Some(100),
                target_end_block_numbers: vec![10, 20],
                time_deadline: Some(TimeDeadlineConfig {
                    conflation_deadline: Duration::from_secs(180),
                    check_interval: Duration::from_secs(1),
                    last_block_confirmation_delay: Duration::from_secs(12),
                }),
            }
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(toml::from_str::<CoordinatorConfig>("[ingestion]\npolling_interval = 5").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = CoordinatorConfig::load(Path::new("/does/not/exist.toml")).unwrap_err();
        assert!(err.to_string().contains("/does/not/exist.toml"));
    }
}
