//! Logging arguments and the `tracing` subscriber.

use crate::{CliError, CliResult};
use clap::{ArgAction, Args, ValueEnum};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// The output format of the log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines with all span fields.
    #[default]
    Full,
    /// Shorter human readable lines.
    Compact,
    /// One JSON object per line.
    Json,
}

/// Logging arguments.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct LogArgs {
    /// Verbosity level: 1 for errors, up to 5 for traces.
    #[arg(short = 'v', long = "verbosity", action = ArgAction::Count, default_value_t = 3, global = true)]
    pub v: u8,
    /// The log line format.
    #[arg(long = "log.format", value_enum, default_value_t = LogFormat::Full, env = "COORDINATOR_LOG_FORMAT")]
    pub format: LogFormat,
}

impl Default for LogArgs {
    fn default() -> Self {
        Self { v: 3, format: LogFormat::Full }
    }
}

impl LogArgs {
    /// Installs the global subscriber configured by these arguments.
    pub fn init_tracing_subscriber(&self, filter: Option<EnvFilter>) -> CliResult<()> {
        init_tracing_subscriber(self.v, self.format, filter)
    }
}

/// Maps a verbosity count to the maximum enabled [`Level`].
const fn verbosity_level(verbosity: u8) -> Level {
    match verbosity {
        0 | 1 => Level::ERROR,
        2 => Level::WARN,
        3 => Level::INFO,
        4 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the global `tracing` subscriber.
///
/// Directives from `RUST_LOG` apply when no `filter` is given. The verbosity level is always
/// added on top.
pub fn init_tracing_subscriber(
    verbosity: u8,
    format: LogFormat,
    filter: Option<EnvFilter>,
) -> CliResult<()> {
    let filter = filter
        .unwrap_or_else(EnvFilter::from_default_env)
        .add_directive(verbosity_level(verbosity).into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|err| CliError::Tracing(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rstest::rstest;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        log: LogArgs,
    }

    #[rstest]
    #[case(0, Level::ERROR)]
    #[case(2, Level::WARN)]
    #[case(3, Level::INFO)]
    #[case(4, Level::DEBUG)]
    #[case(9, Level::TRACE)]
    fn test_verbosity_level(#[case] verbosity: u8, #[case] level: Level) {
        assert_eq!(verbosity_level(verbosity), level);
    }

    #[test]
    fn test_parse_log_args() {
        let cli = TestCli::parse_from(["coordinator"]);
        assert_eq!(cli.log, LogArgs::default());

        let cli = TestCli::parse_from(["coordinator", "-vvvv", "--log.format", "json"]);
        assert_eq!(cli.log.format, LogFormat::Json);
        assert_eq!(cli.log.v, 4);
    }
}
