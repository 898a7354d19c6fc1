//! Prometheus arguments.

use crate::{CliResult, init_prometheus_server};
use clap::Args;
use std::net::{IpAddr, Ipv4Addr};

/// Arguments configuring the Prometheus exporter.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct MetricsArgs {
    /// Serve metrics over HTTP.
    #[arg(long = "metrics.enabled", default_value_t = false, env = "COORDINATOR_METRICS_ENABLED")]
    pub enabled: bool,
    /// The address the metrics server listens on.
    #[arg(long = "metrics.addr", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED), env = "COORDINATOR_METRICS_ADDR")]
    pub addr: IpAddr,
    /// The port the metrics server listens on. `0` picks a free port.
    #[arg(long = "metrics.port", default_value_t = 9090, env = "COORDINATOR_METRICS_PORT")]
    pub port: u16,
}

impl Default for MetricsArgs {
    fn default() -> Self {
        Self { enabled: false, addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 9090 }
    }
}

impl MetricsArgs {
    /// Starts the Prometheus server if metrics are enabled.
    ///
    /// `describe` runs after the recorder is installed, so metric descriptions are registered
    /// with the exporter.
    pub fn init_metrics(&self, describe: impl FnOnce()) -> CliResult<()> {
        if self.enabled {
            init_prometheus_server(self.addr, self.port)?;
            describe();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        metrics: MetricsArgs,
    }

    #[test]
    fn test_disabled_by_default() {
        let cli = TestCli::parse_from(["coordinator"]);
        assert_eq!(cli.metrics, MetricsArgs::default());

        let mut described = false;
        cli.metrics.init_metrics(|| described = true).unwrap();
        assert!(!described);
    }

    #[test]
    fn test_parse_metrics_args() {
        let cli = TestCli::parse_from([
            "coordinator",
            "--metrics.enabled",
            "--metrics.addr",
            "127.0.0.1",
            "--metrics.port",
            "9100",
        ]);
        assert!(cli.metrics.enabled);
        assert_eq!(cli.metrics.addr, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(cli.metrics.port, 9100);
    }
}
