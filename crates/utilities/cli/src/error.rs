//! Error types for the CLI utilities.

use std::io;
use thiserror::Error;

/// An error starting the Prometheus exporter.
#[derive(Debug, Error)]
pub enum PrometheusError {
    /// The listener address could not be bound.
    #[error("failed to bind metrics listener: {0}")]
    Bind(#[from] io::Error),
    /// The exporter failed to build or install.
    #[error("failed to install prometheus exporter: {0}")]
    Build(#[from] metrics_exporter_prometheus::BuildError),
}

/// Errors returned by the CLI utilities.
#[derive(Error, Debug)]
pub enum CliError {
    /// The tracing subscriber could not be installed.
    #[error("Failed to initialize tracing: {0}")]
    Tracing(String),
    /// The metrics exporter could not be installed.
    #[error("Failed to initialize metrics: {0}")]
    MetricsInitialization(#[from] PrometheusError),
}

/// A [`Result`] with a [`CliError`].
pub type CliResult<T> = Result<T, CliError>;
