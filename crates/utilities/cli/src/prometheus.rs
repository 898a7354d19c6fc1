//! Prometheus metrics server.

use crate::PrometheusError;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, SocketAddr, TcpListener};
use tracing::info;

/// Installs the global Prometheus recorder and serves it over HTTP on `addr:port`.
///
/// A `port` of `0` is resolved to a free port before the exporter binds.
pub fn init_prometheus_server(addr: IpAddr, port: u16) -> Result<(), PrometheusError> {
    let listen_addr = if port == 0 {
        let listener = TcpListener::bind((addr, 0))?;
        listener.local_addr()?
    } else {
        SocketAddr::from((addr, port))
    };

    PrometheusBuilder::new().with_http_listener(listen_addr).install()?;

    info!(target: "prometheus", "Serving metrics at: http://{listen_addr}");
    Ok(())
}
