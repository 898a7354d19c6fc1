//! A [`TracesCountersClient`] backed by an alloy [`ReqwestClient`].

use alloy_rpc_client::ReqwestClient;
use async_trait::async_trait;
use coordinator_conflation::{TracesCountersClient, TracesCountersError, TracesCountersResponse};
use coordinator_domain::{BlockNumberAndHash, TracesCounters, TracingModule};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// The tracing node method returning the counters of a block.
const TRACES_COUNTERS_METHOD: &str = "linea_getBlockTracesCountersV2";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct TracesCountersRequest {
    block_number: u64,
    expected_traces_engine_version: String,
}

/// A single counter, which tracing nodes encode either as a number or a decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u64),
    Decimal(String),
}

impl Count {
    fn value(&self) -> Option<u64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Decimal(value) => value.parse().ok(),
        }
    }
}

/// The raw response of the traces counters method.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracesCountersRpcResponse {
    /// The version of the tracing engine that produced the counters.
    pub traces_engine_version: String,
    traces_counters: BTreeMap<String, Count>,
}

impl TracesCountersRpcResponse {
    /// Converts the raw counters into a [`TracesCountersResponse`].
    ///
    /// Modules unknown to the coordinator are dropped. The block L1 size is read from the
    /// `BLOCK_L1_SIZE` module.
    pub fn into_response(self) -> Result<TracesCountersResponse, TracesCountersError> {
        let mut traces_counters = TracesCounters::new();
        for (name, count) in &self.traces_counters {
            let Ok(module) = name.parse::<TracingModule>() else {
                debug!(target: "providers", module = %name, "Ignoring unknown tracing module");
                continue;
            };
            let value = count.value().ok_or_else(|| {
                TracesCountersError::Invalid(format!("invalid count for module {name}"))
            })?;
            traces_counters.set(module, value);
        }

        let block_l1_size =
            u32::try_from(traces_counters.get(TracingModule::BlockL1Size)).unwrap_or(u32::MAX);
        Ok(TracesCountersResponse {
            traces_counters,
            block_l1_size,
            traces_engine_version: self.traces_engine_version,
        })
    }
}

/// Fetches block trace counters from a tracing node over JSON-RPC.
#[derive(Debug, Clone)]
pub struct AlloyTracesCountersClient {
    rpc: ReqwestClient,
    traces_engine_version: String,
}

impl AlloyTracesCountersClient {
    /// Creates a new [`AlloyTracesCountersClient`] talking HTTP to `url`.
    ///
    /// The tracing node rejects requests whose `traces_engine_version` differs from its own.
    pub fn new_http(url: Url, traces_engine_version: impl Into<String>) -> Self {
        Self {
            rpc: ReqwestClient::new_http(url),
            traces_engine_version: traces_engine_version.into(),
        }
    }
}

#[async_trait]
impl TracesCountersClient for AlloyTracesCountersClient {
    async fn traces_counters(
        &self,
        block: BlockNumberAndHash,
    ) -> Result<TracesCountersResponse, TracesCountersError> {
        let request = TracesCountersRequest {
            block_number: block.number,
            expected_traces_engine_version: self.traces_engine_version.clone(),
        };
        let response: Option<TracesCountersRpcResponse> = self
            .rpc
            .request(TRACES_COUNTERS_METHOD, (request,))
            .await
            .map_err(|err| TracesCountersError::Rpc(err.to_string()))?;

        response.ok_or(TracesCountersError::NotAvailable(block))?.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(json: &str) -> TracesCountersRpcResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_encoding() {
        let request =
            TracesCountersRequest { block_number: 42, expected_traces_engine_version: "1.2.0".into() };
        assert_eq!(
            serde_json::to_string(&(request,)).unwrap(),
            r#"[{"blockNumber":42,"expectedTracesEngineVersion":"1.2.0"}]"#
        );
    }

    #[test]
    fn test_into_response() {
        let response = parse(
            r#"{
                "tracesEngineVersion": "1.2.0",
                "tracesCounters": { "ADD": 12, "MUL": "7", "BLOCK_L1_SIZE": "1024" }
            }"#,
        )
        .into_response()
        .unwrap();

        assert_eq!(response.traces_engine_version, "1.2.0");
        assert_eq!(response.block_l1_size, 1024);
        assert_eq!(response.traces_counters.get(TracingModule::Add), 12);
        assert_eq!(response.traces_counters.get(TracingModule::Mul), 7);
        assert_eq!(response.traces_counters.get(TracingModule::Mod), 0);
    }

    #[test]
    fn test_unknown_modules_are_dropped() {
        let response = parse(
            r#"{ "tracesEngineVersion": "1.2.0", "tracesCounters": { "NOT_A_MODULE": 1, "ADD": 3 } }"#,
        )
        .into_response()
        .unwrap();

        assert_eq!(
            response.traces_counters,
            TracesCounters::from_iter([(TracingModule::Add, 3)])
        );
        assert_eq!(response.block_l1_size, 0);
    }

    #[rstest]
    #[case::negative(r#""-1""#)]
    #[case::hex(r#""0x10""#)]
    #[case::garbage(r#""lots""#)]
    fn test_invalid_count(#[case] count: &str) {
        let json = format!(
            r#"{{ "tracesEngineVersion": "1.2.0", "tracesCounters": {{ "ADD": {count} }} }}"#
        );
        assert!(matches!(parse(&json).into_response(), Err(TracesCountersError::Invalid(_))));
    }
}
