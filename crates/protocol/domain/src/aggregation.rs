//! Proof aggregation types.

use crate::{BlobCounters, BlockIntervals};
use alloy_primitives::{B256, Bytes};

/// The versions of the software that produced an execution proof.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ExecutionProofVersions {
    /// The version of the conflation calculator that produced the batch.
    pub conflation_calculator_version: String,
    /// The version of the prover that proved the batch.
    pub execution_prover_version: String,
}

/// The execution proofs of a run of batches, along with their versions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct VersionedExecutionProofs {
    /// One interval per execution proof.
    pub execution_proofs: BlockIntervals,
    /// The versions of each execution proof.
    pub execution_versions: Vec<ExecutionProofVersions>,
}

/// A proven blob along with the execution proofs of the batches inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BlobAndBatchCounters {
    /// The counters of the blob.
    pub blob_counters: BlobCounters,
    /// The execution proofs of the batches in the blob.
    pub versioned_execution_proofs: VersionedExecutionProofs,
}

/// The boundary of one aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::Display)]
#[display("[{start_block_number}..{end_block_number}]")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BlobsToAggregate {
    /// The first block of the aggregation.
    pub start_block_number: u64,
    /// The last block of the aggregation.
    pub end_block_number: u64,
}

/// The L2 state an aggregation chains onto.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AggregationL2State {
    /// The timestamp of the last block of the parent aggregation, in seconds.
    pub parent_aggregation_last_block_timestamp: u64,
    /// The number of the last L1 message anchored by the parent aggregation.
    pub parent_aggregation_last_l1_rolling_hash_message_number: u64,
    /// The L1 rolling hash at the end of the parent aggregation.
    pub parent_aggregation_last_l1_rolling_hash: B256,
}

/// A request for an aggregated proof.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProofsToAggregate {
    /// One interval per compression proof (blob).
    pub compression_proofs: BlockIntervals,
    /// One interval per execution proof (batch).
    pub execution_proofs: BlockIntervals,
    /// The versions of every execution proof.
    pub execution_versions: Vec<ExecutionProofVersions>,
    /// The timestamp of the last block of the parent aggregation, in seconds.
    pub parent_aggregation_last_block_timestamp: u64,
    /// The number of the last L1 message anchored by the parent aggregation.
    pub parent_aggregation_last_l1_rolling_hash_message_number: u64,
    /// The L1 rolling hash at the end of the parent aggregation.
    pub parent_aggregation_last_l1_rolling_hash: B256,
}

impl ProofsToAggregate {
    /// Returns the first block covered by the request.
    pub const fn start_block_number(&self) -> u64 {
        self.compression_proofs.start_block_number()
    }

    /// Returns the last block covered by the request.
    pub fn end_block_number(&self) -> u64 {
        self.compression_proofs.end_block_number()
    }
}

/// An aggregated proof, ready to finalize on L1.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProofToFinalize {
    /// The aggregated proof.
    pub aggregated_proof: Bytes,
    /// The index of the verifier contract for this proof.
    pub aggregated_verifier_index: u32,
    /// The public input of the aggregated proof.
    pub aggregated_proof_public_input: Bytes,
    /// The data hashes of every aggregated blob.
    pub data_hashes: Vec<B256>,
    /// The data hash of the blob preceding the aggregation.
    pub data_parent_hash: B256,
    /// The state root before the first block of the aggregation.
    pub parent_state_root_hash: B256,
    /// The timestamp of the last block of the parent aggregation, in seconds.
    pub parent_aggregation_last_block_timestamp: u64,
    /// The timestamp of the last block of the aggregation, in seconds.
    pub final_timestamp: u64,
    /// The first block of the aggregation.
    pub first_block_number: u64,
    /// The last block of the aggregation.
    pub final_block_number: u64,
    /// The L1 rolling hash at the end of the aggregation.
    pub l1_rolling_hash: B256,
    /// The number of the last L1 message anchored by the aggregation.
    pub l1_rolling_hash_message_number: u64,
    /// The roots of the L2 to L1 message merkle trees.
    pub l2_merkle_roots: Vec<B256>,
    /// The depth of the L2 to L1 message merkle trees.
    pub l2_merkle_trees_depth: u32,
    /// The offsets of the blocks emitting L2 to L1 messages.
    pub l2_messaging_blocks_offsets: Bytes,
}

/// The lifecycle status of an [`Aggregation`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AggregationStatus {
    /// The aggregation is proven and awaits finalization.
    #[default]
    Proven,
}

/// A persisted aggregation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Aggregation {
    /// The first block of the aggregation.
    pub start_block_number: u64,
    /// The last block of the aggregation.
    pub end_block_number: u64,
    /// The status of the aggregation.
    pub status: AggregationStatus,
    /// The version of the calculator that decided the boundary.
    pub aggregation_calculator_version: String,
    /// The number of batches covered.
    pub batch_count: u64,
    /// The aggregated proof.
    pub aggregation_proof: Option<ProofToFinalize>,
}
