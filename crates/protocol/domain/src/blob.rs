//! Blob types.

use alloy_primitives::{B256, Bytes};

/// Counters describing one blob.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BlobCounters {
    /// The number of batches compressed into the blob.
    pub number_of_batches: u32,
    /// The first block of the blob.
    pub start_block_number: u64,
    /// The last block of the blob.
    pub end_block_number: u64,
    /// The timestamp of the first block, in seconds.
    pub start_block_timestamp: u64,
    /// The timestamp of the last block, in seconds.
    pub end_block_timestamp: u64,
}

/// The commitment of one blob, chained to the commitment of its parent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ShnarfResult {
    /// The hash of the blob data.
    pub data_hash: B256,
    /// The snark-friendly hash of the blob data.
    pub snark_hash: B256,
    /// The evaluation point of the blob polynomial.
    pub expected_x: B256,
    /// The evaluation of the blob polynomial at `expected_x`.
    pub expected_y: B256,
    /// The rolling commitment of this blob.
    pub expected_shnarf: B256,
    /// The KZG commitment of the blob.
    pub commitment: Bytes,
    /// The KZG proof checked by the settlement contract.
    pub kzg_proof_contract: Bytes,
    /// The KZG proof attached to the blob sidecar.
    pub kzg_proof_sidecar: Bytes,
}

/// A persisted blob, as seen by the chaining stages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BlobRecord {
    /// The first block of the blob.
    pub start_block_number: u64,
    /// The last block of the blob.
    pub end_block_number: u64,
    /// The hash of the blob data.
    pub blob_hash: B256,
    /// The rolling commitment of the blob.
    pub expected_shnarf: B256,
    /// The number of batches compressed into the blob.
    pub batches_count: u32,
}
