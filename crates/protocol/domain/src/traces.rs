//! Trace line counters reported by the tracer for every block.

use std::{
    collections::BTreeMap,
    ops::{Add, AddAssign},
};

/// A module of the zkEVM arithmetization for which the tracer reports line counts.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[allow(missing_docs)]
pub enum TracingModule {
    Add,
    Bin,
    BlockData,
    BlockHash,
    Ecdata,
    Euc,
    Exp,
    Ext,
    Gas,
    Hub,
    LogData,
    LogInfo,
    Mmio,
    Mmu,
    Mod,
    Mul,
    Mxp,
    Oob,
    RlpAddr,
    RlpTxn,
    RlpTxnRcpt,
    Rom,
    RomLex,
    Shakiradata,
    Shf,
    Stp,
    Trm,
    Txndata,
    Wcp,
    PrecompileEcrecoverEffectiveCalls,
    PrecompileSha2Blocks,
    PrecompileRipemdBlocks,
    PrecompileModexpEffectiveCalls,
    PrecompileEcaddEffectiveCalls,
    PrecompileEcmulEffectiveCalls,
    PrecompileEcpairingFinalExponentiations,
    PrecompileBlakeEffectiveCalls,
    BlockKeccak,
    #[strum(serialize = "BLOCK_L1_SIZE")]
    #[cfg_attr(feature = "serde", serde(rename = "BLOCK_L1_SIZE"))]
    BlockL1Size,
    #[strum(serialize = "BLOCK_L2_L1_LOGS")]
    #[cfg_attr(feature = "serde", serde(rename = "BLOCK_L2_L1_LOGS"))]
    BlockL2L1Logs,
    BlockTransactions,
}

/// Line counts per [`TracingModule`].
///
/// Modules without an entry count as zero, both when comparing counters and when they are used
/// as limits.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TracesCounters(BTreeMap<TracingModule, u64>);

impl TracesCounters {
    /// Creates an empty set of counters.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Creates counters where every module is set to `value`.
    pub fn filled(value: u64) -> Self {
        use strum::IntoEnumIterator;
        Self(TracingModule::iter().map(|module| (module, value)).collect())
    }

    /// Returns the count of the given module.
    pub fn get(&self, module: TracingModule) -> u64 {
        self.0.get(&module).copied().unwrap_or_default()
    }

    /// Sets the count of the given module.
    pub fn set(&mut self, module: TracingModule, value: u64) {
        self.0.insert(module, value);
    }

    /// Returns true if every module counts zero.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|count| *count == 0)
    }

    /// Iterates over the non-default entries.
    pub fn iter(&self) -> impl Iterator<Item = (TracingModule, u64)> + '_ {
        self.0.iter().map(|(module, count)| (*module, *count))
    }

    /// Returns the modules whose count is strictly above the corresponding limit.
    pub fn modules_over_limit(&self, limits: &Self) -> Vec<TracingModule> {
        self.iter()
            .filter(|(module, count)| *count > limits.get(*module))
            .map(|(module, _)| module)
            .collect()
    }
}

impl PartialEq for TracesCounters {
    fn eq(&self, other: &Self) -> bool {
        self.iter().all(|(module, count)| other.get(module) == count) &&
            other.iter().all(|(module, count)| self.get(module) == count)
    }
}

impl Eq for TracesCounters {}

impl FromIterator<(TracingModule, u64)> for TracesCounters {
    fn from_iter<T: IntoIterator<Item = (TracingModule, u64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl AddAssign<&Self> for TracesCounters {
    fn add_assign(&mut self, rhs: &Self) {
        for (module, count) in rhs.iter() {
            let entry = self.0.entry(module).or_default();
            *entry = entry.saturating_add(count);
        }
    }
}

impl Add<&TracesCounters> for &TracesCounters {
    type Output = TracesCounters;

    fn add(self, rhs: &TracesCounters) -> Self::Output {
        let mut sum = self.clone();
        sum += rhs;
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_add_counters() {
        let a = TracesCounters::from_iter([(TracingModule::Add, 10), (TracingModule::Hub, 5)]);
        let b = TracesCounters::from_iter([(TracingModule::Add, 1), (TracingModule::Mul, 7)]);

        let sum = &a + &b;
        assert_eq!(sum.get(TracingModule::Add), 11);
        assert_eq!(sum.get(TracingModule::Hub), 5);
        assert_eq!(sum.get(TracingModule::Mul), 7);
        assert_eq!(sum.get(TracingModule::Rom), 0);
    }

    #[test]
    fn test_modules_over_limit() {
        let limits = TracesCounters::from_iter([(TracingModule::Add, 10), (TracingModule::Hub, 10)]);
        let counters = TracesCounters::from_iter([
            (TracingModule::Add, 10),
            (TracingModule::Hub, 11),
            (TracingModule::Mul, 1),
            (TracingModule::Rom, 0),
        ]);

        assert_eq!(
            counters.modules_over_limit(&limits),
            vec![TracingModule::Hub, TracingModule::Mul]
        );
    }

    #[test]
    fn test_filled_is_not_empty() {
        assert!(TracesCounters::new().is_empty());
        assert!(TracesCounters::filled(0).is_empty());
        assert!(!TracesCounters::filled(1).is_empty());
        assert_eq!(TracesCounters::filled(3).get(TracingModule::BlockL1Size), 3);
    }

    #[test]
    fn test_missing_modules_count_as_zero() {
        assert_eq!(TracesCounters::filled(0), TracesCounters::new());
        assert_eq!(
            TracesCounters::from_iter([(TracingModule::Add, 0), (TracingModule::Bin, 2)]),
            TracesCounters::from_iter([(TracingModule::Bin, 2)])
        );
        assert_ne!(TracesCounters::filled(1), TracesCounters::from_iter([(TracingModule::Bin, 1)]));
    }

    #[test]
    fn test_module_names() {
        assert_eq!(TracingModule::RlpTxnRcpt.to_string(), "RLP_TXN_RCPT");
        assert_eq!(TracingModule::BlockL1Size.to_string(), "BLOCK_L1_SIZE");
        assert_eq!(
            TracingModule::from_str("BLOCK_L2_L1_LOGS").unwrap(),
            TracingModule::BlockL2L1Logs
        );
        assert_eq!(
            TracingModule::from_str("PRECOMPILE_SHA2_BLOCKS").unwrap(),
            TracingModule::PrecompileSha2Blocks
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_counters() {
        let raw = r#"{"ADD":12,"BLOCK_L1_SIZE":400}"#;
        let counters: TracesCounters = serde_json::from_str(raw).unwrap();
        assert_eq!(counters.get(TracingModule::Add), 12);
        assert_eq!(counters.get(TracingModule::BlockL1Size), 400);
    }
}
