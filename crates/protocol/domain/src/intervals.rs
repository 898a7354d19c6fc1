//! Consecutive block intervals.

use thiserror::Error;

/// An inclusive range of block numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::Display)]
#[display("[{start_block_number}..{end_block_number}]")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BlockInterval {
    /// The first block of the interval.
    pub start_block_number: u64,
    /// The last block of the interval.
    pub end_block_number: u64,
}

impl BlockInterval {
    /// Creates a new [`BlockInterval`].
    pub const fn new(start_block_number: u64, end_block_number: u64) -> Self {
        Self { start_block_number, end_block_number }
    }

    /// Returns the number of blocks in the interval.
    pub const fn num_blocks(&self) -> u64 {
        self.end_block_number + 1 - self.start_block_number
    }

    /// Returns true if the interval contains `block_number`.
    pub const fn contains(&self, block_number: u64) -> bool {
        self.start_block_number <= block_number && block_number <= self.end_block_number
    }
}

/// An error building [`BlockIntervals`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockIntervalsError {
    /// No upper boundary was given.
    #[error("Block intervals need at least one upper boundary")]
    Empty,
    /// An upper boundary is lower than the block the intervals start at.
    #[error("Upper boundary={boundary} is lower than start block number={start}")]
    BoundaryBeforeStart {
        /// The starting block number.
        start: u64,
        /// The offending boundary.
        boundary: u64,
    },
    /// Upper boundaries are not strictly increasing.
    #[error("Upper boundaries are not increasing: {previous} followed by {next}")]
    NotAscending {
        /// The preceding boundary.
        previous: u64,
        /// The boundary that does not increase.
        next: u64,
    },
    /// Two intervals are not contiguous.
    #[error("Interval starting at block={actual} does not follow previous end, expected={expected}")]
    Gap {
        /// The expected start of the interval.
        expected: u64,
        /// The actual start of the interval.
        actual: u64,
    },
}

/// A list of consecutive block intervals, encoded as a start block number and the upper boundary
/// of every interval.
///
/// `starting_block_number = 10, upper_boundaries = [12, 15]` describes `[10..12]` and
/// `[13..15]`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BlockIntervals {
    starting_block_number: u64,
    upper_boundaries: Vec<u64>,
}

impl BlockIntervals {
    /// Creates a new [`BlockIntervals`], checking that boundaries are non-empty and strictly
    /// increasing from `starting_block_number`.
    pub fn new(
        starting_block_number: u64,
        upper_boundaries: Vec<u64>,
    ) -> Result<Self, BlockIntervalsError> {
        let first = *upper_boundaries.first().ok_or(BlockIntervalsError::Empty)?;
        if first < starting_block_number {
            return Err(BlockIntervalsError::BoundaryBeforeStart {
                start: starting_block_number,
                boundary: first,
            });
        }
        if let Some(pair) = upper_boundaries.windows(2).find(|pair| pair[1] <= pair[0]) {
            return Err(BlockIntervalsError::NotAscending { previous: pair[0], next: pair[1] });
        }
        Ok(Self { starting_block_number, upper_boundaries })
    }

    /// Builds [`BlockIntervals`] from contiguous intervals, in order.
    pub fn from_intervals(
        intervals: impl IntoIterator<Item = BlockInterval>,
    ) -> Result<Self, BlockIntervalsError> {
        let mut intervals = intervals.into_iter();
        let first = intervals.next().ok_or(BlockIntervalsError::Empty)?;
        let mut upper_boundaries = vec![first.end_block_number];
        for interval in intervals {
            let expected = upper_boundaries.last().copied().unwrap_or_default() + 1;
            if interval.start_block_number != expected {
                return Err(BlockIntervalsError::Gap {
                    expected,
                    actual: interval.start_block_number,
                });
            }
            upper_boundaries.push(interval.end_block_number);
        }
        Self::new(first.start_block_number, upper_boundaries)
    }

    /// Returns the first block of the first interval.
    pub const fn start_block_number(&self) -> u64 {
        self.starting_block_number
    }

    /// Returns the last block of the last interval.
    pub fn end_block_number(&self) -> u64 {
        // `new` rejects empty boundaries.
        self.upper_boundaries.last().copied().unwrap_or(self.starting_block_number)
    }

    /// Returns the upper boundary of every interval.
    pub fn upper_boundaries(&self) -> &[u64] {
        &self.upper_boundaries
    }

    /// Returns the number of intervals.
    pub fn len(&self) -> usize {
        self.upper_boundaries.len()
    }

    /// Always false, kept for symmetry with [`Self::len`].
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Expands the boundaries into explicit intervals.
    pub fn to_intervals(&self) -> Vec<BlockInterval> {
        let mut start = self.starting_block_number;
        self.upper_boundaries
            .iter()
            .map(|end| {
                let interval = BlockInterval::new(start, *end);
                start = end + 1;
                interval
            })
            .collect()
    }
}
