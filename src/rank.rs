//! Rank of this process within a distributed run
//!
//! Only rank 0 prints. When no launcher is detected we are standalone and
//! report rank 0.

use std::env;

/// Environment variables consulted by [`EnvRank`], in priority order
pub const RANK_ENV_VARS: [&str; 4] = [
    "FLOPWATCH_RANK",
    "OMPI_COMM_WORLD_RANK",
    "PMI_RANK",
    "SLURM_PROCID",
];

/// Source of the process rank
pub trait RankProvider: Send + Sync {
    fn rank(&self) -> usize;
}

/// Single-process execution: always rank 0
#[derive(Debug, Default, Clone, Copy)]
pub struct StandaloneRank;

impl RankProvider for StandaloneRank {
    fn rank(&self) -> usize {
        0
    }
}

/// A fixed rank, mostly useful in tests
#[derive(Debug, Clone, Copy)]
pub struct FixedRank(pub usize);

impl RankProvider for FixedRank {
    fn rank(&self) -> usize {
        self.0
    }
}

/// Rank read once from the launcher's environment
#[derive(Debug, Clone, Copy)]
pub struct EnvRank {
    rank: usize,
}

impl EnvRank {
    /// Read the rank from the first variable of [`RANK_ENV_VARS`] that is set
    pub fn from_env() -> Self {
        Self {
            rank: Self::detect(|var| env::var(var).ok()),
        }
    }

    fn detect(lookup: impl Fn(&str) -> Option<String>) -> usize {
        for var in RANK_ENV_VARS {
            if let Some(value) = lookup(var) {
                return match value.trim().parse::<usize>() {
                    Ok(rank) => rank,
                    Err(_) => {
                        tracing::warn!("Ignoring malformed rank {}={:?}, assuming 0", var, value);
                        0
                    }
                };
            }
        }
        0
    }
}

impl RankProvider for EnvRank {
    fn rank(&self) -> usize {
        self.rank
    }
}
