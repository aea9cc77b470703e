//! Parallel brute-force search for unknown container offsets.
//!
//! The fallback path for crypt14 containers whose offsets match no known
//! pair. Every (IV, ciphertext) candidate is an independent trial, so the
//! space is raced across a bounded thread pool and the first success wins.

use crate::error::{AndroidError, AndroidResult};
use crate::offsets::OffsetPair;
use crate::trial;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use wabex_core::constants::{
    AES_KEY_LEN, DEFAULT_BRUTE_WORKERS, DEFAULT_MAX_DB, DEFAULT_MAX_IV, GCM_IV_LEN,
};

/// Cooperative cancellation handle shared between the caller and the search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the search holding this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Progress observer: called with (candidates tried, total candidates).
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Brute-force (IV, ciphertext) offset search over a bounded thread pool.
#[derive(Debug, Clone)]
pub struct BruteForceSearch {
    max_iv: usize,
    max_db: usize,
    workers: usize,
    progress_every: usize,
}

impl Default for BruteForceSearch {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IV, DEFAULT_MAX_DB, DEFAULT_BRUTE_WORKERS)
    }
}

impl BruteForceSearch {
    /// Create a search over iv ∈ [0, max_iv) × db ∈ [0, max_db) with the
    /// given worker pool width.
    pub fn new(max_iv: usize, max_db: usize, workers: usize) -> Self {
        Self {
            max_iv,
            max_db,
            workers: workers.max(1),
            progress_every: 1000,
        }
    }

    /// Candidate pairs in raster order. Enumeration order does not affect
    /// which candidate wins once the pool races them.
    fn candidates(&self) -> Vec<OffsetPair> {
        let mut pairs = Vec::with_capacity(self.max_iv * self.max_db);
        for iv in 0..self.max_iv {
            for db in 0..self.max_db {
                pairs.push(OffsetPair { iv, db });
            }
        }
        pairs
    }

    /// Search the candidate space for offsets that decrypt `database`.
    ///
    /// Returns the plaintext and the winning pair. Work stops at the first
    /// success observed by any worker; a cancelled token stops the search and
    /// surfaces as [`AndroidError::Cancelled`], never as a partial result.
    pub fn search(
        &self,
        database: &[u8],
        key: &[u8; AES_KEY_LEN],
        cancel: &CancelToken,
        progress: Option<&ProgressFn>,
    ) -> AndroidResult<(Vec<u8>, OffsetPair)> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| AndroidError::Internal(anyhow::anyhow!(e)))?;

        let candidates = self.candidates();
        let total = candidates.len();
        let found = AtomicBool::new(false);
        let tried = AtomicUsize::new(0);

        tracing::debug!(total, workers = self.workers, "starting brute-force offset search");

        let hit = pool.install(|| {
            candidates.par_iter().find_map_any(|pair| {
                if found.load(Ordering::Relaxed) || cancel.is_cancelled() {
                    return None;
                }

                let count = tried.fetch_add(1, Ordering::Relaxed) + 1;
                if count % self.progress_every == 0 {
                    tracing::debug!(tried = count, total, "brute-force progress");
                    if let Some(observer) = progress {
                        observer(count, total);
                    }
                }

                let iv_end = pair.iv + GCM_IV_LEN;
                if iv_end > database.len() || pair.db >= database.len() {
                    return None;
                }
                let iv: &[u8; GCM_IV_LEN] = database[pair.iv..iv_end].try_into().ok()?;

                let db = trial::try_decrypt(&database[pair.db..], key, iv)?;
                found.store(true, Ordering::Relaxed);
                Some((db, *pair))
            })
        });

        if let Some((db, pair)) = hit {
            tracing::info!(
                iv = pair.iv,
                db = pair.db,
                "brute force found working offsets"
            );
            return Ok((db, pair));
        }
        if cancel.is_cancelled() {
            return Err(AndroidError::Cancelled);
        }
        Err(AndroidError::OffsetNotFound)
    }
}
