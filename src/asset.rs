//! Sticky, lazy, one-shot asset loading.
//!
//! An [`OnceAsset`] loads at most once per detector instance: the first
//! caller to reach [`OnceAsset::get_or_try_init`] runs the supplied future;
//! every other caller, concurrent or later, waits for or replays that same
//! outcome. A failed load is not retried — the same error is cloned back to
//! every subsequent caller for the lifetime of the instance.

use std::future::Future;

use tokio::sync::OnceCell;

use crate::error::{Result, TurnDetectorError};

/// Lazily-initialized, cached `Result`.
pub struct OnceAsset<T: Clone> {
    inner: OnceCell<std::result::Result<T, TurnDetectorError>>,
}

impl<T: Clone> OnceAsset<T> {
    pub fn new() -> Self {
        Self {
            inner: OnceCell::new(),
        }
    }

    /// Returns the cached value, loading it via `init` on first use.
    ///
    /// If a prior call already failed, that same error is returned again
    /// without re-invoking `init`.
    pub async fn get_or_try_init<F, Fut>(&self, init: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let slot = self
            .inner
            .get_or_init(|| async { init().await })
            .await;
        slot.clone()
    }

    /// True once a load (successful or not) has completed.
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized()
    }

    /// Returns the cached outcome without loading, if a load has already
    /// completed; `None` otherwise. Useful for sync call sites that can
    /// tolerate a conservative default before the asset is ready.
    pub fn try_get(&self) -> Option<Result<T>> {
        self.inner.get().cloned()
    }
}

impl<T: Clone> Default for OnceAsset<T> {
    fn default() -> Self {
        Self::new()
    }
}
