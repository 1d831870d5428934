//! Serialized rebuilds.
//!
//! A rebuild may be requested by any request worker. Only one build runs at
//! a time; a trigger that arrives while one is running is dropped and the
//! request is served from the cache as it currently is.

use super::{BuildOptions, BuildReport, build_site};
use crate::cache::CacheStore;
use anyhow::Result;
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Single-flight gate around [`build_site`].
pub struct Rebuilder {
    options: BuildOptions,
    store: Arc<dyn CacheStore>,
    gate: Mutex<()>,
    running: AtomicBool,
}

impl Rebuilder {
    pub fn new(options: BuildOptions, store: Arc<dyn CacheStore>) -> Self {
        Self {
            options,
            store,
            gate: Mutex::new(()),
            running: AtomicBool::new(false),
        }
    }

    /// Build now, waiting for a running build to finish first.
    pub fn build(&self) -> Result<BuildReport> {
        let _guard = self.gate.lock();
        self.run()
    }

    /// Build unless another build is already running.
    ///
    /// Returns `None` when the trigger was coalesced into the running build.
    pub fn trigger(&self) -> Option<Result<BuildReport>> {
        let _guard = self.gate.try_lock()?;
        Some(self.run())
    }

    /// Whether a build is in progress right now.
    #[inline]
    pub fn is_rebuilding(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn run(&self) -> Result<BuildReport> {
        self.running.store(true, Ordering::Release);
        let result = build_site(&self.options, self.store.as_ref());
        self.running.store(false, Ordering::Release);
        result
    }
}
