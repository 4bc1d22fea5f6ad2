//! Part handles with explicit pending/ready/failed state
//!
//! A [`Part`] is a cheap-clone handle shared between the cache, the
//! worker that fulfills it and any caller awaiting it. The pending state
//! is first-class: duplicate-request suppression in the cache is a check
//! on the stored handle, and a failed handle is removed so the next
//! request retries.
//!
//! All mutable state lives under one mutex; a condvar wakes waiters when
//! the handle settles.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Parsed visual layer plus creator attribution for one variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartLayer {
    /// Raw markup of the variant's single top-level `<g>` element
    pub markup: Arc<str>,
    pub creator: String,
}

/// Resolution state of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartStatus {
    /// Fetch issued, not settled yet
    Pending,
    Ready,
    Failed,
}

#[derive(Debug)]
struct PartState {
    status: PartStatus,
    layer: Option<Arc<PartLayer>>,
    error: Option<String>,
}

/// Outcome of waiting on a handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartWait {
    Failed(String),
    Timeout,
}

/// Pending-or-resolved part, shared between cache, workers and callers
#[derive(Debug, Clone)]
pub struct Part {
    shared: Arc<(Mutex<PartState>, Condvar)>,
}

impl Part {
    /// New handle in the pending state
    pub fn pending() -> Self {
        Self {
            shared: Arc::new((
                Mutex::new(PartState {
                    status: PartStatus::Pending,
                    layer: None,
                    error: None,
                }),
                Condvar::new(),
            )),
        }
    }

    pub fn status(&self) -> PartStatus {
        self.lock().status
    }

    /// Resolved layer, if the handle has settled successfully
    pub fn layer(&self) -> Option<Arc<PartLayer>> {
        self.lock().layer.clone()
    }

    /// Settle the handle with a resolved layer and wake waiters
    pub fn fulfill(&self, layer: PartLayer) {
        let (state, cvar) = &*self.shared;
        let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
        guard.status = PartStatus::Ready;
        guard.layer = Some(Arc::new(layer));
        cvar.notify_all();
    }

    /// Settle the handle as failed and wake waiters
    pub fn fail(&self, reason: impl Into<String>) {
        let (state, cvar) = &*self.shared;
        let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
        guard.status = PartStatus::Failed;
        guard.error = Some(reason.into());
        cvar.notify_all();
    }

    /// Block until the handle settles or the timeout elapses
    pub fn wait_ready(&self, timeout: Duration) -> Result<Arc<PartLayer>, PartWait> {
        let (state, cvar) = &*self.shared;
        let deadline = Instant::now() + timeout;
        let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());

        loop {
            match guard.status {
                PartStatus::Ready => {
                    // layer is always set together with Ready
                    let layer = guard.layer.clone().ok_or(PartWait::Timeout)?;
                    return Ok(layer);
                }
                PartStatus::Failed => {
                    let reason = guard.error.clone().unwrap_or_else(|| "fetch failed".into());
                    return Err(PartWait::Failed(reason));
                }
                PartStatus::Pending => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(PartWait::Timeout);
                    }
                    let (g, _res) = cvar
                        .wait_timeout(guard, deadline - now)
                        .unwrap_or_else(|e| e.into_inner());
                    guard = g;
                }
            }
        }
    }

    /// Whether two handles refer to the same cache entry
    pub fn same_handle(&self, other: &Part) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PartState> {
        self.shared.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}
