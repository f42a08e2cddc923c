//! Mobile overlay and document scroll lock.
//!
//! [`OverlayController`] owns the open/closed state of the full-screen
//! sidebar overlay. While open it holds a [`ScrollLockGuard`]; every path
//! out of the open state (toggle, link click, viewport change, drop) releases
//! the guard, so scrolling can never stay locked after the overlay is gone.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use crate::viewport::ViewportClass;

/// Document-level background scroll lock.
///
/// Reference counted: scrolling is locked while at least one guard is alive.
/// Clones share the same counter.
#[derive(Clone, Debug, Default)]
pub struct BodyScrollLock {
    holders: Arc<AtomicUsize>,
}

impl BodyScrollLock {
    /// Create an unlocked scroll lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock background scrolling until the returned guard is dropped.
    #[must_use]
    pub fn acquire(&self) -> ScrollLockGuard {
        self.holders.fetch_add(1, Ordering::AcqRel);
        ScrollLockGuard {
            holders: Arc::clone(&self.holders),
        }
    }

    /// Whether background scrolling is currently locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.holders.load(Ordering::Acquire) > 0
    }
}

/// Held scroll lock; releases on drop.
#[derive(Debug)]
pub struct ScrollLockGuard {
    holders: Arc<AtomicUsize>,
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        self.holders.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Overlay visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayState {
    /// Overlay hidden.
    #[default]
    Closed,
    /// Overlay shown, background scroll locked.
    Open,
}

/// Controller for the mobile sidebar overlay.
#[derive(Debug)]
pub struct OverlayController {
    lock: BodyScrollLock,
    guard: Option<ScrollLockGuard>,
}

impl OverlayController {
    /// Create a closed overlay bound to the document scroll lock.
    #[must_use]
    pub fn new(lock: BodyScrollLock) -> Self {
        Self { lock, guard: None }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> OverlayState {
        if self.guard.is_some() {
            OverlayState::Open
        } else {
            OverlayState::Closed
        }
    }

    /// Whether the overlay is shown.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.guard.is_some()
    }

    /// Handle a press of the toggle button.
    pub fn toggle(&mut self) -> OverlayState {
        if self.is_open() {
            self.close();
        } else {
            self.guard = Some(self.lock.acquire());
            tracing::debug!("Sidebar overlay opened");
        }
        self.state()
    }

    /// Handle a click on a link inside the overlay.
    pub fn link_clicked(&mut self) -> OverlayState {
        self.close();
        self.state()
    }

    /// Handle a viewport class change; switching to desktop dismisses the overlay.
    pub fn viewport_changed(&mut self, class: ViewportClass) -> OverlayState {
        if class == ViewportClass::Desktop {
            self.close();
        }
        self.state()
    }

    /// Close the overlay and release the scroll lock.
    pub fn close(&mut self) {
        if self.guard.take().is_some() {
            tracing::debug!("Sidebar overlay closed");
        }
    }
}
