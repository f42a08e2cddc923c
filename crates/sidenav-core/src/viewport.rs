//! Viewport size classification.
//!
//! [`ViewportObserver`] turns raw window widths into a [`ViewportClass`] and
//! notifies subscribers only when the class actually changes. Subscriptions
//! are plain channel receivers; dropping one unsubscribes it.

use std::sync::mpsc;

use serde::Serialize;

/// Default width in pixels above which the viewport counts as desktop.
pub const DEFAULT_BREAKPOINT: u32 = 996;

/// Coarse window width bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportClass {
    /// Narrow window; the sidebar is shown as an overlay.
    Mobile,
    /// Wide window; the sidebar is shown inline.
    #[default]
    Desktop,
}

impl ViewportClass {
    /// Classify a window width.
    ///
    /// An unknown width (no layout, e.g. static rendering) counts as desktop.
    #[must_use]
    pub fn classify(width: Option<u32>, breakpoint: u32) -> Self {
        match width {
            Some(width) if width <= breakpoint => Self::Mobile,
            _ => Self::Desktop,
        }
    }
}

/// Receiver for viewport class changes.
pub struct ViewportReceiver {
    rx: mpsc::Receiver<ViewportClass>,
}

impl ViewportReceiver {
    /// Try to receive a change without blocking.
    ///
    /// Returns `None` if no change is queued or the observer is gone.
    #[must_use]
    pub fn try_recv(&self) -> Option<ViewportClass> {
        self.rx.try_recv().ok()
    }

    /// Drain all queued changes.
    pub fn try_iter(&self) -> impl Iterator<Item = ViewportClass> + '_ {
        self.rx.try_iter()
    }
}

/// Tracks the current viewport class.
pub struct ViewportObserver {
    breakpoint: u32,
    class: ViewportClass,
    subscribers: Vec<mpsc::Sender<ViewportClass>>,
}

impl ViewportObserver {
    /// Create an observer with the measured initial width.
    #[must_use]
    pub fn new(breakpoint: u32, initial_width: Option<u32>) -> Self {
        Self {
            breakpoint,
            class: ViewportClass::classify(initial_width, breakpoint),
            subscribers: Vec::new(),
        }
    }

    /// Current viewport class.
    #[must_use]
    pub fn class(&self) -> ViewportClass {
        self.class
    }

    /// Breakpoint separating mobile from desktop.
    #[must_use]
    pub fn breakpoint(&self) -> u32 {
        self.breakpoint
    }

    /// Subscribe to class changes.
    #[must_use]
    pub fn subscribe(&mut self) -> ViewportReceiver {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        ViewportReceiver { rx }
    }

    /// Handle a resize event.
    ///
    /// Returns the new class if it differs from the previous one; pixel
    /// changes within the same class return `None` and notify nobody.
    pub fn resize(&mut self, width: Option<u32>) -> Option<ViewportClass> {
        let class = ViewportClass::classify(width, self.breakpoint);
        if class == self.class {
            return None;
        }

        tracing::debug!(from = ?self.class, to = ?class, ?width, "Viewport class changed");
        self.class = class;
        self.subscribers.retain(|tx| tx.send(class).is_ok());
        Some(class)
    }
}
