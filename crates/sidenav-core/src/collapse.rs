//! Per-category expand/collapse state machine.
//!
//! Each mounted category owns one [`CollapseController`]. Clicks are debounced
//! by a short fixed delay before the visual toggle starts, height transitions
//! are left only through an explicit [`CollapseController::transition_end`]
//! signal, and navigating into a collapsed branch opens it exactly once
//! (edge-triggered on the active flag).
//!
//! ```text
//! Collapsed --toggle--> Transitioning(Opening) --end--> Expanded
//! Expanded  --toggle--> Transitioning(Closing) --end--> Collapsed
//! Collapsed --became active--> Expanded
//! ```

use std::time::{Duration, Instant};

use serde::Serialize;

/// Default delay between a header click and the visual toggle.
pub const DEFAULT_TOGGLE_DELAY: Duration = Duration::from_millis(100);

/// Direction of a running height transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Height animates from zero to the measured content height.
    Opening,
    /// Height animates from the content height to zero.
    Closing,
}

/// State of a category node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapsePhase {
    /// Children visible, no explicit height.
    Expanded,
    /// Children hidden and unmounted.
    Collapsed,
    /// Height transition in progress.
    Transitioning(Direction),
}

/// Snapshot of a category's collapse state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CollapseState {
    /// Whether the category is collapsed or collapsing.
    pub collapsed: bool,
    /// Cached content height in pixels, if measured.
    pub measured_height: Option<f64>,
}

/// Explicit height to apply to the children container.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "px")]
pub enum HeightStyle {
    /// No explicit height; intrinsic layout applies.
    Auto,
    /// Fixed height in pixels with overflow clipped.
    Fixed(f64),
}

/// What the host should do with the click event on a category header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickDisposition {
    /// Suppress link navigation; a toggle is pending (or was cancelled).
    PreventDefault,
    /// The category is not collapsible; nothing happened.
    Ignored,
}

/// Options shared by all controllers of one sidebar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollapseOptions {
    /// When false, categories stay expanded and ignore clicks.
    pub collapsible: bool,
    /// Debounce delay between click and toggle.
    pub toggle_delay: Duration,
}

impl Default for CollapseOptions {
    fn default() -> Self {
        Self {
            collapsible: true,
            toggle_delay: DEFAULT_TOGGLE_DELAY,
        }
    }
}

/// Expand/collapse controller for one category node.
#[derive(Debug)]
pub struct CollapseController {
    phase: CollapsePhase,
    measured_height: Option<f64>,
    was_active: bool,
    pending_toggle: Option<Instant>,
    options: CollapseOptions,
}

impl CollapseController {
    /// Create the controller when its category first mounts.
    ///
    /// Active categories always start expanded; `initially_collapsed` only
    /// applies to inactive ones.
    #[must_use]
    pub fn new(initially_collapsed: bool, is_active: bool, options: CollapseOptions) -> Self {
        let collapsed = options.collapsible && initially_collapsed && !is_active;
        Self {
            phase: if collapsed {
                CollapsePhase::Collapsed
            } else {
                CollapsePhase::Expanded
            },
            measured_height: None,
            was_active: is_active,
            pending_toggle: None,
            options,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> CollapsePhase {
        self.phase
    }

    /// Snapshot of the collapse state.
    #[must_use]
    pub fn state(&self) -> CollapseState {
        CollapseState {
            collapsed: self.is_collapsed(),
            measured_height: self.measured_height,
        }
    }

    /// Whether the category is collapsed or on its way there.
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        matches!(
            self.phase,
            CollapsePhase::Collapsed | CollapsePhase::Transitioning(Direction::Closing)
        )
    }

    /// Whether children should be mounted.
    ///
    /// Children stay mounted while closing so the transition has content to
    /// collapse against; they unmount only once fully collapsed.
    #[must_use]
    pub fn children_mounted(&self) -> bool {
        self.phase != CollapsePhase::Collapsed
    }

    /// Whether a debounced toggle is waiting to fire.
    #[must_use]
    pub fn has_pending_toggle(&self) -> bool {
        self.pending_toggle.is_some()
    }

    /// Deadline of the pending toggle, if any.
    #[must_use]
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.pending_toggle
    }

    /// Height the children container should have right now.
    #[must_use]
    pub fn height_style(&self) -> HeightStyle {
        match self.phase {
            CollapsePhase::Transitioning(Direction::Closing) => HeightStyle::Fixed(0.0),
            CollapsePhase::Transitioning(Direction::Opening) => {
                self.measured_height.map_or(HeightStyle::Auto, HeightStyle::Fixed)
            }
            // Pin the expanded height while a close is pending so the closing
            // transition starts from a concrete value.
            CollapsePhase::Expanded if self.pending_toggle.is_some() => {
                self.measured_height.map_or(HeightStyle::Auto, HeightStyle::Fixed)
            }
            CollapsePhase::Expanded | CollapsePhase::Collapsed => HeightStyle::Auto,
        }
    }

    /// Handle a click on the category header.
    ///
    /// Measures the content height first if it is not cached yet, then
    /// schedules the toggle `toggle_delay` after `now`. A second click while
    /// the first toggle is still pending cancels it.
    pub fn click<F>(&mut self, now: Instant, measure: F) -> ClickDisposition
    where
        F: FnOnce() -> Option<f64>,
    {
        if !self.options.collapsible {
            return ClickDisposition::Ignored;
        }

        if self.measured_height.is_none() {
            self.measured_height = valid_height(measure());
            if self.measured_height.is_none() {
                tracing::debug!("Content height not available, will measure on next open");
            }
        }

        if self.pending_toggle.take().is_some() {
            tracing::debug!("Pending toggle cancelled by repeated click");
        } else {
            self.pending_toggle = Some(now + self.options.toggle_delay);
            tracing::debug!(phase = ?self.phase, "Toggle scheduled");
        }

        ClickDisposition::PreventDefault
    }

    /// Fire the pending toggle if its deadline has passed.
    ///
    /// Returns `true` if the phase changed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.pending_toggle {
            Some(deadline) if deadline <= now => {
                self.pending_toggle = None;
                self.toggle();
                true
            }
            _ => false,
        }
    }

    /// Handle the end of a height transition.
    ///
    /// Returns `true` if the phase changed. Signals outside a transition are ignored.
    pub fn transition_end(&mut self) -> bool {
        match self.phase {
            CollapsePhase::Transitioning(Direction::Opening) => {
                self.phase = CollapsePhase::Expanded;
                true
            }
            CollapsePhase::Transitioning(Direction::Closing) => {
                self.phase = CollapsePhase::Collapsed;
                true
            }
            CollapsePhase::Expanded | CollapsePhase::Collapsed => false,
        }
    }

    /// Feed the active flag computed for the current render.
    ///
    /// Expands the category only on a false-to-true edge. A category the user
    /// collapsed while it stays active is left alone.
    ///
    /// Returns `true` if the phase changed.
    pub fn sync_active(&mut self, is_active: bool) -> bool {
        let became_active = is_active && !self.was_active;
        self.was_active = is_active;

        if became_active && self.is_collapsed() {
            self.phase = CollapsePhase::Expanded;
            self.pending_toggle = None;
            tracing::debug!("Category expanded after becoming active");
            return true;
        }
        false
    }

    /// Drop the cached content height so the next open re-measures.
    pub fn invalidate_measurement(&mut self) {
        self.measured_height = None;
    }

    fn toggle(&mut self) {
        let next = match self.phase {
            // No height to animate from or towards; no transition-end would
            // ever arrive, so jump straight to the resting state.
            _ if self.measured_height.is_none() => {
                if self.is_collapsed() {
                    CollapsePhase::Expanded
                } else {
                    CollapsePhase::Collapsed
                }
            }
            CollapsePhase::Collapsed | CollapsePhase::Transitioning(Direction::Closing) => {
                CollapsePhase::Transitioning(Direction::Opening)
            }
            CollapsePhase::Expanded | CollapsePhase::Transitioning(Direction::Opening) => {
                CollapsePhase::Transitioning(Direction::Closing)
            }
        };
        tracing::debug!(from = ?self.phase, to = ?next, "Category toggled");
        self.phase = next;
    }
}

fn valid_height(height: Option<f64>) -> Option<f64> {
    height.filter(|h| h.is_finite() && *h > 0.0)
}
