//! Documentation sidebar navigation state.
//!
//! This crate provides:
//! - [`Tree`]: validated sidebar tree parsed from generator output
//! - [`is_active`]: active branch detection for the viewed path
//! - [`CollapseController`]: per-category expand/collapse state machine
//! - [`ViewportObserver`] and [`OverlayController`]: the mobile overlay with
//!   its background scroll lock
//! - [`SidebarTree`]: composition of the above, projected by [`render_html`]
//! - [`CloudUrl`]: bounded identity polling used by call-to-action links
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sidenav_core::{BodyScrollLock, SidebarOptions, SidebarTree, Tree, render_html};
//!
//! let tree = Tree::from_json(
//!     r#"[{"type": "category", "label": "Guides", "items": [
//!         {"type": "link", "label": "Setup", "href": "/docs/setup"}
//!     ]}]"#,
//! )?;
//! let sidebar = SidebarTree::new(
//!     tree,
//!     "/docs/setup/",
//!     SidebarOptions::default(),
//!     BodyScrollLock::new(),
//!     None,
//! );
//!
//! let html = render_html(&sidebar.render());
//! assert!(html.contains("menu__link--active"));
//! # Ok(())
//! # }
//! ```

mod collapse;
mod html;
mod measure;
mod overlay;
mod path;
mod poll;
mod sidebar;
mod tree;
mod viewport;

pub use collapse::{
    ClickDisposition, CollapseController, CollapseOptions, CollapsePhase, CollapseState,
    DEFAULT_TOGGLE_DELAY, Direction, HeightStyle,
};
pub use html::{escape_html, render_html};
pub use measure::{ContentMeasure, DEFAULT_ROW_HEIGHT, RowHeightMeasure};
pub use overlay::{BodyScrollLock, OverlayController, OverlayState, ScrollLockGuard};
pub use path::{ActivePath, ensure_trailing_slash, is_active, is_internal_url, is_same_path};
pub use poll::{
    BoundedPoll, CloudUrl, DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS, IdentityProvider, PollStatus,
};
pub use sidebar::{
    NavigationRequest, RenderedCategory, RenderedItem, RenderedLink, RenderedSidebar,
    SidebarError, SidebarOptions, SidebarTree, TOGGLE_ICON_SIZE, ToggleButton, ToggleIcon,
};
pub use tree::{CategoryNode, LinkNode, MAX_DEPTH, NodePath, Tree, TreeError, TreeNode, TreeStats};
pub use viewport::{DEFAULT_BREAKPOINT, ViewportClass, ViewportObserver, ViewportReceiver};
