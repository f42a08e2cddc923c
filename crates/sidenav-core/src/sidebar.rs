//! Sidebar composition.
//!
//! [`SidebarTree`] pairs the immutable generator [`Tree`] with a mirror of
//! mounted per-node state. Every category that is currently mounted owns its
//! own [`CollapseController`]; unmounting a category (collapsing it fully,
//! replacing the tree) drops the state of everything below it. Lookups are
//! always by [`NodePath`], walked in lockstep through both trees.
//!
//! All events are applied synchronously. Time is passed in explicitly so the
//! host decides when debounced toggles fire (see [`SidebarTree::next_deadline`]).
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use sidenav_core::{
//!     BodyScrollLock, NodePath, RowHeightMeasure, SidebarOptions, SidebarTree, Tree, TreeNode,
//! };
//!
//! let tree = Tree::new(vec![TreeNode::category(
//!     "Guides",
//!     vec![TreeNode::link("Intro", "/docs/intro"), TreeNode::link("Setup", "/docs/setup")],
//!     true,
//! )])?;
//! let mut sidebar = SidebarTree::new(
//!     tree,
//!     "/docs/setup/",
//!     SidebarOptions::default(),
//!     BodyScrollLock::new(),
//!     Some(1280),
//! );
//!
//! let view = sidebar.render();
//! assert_eq!(view.items.len(), 1);
//!
//! sidebar.click_category(&NodePath::root(0), Instant::now(), &RowHeightMeasure::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Instant;

use serde::Serialize;

use crate::collapse::{
    ClickDisposition, CollapseController, CollapseOptions, CollapsePhase, CollapseState,
    HeightStyle,
};
use crate::measure::ContentMeasure;
use crate::overlay::{BodyScrollLock, OverlayController, OverlayState};
use crate::path::{ActivePath, ensure_trailing_slash, is_active, is_internal_url};
use crate::tree::{CategoryNode, NodePath, Tree, TreeNode};
use crate::viewport::{DEFAULT_BREAKPOINT, ViewportClass, ViewportObserver, ViewportReceiver};

/// Size of the overlay toggle icon in pixels.
pub const TOGGLE_ICON_SIZE: u32 = 24;

/// Error for events addressing a node the current render does not contain.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SidebarError {
    /// No node exists at the path.
    #[error("no sidebar node at {0}")]
    UnknownNode(NodePath),
    /// The node exists but is not a category.
    #[error("sidebar node at {0} is not a category")]
    NotACategory(NodePath),
    /// The node exists but is not a link.
    #[error("sidebar node at {0} is not a link")]
    NotALink(NodePath),
    /// The node exists but sits inside a collapsed category.
    #[error("sidebar node at {0} is not mounted")]
    NotMounted(NodePath),
}

/// Sidebar-wide options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SidebarOptions {
    /// Collapse behavior shared by all categories.
    pub collapse: CollapseOptions,
    /// Width in pixels above which the viewport counts as desktop.
    pub breakpoint: u32,
}

impl Default for SidebarOptions {
    fn default() -> Self {
        Self {
            collapse: CollapseOptions::default(),
            breakpoint: DEFAULT_BREAKPOINT,
        }
    }
}

/// Request for the routing layer produced by a link click.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavigationRequest {
    /// Destination to navigate to.
    pub href: String,
    /// Whether the destination is outside the site.
    pub external: bool,
}

/// Mounted state mirroring one [`TreeNode`].
#[derive(Debug)]
enum Mounted {
    Link,
    /// Category without children; renders nothing and owns no state.
    Empty,
    Category {
        controller: CollapseController,
        children: Option<Vec<Mounted>>,
    },
}

impl Mounted {
    fn mount(node: &TreeNode, active: &ActivePath, options: CollapseOptions) -> Self {
        match node {
            TreeNode::Link(_) => Self::Link,
            TreeNode::Category(category) if category.children.is_empty() => Self::Empty,
            TreeNode::Category(category) => {
                let controller = CollapseController::new(
                    category.initially_collapsed,
                    is_active(node, active),
                    options,
                );
                let children = controller
                    .children_mounted()
                    .then(|| mount_all(&category.children, active, options));
                Self::Category {
                    controller,
                    children,
                }
            }
        }
    }
}

fn mount_all(nodes: &[TreeNode], active: &ActivePath, options: CollapseOptions) -> Vec<Mounted> {
    nodes
        .iter()
        .map(|node| Mounted::mount(node, active, options))
        .collect()
}

/// Mount or unmount children to match the controller's phase.
fn reconcile(
    category: &CategoryNode,
    controller: &CollapseController,
    children: &mut Option<Vec<Mounted>>,
    active: &ActivePath,
    options: CollapseOptions,
) {
    match (controller.children_mounted(), children.is_some()) {
        (true, false) => *children = Some(mount_all(&category.children, active, options)),
        (false, true) => *children = None,
        _ => {}
    }
}

/// Re-evaluate active flags top-down after a path change.
fn sync_all(
    nodes: &[TreeNode],
    mounted: &mut [Mounted],
    active: &ActivePath,
    options: CollapseOptions,
) {
    for (node, slot) in nodes.iter().zip(mounted.iter_mut()) {
        let (TreeNode::Category(category), Mounted::Category { controller, children }) = (node, slot)
        else {
            continue;
        };
        controller.sync_active(is_active(node, active));
        reconcile(category, controller, children, active, options);
        if let Some(children) = children {
            sync_all(&category.children, children, active, options);
        }
    }
}

/// Fire due toggles everywhere; returns whether anything changed.
fn fire_all(
    nodes: &[TreeNode],
    mounted: &mut [Mounted],
    now: Instant,
    active: &ActivePath,
    options: CollapseOptions,
) -> bool {
    let mut changed = false;
    for (node, slot) in nodes.iter().zip(mounted.iter_mut()) {
        let (TreeNode::Category(category), Mounted::Category { controller, children }) = (node, slot)
        else {
            continue;
        };
        changed |= controller.fire_due(now);
        reconcile(category, controller, children, active, options);
        if let Some(children) = children {
            changed |= fire_all(&category.children, children, now, active, options);
        }
    }
    changed
}

fn earliest_deadline(mounted: &[Mounted]) -> Option<Instant> {
    mounted
        .iter()
        .filter_map(|slot| match slot {
            Mounted::Category {
                controller,
                children,
            } => {
                let below = children.as_deref().and_then(earliest_deadline);
                match (controller.pending_deadline(), below) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                }
            }
            Mounted::Link | Mounted::Empty => None,
        })
        .min()
}

fn invalidate_all(mounted: &mut [Mounted]) {
    for slot in mounted {
        if let Mounted::Category {
            controller,
            children,
        } = slot
        {
            controller.invalidate_measurement();
            if let Some(children) = children {
                invalidate_all(children);
            }
        }
    }
}

/// Walk tree and mounted state in lockstep to the node at `path`.
fn locate<'t, 'm>(
    nodes: &'t [TreeNode],
    mounted: &'m mut [Mounted],
    path: &NodePath,
) -> Result<(&'t TreeNode, &'m mut Mounted), SidebarError> {
    let unknown = || SidebarError::UnknownNode(path.clone());
    let (&first, rest) = path.indices().split_first().ok_or_else(unknown)?;
    let mut node = nodes.get(first).ok_or_else(unknown)?;
    let mut slot = mounted.get_mut(first).ok_or_else(unknown)?;

    for &index in rest {
        let TreeNode::Category(category) = node else {
            return Err(unknown());
        };
        let child = category.children.get(index).ok_or_else(unknown)?;
        slot = match slot {
            Mounted::Category {
                children: Some(children),
                ..
            } => children.get_mut(index).ok_or_else(unknown)?,
            Mounted::Category { children: None, .. } => {
                return Err(SidebarError::NotMounted(path.clone()));
            }
            Mounted::Link | Mounted::Empty => return Err(unknown()),
        };
        node = child;
    }
    Ok((node, slot))
}

/// Read-only variant of [`locate`].
fn locate_ref<'t, 'm>(
    nodes: &'t [TreeNode],
    mounted: &'m [Mounted],
    path: &NodePath,
) -> Result<(&'t TreeNode, &'m Mounted), SidebarError> {
    let unknown = || SidebarError::UnknownNode(path.clone());
    let (&first, rest) = path.indices().split_first().ok_or_else(unknown)?;
    let mut node = nodes.get(first).ok_or_else(unknown)?;
    let mut slot = mounted.get(first).ok_or_else(unknown)?;

    for &index in rest {
        let TreeNode::Category(category) = node else {
            return Err(unknown());
        };
        node = category.children.get(index).ok_or_else(unknown)?;
        slot = match slot {
            Mounted::Category {
                children: Some(children),
                ..
            } => children.get(index).ok_or_else(unknown)?,
            Mounted::Category { children: None, .. } => {
                return Err(SidebarError::NotMounted(path.clone()));
            }
            Mounted::Link | Mounted::Empty => return Err(unknown()),
        };
    }
    Ok((node, slot))
}

/// Interactive sidebar: tree, per-node state, overlay and viewport.
pub struct SidebarTree {
    tree: Tree,
    active: ActivePath,
    mounted: Vec<Mounted>,
    overlay: OverlayController,
    viewport: ViewportObserver,
    options: SidebarOptions,
}

impl SidebarTree {
    /// Mount a sidebar for the page at `active_path`.
    ///
    /// `initial_width` is the measured window width, or `None` when there is
    /// no layout (the viewport then counts as desktop).
    #[must_use]
    pub fn new(
        tree: Tree,
        active_path: &str,
        options: SidebarOptions,
        scroll_lock: BodyScrollLock,
        initial_width: Option<u32>,
    ) -> Self {
        let active = ActivePath::new(active_path);
        let mounted = mount_all(tree.items(), &active, options.collapse);
        Self {
            tree,
            active,
            mounted,
            overlay: OverlayController::new(scroll_lock),
            viewport: ViewportObserver::new(options.breakpoint, initial_width),
            options,
        }
    }

    /// The generator tree being displayed.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The page being viewed.
    #[must_use]
    pub fn active_path(&self) -> &ActivePath {
        &self.active
    }

    /// Current overlay state.
    #[must_use]
    pub fn overlay_state(&self) -> OverlayState {
        self.overlay.state()
    }

    /// Current viewport class.
    #[must_use]
    pub fn viewport_class(&self) -> ViewportClass {
        self.viewport.class()
    }

    /// Subscribe to viewport class changes.
    #[must_use]
    pub fn subscribe_viewport(&mut self) -> ViewportReceiver {
        self.viewport.subscribe()
    }

    /// Collapse state of the mounted category at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SidebarError`] if the path does not address a mounted category.
    pub fn collapse_state(&self, path: &NodePath) -> Result<CollapseState, SidebarError> {
        self.mounted_controller(path).map(CollapseController::state)
    }

    /// Phase of the mounted category at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SidebarError`] if the path does not address a mounted category.
    pub fn phase(&self, path: &NodePath) -> Result<CollapsePhase, SidebarError> {
        self.mounted_controller(path).map(CollapseController::phase)
    }

    /// Change the viewed path (client-side navigation).
    ///
    /// Categories that just became active expand; state of categories the
    /// user collapsed while active is kept.
    pub fn navigate(&mut self, path: &str) {
        let active = ActivePath::new(path);
        if active == self.active {
            return;
        }
        tracing::debug!(from = %self.active, to = %active, "Sidebar navigated");
        self.active = active;
        sync_all(
            self.tree.items(),
            &mut self.mounted,
            &self.active,
            self.options.collapse,
        );
    }

    /// Replace the tree (regenerated content); all per-node state is dropped.
    pub fn replace_tree(&mut self, tree: Tree) {
        self.mounted = mount_all(tree.items(), &self.active, self.options.collapse);
        self.tree = tree;
    }

    /// Handle a click on a category header.
    ///
    /// Measures the children's height if it is not cached yet and schedules
    /// the debounced toggle.
    ///
    /// # Errors
    ///
    /// Returns [`SidebarError`] if the path does not address a mounted category.
    pub fn click_category(
        &mut self,
        path: &NodePath,
        now: Instant,
        measure: &dyn ContentMeasure,
    ) -> Result<ClickDisposition, SidebarError> {
        let (category, controller) = self.controller(path)?;
        Ok(controller.click(now, || measure.content_height(path, category)))
    }

    /// Handle a click on a link.
    ///
    /// Dismisses the overlay and returns the destination for the routing
    /// layer. The active path changes only once the host calls [`navigate`](Self::navigate).
    ///
    /// # Errors
    ///
    /// Returns [`SidebarError`] if the path does not address a mounted link.
    pub fn click_link(&mut self, path: &NodePath) -> Result<NavigationRequest, SidebarError> {
        let (node, _) = locate(self.tree.items(), &mut self.mounted, path)?;
        let TreeNode::Link(link) = node else {
            return Err(SidebarError::NotALink(path.clone()));
        };
        let request = navigation_request(&link.target);
        self.overlay.link_clicked();
        Ok(request)
    }

    /// Handle the end of a height transition on the category at `path`.
    ///
    /// Returns `true` if the phase changed. A fully collapsed category
    /// unmounts its children here.
    ///
    /// # Errors
    ///
    /// Returns [`SidebarError`] if the path does not address a mounted category.
    pub fn transition_end(&mut self, path: &NodePath) -> Result<bool, SidebarError> {
        let (node, slot) = locate(self.tree.items(), &mut self.mounted, path)?;
        let (TreeNode::Category(category), Mounted::Category { controller, children }) = (node, slot)
        else {
            return Err(SidebarError::NotACategory(path.clone()));
        };
        let changed = controller.transition_end();
        reconcile(category, controller, children, &self.active, self.options.collapse);
        Ok(changed)
    }

    /// Fire debounced toggles whose deadline has passed.
    ///
    /// Returns `true` if any category changed phase.
    pub fn tick(&mut self, now: Instant) -> bool {
        fire_all(
            self.tree.items(),
            &mut self.mounted,
            now,
            &self.active,
            self.options.collapse,
        )
    }

    /// Earliest pending toggle deadline, for scheduling the next [`tick`](Self::tick).
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest_deadline(&self.mounted)
    }

    /// Handle a window resize.
    ///
    /// Returns the new class when it changed. Moving to desktop closes the
    /// overlay; any class change drops cached content heights.
    pub fn resize(&mut self, width: Option<u32>) -> Option<ViewportClass> {
        let class = self.viewport.resize(width)?;
        self.overlay.viewport_changed(class);
        invalidate_all(&mut self.mounted);
        Some(class)
    }

    /// Handle a press of the overlay toggle button.
    pub fn toggle_overlay(&mut self) -> OverlayState {
        self.overlay.toggle()
    }

    /// Project the current state into a render tree.
    #[must_use]
    pub fn render(&self) -> RenderedSidebar {
        let open = self.overlay.is_open();
        RenderedSidebar {
            items: render_items(
                self.tree.items(),
                &self.mounted,
                &NodePath::default(),
                &self.active,
                self.options.collapse.collapsible,
                true,
            ),
            overlay: self.overlay.state(),
            viewport: self.viewport.class(),
            toggle_button: ToggleButton::new(open),
        }
    }

    fn mounted_controller(&self, path: &NodePath) -> Result<&CollapseController, SidebarError> {
        match locate_ref(self.tree.items(), &self.mounted, path)? {
            (TreeNode::Category(_), Mounted::Category { controller, .. }) => Ok(controller),
            _ => Err(SidebarError::NotACategory(path.clone())),
        }
    }

    fn controller(
        &mut self,
        path: &NodePath,
    ) -> Result<(&CategoryNode, &mut CollapseController), SidebarError> {
        let (node, slot) = locate(self.tree.items(), &mut self.mounted, path)?;
        match (node, slot) {
            (TreeNode::Category(category), Mounted::Category { controller, .. }) => {
                Ok((category, controller))
            }
            _ => Err(SidebarError::NotACategory(path.clone())),
        }
    }
}

fn navigation_request(target: &str) -> NavigationRequest {
    if is_internal_url(target) {
        NavigationRequest {
            href: ensure_trailing_slash(target).into_owned(),
            external: false,
        }
    } else {
        NavigationRequest {
            href: target.to_owned(),
            external: true,
        }
    }
}

/// Render tree for the whole sidebar.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedSidebar {
    /// Top-level items in input order (empty categories omitted).
    pub items: Vec<RenderedItem>,
    /// Overlay state.
    pub overlay: OverlayState,
    /// Viewport class at render time.
    pub viewport: ViewportClass,
    /// Overlay toggle button.
    pub toggle_button: ToggleButton,
}

/// Rendered sidebar node.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RenderedItem {
    /// Rendered link.
    Link(RenderedLink),
    /// Rendered category.
    Category(RenderedCategory),
}

/// Rendered link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedLink {
    /// Position in the tree.
    pub path: NodePath,
    /// Display label.
    pub label: String,
    /// Destination (internal paths carry a trailing `/`).
    pub href: String,
    /// Whether this link is the page being viewed.
    pub active: bool,
    /// Whether the destination is outside the site.
    pub external: bool,
    /// Badge labels.
    pub tags: Vec<String>,
    /// Whether the link is in the keyboard tab order.
    pub focusable: bool,
}

/// Rendered category.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedCategory {
    /// Position in the tree.
    pub path: NodePath,
    /// Display label.
    pub label: String,
    /// Whether a descendant is the page being viewed.
    pub active: bool,
    /// Whether the header toggles the category.
    pub collapsible: bool,
    /// Collapse phase.
    pub phase: CollapsePhase,
    /// Whether the category is collapsed or collapsing.
    pub collapsed: bool,
    /// Explicit container height.
    pub height: HeightStyle,
    /// Mounted children (empty while fully collapsed).
    pub children: Vec<RenderedItem>,
    /// Whether the header is in the keyboard tab order.
    pub focusable: bool,
}

/// Icon shown on the overlay toggle button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleIcon {
    /// Hamburger menu icon.
    Menu,
    /// Close (×) icon.
    Close,
}

/// Overlay toggle button, positioned by the page shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ToggleButton {
    /// Accessible label.
    pub aria_label: &'static str,
    /// Whether the overlay is open.
    pub expanded: bool,
    /// Icon to show.
    pub icon: ToggleIcon,
    /// Icon size in pixels.
    pub icon_size: u32,
}

impl ToggleButton {
    fn new(open: bool) -> Self {
        Self {
            aria_label: if open { "Close menu" } else { "Open menu" },
            expanded: open,
            icon: if open {
                ToggleIcon::Close
            } else {
                ToggleIcon::Menu
            },
            icon_size: TOGGLE_ICON_SIZE,
        }
    }
}

fn render_items(
    nodes: &[TreeNode],
    mounted: &[Mounted],
    parent: &NodePath,
    active: &ActivePath,
    collapsible: bool,
    focusable: bool,
) -> Vec<RenderedItem> {
    nodes
        .iter()
        .zip(mounted)
        .enumerate()
        .filter_map(|(i, (node, slot))| {
            let path = parent.child(i);
            match (node, slot) {
                (TreeNode::Link(link), _) => {
                    let request = navigation_request(&link.target);
                    Some(RenderedItem::Link(RenderedLink {
                        label: link.label.clone(),
                        href: request.href,
                        active: active.matches(link),
                        external: request.external,
                        tags: link.tags.iter().cloned().collect(),
                        focusable,
                        path,
                    }))
                }
                (
                    TreeNode::Category(category),
                    Mounted::Category {
                        controller,
                        children,
                    },
                ) => {
                    let children = children.as_deref().map_or_else(Vec::new, |children| {
                        render_items(
                            &category.children,
                            children,
                            &path,
                            active,
                            collapsible,
                            focusable && !controller.is_collapsed(),
                        )
                    });
                    Some(RenderedItem::Category(RenderedCategory {
                        label: category.label.clone(),
                        active: is_active(node, active),
                        collapsible,
                        phase: controller.phase(),
                        collapsed: controller.is_collapsed(),
                        height: controller.height_style(),
                        children,
                        focusable,
                        path,
                    }))
                }
                (TreeNode::Category(_), Mounted::Link | Mounted::Empty) => None,
            }
        })
        .collect()
}
