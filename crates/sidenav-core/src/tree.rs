//! Sidebar tree model.
//!
//! The tree is produced by the static site generator and handed to the
//! sidebar as JSON. Parsing goes through a permissive raw representation and
//! is then validated into [`TreeNode`] values, so every consumer can match
//! exhaustively on `Link` / `Category` without re-checking shapes.
//!
//! # Input Format
//!
//! ```json
//! [
//!   {
//!     "type": "category",
//!     "label": "Guides",
//!     "collapsed": true,
//!     "items": [
//!       { "type": "link", "label": "Intro", "href": "/docs/intro" },
//!       { "type": "link", "label": "Setup", "href": "/docs/setup", "customProps": { "tag": "new" } }
//!     ]
//!   }
//! ]
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum category nesting accepted from the generator.
pub const MAX_DEPTH: usize = 64;

/// Error produced while building a tree from generator output.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Input is not valid sidebar JSON.
    #[error("invalid sidebar JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// A node has an empty label.
    #[error("node at {position} has no label")]
    MissingLabel {
        /// Position of the offending node.
        position: NodePath,
    },
    /// A link has an empty href.
    #[error("link at {position} has no target")]
    MissingTarget {
        /// Position of the offending node.
        position: NodePath,
    },
    /// Categories are nested deeper than [`MAX_DEPTH`].
    #[error("node at {position} exceeds maximum nesting depth of {limit}")]
    TooDeep {
        /// Position of the offending node.
        position: NodePath,
        /// Configured depth limit.
        limit: usize,
    },
}

/// Position of a node in the tree as a sequence of child indices.
///
/// `[0, 2]` addresses the third child of the first top-level node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// Path of the top-level node at `index`.
    #[must_use]
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    /// Path of this node's child at `index`.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Self(indices)
    }

    /// Child indices from the top level down.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Nesting depth (1 for top-level nodes).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
        }
        f.write_str("]")
    }
}

/// Leaf node pointing at a navigable destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LinkNode {
    /// Display label.
    pub label: String,
    /// Destination path or URL.
    pub target: String,
    /// Badge labels rendered beside the link label.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

/// Node grouping child nodes under a togglable header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    /// Display label.
    pub label: String,
    /// Child nodes in display order.
    pub children: Vec<TreeNode>,
    /// Whether the category starts collapsed when it is not active.
    pub initially_collapsed: bool,
}

/// Sidebar tree node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    /// Navigable leaf.
    Link(LinkNode),
    /// Group of child nodes.
    Category(CategoryNode),
}

impl TreeNode {
    /// Create a link node without tags.
    #[must_use]
    pub fn link(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Link(LinkNode {
            label: label.into(),
            target: target.into(),
            tags: BTreeSet::new(),
        })
    }

    /// Create a link node carrying badge tags.
    #[must_use]
    pub fn tagged_link<I, S>(label: impl Into<String>, target: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Link(LinkNode {
            label: label.into(),
            target: target.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        })
    }

    /// Create a category node.
    #[must_use]
    pub fn category(
        label: impl Into<String>,
        children: Vec<TreeNode>,
        initially_collapsed: bool,
    ) -> Self {
        Self::Category(CategoryNode {
            label: label.into(),
            children,
            initially_collapsed,
        })
    }

    /// Display label of the node.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Link(link) => &link.label,
            Self::Category(category) => &category.label,
        }
    }
}

/// Validated, immutable sidebar tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tree {
    items: Vec<TreeNode>,
}

impl Tree {
    /// Build a tree from already constructed nodes, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if a label or link target is empty, or if
    /// categories nest deeper than [`MAX_DEPTH`].
    pub fn new(items: Vec<TreeNode>) -> Result<Self, TreeError> {
        validate_items(&items, &NodePath::default())?;
        Ok(Self { items })
    }

    /// Parse and validate generator JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Parse`] for malformed JSON and the validation
    /// errors of [`Tree::new`].
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        let raw: Vec<RawItem> = serde_json::from_str(json)?;
        let items = raw
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.into_node(&NodePath::root(i)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(items)
    }

    /// Top-level nodes in display order.
    #[must_use]
    pub fn items(&self) -> &[TreeNode] {
        &self.items
    }

    /// Look up a node by position.
    #[must_use]
    pub fn get(&self, path: &NodePath) -> Option<&TreeNode> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.items.get(*first)?;
        for &index in rest {
            node = match node {
                TreeNode::Category(category) => category.children.get(index)?,
                TreeNode::Link(_) => return None,
            };
        }
        Some(node)
    }

    /// Summary counts used by diagnostics.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        fn walk(nodes: &[TreeNode], depth: usize, stats: &mut TreeStats) {
            for node in nodes {
                stats.max_depth = stats.max_depth.max(depth);
                match node {
                    TreeNode::Link(_) => stats.links += 1,
                    TreeNode::Category(category) if category.children.is_empty() => {
                        stats.categories += 1;
                        stats.empty_categories += 1;
                    }
                    TreeNode::Category(category) => {
                        stats.categories += 1;
                        walk(&category.children, depth + 1, stats);
                    }
                }
            }
        }

        let mut stats = TreeStats::default();
        walk(&self.items, 1, &mut stats);
        stats
    }
}

/// Node counts for a [`Tree`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Number of link nodes.
    pub links: usize,
    /// Number of category nodes.
    pub categories: usize,
    /// Categories without children (rendered as nothing).
    pub empty_categories: usize,
    /// Deepest nesting level.
    pub max_depth: usize,
}

fn validate_items(items: &[TreeNode], parent: &NodePath) -> Result<(), TreeError> {
    for (i, node) in items.iter().enumerate() {
        let position = parent.child(i);
        if position.depth() > MAX_DEPTH {
            return Err(TreeError::TooDeep {
                position,
                limit: MAX_DEPTH,
            });
        }
        if node.label().trim().is_empty() {
            return Err(TreeError::MissingLabel { position });
        }
        match node {
            TreeNode::Link(link) => {
                if link.target.trim().is_empty() {
                    return Err(TreeError::MissingTarget { position });
                }
            }
            TreeNode::Category(category) => validate_items(&category.children, &position)?,
        }
    }
    Ok(())
}

/// Generator item as it appears on the wire.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawItem {
    Link {
        #[serde(default)]
        label: String,
        #[serde(default)]
        href: String,
        #[serde(default, rename = "customProps")]
        custom_props: Option<RawCustomProps>,
    },
    Category {
        #[serde(default)]
        label: String,
        #[serde(default)]
        items: Vec<RawItem>,
        #[serde(default = "default_collapsed")]
        collapsed: bool,
    },
}

#[derive(Deserialize, Default)]
struct RawCustomProps {
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

fn default_collapsed() -> bool {
    true
}

impl RawItem {
    fn into_node(self, position: &NodePath) -> Result<TreeNode, TreeError> {
        // Depth is checked while converting so hostile nesting fails before recursing further.
        if position.depth() > MAX_DEPTH {
            return Err(TreeError::TooDeep {
                position: position.clone(),
                limit: MAX_DEPTH,
            });
        }
        match self {
            Self::Link {
                label,
                href,
                custom_props,
            } => {
                let props = custom_props.unwrap_or_default();
                let tags = props
                    .tag
                    .into_iter()
                    .chain(props.tags)
                    .filter(|tag| !tag.trim().is_empty())
                    .collect();
                Ok(TreeNode::Link(LinkNode {
                    label,
                    target: href,
                    tags,
                }))
            }
            Self::Category {
                label,
                items,
                collapsed,
            } => {
                let children = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| item.into_node(&position.child(i)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TreeNode::Category(CategoryNode {
                    label,
                    children,
                    initially_collapsed: collapsed,
                }))
            }
        }
    }
}
