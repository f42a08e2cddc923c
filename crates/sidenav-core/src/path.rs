//! Active path matching.
//!
//! Decides which branch of the sidebar corresponds to the page being viewed.
//! Paths that differ only by a trailing `/` are the same page; there is no
//! prefix matching.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::tree::{LinkNode, TreeNode};

/// Matches hrefs with a scheme (`https:`, `mailto:`) or protocol-relative `//host`.
static EXTERNAL_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.\-]*:|//)").expect("valid regex"));

/// Append a trailing `/` unless the path already ends with one.
#[must_use]
pub fn ensure_trailing_slash(path: &str) -> Cow<'_, str> {
    if path.ends_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("{path}/"))
    }
}

/// Whether an href points inside the site.
#[must_use]
pub fn is_internal_url(href: &str) -> bool {
    !href.is_empty() && !EXTERNAL_URL.is_match(href)
}

/// Compare two paths, ignoring a trailing `/`.
#[must_use]
pub fn is_same_path(a: &str, b: &str) -> bool {
    ensure_trailing_slash(a) == ensure_trailing_slash(b)
}

/// The path currently being viewed, stored in canonical form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActivePath(String);

impl ActivePath {
    /// Canonicalize a viewed path.
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self(ensure_trailing_slash(path).into_owned())
    }

    /// Canonical path with a trailing `/`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a link points at this path.
    #[must_use]
    pub fn matches(&self, link: &LinkNode) -> bool {
        ensure_trailing_slash(&link.target) == self.0
    }
}

impl From<&str> for ActivePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for ActivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `node`, or any node below it, is the page being viewed.
///
/// Evaluated fresh on every render; results are never cached across a path change.
#[must_use]
pub fn is_active(node: &TreeNode, active: &ActivePath) -> bool {
    match node {
        TreeNode::Link(link) => active.matches(link),
        TreeNode::Category(category) => category
            .children
            .iter()
            .any(|child| is_active(child, active)),
    }
}
