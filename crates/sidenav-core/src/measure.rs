//! Content height measurement.
//!
//! Opening a category animates towards the height of its children. Hosts
//! with a live layout report the real height; [`RowHeightMeasure`] estimates
//! it when there is none.

use crate::tree::{CategoryNode, NodePath};

/// Default row height in pixels used by [`RowHeightMeasure`].
pub const DEFAULT_ROW_HEIGHT: f64 = 36.0;

/// Measures the rendered height of a category's children.
pub trait ContentMeasure {
    /// Height in pixels of the children container of `category` at `path`.
    ///
    /// Returns `None` when the content is not laid out yet.
    fn content_height(&self, path: &NodePath, category: &CategoryNode) -> Option<f64>;
}

impl<F> ContentMeasure for F
where
    F: Fn(&NodePath, &CategoryNode) -> Option<f64>,
{
    fn content_height(&self, path: &NodePath, category: &CategoryNode) -> Option<f64> {
        self(path, category)
    }
}

/// Estimates height as one fixed-height row per direct child.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowHeightMeasure {
    row_height: f64,
}

impl RowHeightMeasure {
    /// Create an estimator with the given row height in pixels.
    #[must_use]
    pub fn new(row_height: f64) -> Self {
        Self { row_height }
    }
}

impl Default for RowHeightMeasure {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_HEIGHT)
    }
}

impl ContentMeasure for RowHeightMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn content_height(&self, _path: &NodePath, category: &CategoryNode) -> Option<f64> {
        let rows = category.children.len();
        (rows > 0).then(|| rows as f64 * self.row_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNode;

    fn category(children: Vec<TreeNode>) -> CategoryNode {
        CategoryNode {
            label: "Guides".to_owned(),
            children,
            initially_collapsed: true,
        }
    }

    #[test]
    fn test_row_height_counts_direct_children() {
        let measure = RowHeightMeasure::new(30.0);
        let node = category(vec![
            TreeNode::link("A", "/a"),
            TreeNode::category("B", vec![TreeNode::link("C", "/c")], true),
        ]);

        assert_eq!(
            measure.content_height(&NodePath::root(0), &node),
            Some(60.0)
        );
    }

    #[test]
    fn test_row_height_empty_is_unmeasured() {
        let measure = RowHeightMeasure::default();

        assert_eq!(measure.content_height(&NodePath::root(0), &category(Vec::new())), None);
    }

    #[test]
    fn test_closure_measure() {
        let measure = |_: &NodePath, _: &CategoryNode| Some(12.5);

        assert_eq!(
            measure.content_height(&NodePath::root(0), &category(Vec::new())),
            Some(12.5)
        );
    }
}
