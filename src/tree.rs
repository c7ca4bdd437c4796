//! Associative merge tree (segment tree)
//!
//! An array-backed complete binary tree over a fixed number of leaves.
//! Node `1` is the root and node `i` has children `2i` and `2i + 1`;
//! slot `0` is unused. Every internal node stores the merge of its two
//! children, so any contiguous range folds from O(log n) stored nodes.
//!
//! The merge operation is a strategy type implementing [`Merge`]. It must be
//! associative and `identity()` must be neutral on both sides. Commutativity
//! is not required: folds always run left to right.
//!
//! ```rust
//! use segwin::tree::{MergeTree, Max, Sum};
//!
//! let mut sums = MergeTree::<Sum>::new(&[1.0, 2.0, 3.0, 4.0]).unwrap();
//! assert_eq!(sums.query(1, 2).unwrap(), 5.0);
//!
//! sums.update(2, 10.0).unwrap();
//! assert_eq!(sums.query(0, 3).unwrap(), 17.0);
//!
//! let maxima = MergeTree::<Max>::new(&[3.0, -1.0, 7.0]).unwrap();
//! assert_eq!(maxima.total(), 7.0);
//! ```

use crate::error::TreeError;

/// Associative merge strategy with an identity element.
pub trait Merge {
    /// Value domain of the tree.
    type Value: Clone;

    /// Neutral element: `merge(x, identity) == merge(identity, x) == x`.
    fn identity() -> Self::Value;

    /// Combine two adjacent aggregates, `left` covering the earlier leaves.
    fn merge(left: &Self::Value, right: &Self::Value) -> Self::Value;
}

/// Running total. Identity `0.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

impl Merge for Sum {
    type Value = f64;

    fn identity() -> f64 {
        0.0
    }

    fn merge(left: &f64, right: &f64) -> f64 {
        left + right
    }
}

/// Maximum. Identity `-inf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Max;

impl Merge for Max {
    type Value = f64;

    fn identity() -> f64 {
        f64::NEG_INFINITY
    }

    fn merge(left: &f64, right: &f64) -> f64 {
        left.max(*right)
    }
}

/// Minimum. Identity `+inf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Min;

impl Merge for Min {
    type Value = f64;

    fn identity() -> f64 {
        f64::INFINITY
    }

    fn merge(left: &f64, right: &f64) -> f64 {
        left.min(*right)
    }
}

/// Segment tree over `len` leaves, parameterized by a [`Merge`] strategy.
#[derive(Debug, Clone)]
pub struct MergeTree<M: Merge> {
    /// Number of leaves.
    len: usize,
    /// Implicit binary layout, `4 * len` slots, 1-indexed.
    nodes: Vec<M::Value>,
}

impl<M: Merge> MergeTree<M> {
    /// Build a tree whose leaves are `data`, in O(n).
    pub fn new(data: &[M::Value]) -> Result<Self, TreeError> {
        if data.is_empty() {
            return Err(TreeError::Empty);
        }

        let len = data.len();
        let mut tree = Self {
            len,
            nodes: vec![M::identity(); 4 * len],
        };
        tree.build(data, 1, 0, len - 1);
        Ok(tree)
    }

    /// Build a tree with `len` leaves all set to `value`.
    pub fn filled(len: usize, value: M::Value) -> Result<Self, TreeError> {
        Self::new(&vec![value; len])
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: trees have at least one leaf.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Aggregate over every leaf (the root).
    pub fn total(&self) -> M::Value {
        self.nodes[1].clone()
    }

    /// Current value of leaf `index`.
    pub fn get(&self, index: usize) -> Option<M::Value> {
        if index >= self.len {
            return None;
        }

        let (mut node, mut start, mut end) = (1, 0, self.len - 1);
        while start != end {
            let mid = start + (end - start) / 2;
            if index <= mid {
                node *= 2;
                end = mid;
            } else {
                node = 2 * node + 1;
                start = mid + 1;
            }
        }
        Some(self.nodes[node].clone())
    }

    /// Replace leaf `index` with `value` and repair its ancestors, in O(log n).
    pub fn update(&mut self, index: usize, value: M::Value) -> Result<(), TreeError> {
        if index >= self.len {
            return Err(TreeError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }

        self.update_node(1, 0, self.len - 1, index, value);
        Ok(())
    }

    /// Fold of leaves `low..=high`, in O(log n).
    pub fn query(&self, low: usize, high: usize) -> Result<M::Value, TreeError> {
        if low > high || high >= self.len {
            return Err(TreeError::InvalidRange {
                low,
                high,
                len: self.len,
            });
        }

        Ok(self.query_node(1, 0, self.len - 1, low, high))
    }

    fn build(&mut self, data: &[M::Value], node: usize, start: usize, end: usize) {
        if start == end {
            self.nodes[node] = data[start].clone();
            return;
        }

        let mid = start + (end - start) / 2;
        self.build(data, 2 * node, start, mid);
        self.build(data, 2 * node + 1, mid + 1, end);
        self.pull(node);
    }

    fn update_node(
        &mut self,
        node: usize,
        start: usize,
        end: usize,
        index: usize,
        value: M::Value,
    ) {
        if start == end {
            self.nodes[node] = value;
            return;
        }

        let mid = start + (end - start) / 2;
        if index <= mid {
            self.update_node(2 * node, start, mid, index, value);
        } else {
            self.update_node(2 * node + 1, mid + 1, end, index, value);
        }
        self.pull(node);
    }

    fn query_node(
        &self,
        node: usize,
        start: usize,
        end: usize,
        low: usize,
        high: usize,
    ) -> M::Value {
        // Disjoint from the query: contributes nothing
        if high < start || end < low {
            return M::identity();
        }
        // Fully covered: stored aggregate is the answer
        if low <= start && end <= high {
            return self.nodes[node].clone();
        }

        let mid = start + (end - start) / 2;
        let left = self.query_node(2 * node, start, mid, low, high);
        let right = self.query_node(2 * node + 1, mid + 1, end, low, high);
        M::merge(&left, &right)
    }

    /// Recompute an internal node from its children.
    fn pull(&mut self, node: usize) {
        self.nodes[node] = M::merge(&self.nodes[2 * node], &self.nodes[2 * node + 1]);
    }
}
