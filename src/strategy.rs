//! Rebalancing strategies. `Baseline` performs no work beyond the
//! tree/arena primitives; `Splay` additionally splays every touched node
//! to the root, trading a constant-factor cost per operation for
//! amortized `O(log n)` behaviour regardless of access pattern.
//!
//! Both are zero-sized marker types implementing the same trait, so the
//! façade monomorphises per strategy instead of going through `dyn`.

use crate::arena::NodeId;
use crate::tree::Tree;

/// A compile-time-selected rebalancing policy.
///
/// Every method takes the tree handle directly rather than a node-algebra
/// walker: a strategy's whole job is deciding *when* to rebalance around
/// the primitives `Tree` already provides, not reimplementing them.
pub trait Strategy<T>: Sized {
    fn node_at_index(tree: &mut Tree<T>, k: usize) -> NodeId {
        tree.node_at_index(k)
    }

    fn emplace_front(tree: &mut Tree<T>, data: T) -> NodeId {
        tree.insert_at(0, data)
    }

    fn emplace_back(tree: &mut Tree<T>, data: T) -> NodeId {
        let len = tree.len();
        tree.insert_at(len, data)
    }

    fn emplace_before(tree: &mut Tree<T>, at: NodeId, data: T) -> NodeId {
        let k = tree.index_of(at);
        tree.insert_at(k, data)
    }

    /// Inserts `data`, in order, starting at ordinal `at`.
    fn insert_nodes_before<I: IntoIterator<Item = T>>(tree: &mut Tree<T>, at: usize, data: I) {
        let mut k = at;
        for item in data {
            tree.insert_at(k, item);
            k += 1;
        }
    }

    fn erase_node(tree: &mut Tree<T>, n: NodeId) -> T {
        tree.erase(n)
    }

    fn erase_front(tree: &mut Tree<T>) -> Option<T> {
        let n = tree.first?;
        Some(Self::erase_node(tree, n))
    }

    fn erase_back(tree: &mut Tree<T>) -> Option<T> {
        let n = tree.last?;
        Some(Self::erase_node(tree, n))
    }

    /// Erases the half-open ordinal range `[begin, end)`, returning the
    /// removed values in order. The range is bracketed into a single
    /// detachable subtree and torn down in one pass, so the cost is
    /// proportional to the number of elements erased and the height of
    /// the tree, not to the number of elements erased times the height.
    fn erase_nodes_between(tree: &mut Tree<T>, begin: usize, end: usize) -> Vec<T> {
        let range = tree.detach_range(
            begin,
            end,
            |t, n| t.rotate_up_to(n, None),
            |t, n, top| t.rotate_up_to(n, Some(top)),
        );
        range.into_values_in_order()
    }
}

/// No rebalancing: a plain unbalanced binary search tree ordered by
/// ordinal position. Worst case degenerates to a linked list (e.g. after
/// only ever pushing to one end), but pays no splay overhead when the
/// access pattern is already well-behaved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Baseline;

impl<T> Strategy<T> for Baseline {}

/// Every access or structural change splays the touched node to the
/// root. Amortized `O(log n)` per operation for any access sequence, at
/// the cost of restructuring the tree on every read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Splay;

impl<T> Strategy<T> for Splay {
    fn node_at_index(tree: &mut Tree<T>, k: usize) -> NodeId {
        let n = tree.node_at_index(k);
        tree.splay(n, None);
        n
    }

    fn emplace_front(tree: &mut Tree<T>, data: T) -> NodeId {
        let n = tree.insert_at(0, data);
        tree.splay(n, None);
        n
    }

    fn emplace_back(tree: &mut Tree<T>, data: T) -> NodeId {
        let len = tree.len();
        let n = tree.insert_at(len, data);
        tree.splay(n, None);
        n
    }

    fn emplace_before(tree: &mut Tree<T>, at: NodeId, data: T) -> NodeId {
        tree.splay(at, None);
        let k = tree.index_of(at);
        let n = tree.insert_at(k, data);
        tree.splay(n, None);
        n
    }

    /// As in baseline, but splay the tail of the inserted run when
    /// finished.
    fn insert_nodes_before<I: IntoIterator<Item = T>>(tree: &mut Tree<T>, at: usize, data: I) {
        let mut k = at;
        let mut tail = None;
        for item in data {
            tail = Some(tree.insert_at(k, item));
            k += 1;
        }
        if let Some(n) = tail {
            tree.splay(n, None);
        }
    }

    fn erase_front(tree: &mut Tree<T>) -> Option<T> {
        let n = tree.first?;
        tree.splay(n, None);
        Some(tree.erase(n))
    }

    fn erase_back(tree: &mut Tree<T>) -> Option<T> {
        let n = tree.last?;
        tree.splay(n, None);
        Some(tree.erase(n))
    }

    /// Unlike `erase_front`/`erase_back`, which splay the target to the
    /// root before removing it, this erases first and then splays
    /// whichever node `erase` identifies as needing its size refreshed:
    /// that node is the point of structural disturbance left behind by
    /// the removal, and is what benefits from being brought to the root.
    fn erase_node(tree: &mut Tree<T>, n: NodeId) -> T {
        let (value, refresh_from) = tree.erase_reporting_refresh(n);
        if let Some(r) = refresh_from {
            tree.splay(r, None);
        }
        value
    }

    fn erase_nodes_between(tree: &mut Tree<T>, begin: usize, end: usize) -> Vec<T> {
        let range = tree.detach_range(
            begin,
            end,
            |t, n| t.splay(n, None),
            |t, n, top| t.splay(n, Some(top)),
        );
        range.into_values_in_order()
    }
}
