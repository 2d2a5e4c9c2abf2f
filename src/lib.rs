//! `coppice` is an order-statistic sequence container: a deque-like
//! collection addressed by 0-indexed ordinal position, backed by a
//! size-augmented binary tree.
//!
//! Every element can be read, inserted, or removed by its position in
//! logarithmic time, the sequence can be split and rejoined, and the
//! rebalancing policy is chosen at the type level rather than baked in:
//!
//! * [`Baseline`] is a plain unbalanced binary search tree ordered by
//!   position. No rebalancing overhead, but an adversarial access
//!   pattern can degrade it to a linked list.
//! * [`Splay`] (the default) splays every accessed or modified node to
//!   the root, giving amortized `O(log n)` behaviour for any sequence of
//!   operations, including repeated access to the same region.
//!
//! ```
//! use coppice::OrdList;
//!
//! let mut list: OrdList<i32> = OrdList::new();
//! list.push_back(1);
//! list.push_back(2);
//! list.push_front(0);
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
//! ```

mod arena;
mod error;
mod iter;
mod list;
mod strategy;
mod tree;

pub use error::IndexOutOfBounds;
pub use iter::{IntoIter, Iter, IterMut};
pub use list::OrdList;
pub use strategy::{Baseline, Splay, Strategy};
