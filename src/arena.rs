//! The node algebra: rank queries, rotations, splay steps, in-place node
//! swap and erase, all expressed over a [`NodeId`]-addressed arena.
//!
//! Every node needs a parent back-reference (for `index_of` and the
//! iterator's random-access arithmetic), which safe Rust cannot express as
//! an actual pointer without either `Rc<RefCell<_>>` everywhere or
//! `unsafe`. Instead, as the source library's own design notes suggest,
//! the tree is realised as a `Vec`-backed slot arena addressed by a small
//! `NodeId` handle; "parent" is just another `NodeId`, non-owning by
//! convention (only children are ever walked downward when freeing a
//! subtree).

use std::fmt;

/// A handle to a node inside an [`Arena`]. Only ever valid for the arena
/// that produced it; the arena never hands one out for a freed slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Side {
    Left,
    Right,
}

pub(crate) struct Node<T> {
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    /// 1 + size(left) + size(right). Stale immediately after a rotation or
    /// splay step; callers refresh explicitly (see `update_size`).
    pub(crate) size: usize,
    pub(crate) data: T,
}

enum Slot<T> {
    Occupied(Node<T>),
    /// Links to the next free slot, forming an intrusive free list.
    Free(Option<usize>),
}

/// The concrete realisation of the "allocator capability": a slot arena
/// with a free list, owned exclusively by one [`crate::tree::Tree`].
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Arena { slots: Vec::new(), free_head: None }
    }

    pub(crate) fn with_capacity(cap: usize) -> Self {
        Arena { slots: Vec::with_capacity(cap), free_head: None }
    }

    pub(crate) fn alloc(&mut self, data: T) -> NodeId {
        let node = Node { parent: None, left: None, right: None, size: 1, data };
        match self.free_head.take() {
            Some(idx) => {
                let next_free = match &self.slots[idx] {
                    Slot::Free(next) => *next,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                self.free_head = next_free;
                self.slots[idx] = Slot::Occupied(node);
                NodeId(idx)
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Removes the node from the arena and hands its `data` back to the
    /// caller. The node's own `parent`/`left`/`right` are not consulted or
    /// touched by anyone else afterwards; callers must have already
    /// spliced it out of the tree.
    pub(crate) fn dealloc(&mut self, id: NodeId) -> T {
        let prev = std::mem::replace(&mut self.slots[id.0], Slot::Free(self.free_head));
        self.free_head = Some(id.0);
        match prev {
            Slot::Occupied(node) => node.data,
            Slot::Free(_) => panic!("double free of arena node {:?}", id),
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> &Node<T> {
        match &self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Free(_) => panic!("use of stale node handle {:?}", id),
        }
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match &mut self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Free(_) => panic!("use of stale node handle {:?}", id),
        }
    }

    pub(crate) fn left(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).left
    }

    pub(crate) fn right(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).right
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    pub(crate) fn size(&self, id: NodeId) -> usize {
        self.get(id).size
    }

    pub(crate) fn size_opt(&self, id: Option<NodeId>) -> usize {
        id.map_or(0, |n| self.size(n))
    }

    /// Which child slot of `parent` holds `child`, if any.
    pub(crate) fn side_of(&self, parent: NodeId, child: NodeId) -> Option<Side> {
        let node = self.get(parent);
        if node.left == Some(child) {
            Some(Side::Left)
        } else if node.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }

    fn set_child(&mut self, parent: NodeId, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.get_mut(parent).left = child,
            Side::Right => self.get_mut(parent).right = child,
        }
        if let Some(c) = child {
            self.get_mut(c).parent = Some(parent);
        }
    }

    pub(crate) fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(l) = self.left(id) {
            id = l;
        }
        id
    }

    pub(crate) fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(r) = self.right(id) {
            id = r;
        }
        id
    }

    pub(crate) fn root_of(&self, mut id: NodeId) -> NodeId {
        while let Some(p) = self.parent(id) {
            id = p;
        }
        id
    }

    /// `size(n) := 1 + size(left(n)) + size(right(n))`. Returns whether the
    /// value changed, so callers walking upward can stop early.
    pub(crate) fn update_size(&mut self, id: NodeId) -> bool {
        let l = self.left(id);
        let r = self.right(id);
        let new_size = 1 + self.size_opt(l) + self.size_opt(r);
        let node = self.get_mut(id);
        if node.size == new_size {
            false
        } else {
            node.size = new_size;
            true
        }
    }

    /// Refreshes `size` from `start` up to the root, stopping as soon as a
    /// node's size turns out not to have changed.
    pub(crate) fn update_sizes_upwards(&mut self, start: Option<NodeId>) {
        let mut cur = start;
        while let Some(n) = cur {
            if !self.update_size(n) {
                break;
            }
            cur = self.parent(n);
        }
    }

    /// rank query: the in-order ordinal of `n` within its tree.
    pub(crate) fn index_of(&self, n: NodeId) -> usize {
        let mut acc = self.size_opt(self.left(n));
        let mut cur = n;
        while let Some(p) = self.parent(cur) {
            if self.right(p) == Some(cur) {
                acc += self.size_opt(self.left(p)) + 1;
            }
            cur = p;
        }
        acc
    }

    /// rank descent: the node at ordinal `k` under `root`.
    /// Precondition: `k < size(root)`.
    pub(crate) fn node_at_index(&self, root: NodeId, mut k: usize) -> NodeId {
        debug_assert!(k < self.size(root), "rank descent out of range");
        let mut cur = root;
        loop {
            let l = self.size_opt(self.left(cur));
            if k < l {
                cur = self.left(cur).expect("left subtree size says a child should exist");
            } else if k == l {
                return cur;
            } else {
                k -= l + 1;
                cur = self.right(cur).expect("right subtree size says a child should exist");
            }
        }
    }

    /// insert-position descent: where a node with final ordinal `k`
    /// should attach, given a non-empty tree rooted at `root`.
    /// Precondition: `k <= size(root)`.
    pub(crate) fn insert_position(&self, root: NodeId, mut k: usize) -> (NodeId, Side) {
        debug_assert!(k <= self.size(root), "insert position out of range");
        let mut cur = root;
        loop {
            let l = self.size_opt(self.left(cur));
            if l > 0 && k <= l {
                cur = self.left(cur).unwrap();
                continue;
            }
            if k == 0 {
                return (cur, Side::Left);
            }
            match self.right(cur) {
                Some(r) => {
                    k -= l + 1;
                    cur = r;
                }
                None => return (cur, Side::Right),
            }
        }
    }

    /// successor.
    pub(crate) fn next(&self, n: NodeId) -> Option<NodeId> {
        if let Some(r) = self.right(n) {
            return Some(self.leftmost(r));
        }
        let mut cur = n;
        loop {
            let p = self.parent(cur)?;
            if self.left(p) == Some(cur) {
                return Some(p);
            }
            cur = p;
        }
    }

    /// predecessor.
    pub(crate) fn prev(&self, n: NodeId) -> Option<NodeId> {
        if let Some(l) = self.left(n) {
            return Some(self.rightmost(l));
        }
        let mut cur = n;
        loop {
            let p = self.parent(cur)?;
            if self.right(p) == Some(cur) {
                return Some(p);
            }
            cur = p;
        }
    }

    /// `next(n, steps)`/`prev(n, steps)`, unified as a signed jump.
    /// Equivalent in complexity (one path-length pass to find the root
    /// plus one rank descent) to a pop-up/descend case analysis, without
    /// duplicating its four-way branch.
    pub(crate) fn advance(&self, n: NodeId, steps: isize) -> Option<NodeId> {
        if steps == 0 {
            return Some(n);
        }
        let root = self.root_of(n);
        let idx = self.index_of(n) as isize + steps;
        let size = self.size(root) as isize;
        if idx < 0 || idx >= size {
            None
        } else {
            Some(self.node_at_index(root, idx as usize))
        }
    }

    /// Rotate `n` left: requires `right(n)` to be present. Leaves sizes
    /// stale; callers refresh `n` then the returned former right child, in
    /// that order.
    pub(crate) fn rotate_left(&mut self, n: NodeId) -> NodeId {
        let r = self.right(n).expect("rotate_left requires a right child");
        let rl = self.left(r);
        let parent = self.parent(n);
        let side_in_parent = parent.and_then(|p| self.side_of(p, n));

        self.set_child(n, Side::Right, rl);
        self.set_child(r, Side::Left, Some(n));
        self.get_mut(r).parent = parent;
        if let Some(p) = parent {
            self.set_child(p, side_in_parent.unwrap(), Some(r));
        }
        r
    }

    /// Rotate `n` right: requires `left(n)` to be present. Symmetric to
    /// [`Self::rotate_left`].
    pub(crate) fn rotate_right(&mut self, n: NodeId) -> NodeId {
        let l = self.left(n).expect("rotate_right requires a left child");
        let lr = self.right(l);
        let parent = self.parent(n);
        let side_in_parent = parent.and_then(|p| self.side_of(p, n));

        self.set_child(n, Side::Left, lr);
        self.set_child(l, Side::Right, Some(n));
        self.get_mut(l).parent = parent;
        if let Some(p) = parent {
            self.set_child(p, side_in_parent.unwrap(), Some(l));
        }
        l
    }

    /// Rotates `parent` in whichever direction lifts its `child_side`
    /// child up into `parent`'s place: a left child is promoted by
    /// rotating `parent` right, a right child by rotating it left.
    fn promote(&mut self, parent: NodeId, child_side: Side) -> NodeId {
        match child_side {
            Side::Left => self.rotate_right(parent),
            Side::Right => self.rotate_left(parent),
        }
    }

    /// Single splay step (zig): `n`'s parent exists, its grandparent does
    /// not. Returns the former parent, whose size needs refreshing first.
    pub(crate) fn splay_step_single(&mut self, n: NodeId) -> NodeId {
        let p = self.parent(n).expect("splay_step_single requires a parent");
        let n_side = self.side_of(p, n).expect("n must be a child of p");
        self.promote(p, n_side)
    }

    /// Double splay step (zig-zig or zig-zag). Returns `(pp, p)`: sizes
    /// must be refreshed in that order, since the former grandparent ends
    /// up as a descendant of the former parent.
    pub(crate) fn splay_step_double(&mut self, n: NodeId) -> (NodeId, NodeId) {
        let p = self.parent(n).expect("splay_step_double requires a parent");
        let pp = self.parent(p).expect("splay_step_double requires a grandparent");
        let n_side = self.side_of(p, n).expect("n must be a child of p");
        let p_side = self.side_of(pp, p).expect("p must be a child of pp");

        if n_side == p_side {
            // zig-zig: same side twice, grandparent rotates first.
            self.promote(pp, p_side);
            self.promote(p, n_side);
        } else {
            // zig-zag: parent rotates first, then grandparent in p's old slot.
            self.promote(p, n_side);
            self.promote(pp, p_side);
        }
        (pp, p)
    }

    /// Splays `n` until its parent is `top` (or to the root, if `top` is
    /// `None`). `on_refresh` is called on every node whose subtree shape
    /// changed, descendants before ancestors, matching the order sizes are
    /// recomputed in.
    pub(crate) fn splay(
        &mut self,
        n: NodeId,
        top: Option<NodeId>,
        mut on_refresh: impl FnMut(&mut Self, NodeId),
    ) {
        while self.parent(n) != top {
            let p = self.parent(n).unwrap();
            let pp = self.parent(p);
            if pp == top {
                let refreshed = self.splay_step_single(n);
                self.update_size(refreshed);
                on_refresh(self, refreshed);
            } else {
                let (a, b) = self.splay_step_double(n);
                self.update_size(a);
                on_refresh(self, a);
                self.update_size(b);
                on_refresh(self, b);
            }
            self.update_size(n);
            on_refresh(self, n);
        }
    }

    /// Exchanges `a` and `b`'s structural position (`parent`/`left`/
    /// `right`/`size`) without touching `data`, so stable references into
    /// `data` survive the swap. Handles the case where `a` and `b` are
    /// directly adjacent (one is the other's child).
    pub(crate) fn swap_nodes(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let an = (self.get(a).parent, self.get(a).left, self.get(a).right, self.get(a).size);
        let bn = (self.get(b).parent, self.get(b).left, self.get(b).right, self.get(b).size);
        let (a_parent, a_left, a_right, a_size) = an;
        let (b_parent, b_left, b_right, b_size) = bn;

        for child in [a_left, a_right] {
            if let Some(c) = child {
                if c != b {
                    self.get_mut(c).parent = Some(b);
                }
            }
        }
        for child in [b_left, b_right] {
            if let Some(c) = child {
                if c != a {
                    self.get_mut(c).parent = Some(a);
                }
            }
        }
        if let Some(p) = a_parent {
            if p != b {
                let side = self.side_of(p, a).expect("a must be a child of its parent");
                self.set_child_raw(p, side, Some(b));
            }
        }
        if let Some(p) = b_parent {
            if p != a {
                let side = self.side_of(p, b).expect("b must be a child of its parent");
                self.set_child_raw(p, side, Some(a));
            }
        }

        let fix = |x: Option<NodeId>, other: NodeId, self_id: NodeId| -> Option<NodeId> {
            if x == Some(self_id) { Some(other) } else { x }
        };
        let new_a_parent = fix(b_parent, b, a);
        let new_a_left = fix(b_left, b, a);
        let new_a_right = fix(b_right, b, a);
        let new_b_parent = fix(a_parent, a, b);
        let new_b_left = fix(a_left, a, b);
        let new_b_right = fix(a_right, a, b);

        {
            let na = self.get_mut(a);
            na.parent = new_a_parent;
            na.left = new_a_left;
            na.right = new_a_right;
            na.size = b_size;
        }
        {
            let nb = self.get_mut(b);
            nb.parent = new_b_parent;
            nb.left = new_b_left;
            nb.right = new_b_right;
            nb.size = a_size;
        }
    }

    /// Like `set_child`, but does not touch the child's parent pointer
    /// (used by `swap_nodes`, which fixes up parent pointers itself to
    /// account for the two nodes possibly being adjacent).
    fn set_child_raw(&mut self, parent: NodeId, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.get_mut(parent).left = child,
            Side::Right => self.get_mut(parent).right = child,
        }
    }

    fn splice_out(&mut self, n: NodeId, replacement: Option<NodeId>) {
        let parent = self.parent(n);
        if let Some(r) = replacement {
            self.get_mut(r).parent = parent;
        }
        if let Some(p) = parent {
            let side = self.side_of(p, n).expect("n must be a child of its parent");
            self.set_child_raw(p, side, replacement);
        }
    }

    /// erase: removes `n` from the tree, preserving the in-order
    /// sequence of the remaining nodes. `n`'s own fields are left
    /// untouched; the caller destroys or relinks it. Returns the node that
    /// took `n`'s place (if any) and the node sizes should be refreshed
    /// upwards from.
    pub(crate) fn erase(&mut self, n: NodeId) -> EraseResult {
        let left = self.left(n);
        let right = self.right(n);
        if left.is_none() || right.is_none() {
            let child = left.or(right);
            let parent = self.parent(n);
            self.splice_out(n, child);
            EraseResult { replacement: child, refresh_from: child.or(parent) }
        } else {
            let succ = self.next(n).expect("a node with two children has a successor");
            debug_assert!(self.left(succ).is_none());
            self.swap_nodes(n, succ);
            let replacement = self.right(n);
            let parent_after = self.parent(n);
            self.splice_out(n, replacement);
            EraseResult { replacement: Some(succ), refresh_from: replacement.or(parent_after) }
        }
    }
}

pub(crate) struct EraseResult {
    pub(crate) replacement: Option<NodeId>,
    pub(crate) refresh_from: Option<NodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_chain(arena: &mut Arena<i32>, values: &[i32]) -> NodeId {
        // builds a simple right-leaning chain via repeated `insert_position`
        // at the end, exercising link/rotate plumbing indirectly through
        // the higher-level tree tests instead. Here we only need raw nodes
        // for node-algebra unit tests.
        let mut root = arena.alloc(values[0]);
        for &v in &values[1..] {
            let id = arena.alloc(v);
            let rightmost = arena.rightmost(root);
            arena.set_child(rightmost, Side::Right, Some(id));
            arena.update_sizes_upwards(Some(rightmost));
        }
        root = arena.root_of(root);
        root
    }

    #[test]
    fn index_of_matches_in_order_position() {
        let mut arena = Arena::new();
        let root = build_chain(&mut arena, &[10, 20, 30, 40, 50]);
        for (expected_idx, _) in [10, 20, 30, 40, 50].iter().enumerate() {
            let node = arena.node_at_index(root, expected_idx);
            assert_eq!(arena.index_of(node), expected_idx);
        }
    }

    #[test]
    fn rotate_left_then_right_is_identity_in_shape() {
        let mut arena = Arena::new();
        let root = build_chain(&mut arena, &[1, 2, 3]);
        // root is leftmost (1), right child chain 2 -> 3.
        let before: Vec<i32> = {
            let mut out = vec![];
            for i in 0..arena.size(root) {
                out.push(arena.get(arena.node_at_index(root, i)).data);
            }
            out
        };
        let new_root = arena.rotate_left(root);
        arena.update_size(root);
        arena.update_size(new_root);
        let new_root2 = arena.rotate_right(new_root);
        arena.update_size(new_root);
        arena.update_size(new_root2);
        let after: Vec<i32> = {
            let mut out = vec![];
            for i in 0..arena.size(new_root2) {
                out.push(arena.get(arena.node_at_index(new_root2, i)).data);
            }
            out
        };
        assert_eq!(before, after);
    }

    #[test]
    fn swap_adjacent_nodes_preserves_sequence_and_data_identity() {
        let mut arena = Arena::new();
        let root = build_chain(&mut arena, &[1, 2, 3, 4]);
        let a = arena.node_at_index(root, 0); // value 1, parent-of chain
        let b = arena.node_at_index(root, 1); // value 2, a's right child
        assert_eq!(arena.parent(b), Some(a));
        arena.swap_nodes(a, b);
        let new_root = arena.root_of(a);
        let seq: Vec<i32> = (0..arena.size(new_root))
            .map(|i| arena.get(arena.node_at_index(new_root, i)).data)
            .collect();
        assert_eq!(seq, vec![1, 2, 3, 4]);
        // a still holds 1, b still holds 2: data did not move.
        assert_eq!(arena.get(a).data, 1);
        assert_eq!(arena.get(b).data, 2);
    }
}
