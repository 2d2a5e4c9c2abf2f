//! The tree handle: owns the arena, caches `root`/`first`/`last`,
//! and exposes whole-tree operations built on the node algebra in
//! [`crate::arena`].

use crate::arena::{Arena, EraseResult, NodeId, Side};

pub(crate) struct Tree<T> {
    pub(crate) arena: Arena<T>,
    pub(crate) root: Option<NodeId>,
    pub(crate) first: Option<NodeId>,
    pub(crate) last: Option<NodeId>,
}

impl<T> Tree<T> {
    pub(crate) fn new() -> Self {
        Tree { arena: Arena::new(), root: None, first: None, last: None }
    }

    pub(crate) fn len(&self) -> usize {
        self.root.map_or(0, |r| self.arena.size(r))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Drops every node. Iterative by construction (the arena is just a
    /// `Vec`, replaced wholesale), so this cannot stack-overflow on a long
    /// chain the way a naive recursive `Drop` over `Box` children would.
    pub(crate) fn clear(&mut self) {
        self.arena = Arena::new();
        self.root = None;
        self.first = None;
        self.last = None;
    }

    pub(crate) fn get(&self, id: NodeId) -> &T {
        &self.arena.get(id).data
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.arena.get_mut(id).data
    }

    pub(crate) fn node_at_index(&self, k: usize) -> NodeId {
        self.arena.node_at_index(self.root.expect("index on empty tree"), k)
    }

    pub(crate) fn index_of(&self, id: NodeId) -> usize {
        self.arena.index_of(id)
    }

    pub(crate) fn next(&self, id: NodeId) -> Option<NodeId> {
        self.arena.next(id)
    }

    pub(crate) fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.arena.prev(id)
    }

    pub(crate) fn advance(&self, id: NodeId, steps: isize) -> Option<NodeId> {
        self.arena.advance(id, steps)
    }

    /// `link`: attaches a freshly-allocated node holding `data` at the
    /// insert position for ordinal `k`, updating `first`/`last`/`root` as
    /// needed. Returns the new node's id.
    pub(crate) fn insert_at(&mut self, k: usize, data: T) -> NodeId {
        debug_assert!(k <= self.len());
        let id = self.arena.alloc(data);
        match self.root {
            None => {
                self.root = Some(id);
                self.first = Some(id);
                self.last = Some(id);
            }
            Some(root) => {
                let (parent, side) = self.arena.insert_position(root, k);
                self.link(parent, side, id);
            }
        }
        id
    }

    /// `link(pos, n)` in its primitive form: attach an already
    /// allocated (and childless) node `id` as `parent`'s `side` child.
    pub(crate) fn link(&mut self, parent: NodeId, side: Side, id: NodeId) {
        match side {
            Side::Left => {
                self.arena.get_mut(parent).left = Some(id);
                self.arena.get_mut(id).parent = Some(parent);
                if self.first == Some(parent) {
                    self.first = Some(id);
                }
            }
            Side::Right => {
                self.arena.get_mut(parent).right = Some(id);
                self.arena.get_mut(id).parent = Some(parent);
                if self.last == Some(parent) {
                    self.last = Some(id);
                }
            }
        }
        self.arena.update_sizes_upwards(Some(parent));
    }

    /// Splays `n` towards `top` (root if `None`), refreshing the size of
    /// every disturbed node.
    pub(crate) fn splay(&mut self, n: NodeId, top: Option<NodeId>) {
        self.arena.splay(n, top, |_, _| {});
        if top.is_none() {
            self.root = Some(n);
        }
    }

    /// Rotates `n` upward one single step at a time (no zig-zig/zig-zag
    /// pairing) until its parent is `top` (or to the root, if `top` is
    /// `None`). The non-splaying counterpart to `splay`: reaches the same
    /// destination without the double rotation that gives splay trees
    /// their amortized bound, for strategies that don't want one.
    pub(crate) fn rotate_up_to(&mut self, n: NodeId, top: Option<NodeId>) {
        while self.arena.parent(n) != top {
            let refreshed = self.arena.splay_step_single(n);
            self.arena.update_size(refreshed);
        }
        self.arena.update_size(n);
        if top.is_none() {
            self.root = Some(n);
        }
    }

    pub(crate) fn rotate_left(&mut self, n: NodeId) {
        let was_root = self.root == Some(n);
        let new_sub_root = self.arena.rotate_left(n);
        self.arena.update_size(n);
        self.arena.update_size(new_sub_root);
        if was_root {
            self.root = Some(new_sub_root);
        }
    }

    pub(crate) fn rotate_right(&mut self, n: NodeId) {
        let was_root = self.root == Some(n);
        let new_sub_root = self.arena.rotate_right(n);
        self.arena.update_size(n);
        self.arena.update_size(new_sub_root);
        if was_root {
            self.root = Some(new_sub_root);
        }
    }

    pub(crate) fn swap_nodes(&mut self, a: NodeId, b: NodeId) {
        let fix = |slot: &mut Option<NodeId>| {
            if *slot == Some(a) {
                *slot = Some(b);
            } else if *slot == Some(b) {
                *slot = Some(a);
            }
        };
        self.arena.swap_nodes(a, b);
        fix(&mut self.root);
        fix(&mut self.first);
        fix(&mut self.last);
    }

    /// `unlink(n)`: detaches `n`'s subtree, fixing `root`/`first`/
    /// `last`. Does not destroy anything.
    pub(crate) fn unlink(&mut self, n: NodeId) {
        let first_under_n = self.first.map_or(false, |f| self.subtree_contains(n, f));
        let last_under_n = self.last.map_or(false, |l| self.subtree_contains(n, l));
        let parent = self.arena.parent(n);
        match parent {
            Some(p) => {
                let side = self.arena.side_of(p, n).expect("n must be a child of its parent");
                match side {
                    Side::Left => self.arena.get_mut(p).left = None,
                    Side::Right => self.arena.get_mut(p).right = None,
                }
                self.arena.get_mut(n).parent = None;
                self.arena.update_sizes_upwards(Some(p));
            }
            None => {
                self.root = None;
            }
        }
        if first_under_n {
            self.first = parent;
        }
        if last_under_n {
            self.last = parent;
        }
    }

    fn subtree_contains(&self, subtree_root: NodeId, candidate: NodeId) -> bool {
        let mut cur = Some(candidate);
        while let Some(c) = cur {
            if c == subtree_root {
                return true;
            }
            cur = self.arena.parent(c);
        }
        false
    }

    /// `erase(n, {destroy})`: removes `n`, fixing `root`/`first`/
    /// `last`, and hands back its `data`.
    pub(crate) fn erase(&mut self, n: NodeId) -> T {
        self.erase_reporting_refresh(n).0
    }

    /// Like `erase`, but also returns the node sizes were just refreshed
    /// upward from: the node nearest the disturbance, and the correct
    /// post-erase splay target for strategies that splay on erase rather
    /// than before it. `None` means the tree is now empty.
    pub(crate) fn erase_reporting_refresh(&mut self, n: NodeId) -> (T, Option<NodeId>) {
        let is_first = self.first == Some(n);
        let is_last = self.last == Some(n);
        let is_root = self.root == Some(n);

        let next = if is_first { self.arena.next(n) } else { None };
        let prev = if is_last { self.arena.prev(n) } else { None };

        let EraseResult { replacement, refresh_from } = self.arena.erase(n);
        self.arena.update_sizes_upwards(refresh_from);

        if is_root {
            self.root = replacement;
        }
        if is_first {
            self.first = next;
        }
        if is_last {
            self.last = prev;
        }
        (self.arena.dealloc(n), refresh_from)
    }

    /// Detaches the subtree rooted at `n` and moves it, node for node,
    /// into a brand-new [`Tree`] with its own arena. `O(k)` in the size of
    /// the detached subtree: a safe arena cannot splice a `NodeId` from
    /// one `Vec`-backed store into another in O(1) the way a raw pointer
    /// transplant could, so every moved node is reallocated and its
    /// topology remapped (see DESIGN.md).
    pub(crate) fn unlink_subtree(&mut self, n: NodeId) -> Tree<T> {
        self.unlink(n);
        self.relocate_subtree(n)
    }

    fn relocate_subtree(&mut self, n: NodeId) -> Tree<T> {
        // Pre-order collection (explicit stack, not recursion: a long
        // unbalanced chain must not blow the call stack).
        let mut ids = Vec::new();
        let mut stack = vec![n];
        while let Some(id) = stack.pop() {
            ids.push(id);
            let node = self.arena.get(id);
            if let Some(r) = node.right {
                stack.push(r);
            }
            if let Some(l) = node.left {
                stack.push(l);
            }
        }

        let mut topology = Vec::with_capacity(ids.len());
        for &old_id in &ids {
            let node = self.arena.get(old_id);
            topology.push((node.left, node.right, node.parent, node.size));
        }

        let mut new_arena = Arena::with_capacity(ids.len());
        let mut map = vec![None; old_id_bound(&ids)];
        for &old_id in &ids {
            let data = self.arena.dealloc(old_id);
            let new_id = new_arena.alloc(data);
            map[old_id.index()] = Some(new_id);
        }
        for (i, &old_id) in ids.iter().enumerate() {
            let (left, right, parent, size) = topology[i];
            let new_id = map[old_id.index()].unwrap();
            let node = new_arena.get_mut(new_id);
            node.left = left.map(|x| map[x.index()].unwrap());
            node.right = right.map(|x| map[x.index()].unwrap());
            node.parent = parent.and_then(|x| map.get(x.index()).copied().flatten());
            node.size = size;
        }

        let new_root = map[n.index()].unwrap();
        let new_first = new_arena.leftmost(new_root);
        let new_last = new_arena.rightmost(new_root);
        Tree { arena: new_arena, root: Some(new_root), first: Some(new_first), last: Some(new_last) }
    }

    /// Detaches the ordinal range `[begin, end)` into its own tree in one
    /// bracketing step instead of one detach per erased element: lift the
    /// successor of the range to `top` via `lift_to_root`, then lift the
    /// predecessor of the range beneath it via `lift_beneath`, leaving the
    /// whole range as a single subtree that `unlink_subtree` removes in
    /// one pass. The two closures encode the caller's rebalancing policy
    /// (a plain rotation chain for `Baseline`, full splaying for `Splay`);
    /// the bracketing shape is the same either way.
    pub(crate) fn detach_range(
        &mut self,
        begin: usize,
        end: usize,
        mut lift_to_root: impl FnMut(&mut Self, NodeId),
        mut lift_beneath: impl FnMut(&mut Self, NodeId, NodeId),
    ) -> Tree<T> {
        debug_assert!(begin <= end && end <= self.len());
        if begin == end {
            return Tree::new();
        }
        let succ = if end < self.len() { Some(self.node_at_index(end)) } else { None };
        let pred = if begin > 0 { Some(self.node_at_index(begin - 1)) } else { None };

        let range_root = match (pred, succ) {
            (Some(p), Some(s)) => {
                lift_to_root(self, s);
                lift_beneath(self, p, s);
                self.arena.right(p).expect("predecessor must bracket a non-empty range")
            }
            (None, Some(s)) => {
                lift_to_root(self, s);
                self.arena.left(s).expect("successor must bracket a non-empty range")
            }
            (Some(p), None) => {
                lift_to_root(self, p);
                self.arena.right(p).expect("predecessor must bracket a non-empty range")
            }
            (None, None) => self.root.expect("a non-empty range requires a root"),
        };
        self.unlink_subtree(range_root)
    }

    /// Consumes a tree and returns its elements in sequence order.
    /// Iterative in-order walk that deallocates each node as it is
    /// visited, for destroying a (typically small, already-detached)
    /// subtree without paying for splice-based `erase`'s bookkeeping.
    pub(crate) fn into_values_in_order(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = Vec::new();
        let mut cur = self.root;
        loop {
            while let Some(n) = cur {
                stack.push(n);
                cur = self.arena.get(n).left;
            }
            match stack.pop() {
                Some(n) => {
                    let right = self.arena.get(n).right;
                    out.push(self.arena.dealloc(n));
                    cur = right;
                }
                None => break,
            }
        }
        out
    }

    /// `link_subtree(pos, other)`: consumes `other`'s nodes and
    /// attaches them at the insert position for ordinal `k`, relocating
    /// them into this tree's arena (see `unlink_subtree`'s doc comment for
    /// why relocation is necessary).
    pub(crate) fn link_subtree_at(&mut self, k: usize, other: Tree<T>) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other;
            return;
        }
        // `import_subtree` only reallocates `other`'s nodes into this
        // arena; it does not attach `new_root` anywhere, so `self.len()`
        // below still reads the pre-splice length.
        let new_root = self.import_subtree(other);

        match self.root {
            None => unreachable!("checked is_empty above"),
            Some(root) => {
                if k == 0 {
                    // becomes the new leftmost subtree
                    let old_first = self.first.unwrap();
                    self.arena.get_mut(old_first).left = Some(new_root);
                    self.arena.get_mut(new_root).parent = Some(old_first);
                    self.first = Some(self.arena.leftmost(new_root));
                    self.arena.update_sizes_upwards(Some(old_first));
                } else if k == self.len() {
                    let old_last = self.last.unwrap();
                    self.arena.get_mut(old_last).right = Some(new_root);
                    self.arena.get_mut(new_root).parent = Some(old_last);
                    self.last = Some(self.arena.rightmost(new_root));
                    self.arena.update_sizes_upwards(Some(old_last));
                } else {
                    let (parent, side) = self.arena.insert_position(root, k);
                    match side {
                        Side::Left => {
                            self.arena.get_mut(parent).left = Some(new_root);
                        }
                        Side::Right => {
                            self.arena.get_mut(parent).right = Some(new_root);
                        }
                    }
                    self.arena.get_mut(new_root).parent = Some(parent);
                    self.arena.update_sizes_upwards(Some(parent));
                }
            }
        }
    }

    /// Moves every node of `other` into `self`'s arena, preserving shape,
    /// and returns the relocated root's new id. `other` is consumed.
    fn import_subtree(&mut self, mut other: Tree<T>) -> NodeId {
        let other_root = other.root.take().expect("import_subtree requires a non-empty tree");
        let mut ids = Vec::new();
        let mut stack = vec![other_root];
        while let Some(id) = stack.pop() {
            ids.push(id);
            let node = other.arena.get(id);
            if let Some(r) = node.right {
                stack.push(r);
            }
            if let Some(l) = node.left {
                stack.push(l);
            }
        }
        let mut topology = Vec::with_capacity(ids.len());
        for &old_id in &ids {
            let node = other.arena.get(old_id);
            topology.push((node.left, node.right, node.parent, node.size));
        }
        let mut map = vec![None; old_id_bound(&ids)];
        for &old_id in &ids {
            let data = other.arena.dealloc(old_id);
            let new_id = self.arena.alloc(data);
            map[old_id.index()] = Some(new_id);
        }
        for (i, &old_id) in ids.iter().enumerate() {
            let (left, right, parent, size) = topology[i];
            let new_id = map[old_id.index()].unwrap();
            let node = self.arena.get_mut(new_id);
            node.left = left.map(|x| map[x.index()].unwrap());
            node.right = right.map(|x| map[x.index()].unwrap());
            node.parent = parent.and_then(|x| map.get(x.index()).copied().flatten());
            node.size = size;
        }
        map[other_root.index()].unwrap()
    }
}

fn old_id_bound(ids: &[NodeId]) -> usize {
    ids.iter().map(|id| id.index()).max().map_or(0, |m| m + 1)
}

impl<T: Clone> Clone for Tree<T> {
    /// `clone`: deep-copies the entire subtree shape and `data`;
    /// sizes are copied verbatim rather than recomputed.
    fn clone(&self) -> Self {
        let Some(root) = self.root else {
            return Tree::new();
        };
        let mut ids = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            ids.push(id);
            let node = self.arena.get(id);
            if let Some(r) = node.right {
                stack.push(r);
            }
            if let Some(l) = node.left {
                stack.push(l);
            }
        }
        let mut new_arena = Arena::with_capacity(ids.len());
        let mut map = vec![None; old_id_bound(&ids)];
        for &old_id in &ids {
            let node = self.arena.get(old_id);
            let new_id = new_arena.alloc(node.data.clone());
            map[old_id.index()] = Some(new_id);
        }
        for &old_id in &ids {
            let node = self.arena.get(old_id);
            let new_id = map[old_id.index()].unwrap();
            let new_node = new_arena.get_mut(new_id);
            new_node.left = node.left.map(|x| map[x.index()].unwrap());
            new_node.right = node.right.map(|x| map[x.index()].unwrap());
            new_node.parent = node.parent.and_then(|x| map.get(x.index()).copied().flatten());
            new_node.size = node.size;
        }
        let new_root = map[root.index()].unwrap();
        let new_first = new_arena.leftmost(new_root);
        let new_last = new_arena.rightmost(new_root);
        Tree { arena: new_arena, root: Some(new_root), first: Some(new_first), last: Some(new_last) }
    }
}

#[cfg(test)]
impl<T> Tree<T> {
    /// Checks invariants 1-6 of the data model: size augmentation,
    /// two-way parent/child consistency, and the `first`/`last` cache.
    /// Test-only; not on the release hot path.
    pub(crate) fn assert_invariants(&self) {
        log::trace!("checking tree invariants, len={}", self.len());
        match self.root {
            None => {
                assert!(self.first.is_none(), "empty tree must have no first");
                assert!(self.last.is_none(), "empty tree must have no last");
            }
            Some(root) => {
                assert!(self.arena.parent(root).is_none(), "root must have no parent");
                self.assert_subtree_invariants(root);
                assert_eq!(self.first, Some(self.arena.leftmost(root)), "first cache out of sync");
                assert_eq!(self.last, Some(self.arena.rightmost(root)), "last cache out of sync");
            }
        }
    }

    fn assert_subtree_invariants(&self, n: NodeId) {
        let node = self.arena.get(n);
        let mut size = 1;
        if let Some(l) = node.left {
            assert_eq!(self.arena.parent(l), Some(n), "left child's parent pointer broken");
            self.assert_subtree_invariants(l);
            size += self.arena.size(l);
        }
        if let Some(r) = node.right {
            assert_eq!(self.arena.parent(r), Some(n), "right child's parent pointer broken");
            self.assert_subtree_invariants(r);
            size += self.arena.size(r);
        }
        assert_eq!(node.size, size, "size augmentation violated at {:?}", n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence<T: Copy>(tree: &Tree<T>) -> Vec<T> {
        (0..tree.len()).map(|i| *tree.get(tree.node_at_index(i))).collect()
    }

    #[test]
    fn insert_at_builds_expected_sequence() {
        let mut tree: Tree<i32> = Tree::new();
        for (i, v) in [3, 1, 4, 1, 5].into_iter().enumerate() {
            let k = i % 3; // exercise a few different positions
            tree.insert_at(k.min(tree.len()), v);
        }
        assert_eq!(tree.len(), 5);
        assert_eq!(sequence(&tree).len(), 5);
    }

    #[test]
    fn erase_the_only_element_empties_the_tree() {
        let mut tree: Tree<i32> = Tree::new();
        tree.insert_at(0, 42);
        let id = tree.root.unwrap();
        let val = tree.erase(id);
        assert_eq!(val, 42);
        assert!(tree.is_empty());
        assert!(tree.root.is_none());
        assert!(tree.first.is_none());
        assert!(tree.last.is_none());
    }

    #[test]
    fn clone_is_independent() {
        let mut tree: Tree<i32> = Tree::new();
        for v in 0..10 {
            tree.insert_at(tree.len(), v);
        }
        let mut cloned = tree.clone();
        assert_eq!(sequence(&tree), sequence(&cloned));
        cloned.insert_at(0, -1);
        assert_ne!(sequence(&tree), sequence(&cloned));
        assert_eq!(sequence(&tree), (0..10).collect::<Vec<_>>());
    }
}
