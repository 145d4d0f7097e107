//! A parent-linked BST whose nodes live in an index arena. Instead of raw
//! pointers, every link between nodes is a `u32` index into a `Vec` owned
//! by the tree, so parent back-references need no aliasing or lifetime
//! tricks: a node records its relation to its parent as one of
//! `{root, left-child-of, right-child-of}` and every structural edit
//! dispatches on that relation.
//!
//! The tree does not rebalance itself. Keys are unique; inserting a key
//! that is already present is rejected with [`Error::DuplicateKey`].
//!
//! # Examples
//!
//! ```
//! use bstree::arena::{Error, Tree};
//!
//! let mut tree: Tree<i32> = vec![10, 5, 15].into_iter().collect();
//!
//! assert!(tree.search(&5).is_some());
//! assert_eq!(tree.in_order().copied().collect::<Vec<_>>(), [5, 10, 15]);
//!
//! assert_eq!(tree.delete(&10), Ok(()));
//! assert_eq!(tree.delete(&10), Err(Error::KeyNotFound));
//! assert!(tree.search(&10).is_none());
//! assert_eq!(tree.in_order().copied().collect::<Vec<_>>(), [5, 15]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::{FromIterator, FusedIterator};

/// Errors reported by tree operations. Both conditions are ordinary,
/// recoverable outcomes: the tree is left exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The key passed to [`Tree::insert`] already exists in the tree.
    #[error("key already exists in the tree")]
    DuplicateKey,
    /// The key passed to [`Tree::delete`] was not found in the tree.
    #[error("key not found in the tree")]
    KeyNotFound,
}

/// Index of a node's slot in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(u32);

/// A node's relation to its parent. This is the inverse of exactly one
/// child link (or of the tree's root reference), and every function that
/// rewrites links goes through [`Tree::replace_in_parent`] which matches
/// on it, so the "does this node have a parent?" question is answered in
/// one place instead of being guessed at from pointer comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParentLink {
    /// The node is the tree's root and has no parent.
    Root,
    /// The node is the left child of the referenced node.
    LeftOf(NodeId),
    /// The node is the right child of the referenced node.
    RightOf(NodeId),
}

#[derive(Debug, Clone)]
struct Node<K> {
    key: K,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: ParentLink,
}

/// A Binary Search Tree storing a set of unique, ordered keys. This can be
/// used for inserting, finding, enumerating, and deleting keys.
///
/// Nodes are kept in an arena indexed by `u32`, with freed slots recycled
/// by later inserts. Deleting a node removes its record from the arena
/// entirely, so nothing can observe a deleted node afterwards.
///
/// # Examples
///
/// ```
/// use bstree::arena::Tree;
///
/// let mut tree = Tree::new();
///
/// // Nothing in here yet.
/// assert!(tree.search(&1).is_none());
///
/// assert_eq!(tree.insert(1), Ok(()));
/// assert_eq!(tree.search(&1).map(|view| *view.key()), Some(1));
///
/// // Deleting the key empties the tree again.
/// assert_eq!(tree.delete(&1), Ok(()));
/// assert!(tree.is_empty());
/// ```
#[derive(Clone)]
pub struct Tree<K> {
    nodes: Vec<Option<Node<K>>>,
    /// Slots freed by deletion, reused before the arena grows.
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
}

impl<K> Default for Tree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for Tree<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.in_order()).finish()
    }
}

impl<K> Tree<K> {
    /// Generates a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// Returns the number of keys in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a read-only view of the root node, or `None` if the tree is
    /// empty.
    pub fn root(&self) -> Option<NodeView<'_, K>> {
        self.root.map(|id| NodeView { tree: self, id })
    }

    /// Inserts the given key into the tree, attaching exactly one new leaf.
    ///
    /// Duplicate keys are rejected: if the key is already present the tree
    /// is left unchanged and [`Error::DuplicateKey`] is returned.
    ///
    /// This is `O(height)` with no rebalancing, so inserting keys in sorted
    /// order degrades to `O(N)` per operation.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::arena::{Error, Tree};
    ///
    /// let mut tree = Tree::new();
    ///
    /// assert_eq!(tree.insert(1), Ok(()));
    /// assert_eq!(tree.insert(1), Err(Error::DuplicateKey));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K) -> Result<(), Error>
    where
        K: Ord,
    {
        let mut current = match self.root {
            Some(root) => root,
            None => {
                let root = self.alloc(key, ParentLink::Root);
                self.root = Some(root);
                return Ok(());
            }
        };

        loop {
            match key.cmp(&self.node(current).key) {
                Ordering::Less => match self.node(current).left {
                    Some(left) => current = left,
                    None => {
                        let new = self.alloc(key, ParentLink::LeftOf(current));
                        self.node_mut(current).left = Some(new);
                        return Ok(());
                    }
                },
                Ordering::Equal => return Err(Error::DuplicateKey),
                Ordering::Greater => match self.node(current).right {
                    Some(right) => current = right,
                    None => {
                        let new = self.alloc(key, ParentLink::RightOf(current));
                        self.node_mut(current).right = Some(new);
                        return Ok(());
                    }
                },
            }
        }
    }

    /// Potentially finds the node holding the given key. If no node has the
    /// corresponding key, `None` is returned.
    ///
    /// The returned [`NodeView`] borrows the tree, so it cannot be held
    /// across a later `insert` or `delete`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::arena::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1).unwrap();
    ///
    /// assert_eq!(tree.search(&1).map(|view| *view.key()), Some(1));
    /// assert!(tree.search(&42).is_none());
    /// ```
    pub fn search(&self, key: &K) -> Option<NodeView<'_, K>>
    where
        K: Ord,
    {
        self.find_node(key).map(|id| NodeView { tree: self, id })
    }

    /// Deletes the node holding the given key from the tree. If the tree
    /// does not contain the key, [`Error::KeyNotFound`] is returned and the
    /// tree is left unchanged.
    ///
    /// Removal distinguishes three cases once the target node is found:
    ///
    /// 1. **Leaf**: the parent's child link (or the root reference, when
    ///    the target is the root) is cleared and the node is released.
    /// 2. **One child**: the child is spliced into the target's position.
    ///    Its parent link takes over the target's relation, and the link
    ///    that referenced the target now references the child. The child's
    ///    whole subtree was already ordered correctly relative to the
    ///    target's parent, so the ordering invariant is untouched.
    /// 3. **Two children**: the target's in-order successor (the minimum
    ///    of its right subtree) is spliced out and the target's key is
    ///    overwritten with the successor's key. The target node itself
    ///    keeps its position and links; only its key changes. The
    ///    successor has no left child by minimality, so splicing it out is
    ///    always one of the two simpler cases above.
    ///
    /// The successor is always taken from the right subtree, never the
    /// predecessor from the left, so identical insert/delete sequences
    /// produce identical tree shapes.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::arena::{Error, Tree};
    ///
    /// let mut tree: Tree<i32> = vec![2, 1, 3].into_iter().collect();
    ///
    /// assert_eq!(tree.delete(&2), Ok(()));
    /// assert_eq!(tree.delete(&2), Err(Error::KeyNotFound));
    ///
    /// assert!(tree.search(&2).is_none());
    /// assert_eq!(tree.in_order().copied().collect::<Vec<_>>(), [1, 3]);
    /// ```
    pub fn delete(&mut self, key: &K) -> Result<(), Error>
    where
        K: Ord,
    {
        let target = self.find_node(key).ok_or(Error::KeyNotFound)?;
        self.remove_node(target);
        Ok(())
    }

    /// Returns an iterator over the keys in ascending order.
    ///
    /// The walk is iterative with an explicit stack, using `O(height)`
    /// auxiliary space. Repeated calls on an unmodified tree yield
    /// identical sequences.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::arena::Tree;
    ///
    /// let tree: Tree<i32> = vec![10, 5, 15, 3, 7, 12, 17].into_iter().collect();
    ///
    /// let keys: Vec<i32> = tree.in_order().copied().collect();
    /// assert_eq!(keys, [3, 5, 7, 10, 12, 15, 17]);
    /// ```
    pub fn in_order(&self) -> InOrder<'_, K> {
        let mut iter = InOrder {
            tree: self,
            stack: Vec::new(),
            remaining: self.len,
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// Descends from the root comparing keys until a match or a dead end.
    fn find_node(&self, key: &K) -> Option<NodeId>
    where
        K: Ord,
    {
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.node(id);
            match key.cmp(&node.key) {
                Ordering::Less => current = node.left,
                Ordering::Equal => return Some(id),
                Ordering::Greater => current = node.right,
            }
        }
        None
    }

    /// Removes the node at `id` from the structure and releases exactly one
    /// arena slot.
    fn remove_node(&mut self, id: NodeId) {
        let (left, right) = {
            let node = self.node(id);
            (node.left, node.right)
        };
        match (left, right) {
            (Some(_), Some(right)) => {
                let successor = self.min_in_subtree(right);
                debug_assert!(self.node(successor).left.is_none());
                let succ = self.splice_out(successor);
                self.node_mut(id).key = succ.key;
            }
            _ => {
                self.splice_out(id);
            }
        }
    }

    /// Unlinks a node with at most one child, rewiring the child (if any)
    /// to the node's parent, and returns the released node record.
    ///
    /// # Panics
    ///
    /// When the node has two children. Callers must reduce that case to a
    /// single-child or leaf deletion first.
    fn splice_out(&mut self, id: NodeId) -> Node<K> {
        let (left, right, parent) = {
            let node = self.node(id);
            (node.left, node.right, node.parent)
        };
        let child = match (left, right) {
            (None, None) => None,
            (Some(child), None) | (None, Some(child)) => Some(child),
            (Some(_), Some(_)) => panic!("cannot splice out a node with two children"),
        };
        if let Some(child) = child {
            self.node_mut(child).parent = parent;
        }
        self.replace_in_parent(id, child);
        self.release(id)
    }

    /// Writes `child` into whichever link currently references `of`: the
    /// parent's left or right child link, or the tree's root reference when
    /// `of` is the root.
    ///
    /// # Panics
    ///
    /// When the recorded parent relation disagrees with the parent's actual
    /// child link. That means a previous relink corrupted the structure, so
    /// this aborts rather than compounding the damage.
    fn replace_in_parent(&mut self, of: NodeId, child: Option<NodeId>) {
        match self.node(of).parent {
            ParentLink::Root => {
                assert_eq!(self.root, Some(of), "root reference out of sync with parent relation");
                self.root = child;
            }
            ParentLink::LeftOf(parent) => {
                let slot = &mut self.node_mut(parent).left;
                assert_eq!(*slot, Some(of), "left child link out of sync with parent relation");
                *slot = child;
            }
            ParentLink::RightOf(parent) => {
                let slot = &mut self.node_mut(parent).right;
                assert_eq!(*slot, Some(of), "right child link out of sync with parent relation");
                *slot = child;
            }
        }
    }

    /// Returns the minimum-keyed node of the subtree rooted at `current` by
    /// following left links to the end.
    fn min_in_subtree(&self, mut current: NodeId) -> NodeId {
        while let Some(left) = self.node(current).left {
            current = left;
        }
        current
    }

    fn alloc(&mut self, key: K, parent: ParentLink) -> NodeId {
        let node = Node {
            key,
            left: None,
            right: None,
            parent,
        };
        self.len += 1;
        match self.free.pop() {
            Some(id) => {
                debug_assert!(self.nodes[id.0 as usize].is_none());
                self.nodes[id.0 as usize] = Some(node);
                id
            }
            None => {
                assert!(self.nodes.len() < u32::MAX as usize, "arena index space exhausted");
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(Some(node));
                id
            }
        }
    }

    /// Takes the node record out of the arena and recycles its slot. All of
    /// the node's links die with the returned record.
    fn release(&mut self, id: NodeId) -> Node<K> {
        let node = self.nodes[id.0 as usize]
            .take()
            .expect("released slot must be occupied");
        self.free.push(id);
        self.len -= 1;
        node
    }

    fn node(&self, id: NodeId) -> &Node<K> {
        self.nodes[id.0 as usize]
            .as_ref()
            .expect("node id must reference an occupied slot")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        self.nodes[id.0 as usize]
            .as_mut()
            .expect("node id must reference an occupied slot")
    }
}

impl<K> Extend<K> for Tree<K>
where
    K: Ord,
{
    /// Inserts the keys in iteration order, ignoring duplicates.
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            let _ = self.insert(key);
        }
    }
}

impl<K> FromIterator<K> for Tree<K>
where
    K: Ord,
{
    /// Builds a tree by inserting the keys in iteration order: the first
    /// key becomes the root and the rest descend from it, so the order of
    /// the keys determines the shape (but not the contents) of the tree.
    /// Duplicate keys after their first occurrence are ignored.
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Tree::new();
        tree.extend(iter);
        tree
    }
}

/// A read-only view of a single node: its key and the shape of its
/// immediate children. The view borrows the tree, so the borrow checker
/// prevents it from outliving any subsequent mutation.
pub struct NodeView<'a, K> {
    tree: &'a Tree<K>,
    id: NodeId,
}

impl<'a, K> Clone for NodeView<'a, K> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, K> Copy for NodeView<'a, K> {}

impl<'a, K> NodeView<'a, K> {
    /// The node's key.
    pub fn key(&self) -> &'a K {
        &self.node().key
    }

    /// Whether the node has a left child.
    pub fn has_left(&self) -> bool {
        self.node().left.is_some()
    }

    /// Whether the node has a right child.
    pub fn has_right(&self) -> bool {
        self.node().right.is_some()
    }

    /// Whether the node has no children.
    pub fn is_leaf(&self) -> bool {
        !self.has_left() && !self.has_right()
    }

    /// A view of the left child, if there is one.
    pub fn left(&self) -> Option<NodeView<'a, K>> {
        self.node().left.map(|id| NodeView { tree: self.tree, id })
    }

    /// A view of the right child, if there is one.
    pub fn right(&self) -> Option<NodeView<'a, K>> {
        self.node().right.map(|id| NodeView { tree: self.tree, id })
    }

    fn node(&self) -> &'a Node<K> {
        self.tree.node(self.id)
    }
}

impl<'a, K> fmt::Debug for NodeView<'a, K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeView")
            .field("key", self.key())
            .field("has_left", &self.has_left())
            .field("has_right", &self.has_right())
            .finish()
    }
}

/// Iterator over a tree's keys in ascending order. Created by
/// [`Tree::in_order`].
pub struct InOrder<'a, K> {
    tree: &'a Tree<K>,
    /// Nodes whose key and right subtree are still pending, deepest (and
    /// smallest) on top.
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a, K> InOrder<'a, K> {
    fn push_left_spine(&mut self, mut current: Option<NodeId>) {
        while let Some(id) = current {
            self.stack.push(id);
            current = self.tree.node(id).left;
        }
    }
}

impl<'a, K> Iterator for InOrder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let id = self.stack.pop()?;
        let right = self.tree.node(id).right;
        self.push_left_spine(right);
        self.remaining -= 1;
        Some(&self.tree.node(id).key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K> ExactSizeIterator for InOrder<'a, K> {}
impl<'a, K> FusedIterator for InOrder<'a, K> {}

#[cfg(test)]
impl<K> Tree<K>
where
    K: Ord,
{
    /// Walks the whole structure and asserts every invariant the tree is
    /// supposed to maintain: strict BST ordering, parent/child link
    /// agreement, an accurate length counter, and an arena with no
    /// unreachable occupied slots.
    fn check_invariants(&self) {
        let reachable = match self.root {
            Some(root) => {
                assert_eq!(self.node(root).parent, ParentLink::Root);
                self.check_subtree(root, None, None)
            }
            None => 0,
        };
        assert_eq!(reachable, self.len);

        let occupied = self.nodes.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(occupied, self.len);
        assert_eq!(self.nodes.len(), self.len + self.free.len());

        let keys: Vec<&K> = self.in_order().collect();
        assert_eq!(keys.len(), self.len);
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Checks one subtree against its key bounds and returns its node
    /// count.
    fn check_subtree(&self, id: NodeId, lower: Option<&K>, upper: Option<&K>) -> usize {
        let node = self.node(id);
        if let Some(lower) = lower {
            assert!(*lower < node.key);
        }
        if let Some(upper) = upper {
            assert!(node.key < *upper);
        }

        let mut count = 1;
        if let Some(left) = node.left {
            assert_eq!(self.node(left).parent, ParentLink::LeftOf(id));
            count += self.check_subtree(left, lower, Some(&node.key));
        }
        if let Some(right) = node.right {
            assert_eq!(self.node(right).parent, ParentLink::RightOf(id));
            count += self.check_subtree(right, Some(&node.key), upper);
        }
        count
    }
}


#[cfg(test)]
mod quicktests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::test::quick::Op;

    /// Applies a set of operations to a tree and an ordered set.
    /// This way we can ensure that after a random smattering of inserts
    /// and deletes we have the same set of keys in the model.
    fn do_ops<K>(ops: &[Op<K>], tree: &mut Tree<K>, model: &mut BTreeSet<K>)
    where
        K: Ord + Clone,
    {
        for op in ops {
            match op {
                Op::Insert(k) => {
                    let expected = if model.insert(k.clone()) {
                        Ok(())
                    } else {
                        Err(Error::DuplicateKey)
                    };
                    assert_eq!(tree.insert(k.clone()), expected);
                }
                Op::Remove(k) => {
                    let expected = if model.remove(k) {
                        Ok(())
                    } else {
                        Err(Error::KeyNotFound)
                    };
                    assert_eq!(tree.delete(k), expected);
                }
                Op::Enumerate => {
                    assert!(tree.in_order().eq(model.iter()));
                }
            }
        }
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
            let mut tree = Tree::new();
            let mut model = BTreeSet::new();

            do_ops(&ops, &mut tree, &mut model);
            tree.check_invariants();
            tree.in_order().eq(model.iter())
        }
    }

    quickcheck::quickcheck! {
        fn contains(xs: Vec<i8>) -> bool {
            let mut tree = Tree::new();
            for x in &xs {
                let _ = tree.insert(*x);
            }

            tree.check_invariants();
            xs.iter().all(|x| tree.search(x).map(|view| *view.key()) == Some(*x))
        }
    }
}
