//! This crate provides an ordered-key container backed by a Binary Search
//! Tree (BST) with explicit parent back-references.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored keys. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores a key and
//! sometimes has child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than its own key.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! The benefits of these invariants are many. For instance, searching for
//! keys in the tree takes `O(height)` (where `height` is defined as the longest
//! path from the root `Node` to a leaf `Node`). BSTs also naturally support
//! sorted iteration by visiting the left subtree, then the subtree root, then
//! the right subtree.
//!
//! The tree in this crate does **not** self-balance: inserting keys in
//! sorted order produces a degenerate tree of height `O(N)`, so the
//! `O(height)` bounds degrade to `O(N)` per operation on such input. This
//! is a documented property of the structure, not a defect.
//!
//! The interesting part of an unbalanced BST is deletion, which must
//! relink parent and child links across three structurally distinct cases
//! (leaf, single child, two children) without ever breaking the ordering
//! invariant. See [`arena::Tree::delete`] for the full procedure.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod arena;

#[cfg(test)]
mod test {
    pub(crate) mod quick;
}
