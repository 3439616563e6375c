//! # Generic Operator-Tree Traversal
//!
//! A pre-order depth-first walk over any tree reachable through a "direct
//! children" accessor. The walker is deliberately ignorant of the node type:
//! callers pass a function that returns a node's children, and get back a lazy
//! iterator yielding the root first, then each child's full traversal, left to
//! right.
//!
//! The fragment model uses this to count operators of a specific kind inside a
//! fragment's operator tree (e.g. table writers) without owning a bespoke
//! counting routine per kind -- filtering the produced sequence is a pure
//! projection and does not affect traversal order.
//!
//! Traversals are restartable (start a fresh one from any node) and finite
//! (operator trees are acyclic by construction; there is nothing to detect).

/// Lazy pre-order depth-first iterator over a tree.
///
/// Created by [`depth_first_pre_order`]. Holds an explicit stack of pending
/// nodes; children are pushed in reverse so they pop in left-to-right order.
pub struct PreOrder<'a, T, F> {
    stack: Vec<&'a T>,
    successors: F,
}

/// Walk the tree rooted at `root` in pre-order depth-first order.
///
/// `successors` returns a node's direct children, in positional order. The
/// traversal is lazy: nodes are visited as the iterator is advanced, and
/// dropping the iterator early abandons the rest of the walk.
pub fn depth_first_pre_order<'a, T, F>(root: &'a T, successors: F) -> PreOrder<'a, T, F>
where
    F: FnMut(&'a T) -> Vec<&'a T>,
{
    PreOrder {
        stack: vec![root],
        successors,
    }
}

impl<'a, T, F> Iterator for PreOrder<'a, T, F>
where
    F: FnMut(&'a T) -> Vec<&'a T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.stack.pop()?;
        let mut children = (self.successors)(node);
        children.reverse();
        self.stack.extend(children);
        Some(node)
    }
}
