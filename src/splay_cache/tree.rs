use crate::arena::{Handle, TypedArena};
use crate::splay_cache::node::{Node, Side};
use crate::splay_cache::{Error, Result};
use log::trace;
use std::borrow::Borrow;
use std::cmp::Ordering;

/// A single splay step, named after the shape formed by a node, its parent and its grandparent.
/// The side is the side of its parent that the splayed node hangs from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    /// The parent is the root.
    Zig(Side),
    /// The node and its parent hang from the same side of their parents.
    ZigZig(Side),
    /// The node and its parent hang from opposite sides of their parents.
    ZigZag(Side),
}

pub struct Tree<T, U> {
    arena: TypedArena<Node<T, U>>,
    root: Option<Handle>,
}

impl<T, U> Tree<T, U> {
    pub fn new(chunk_size: usize) -> Self {
        Tree {
            arena: TypedArena::new(chunk_size),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn root(&self) -> Option<Handle> {
        self.root
    }

    pub fn node(&self, handle: Handle) -> &Node<T, U> {
        &self.arena[handle]
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    fn parent_of(&self, handle: Handle) -> Handle {
        self.arena[handle].parent.expect("Expected node to have a parent.")
    }

    fn side(&self, handle: Handle) -> Option<Side> {
        self.arena[handle].parent.map(|parent| {
            if self.arena[parent].left == Some(handle) {
                Side::Left
            } else {
                Side::Right
            }
        })
    }

    /// Returns the next splay step for a node, or `None` if the node is the root.
    pub fn classify(&self, handle: Handle) -> Option<Step> {
        let side = self.side(handle)?;
        match self.side(self.parent_of(handle)) {
            None => Some(Step::Zig(side)),
            Some(parent_side) if parent_side == side => Some(Step::ZigZig(side)),
            Some(_) => Some(Step::ZigZag(side)),
        }
    }

    /// Replaces `old` with `new` in the child slot of `parent`, or makes `new` the root if there
    /// is no parent.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Handle) {
        match parent {
            None => self.root = Some(new),
            Some(parent) => {
                let parent_node = &mut self.arena[parent];
                if parent_node.left == Some(old) {
                    parent_node.left = Some(new);
                } else {
                    parent_node.right = Some(new);
                }
            },
        }
    }

    pub fn rotate_left(&mut self, handle: Handle) {
        let child = self.arena[handle]
            .right
            .expect("Expected right child node to be `Some`.");
        let inner = self.arena[child].left;
        self.arena[handle].right = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(handle);
        }

        let parent = self.arena[handle].parent;
        self.arena[child].parent = parent;
        self.replace_child(parent, handle, child);

        self.arena[child].left = Some(handle);
        self.arena[handle].parent = Some(child);
    }

    pub fn rotate_right(&mut self, handle: Handle) {
        let child = self.arena[handle]
            .left
            .expect("Expected left child node to be `Some`.");
        let inner = self.arena[child].right;
        self.arena[handle].left = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(handle);
        }

        let parent = self.arena[handle].parent;
        self.arena[child].parent = parent;
        self.replace_child(parent, handle, child);

        self.arena[child].right = Some(handle);
        self.arena[handle].parent = Some(child);
    }

    /// Rotates a node up until it becomes the root and returns the number of rotations performed.
    /// Every rotation lifts the node by one level, so the count equals its depth beforehand.
    pub fn splay(&mut self, handle: Handle) -> usize {
        let mut rotations = 0;
        while let Some(step) = self.classify(handle) {
            trace!("splay step {:?}", step);
            let parent = self.parent_of(handle);
            match step {
                Step::Zig(Side::Left) => self.rotate_right(parent),
                Step::Zig(Side::Right) => self.rotate_left(parent),
                Step::ZigZig(Side::Left) => {
                    let grandparent = self.parent_of(parent);
                    self.rotate_right(grandparent);
                    self.rotate_right(parent);
                },
                Step::ZigZig(Side::Right) => {
                    let grandparent = self.parent_of(parent);
                    self.rotate_left(grandparent);
                    self.rotate_left(parent);
                },
                Step::ZigZag(Side::Left) => {
                    self.rotate_right(parent);
                    let grandparent = self.parent_of(handle);
                    self.rotate_left(grandparent);
                },
                Step::ZigZag(Side::Right) => {
                    self.rotate_left(parent);
                    let grandparent = self.parent_of(handle);
                    self.rotate_right(grandparent);
                },
            }
            rotations += match step {
                Step::Zig(_) => 1,
                Step::ZigZig(_) | Step::ZigZag(_) => 2,
            };
        }
        rotations
    }

    /// Finds the node holding `key` without restructuring the tree.
    pub fn search<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.locate(key).map(|(handle, _)| handle)
    }

    /// Returns the number of edges between the root and the node holding `key`.
    pub fn depth<V>(&self, key: &V) -> Option<usize>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.locate(key).map(|(_, depth)| depth)
    }

    fn locate<V>(&self, key: &V) -> Option<(Handle, usize)>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut current = self.root;
        let mut depth = 0;
        while let Some(handle) = current {
            let node = &self.arena[handle];
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some((handle, depth)),
            };
            depth += 1;
        }
        None
    }

    /// Attaches a new node at the empty slot where `key` belongs. If the key is already present
    /// the tree is left untouched and the existing node is returned alongside `false`.
    pub fn insert(&mut self, key: T, value: U) -> (Handle, bool)
    where
        T: Ord,
    {
        let mut last: Option<(Handle, Side)> = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = &self.arena[handle];
            let side = match key.cmp(&node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return (handle, false),
            };
            last = Some((handle, side));
            current = node.child(side);
        }

        let handle = self
            .arena
            .allocate(Node::new(key, value, last.map(|(parent, _)| parent)));
        match last {
            None => self.root = Some(handle),
            Some((parent, side)) => *self.arena[parent].child_mut(side) = Some(handle),
        }
        trace!("inserted node {:?} below {:?}", handle, last);
        (handle, true)
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(Handle, usize)> = self.root.into_iter().map(|root| (root, 1)).collect();
        while let Some((handle, level)) = stack.pop() {
            height = height.max(level);
            let node = &self.arena[handle];
            for child in node.left.into_iter().chain(node.right) {
                stack.push((child, level + 1));
            }
        }
        height
    }

    pub fn in_order(&self) -> InOrder<T, U> {
        InOrder {
            tree: self,
            current: self.root,
            stack: Vec::new(),
        }
    }

    pub fn check_invariants(&self) -> Result<()>
    where
        T: Ord,
    {
        let allocated = self.arena.len();
        let root = match self.root {
            Some(root) => root,
            None if allocated == 0 => return Ok(()),
            None => {
                return Err(Error::UnreachableNodes {
                    reachable: 0,
                    allocated,
                })
            },
        };
        if self.arena[root].parent.is_some() {
            return Err(Error::RootHasParent);
        }

        let mut reachable = 0;
        let mut stack = vec![(root, 0)];
        while let Some((handle, depth)) = stack.pop() {
            reachable += 1;
            if reachable > allocated {
                return Err(Error::UnreachableNodes {
                    reachable,
                    allocated,
                });
            }
            let node = &self.arena[handle];
            for child in node.left.into_iter().chain(node.right) {
                if self.arena[child].parent != Some(handle) {
                    return Err(Error::BrokenParentLink { depth: depth + 1 });
                }
                stack.push((child, depth + 1));
            }
        }
        if reachable != allocated {
            return Err(Error::UnreachableNodes {
                reachable,
                allocated,
            });
        }

        let mut previous: Option<&T> = None;
        for (position, handle) in self.in_order().enumerate() {
            let key = &self.arena[handle].key;
            if let Some(previous) = previous {
                if previous >= key {
                    return Err(Error::OrderViolation { position });
                }
            }
            previous = Some(key);
        }
        Ok(())
    }
}

/// Walks the handles of a tree in key order.
pub struct InOrder<'a, T, U> {
    tree: &'a Tree<T, U>,
    current: Option<Handle>,
    stack: Vec<Handle>,
}

impl<'a, T, U> Iterator for InOrder<'a, T, U> {
    type Item = Handle;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.current {
            self.stack.push(handle);
            self.current = self.tree.arena[handle].left;
        }
        let handle = self.stack.pop()?;
        self.current = self.tree.arena[handle].right;
        Some(handle)
    }
}
