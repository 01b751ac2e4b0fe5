//! Base-16 radix trie over packed boards.
//!
//! The root branches on the highest-index tile, each level below on the next
//! lower tile, so a depth-first walk visiting branches 0..16 yields boards in
//! ascending numeric order with no duplicates, whatever the insertion order.
//! Nodes live in a flat arena and refer to children by index.

use crate::board::{shift, Board};

type NodeId = u32;

const ABSENT: NodeId = 0; // the root is never a child, so 0 is free
const LEAF: NodeId = NodeId::MAX;

type Node = [NodeId; 16];

/// Deduplicating ordered set of boards with a fixed tile count.
#[derive(Clone, Debug)]
pub struct BoardTree {
    depth: usize,
    nodes: Vec<Node>,
    len: usize,
}

impl BoardTree {
    /// An empty set for boards of `depth` tiles.
    pub fn new(depth: usize) -> Self {
        debug_assert!((1..=16).contains(&depth));
        Self { depth, nodes: vec![[ABSENT; 16]], len: 0 }
    }

    #[inline]
    pub fn depth(&self) -> usize { self.depth }

    /// Number of distinct boards stored.
    #[inline]
    pub fn len(&self) -> usize { self.len }

    #[inline]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Insert `board`. Returns false if it was already present.
    pub fn add(&mut self, board: Board) -> bool {
        let raw = board.into_raw();
        let mut node = 0usize;
        for level in (0..self.depth).rev() {
            let branch = ((raw >> shift(level)) & 0xf) as usize;
            let child = self.nodes[node][branch];
            if level == 0 {
                if child == LEAF {
                    return false;
                }
                self.nodes[node][branch] = LEAF;
                self.len += 1;
                return true;
            }
            node = if child == ABSENT {
                let id = self.nodes.len();
                self.nodes.push([ABSENT; 16]);
                self.nodes[node][branch] = id as NodeId;
                id
            } else {
                child as usize
            };
        }
        false
    }

    pub fn contains(&self, board: Board) -> bool {
        let raw = board.into_raw();
        let mut node = 0usize;
        for level in (0..self.depth).rev() {
            let child = self.nodes[node][((raw >> shift(level)) & 0xf) as usize];
            match child {
                ABSENT => return false,
                LEAF => return level == 0,
                id => node = id as usize,
            }
        }
        false
    }

    /// Ascending traversal. Pure read; call again to restart.
    pub fn iter(&self) -> Iter<'_> {
        Iter { tree: self, stack: vec![Frame { node: 0, branch: 0, prefix: 0 }] }
    }

    /// Call `f` on every board in ascending order.
    pub fn for_each<F: FnMut(Board)>(&self, f: F) { self.iter().for_each(f) }

    /// Set union: add every board of `other`.
    pub fn merge(&mut self, other: &BoardTree) {
        debug_assert_eq!(self.depth, other.depth);
        for board in other {
            self.add(board);
        }
    }
}

impl Extend<Board> for BoardTree {
    fn extend<I: IntoIterator<Item = Board>>(&mut self, iter: I) {
        for board in iter {
            self.add(board);
        }
    }
}

impl<'a> IntoIterator for &'a BoardTree {
    type Item = Board;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Iter<'a> { self.iter() }
}

struct Frame {
    node: NodeId,
    branch: u8,
    prefix: u64,
}

/// Depth-first ascending iterator over a [`BoardTree`].
pub struct Iter<'a> {
    tree: &'a BoardTree,
    stack: Vec<Frame>,
}

impl Iterator for Iter<'_> {
    type Item = Board;

    fn next(&mut self) -> Option<Board> {
        loop {
            let frame = self.stack.last_mut()?;
            if frame.branch == 16 {
                self.stack.pop();
                continue;
            }
            let branch = frame.branch;
            frame.branch += 1;
            let child = self.tree.nodes[frame.node as usize][branch as usize];
            if child == ABSENT {
                continue;
            }
            let prefix = (frame.prefix << 4) | branch as u64;
            if child == LEAF {
                return Some(Board::from_raw(prefix));
            }
            self.stack.push(Frame { node: child, branch: 0, prefix });
        }
    }
}
