//! Huffman tree construction, serialization and decoding
//!
//! Symbols are 9 bits wide: the byte values 0-255 plus the end-of-stream
//! sentinel 256, which terminates every encoded payload. Paths use `0` for
//! the left child and `1` for the right child everywhere.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io::Write;

use bitstream_io::{BitRead, BitWrite};
use tracing::debug;

use crate::code_table::CodeTable;
use crate::error::{is_eof, GrinError};
use crate::frequency::FrequencyTable;

/// A byte value, or [`EOF_SYMBOL`].
pub type Symbol = u16;

/// Synthetic end-of-stream symbol. It has no byte form.
pub const EOF_SYMBOL: Symbol = 256;

/// Width of a symbol in the serialized tree.
pub const SYMBOL_BITS: u32 = 9;

/// Deepest internal node accepted when reading a tree. 257 leaves can never
/// produce a deeper tree.
pub const MAX_TREE_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        symbol: Symbol,
        freq: u64,
    },
    Internal {
        freq: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn leaf(symbol: Symbol, freq: u64) -> Self {
        HuffNode::Leaf { symbol, freq }
    }

    pub fn merge(left: HuffNode, right: HuffNode) -> Self {
        HuffNode::Internal {
            freq: left.freq() + right.freq(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Construction-time weight. Zero for nodes read back from a stream.
    pub fn freq(&self) -> u64 {
        match self {
            HuffNode::Leaf { freq, .. } | HuffNode::Internal { freq, .. } => *freq,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }

    /// Step down one edge: `false` goes left, `true` goes right.
    pub fn child(&self, bit: bool) -> Option<&HuffNode> {
        match self {
            HuffNode::Leaf { .. } => None,
            HuffNode::Internal { left, right, .. } => Some(if bit { right } else { left }),
        }
    }
}

/// Priority queue slot. Lowest frequency first; among equal frequencies the
/// node queued earliest comes out first.
struct QueueEntry {
    freq: u64,
    seq: u64,
    node: HuffNode,
}

impl Eq for QueueEntry {}
impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq && self.seq == other.seq
    }
}
impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on (freq, seq)
        other
            .freq
            .cmp(&self.freq)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct NodeQueue {
    heap: BinaryHeap<QueueEntry>,
    next_seq: u64,
}

impl NodeQueue {
    fn push(&mut self, node: HuffNode) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueEntry {
            freq: node.freq(),
            seq,
            node,
        });
    }

    fn pop(&mut self) -> Option<HuffNode> {
        self.heap.pop().map(|entry| entry.node)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: HuffNode,
}

impl HuffmanTree {
    /// Build an optimal prefix-code tree over the table's bytes plus the
    /// end-of-stream symbol, which always weighs 1.
    ///
    /// Leaves enter the queue in ascending byte order followed by the
    /// sentinel, and each merged node is queued after everything before it.
    /// The first node removed becomes the left child.
    pub fn from_frequencies(freqs: &FrequencyTable) -> Self {
        let mut queue = NodeQueue::default();
        for (byte, freq) in freqs.iter() {
            queue.push(HuffNode::leaf(Symbol::from(byte), freq));
        }
        queue.push(HuffNode::leaf(EOF_SYMBOL, 1));

        let root = loop {
            match (queue.pop(), queue.pop()) {
                (Some(left), Some(right)) => queue.push(HuffNode::merge(left, right)),
                (Some(last), None) => break last,
                // the sentinel is always queued
                (None, _) => break HuffNode::leaf(EOF_SYMBOL, 1),
            }
        };

        let tree = Self { root };
        debug!(
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            "built huffman tree"
        );
        tree
    }

    pub fn root(&self) -> &HuffNode {
        &self.root
    }

    /// Derive the symbol to bit-path table used for encoding.
    pub fn code_table(&self) -> CodeTable {
        CodeTable::from_tree(self)
    }

    pub fn leaf_count(&self) -> usize {
        fn count(node: &HuffNode) -> usize {
            match node {
                HuffNode::Leaf { .. } => 1,
                HuffNode::Internal { left, right, .. } => count(left) + count(right),
            }
        }
        count(&self.root)
    }

    /// A full binary tree has exactly one fewer internal node than leaves.
    pub fn internal_count(&self) -> usize {
        self.leaf_count() - 1
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn depth(node: &HuffNode) -> usize {
            match node {
                HuffNode::Leaf { .. } => 0,
                HuffNode::Internal { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        depth(&self.root)
    }

    /// Size of the serialized shape: one tag bit per node plus a symbol per leaf.
    pub fn serialized_bits(&self) -> u64 {
        let leaves = self.leaf_count() as u64;
        self.internal_count() as u64 + leaves * (1 + u64::from(SYMBOL_BITS))
    }

    /// Write the tree shape in pre-order: `1` for an internal node followed by
    /// its left then right subtree, `0` plus a 9-bit symbol for a leaf.
    pub fn serialize<W: BitWrite>(&self, out: &mut W) -> std::io::Result<()> {
        write_node(&self.root, out)
    }

    /// Rebuild a tree written by [`HuffmanTree::serialize`].
    pub fn deserialize<R: BitRead>(input: &mut R) -> Result<Self, GrinError> {
        let root = read_node(input, 0)?;
        let tree = Self { root };
        debug!(
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            "read huffman tree"
        );
        Ok(tree)
    }

    /// Walk the tree bit by bit, writing one byte per leaf reached, until the
    /// end-of-stream leaf. Returns the number of bytes written.
    pub fn decode<R: BitRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<u64, GrinError> {
        match &self.root {
            HuffNode::Leaf {
                symbol: EOF_SYMBOL, ..
            } => return Ok(0),
            HuffNode::Leaf { symbol, .. } => {
                return Err(GrinError::MalformedTree(format!(
                    "single-leaf tree holds symbol {} instead of end-of-stream",
                    symbol
                )));
            }
            HuffNode::Internal { .. } => {}
        }

        let mut written = 0u64;
        let mut node = &self.root;
        loop {
            let bit = match input.read_bit() {
                Ok(bit) => bit,
                Err(e) if is_eof(&e) => return Err(GrinError::TruncatedStream),
                Err(e) => return Err(e.into()),
            };
            node = node
                .child(bit)
                .ok_or_else(|| GrinError::MalformedTree("path continues past a leaf".into()))?;

            if let HuffNode::Leaf { symbol, .. } = node {
                if *symbol == EOF_SYMBOL {
                    debug!(bytes = written, "reached end-of-stream code");
                    return Ok(written);
                }
                output.write_all(&[*symbol as u8])?;
                written += 1;
                node = &self.root;
            }
        }
    }
}

fn write_node<W: BitWrite>(node: &HuffNode, out: &mut W) -> std::io::Result<()> {
    match node {
        HuffNode::Leaf { symbol, .. } => {
            out.write_bit(false)?;
            out.write(SYMBOL_BITS, *symbol)
        }
        HuffNode::Internal { left, right, .. } => {
            out.write_bit(true)?;
            write_node(left, out)?;
            write_node(right, out)
        }
    }
}

fn read_node<R: BitRead>(input: &mut R, depth: usize) -> Result<HuffNode, GrinError> {
    if input.read_bit().map_err(tree_read_error)? {
        if depth >= MAX_TREE_DEPTH {
            return Err(GrinError::MalformedTree(format!(
                "tree deeper than {} levels",
                MAX_TREE_DEPTH
            )));
        }
        let left = read_node(input, depth + 1)?;
        let right = read_node(input, depth + 1)?;
        Ok(HuffNode::merge(left, right))
    } else {
        let symbol: Symbol = input.read(SYMBOL_BITS).map_err(tree_read_error)?;
        if symbol > EOF_SYMBOL {
            return Err(GrinError::MalformedTree(format!(
                "leaf symbol {} out of range",
                symbol
            )));
        }
        Ok(HuffNode::leaf(symbol, 0))
    }
}

fn tree_read_error(err: std::io::Error) -> GrinError {
    if is_eof(&err) {
        GrinError::MalformedTree("input ended inside the tree".into())
    } else {
        GrinError::Io(err)
    }
}
