//! In-memory block tree
//!
//! Nodes live in an arena keyed by block hash; parent and child links are
//! hash keys into the arena, never references, so the tree has no ownership
//! cycles. Structural mutation happens through the symmetric `link`/`unlink`
//! pair, which the acceptance controller calls under its exclusive lock.

use std::collections::HashMap;

use crate::constants::HEADER_SIZE;
use crate::types::{Hash, Natural};

/// One known block: identity, tree position, and header bytes.
#[derive(Debug, Clone)]
pub struct BlockTreeNode {
    pub hash: Hash,
    pub parent: Option<Hash>,
    pub children: Vec<Hash>,
    pub height: Natural,
    pub tx_count: u32,
    pub header: [u8; HEADER_SIZE],
}

/// Mapping from block hash to tree node.
#[derive(Debug, Default)]
pub struct BlockIndex {
    nodes: HashMap<Hash, BlockTreeNode>,
}

impl BlockIndex {
    /// Index seeded with its genesis node at height 0.
    pub fn with_genesis(hash: Hash, header: [u8; HEADER_SIZE]) -> Self {
        let mut index = BlockIndex::default();
        index.nodes.insert(
            hash,
            BlockTreeNode {
                hash,
                parent: None,
                children: Vec::new(),
                height: 0,
                tx_count: 0,
                header,
            },
        );
        index
    }

    pub fn get(&self, hash: &Hash) -> Option<&BlockTreeNode> {
        self.nodes.get(hash)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.nodes.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a node and register it as a child of its parent.
    ///
    /// The parent must already be indexed and the node's height must be one
    /// greater; both are invariants of the acceptance controller, so a breach
    /// here is a bug, not bad input.
    pub fn link(&mut self, node: BlockTreeNode) {
        let parent_hash = node
            .parent
            .expect("only the genesis node may lack a parent");
        let parent = self
            .nodes
            .get_mut(&parent_hash)
            .expect("parent block not in index");
        assert_eq!(node.height, parent.height + 1, "height must extend parent");
        parent.children.push(node.hash);
        self.nodes.insert(node.hash, node);
    }

    /// Remove a node and detach it from its parent, exactly reversing `link`.
    /// The node must be a leaf.
    pub fn unlink(&mut self, hash: &Hash) -> BlockTreeNode {
        let node = self.nodes.remove(hash).expect("unlinked block not in index");
        assert!(node.children.is_empty(), "may only unlink a leaf node");
        if let Some(parent_hash) = node.parent {
            if let Some(parent) = self.nodes.get_mut(&parent_hash) {
                parent.children.retain(|child| child != hash);
            }
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(hash: u8, parent: u8, height: Natural) -> BlockTreeNode {
        BlockTreeNode {
            hash: [hash; 32],
            parent: Some([parent; 32]),
            children: Vec::new(),
            height,
            tx_count: 1,
            header: [0u8; HEADER_SIZE],
        }
    }

    #[test]
    fn test_genesis_index() {
        let index = BlockIndex::with_genesis([0; 32], [0u8; HEADER_SIZE]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&[0; 32]).unwrap().height, 0);
        assert!(index.get(&[0; 32]).unwrap().parent.is_none());
    }

    #[test]
    fn test_link_registers_child() {
        let mut index = BlockIndex::with_genesis([0; 32], [0u8; HEADER_SIZE]);
        index.link(node(1, 0, 1));

        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&[0; 32]).unwrap().children, vec![[1u8; 32]]);
        assert_eq!(index.get(&[1; 32]).unwrap().height, 1);
    }

    #[test]
    fn test_unlink_reverses_link() {
        let mut index = BlockIndex::with_genesis([0; 32], [0u8; HEADER_SIZE]);
        index.link(node(1, 0, 1));
        index.unlink(&[1; 32]);

        assert_eq!(index.len(), 1);
        assert!(index.get(&[0; 32]).unwrap().children.is_empty());
        assert!(!index.contains(&[1; 32]));
    }

    #[test]
    fn test_side_branches_share_parent() {
        let mut index = BlockIndex::with_genesis([0; 32], [0u8; HEADER_SIZE]);
        index.link(node(1, 0, 1));
        index.link(node(2, 0, 1));

        let genesis = index.get(&[0; 32]).unwrap();
        assert_eq!(genesis.children.len(), 2);

        index.unlink(&[1; 32]);
        assert_eq!(index.get(&[0; 32]).unwrap().children, vec![[2u8; 32]]);
    }

    #[test]
    #[should_panic(expected = "parent block not in index")]
    fn test_link_unknown_parent_panics() {
        let mut index = BlockIndex::with_genesis([0; 32], [0u8; HEADER_SIZE]);
        index.link(node(2, 9, 1));
    }

    #[test]
    #[should_panic(expected = "height must extend parent")]
    fn test_link_wrong_height_panics() {
        let mut index = BlockIndex::with_genesis([0; 32], [0u8; HEADER_SIZE]);
        index.link(node(1, 0, 5));
    }
}
