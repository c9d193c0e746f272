//! A Merkle tree that keeps every level around.
//!
//! Most callers only want [`root`](super::root). `Tree` exists for
//! diagnostics: it prints as its hex root, and [`Tree::dump`] draws the
//! whole thing.

use std::fmt;

use super::{hash_leaf, next_level};
use crate::crypto::HashAlgorithm;

#[derive(Debug, Clone)]
pub struct Tree {
    hash: HashAlgorithm,
    size: usize,
    /// `levels[0]` holds leaf hashes, the last level holds the root.
    levels: Vec<Vec<Vec<u8>>>,
}

impl Tree {
    pub fn new<L: AsRef<[u8]>>(hash: HashAlgorithm, leaves: &[L]) -> Self {
        let mut levels = Vec::new();
        let mut level: Vec<Vec<u8>> = leaves
            .iter()
            .map(|leaf| hash_leaf(hash, leaf.as_ref()))
            .collect();

        if !level.is_empty() {
            while level.len() > 1 {
                let next = next_level(hash, level.clone());
                levels.push(level);
                level = next;
            }
            levels.push(level);
        }

        Self {
            hash,
            size: leaves.len(),
            levels,
        }
    }

    pub fn root(&self) -> Vec<u8> {
        match self.levels.last() {
            Some(top) => top[0].clone(),
            None => self.hash.digest(&[]),
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn leaf_hash(&self, index: usize) -> Option<&[u8]> {
        self.levels.first()?.get(index).map(Vec::as_slice)
    }

    /// Writes the tree sideways, root first, one node per line.
    ///
    /// Nodes that only have a left child are skipped; their hash is the
    /// child's hash anyway.
    pub fn dump(&self, w: &mut impl fmt::Write) -> fmt::Result {
        if self.size == 0 {
            return writeln!(w, "empty: {}", hex::encode(self.root()));
        }

        writeln!(w, "root: {}", hex::encode(self.root()))?;
        if self.size > 1 {
            let top = self.levels.len() - 2;
            self.dump_level(w, top, 0, "")?;
            self.dump_level(w, top, 1, "")?;
        }
        Ok(())
    }

    fn dump_level(&self, w: &mut impl fmt::Write, level: usize, index: usize, prefix: &str) -> fmt::Result {
        const MIDDLE: [&str; 2] = [" ├─", " │ "];
        const LAST: [&str; 2] = [" └─", "   "];

        if level == 0 {
            let glyph = if index == self.size - 1 || index & 1 == 1 { LAST } else { MIDDLE };
            return writeln!(
                w,
                "{prefix}{} leaf: {}",
                glyph[0],
                hex::encode(&self.levels[0][index])
            );
        }

        let span = 1usize << level;
        if self.size <= index * span + span / 2 {
            // Right subtree is empty, this node is just its left child.
            return self.dump_level(w, level - 1, 2 * index, prefix);
        }

        let glyph = if index & 1 == 1 || (index + 1) * span == self.size {
            LAST
        } else {
            MIDDLE
        };
        writeln!(
            w,
            "{prefix}{} node: {}",
            glyph[0],
            hex::encode(&self.levels[level][index])
        )?;
        let child_prefix = format!("{prefix}{}", glyph[1]);
        self.dump_level(w, level - 1, 2 * index, &child_prefix)?;
        self.dump_level(w, level - 1, 2 * index + 1, &child_prefix)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return self.dump(f);
        }
        f.write_str(&hex::encode(self.root()))
    }
}
