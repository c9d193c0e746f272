//! Audit paths (RFC 6962 §2.1.1).
//!
//! An audit path proves one leaf is part of a tree with a given root
//! without handing over the other leaves. For transaction IDs this is what
//! lets a verifier check a single output against a group root.

use super::{hash_leaf, hash_node, split_point};
use crate::crypto::HashAlgorithm;

/// Sibling hashes from the leaf up to (not including) the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditPath {
    pub index: usize,
    pub size: usize,
    pub siblings: Vec<Vec<u8>>,
}

/// Builds the audit path for `leaves[index]`. `None` if out of range.
pub fn audit_path<L: AsRef<[u8]>>(
    hash: HashAlgorithm,
    leaves: &[L],
    index: usize,
) -> Option<AuditPath> {
    if index >= leaves.len() {
        return None;
    }

    let hashes: Vec<Vec<u8>> = leaves
        .iter()
        .map(|leaf| hash_leaf(hash, leaf.as_ref()))
        .collect();

    let mut siblings = Vec::new();
    collect_path(hash, &hashes, index, &mut siblings);

    Some(AuditPath {
        index,
        size: leaves.len(),
        siblings,
    })
}

fn collect_path(hash: HashAlgorithm, hashes: &[Vec<u8>], m: usize, out: &mut Vec<Vec<u8>>) {
    let n = hashes.len();
    if n <= 1 {
        return;
    }
    let k = split_point(n);
    if m < k {
        collect_path(hash, &hashes[..k], m, out);
        out.push(subtree_root(hash, &hashes[k..]));
    } else {
        collect_path(hash, &hashes[k..], m - k, out);
        out.push(subtree_root(hash, &hashes[..k]));
    }
}

fn subtree_root(hash: HashAlgorithm, hashes: &[Vec<u8>]) -> Vec<u8> {
    if hashes.len() == 1 {
        return hashes[0].clone();
    }
    let k = split_point(hashes.len());
    hash_node(
        hash,
        &subtree_root(hash, &hashes[..k]),
        &subtree_root(hash, &hashes[k..]),
    )
}

/// Checks that `leaf` sits at `path.index` in a tree of `path.size` leaves
/// whose root is `root`.
pub fn verify_audit_path(hash: HashAlgorithm, leaf: &[u8], path: &AuditPath, root: &[u8]) -> bool {
    if path.index >= path.size {
        return false;
    }

    let mut f_n = path.index;
    let mut s_n = path.size - 1;
    let mut r = hash_leaf(hash, leaf);

    for sibling in &path.siblings {
        if s_n == 0 {
            return false;
        }
        if f_n & 1 == 1 || f_n == s_n {
            r = hash_node(hash, sibling, &r);
            while f_n & 1 == 0 && f_n != 0 {
                f_n >>= 1;
                s_n >>= 1;
            }
        } else {
            r = hash_node(hash, &r, sibling);
        }
        f_n >>= 1;
        s_n >>= 1;
    }

    s_n == 0 && r == root
}
