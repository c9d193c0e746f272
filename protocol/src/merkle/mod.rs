//! # Merkle Hashing
//!
//! Binary Merkle trees in the RFC 6962 (certificate transparency) style:
//!
//! - leaves are hashed as `H(0x00 || leaf)`, interior nodes as
//!   `H(0x01 || left || right)`. The distinct prefixes mean an interior hash
//!   can never be passed off as a leaf (the classic second-preimage trick).
//! - an unbalanced tree behaves as if padded to the next power of two with
//!   absent leaves. A node whose right child is absent takes its left
//!   child's hash unchanged, with no extra hashing. That is exactly the
//!   "split at the largest power of two below n" rule from the RFC.
//! - the root of zero leaves is the hash of the empty string.
//!
//! An *empty* leaf is not an absent leaf: it is still hashed, as `H(0x00)`.
//!
//! ```text
//! mod.rs   - root(), leaf/node hashing
//! tree.rs  - Tree: every level kept, printable
//! proof.rs - audit paths (inclusion proofs)
//! ```

pub mod proof;
pub mod tree;

pub use proof::{audit_path, verify_audit_path, AuditPath};
pub use tree::Tree;

use crate::config::{MERKLE_LEAF_PREFIX, MERKLE_NODE_PREFIX};
use crate::crypto::HashAlgorithm;

/// Merkle root of `leaves` using `hash` throughout.
pub fn root<L: AsRef<[u8]>>(hash: HashAlgorithm, leaves: &[L]) -> Vec<u8> {
    let mut level: Vec<Vec<u8>> = leaves
        .iter()
        .map(|leaf| hash_leaf(hash, leaf.as_ref()))
        .collect();

    if level.is_empty() {
        return hash.digest(&[]);
    }

    while level.len() > 1 {
        level = next_level(hash, level);
    }
    level.swap_remove(0)
}

pub fn hash_leaf(hash: HashAlgorithm, leaf: &[u8]) -> Vec<u8> {
    hash.digest_parts(&[&[MERKLE_LEAF_PREFIX], leaf])
}

pub fn hash_node(hash: HashAlgorithm, left: &[u8], right: &[u8]) -> Vec<u8> {
    hash.digest_parts(&[&[MERKLE_NODE_PREFIX], left, right])
}

/// Pairs up a level. An unpaired last node is promoted as-is.
pub(crate) fn next_level(hash: HashAlgorithm, level: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
    let mut next = Vec::with_capacity((level.len() + 1) / 2);
    let mut nodes = level.into_iter();
    while let Some(left) = nodes.next() {
        match nodes.next() {
            Some(right) => next.push(hash_node(hash, &left, &right)),
            None => next.push(left),
        }
    }
    next
}

/// Largest power of two strictly less than `n` (`n >= 2`).
pub(crate) fn split_point(n: usize) -> usize {
    debug_assert!(n >= 2);
    let mut k = 1;
    while k << 1 < n {
        k <<= 1;
    }
    k
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Helpers --

    /// Merkle Tree Hash exactly as written in RFC 6962 §2.1.
    fn reference_mth(hash: HashAlgorithm, leaves: &[Vec<u8>]) -> Vec<u8> {
        match leaves.len() {
            0 => hash.digest(&[]),
            1 => hash.digest_parts(&[&[0x00], &leaves[0]]),
            n => {
                let k = split_point(n);
                let left = reference_mth(hash, &leaves[..k]);
                let right = reference_mth(hash, &leaves[k..]);
                hash.digest_parts(&[&[0x01], &left, &right])
            }
        }
    }

    fn leaves(n: usize, empty_every: usize) -> Vec<Vec<u8>> {
        (0..n)
            .map(|i| {
                if empty_every != 0 && i % empty_every == 0 {
                    Vec::new()
                } else {
                    HashAlgorithm::Sha256.digest(&(i as u64).to_be_bytes())[..1 + i % 31].to_vec()
                }
            })
            .collect()
    }

    fn labels(names: &[&str]) -> Vec<Vec<u8>> {
        names.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    // -- Tests --

    #[test]
    fn known_vectors() {
        let h = HashAlgorithm::Sha256;
        let cases = [
            (vec!["L1", "L2"], "0458611336c5dfbf775a6ca6196b215413be1d4e129a3c837633276e458da501"),
            (vec!["L1", "L2", "L3"], "fb790cff1cc41df6229c8b4e399b57a4263a9532e9a5dfdff190337682ee836f"),
            (vec!["L1", "L2", "L3", "L4"], "41d0c7082e1794f1133cb7cebeaedb2818a93d7f4d697c4db5d2c97a37c536aa"),
            (
                vec!["L1", "L2", "L3", "L4", "L5"],
                "8d5fe8e8394e4a793a9cee344558017546f5005608ad52db4e388c13dec299f9",
            ),
        ];
        for (names, expected) in cases {
            assert_eq!(hex::encode(root(h, &labels(&names))), expected, "{names:?}");
        }
    }

    #[test]
    fn zero_leaves_is_empty_hash() {
        let none: [&[u8]; 0] = [];
        assert_eq!(root(HashAlgorithm::Sha256, &none), HashAlgorithm::Sha256.digest(b""));
        assert_eq!(root(HashAlgorithm::Sha224, &none), HashAlgorithm::Sha224.digest(b""));
    }

    #[test]
    fn single_empty_leaf_is_hashed() {
        let h = HashAlgorithm::Sha256;
        assert_eq!(root(h, &[b""]), h.digest(&[0x00]));
        assert_eq!(root(h, &[b"L1"]), h.digest(b"\x00L1"));
    }

    #[test]
    fn agrees_with_rfc6962_up_to_129_leaves() {
        for alg in [HashAlgorithm::Sha256, HashAlgorithm::Sha384] {
            for n in 0..=129 {
                for empty_every in [0, 1, 3] {
                    let data = leaves(n, empty_every);
                    assert_eq!(
                        root(alg, &data),
                        reference_mth(alg, &data),
                        "alg={alg} n={n} empty_every={empty_every}"
                    );
                }
            }
        }
    }

    #[test]
    fn order_matters() {
        let h = HashAlgorithm::Sha256;
        assert_ne!(root(h, &[b"a", b"b"]), root(h, &[b"b", b"a"]));
    }

    #[test]
    fn split_point_values() {
        assert_eq!(split_point(2), 1);
        assert_eq!(split_point(3), 2);
        assert_eq!(split_point(4), 2);
        assert_eq!(split_point(5), 4);
        assert_eq!(split_point(129), 128);
    }
}
