//! Transaction identity.
//!
//! A transaction ID is a two-level Merkle root:
//!
//! ```text
//!                          ID
//!          ┌──────────┬────┴─────┬────────────┬──────────────┐
//!       inputs   references   outputs   parameters   required_signers
//!       (fn 2)     (fn 3)     (fn 4)      (fn 5)         (fn 6)
//!        │
//!   leaf[i] = HMAC(salt; BE32(fn) || BE32(i)) || canonical(element[i])
//! ```
//!
//! The per-leaf HMAC is keyed by the transaction salt, so without the salt
//! nobody can line up equal elements across transactions or build a
//! membership proof for an element they guessed.
//!
//! The same walk also produces `encoded`: the salt and every element,
//! unsalted, each behind its own field tag. That is exactly the canonical
//! encoding of the whole message, so it can be stored and decoded with any
//! protobuf library.

use thiserror::Error;

use super::pb;
use super::types::{Id, Parameter, Party, Signature, State, StateId};
use crate::config::{ID_FIELD_NUMBERS, MIN_SALT_LENGTH, SALT_FIELD_NUMBER};
use crate::crypto::{HashAlgorithm, HashError};
use crate::encoding::wire::put_length_delimited;
use crate::encoding::{marshal_deterministic, EncodeError, ProtoMessage};
use crate::merkle;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("transaction salt is missing or less than 32 bytes in length")]
    SaltTooShort,

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error("failed to decode transaction: {0}")]
    Decode(#[from] prost::DecodeError),
}

/// A transaction together with its derived ID and canonical encoding.
///
/// Both are computed once, in [`Transaction::new`], and never change
/// afterwards. There is no way to build one without going through
/// identity derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Id,
    pub inputs: Vec<StateId>,
    pub references: Vec<StateId>,
    pub outputs: Vec<State>,
    pub parameters: Vec<Parameter>,
    pub required_signers: Vec<Party>,
    pub encoded: Vec<u8>,
    tx: pb::Transaction,
}

impl Transaction {
    pub fn new(hash: HashAlgorithm, tx: pb::Transaction) -> Result<Self, IdentityError> {
        if tx.salt.len() < MIN_SALT_LENGTH {
            return Err(IdentityError::SaltTooShort);
        }

        // Same order as ID_FIELD_NUMBERS.
        let elements: [Vec<&dyn ProtoMessage>; 5] = [
            as_messages(&tx.inputs),
            as_messages(&tx.references),
            as_messages(&tx.outputs),
            as_messages(&tx.parameters),
            as_messages(&tx.required_signers),
        ];
        let groups = ID_FIELD_NUMBERS.into_iter().zip(elements);

        let mut encoded = Vec::new();
        put_length_delimited(&mut encoded, SALT_FIELD_NUMBER, &tx.salt);

        let mut group_roots = Vec::with_capacity(ID_FIELD_NUMBERS.len());
        for (field_number, elements) in groups {
            let mut leaves = Vec::with_capacity(elements.len());
            for (index, element) in elements.into_iter().enumerate() {
                let bytes = marshal_deterministic(element)?;
                put_length_delimited(&mut encoded, field_number, &bytes);

                let mut leaf = leaf_salt(hash, &tx.salt, field_number, index as u32)?;
                leaf.extend_from_slice(&bytes);
                leaves.push(leaf);
            }
            group_roots.push(merkle::root(hash, &leaves));
        }

        let id = Id::new(merkle::root(hash, &group_roots));
        tracing::trace!(txid = %id, encoded_len = encoded.len(), "derived transaction identity");

        Ok(Self {
            inputs: tx.inputs.iter().map(StateId::from).collect(),
            references: tx.references.iter().map(StateId::from).collect(),
            outputs: tx
                .outputs
                .iter()
                .enumerate()
                .map(|(i, out)| State::from_output(&id, i as u64, out))
                .collect(),
            parameters: tx.parameters.iter().map(Parameter::from).collect(),
            required_signers: tx.required_signers.iter().map(Party::from).collect(),
            id,
            encoded,
            tx,
        })
    }

    /// Decodes a serialized transaction and derives its identity. Fields
    /// the schema doesn't know are an error rather than silently dropped.
    pub fn from_bytes(hash: HashAlgorithm, bytes: &[u8]) -> Result<Self, IdentityError> {
        let unknown = pb::unknown_field_len(bytes)?;
        if unknown > 0 {
            return Err(EncodeError::UnknownFields { len: unknown }.into());
        }
        let tx = <pb::Transaction as prost::Message>::decode(bytes)?;
        Self::new(hash, tx)
    }

    /// The wire message this transaction was built from.
    pub fn message(&self) -> &pb::Transaction {
        &self.tx
    }

    pub fn salt(&self) -> &[u8] {
        &self.tx.salt
    }
}

/// A transaction plus the signatures that came with it. The signatures are
/// not verified here.
#[derive(Debug, Clone, PartialEq)]
pub struct Signed {
    pub transaction: Transaction,
    pub signatures: Vec<Signature>,
}

impl Signed {
    pub fn new(transaction: Transaction, signatures: Vec<Signature>) -> Self {
        Self {
            transaction,
            signatures,
        }
    }

    pub fn id(&self) -> &Id {
        &self.transaction.id
    }
}

fn as_messages<M: ProtoMessage>(elements: &[M]) -> Vec<&dyn ProtoMessage> {
    elements.iter().map(|m| m as &dyn ProtoMessage).collect()
}

fn leaf_salt(
    hash: HashAlgorithm,
    salt: &[u8],
    field_number: u32,
    index: u32,
) -> Result<Vec<u8>, HashError> {
    hash.hmac(salt, &[&field_number.to_be_bytes(), &index.to_be_bytes()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmac::{Hmac, Mac};
    use prost::Message;
    use sha2::{Digest, Sha256};

    // -- Helpers --

    const SALT: &[u8] = b"NaCl - abcdefghijklmnopqrstuvwxyz";

    fn reference(txid: &str, index: u64) -> pb::StateReference {
        pb::StateReference {
            txid: txid.as_bytes().to_vec(),
            output_index: index,
        }
    }

    fn two_inputs() -> pb::Transaction {
        pb::Transaction {
            salt: SALT.to_vec(),
            inputs: vec![reference("input-transaction-id-0", 1), reference("input-transaction-id-1", 0)],
            ..Default::default()
        }
    }

    fn full() -> pb::Transaction {
        pb::Transaction {
            salt: vec![0x5a; 32],
            inputs: vec![reference("in", 0)],
            references: vec![reference("ref", 4)],
            outputs: vec![pb::State {
                info: Some(pb::StateInfo {
                    owners: vec![pb::Party {
                        public_key: vec![2; 33],
                    }],
                    kind: "token".into(),
                }),
                state: b"100".to_vec(),
            }],
            parameters: vec![pb::Parameter {
                name: "fee".into(),
                value: vec![1],
            }],
            required_signers: vec![pb::Party {
                public_key: vec![3; 33],
            }],
        }
    }

    fn state(kind: &str, data: &str) -> pb::State {
        pb::State {
            info: Some(pb::StateInfo {
                kind: kind.into(),
                owners: vec![
                    pb::Party {
                        public_key: b"owner-1".to_vec(),
                    },
                    pb::Party {
                        public_key: b"owner-2".to_vec(),
                    },
                ],
            }),
            state: data.as_bytes().to_vec(),
        }
    }

    /// Every group populated with two elements.
    fn golden() -> pb::Transaction {
        pb::Transaction {
            salt: SALT.to_vec(),
            inputs: vec![reference("input-transaction-id-0", 1), reference("input-transaction-id-1", 0)],
            references: vec![reference("ref-transaction-id-0", 1), reference("ref-transaction-id-1", 0)],
            outputs: vec![state("state-kind-0", "state-0"), state("state-kind-1", "state-1")],
            parameters: vec![
                pb::Parameter {
                    name: "name-0".into(),
                    value: b"value-0".to_vec(),
                },
                pb::Parameter {
                    name: "name-1".into(),
                    value: b"value-1".to_vec(),
                },
            ],
            required_signers: vec![
                pb::Party {
                    public_key: b"observer-1".to_vec(),
                },
                pb::Party {
                    public_key: b"observer-2".to_vec(),
                },
            ],
        }
    }

    fn counting_salt() -> Vec<u8> {
        (0u8..32).collect()
    }

    fn sha(data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }

    fn mth(leaves: &[Vec<u8>]) -> Vec<u8> {
        match leaves.len() {
            0 => sha(b""),
            1 => sha(&[&[0u8][..], &leaves[0][..]].concat()),
            n => {
                let k = n.next_power_of_two() / 2;
                let (l, r) = (mth(&leaves[..k]), mth(&leaves[k..]));
                sha(&[&[1u8][..], &l[..], &r[..]].concat())
            }
        }
    }

    fn hmac_sha256(key: &[u8], fn_: u32, idx: u32) -> Vec<u8> {
        let mut mac = Hmac::<Sha256>::new_from_slice(key).unwrap();
        mac.update(&fn_.to_be_bytes());
        mac.update(&idx.to_be_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    // -- Tests --

    #[test]
    fn encoded_matches_prost() {
        let tx = full();
        let t = Transaction::new(HashAlgorithm::Sha256, tx.clone()).unwrap();
        assert_eq!(t.encoded, tx.encode_to_vec());

        let t = Transaction::new(HashAlgorithm::Sha256, two_inputs()).unwrap();
        assert_eq!(t.encoded, two_inputs().encode_to_vec());
    }

    #[test]
    fn id_matches_first_principles() {
        let t = Transaction::new(HashAlgorithm::Sha256, two_inputs()).unwrap();

        let input_leaves: Vec<Vec<u8>> = two_inputs()
            .inputs
            .iter()
            .enumerate()
            .map(|(i, r)| [hmac_sha256(SALT, 2, i as u32), r.encode_to_vec()].concat())
            .collect();
        let empty = sha(b"");
        let groups = vec![mth(&input_leaves), empty.clone(), empty.clone(), empty.clone(), empty];

        assert_eq!(t.id.as_bytes(), mth(&groups).as_slice());
    }

    #[test]
    fn golden_ids() {
        let changed_salt = pb::Transaction {
            salt: counting_salt(),
            ..golden()
        };
        let salted_empty = pb::Transaction {
            salt: counting_salt(),
            ..Default::default()
        };
        let empty_signers = pb::Transaction {
            required_signers: Vec::new(),
            ..golden()
        };
        let mut nil_input = golden();
        nil_input.inputs[0] = pb::StateReference::default();
        let mut long_key = golden();
        if let Some(info) = long_key.outputs[0].info.as_mut() {
            info.owners[0].public_key = counting_salt().repeat(3);
        }

        let cases = [
            ("happy", golden(), "74ab83202b777ab9f27931fd76827cb848048e3abd70d2718cf1b60ed740bd89"),
            ("changed salt", changed_salt, "2b28f98d9ee6806fea1942ae130a6c75b8f9bf5a6ace24695f4a25e021a9af53"),
            ("salted empty", salted_empty, "38955e69c8db8963b3513c17631aebcf224c9c77017992dfe35a6dbba54b60a8"),
            ("empty signers", empty_signers, "6c8847e9e9cd65a88e17116599d47ed0c521f4cc3fd8696bda2e41b1bb10733a"),
            ("nil input", nil_input, "c85b907ec17ab566b36147964b65122e8468ea7944a0c40015552f17bb21a1f5"),
            ("long key", long_key, "bbecd8c2a804b25788f70cbe13aaca8c5d63b777a947d81cce15e853304e2ee0"),
        ];
        for (name, tx, expected) in cases {
            let t = Transaction::new(HashAlgorithm::Sha256, tx.clone()).unwrap();
            assert_eq!(hex::encode(t.id.as_bytes()), expected, "{name}");
            assert_eq!(t.encoded, tx.encode_to_vec(), "{name}");
        }
    }

    #[test]
    fn id_is_stable_across_runs() {
        let a = Transaction::new(HashAlgorithm::Sha256, two_inputs()).unwrap();
        let b = Transaction::new(HashAlgorithm::Sha256, two_inputs()).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.as_bytes().len(), 32);
    }

    #[test]
    fn salt_changes_id() {
        let a = Transaction::new(HashAlgorithm::Sha256, full()).unwrap();
        let mut other = full();
        other.salt[31] ^= 0xff;
        let b = Transaction::new(HashAlgorithm::Sha256, other).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn short_salt_is_rejected() {
        let tx = pb::Transaction {
            salt: vec![1; 31],
            ..Default::default()
        };
        let err = Transaction::new(HashAlgorithm::Sha256, tx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "transaction salt is missing or less than 32 bytes in length"
        );

        let err = Transaction::new(HashAlgorithm::Sha256, pb::Transaction::default()).unwrap_err();
        assert!(matches!(err, IdentityError::SaltTooShort));
    }

    #[test]
    fn nil_element_is_well_defined() {
        let mut with_nil = two_inputs();
        with_nil.inputs.insert(1, pb::StateReference::default());

        let base = Transaction::new(HashAlgorithm::Sha256, two_inputs()).unwrap();
        let a = Transaction::new(HashAlgorithm::Sha256, with_nil.clone()).unwrap();
        let b = Transaction::new(HashAlgorithm::Sha256, with_nil).unwrap();

        assert_ne!(a.id, base.id);
        assert_eq!(a.id, b.id);
        assert_eq!(a.inputs[1], StateId::new(Id::default(), 0));
    }

    #[test]
    fn reordering_elements_changes_id() {
        let mut swapped = two_inputs();
        swapped.inputs.swap(0, 1);
        let a = Transaction::new(HashAlgorithm::Sha256, two_inputs()).unwrap();
        let b = Transaction::new(HashAlgorithm::Sha256, swapped).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn hash_algorithm_is_threaded_through() {
        let a = Transaction::new(HashAlgorithm::Sha256, full()).unwrap();
        let b = Transaction::new(HashAlgorithm::Sha384, full()).unwrap();
        assert_eq!(b.id.as_bytes().len(), 48);
        assert_eq!(a.encoded, b.encoded);
    }

    #[test]
    fn from_bytes_round_trip() {
        let t = Transaction::new(HashAlgorithm::Sha256, full()).unwrap();
        let back = Transaction::from_bytes(HashAlgorithm::Sha256, &t.encoded).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.message(), &full());
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        let err = Transaction::from_bytes(HashAlgorithm::Sha256, &[0x0a, 0x05, 0x01]).unwrap_err();
        assert!(matches!(err, IdentityError::Decode(_)));
    }

    #[test]
    fn from_bytes_rejects_unknown_fields() {
        let mut input = reference("input-transaction-id-0", 1).encode_to_vec();
        input.extend_from_slice(&[0x3A, 0x07]);
        input.extend_from_slice(b"garbage");

        let mut raw = Vec::new();
        put_length_delimited(&mut raw, 1, SALT);
        put_length_delimited(&mut raw, 2, &input);

        // prost alone would accept this and drop field 7.
        assert!(pb::Transaction::decode(raw.as_slice()).is_ok());

        let err = Transaction::from_bytes(HashAlgorithm::Sha256, &raw).unwrap_err();
        assert!(matches!(
            err,
            IdentityError::Encode(EncodeError::UnknownFields { len: 9 })
        ));
        assert_eq!(
            err.to_string(),
            "refusing to marshal unknown fields with length 9"
        );
    }

    #[test]
    fn outputs_are_addressed_by_txid() {
        let t = Transaction::new(HashAlgorithm::Sha256, full()).unwrap();
        assert_eq!(t.outputs.len(), 1);
        assert_eq!(t.outputs[0].id, StateId::new(t.id.clone(), 0));
        assert_eq!(t.outputs[0].info.kind, "token");
        assert_eq!(t.required_signers, vec![Party::new(vec![3; 33])]);
    }
}
