//! A namespace: one ledger partition with its own repository and validator.
//!
//! Submitting through a namespace stores the transaction and a receipt for
//! it first, then commits by receipt. That's the path a transaction takes
//! when it was disseminated and endorsed before being applied.

use std::sync::Arc;

use tracing::debug;

use super::committer::Committer;
use super::error::{Stage, SubmitError, SubmitResult};
use crate::crypto::HashAlgorithm;
use crate::storage::Repository;
use crate::transaction::{Id, Receipt, Signed};
use crate::validator::Validator;

pub struct Namespace {
    name: String,
    hash: HashAlgorithm,
    repo: Arc<dyn Repository>,
    committer: Committer,
}

impl Namespace {
    pub fn new(
        name: impl Into<String>,
        hash: HashAlgorithm,
        repo: Arc<dyn Repository>,
        validator: Arc<dyn Validator>,
    ) -> Self {
        Self {
            name: name.into(),
            hash,
            committer: Committer::new(repo.clone(), validator),
            repo,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn committer(&self) -> &Committer {
        &self.committer
    }

    /// Stores `signed`, records a receipt for it and commits. Returns the
    /// receipt ID.
    pub fn submit(&self, signed: &Signed) -> SubmitResult<Id> {
        let tx = &signed.transaction;

        self.repo
            .put_transaction(tx)
            .map_err(|e| SubmitError::halt(Stage::Received, "failed to store transaction", e))?;

        let receipt = Receipt::new(self.hash, &tx.id, &signed.signatures)?;
        self.repo.put_receipt(&receipt).map_err(|e| {
            SubmitError::halt(Stage::Received, "failed to store transaction receipt", e)
        })?;
        debug!(namespace = %self.name, txid = %tx.id, receipt = %receipt.id, "stored receipt");

        self.committer.commit(&receipt.id)?;
        Ok(receipt.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{sha256, Keypair};
    use crate::storage::{MemoryKv, TransactionRepository};
    use crate::transaction::{pb, Party, Signature, State, StateId, StateInfo, Transaction};
    use crate::validator::SignatureValidator;

    // -- Helpers --

    fn namespace() -> (Arc<TransactionRepository>, Namespace) {
        let repo = Arc::new(TransactionRepository::new(
            Arc::new(MemoryKv::new()),
            HashAlgorithm::Sha256,
        ));
        let ns = Namespace::new(
            "payments",
            HashAlgorithm::Sha256,
            repo.clone(),
            Arc::new(SignatureValidator::new()),
        );
        (repo, ns)
    }

    fn owned_by(owner: &Keypair) -> State {
        State {
            id: StateId::new(Id::new(vec![0xcc; 32]), 0),
            info: StateInfo {
                kind: "coin".into(),
                owners: vec![Party::new(owner.public_key())],
            },
            data: b"10".to_vec(),
        }
    }

    fn spend(input: &State, salt: u8) -> Transaction {
        let tx = pb::Transaction {
            salt: vec![salt; 32],
            inputs: vec![input.id.to_pb()],
            outputs: vec![pb::State {
                info: Some(input.info.to_pb()),
                state: b"10".to_vec(),
            }],
            ..Default::default()
        };
        Transaction::new(HashAlgorithm::Sha256, tx).unwrap()
    }

    fn signed_by(tx: Transaction, key: &Keypair) -> Signed {
        let sig = key.sign(&sha256(tx.id.as_bytes())).unwrap();
        Signed::new(tx, vec![Signature::new(key.public_key(), sig)])
    }

    // -- Tests --

    #[test]
    fn submit_commits_by_receipt() {
        let (repo, ns) = namespace();
        let owner = Keypair::generate();
        let input = owned_by(&owner);
        repo.put_state(&input).unwrap();

        let signed = signed_by(spend(&input, 1), &owner);
        let receipt_id = ns.submit(&signed).unwrap();

        let receipt = repo.get_receipt(&receipt_id).unwrap();
        assert_eq!(&receipt.txid, signed.id());
        assert_eq!(receipt.signatures, signed.signatures);
        assert_eq!(repo.get_committed(signed.id()).unwrap().receipt_id, receipt_id);
        assert!(repo.get_state(&input.id, true).is_ok());
        assert_eq!(ns.name(), "payments");
    }

    #[test]
    fn unsigned_spend_is_rejected_but_stored() {
        let (repo, ns) = namespace();
        let owner = Keypair::generate();
        let input = owned_by(&owner);
        repo.put_state(&input).unwrap();

        let signed = Signed::new(spend(&input, 2), vec![]);
        let err = ns.submit(&signed).unwrap_err();

        assert!(err.is_rejected());
        assert!(err.to_string().contains("missing signature from"));
        // The transaction and receipt were recorded before commit was attempted.
        assert!(repo.get_transaction(signed.id()).is_ok());
        assert!(repo.get_committed(signed.id()).unwrap_err().is_not_found());
        assert!(repo.get_state(&input.id, false).is_ok());
    }

    #[test]
    fn wrong_signer_is_rejected() {
        let (repo, ns) = namespace();
        let owner = Keypair::generate();
        let thief = Keypair::generate();
        let input = owned_by(&owner);
        repo.put_state(&input).unwrap();

        let err = ns.submit(&signed_by(spend(&input, 3), &thief)).unwrap_err();
        assert!(err.is_rejected());
    }
}
