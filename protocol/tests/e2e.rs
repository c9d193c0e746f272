//! End-to-end integration tests for Strata.
//!
//! These run the whole path a transaction takes on a single node: salted
//! identity, signing, submission through a namespace, commit, and ordering
//! through the in-process sequencer, all on a sled database in a temporary
//! directory. Each test opens its own database.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use strata_protocol::crypto::{sha256, HashAlgorithm, Keypair};
use strata_protocol::storage::{LedgerDb, Repository, TransactionRepository};
use strata_protocol::submit::{Namespace, SubmitError};
use strata_protocol::totalorder::{InProcessSequencer, TotalOrderStore, TxIdAndHmac};
use strata_protocol::transaction::{
    pb, Id, Party, Signature, Signed, State, StateId, StateInfo, Transaction,
};
use strata_protocol::validator::SignatureValidator;

const HASH: HashAlgorithm = HashAlgorithm::Sha256;
const NAMESPACE_KEY: &[u8] = b"e2e-namespace-key";

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

struct Node {
    _dir: tempfile::TempDir,
    db: LedgerDb,
    repo: Arc<TransactionRepository>,
    namespace: Namespace,
}

fn open_node(dir: tempfile::TempDir) -> Node {
    let db = LedgerDb::open(dir.path()).expect("open db");
    let repo = Arc::new(TransactionRepository::new(Arc::new(db.ledger()), HASH));
    let namespace = Namespace::new("e2e", HASH, repo.clone(), Arc::new(SignatureValidator::new()));
    Node {
        _dir: dir,
        db,
        repo,
        namespace,
    }
}

fn node() -> Node {
    open_node(tempfile::tempdir().expect("tempdir"))
}

/// A genesis-style transaction: no inputs, one output owned by `owner`.
fn issue(owner: &Keypair, salt: u8, amount: &[u8]) -> Transaction {
    let tx = pb::Transaction {
        salt: vec![salt; 32],
        outputs: vec![pb::State {
            info: Some(pb::StateInfo {
                owners: vec![pb::Party {
                    public_key: owner.public_key(),
                }],
                kind: "coin".into(),
            }),
            state: amount.to_vec(),
        }],
        ..Default::default()
    };
    Transaction::new(HASH, tx).expect("identity")
}

/// Spends `input` into a new output owned by `to`.
fn transfer(input: &State, to: &Keypair, salt: u8) -> Transaction {
    let tx = pb::Transaction {
        salt: vec![salt; 32],
        inputs: vec![input.id.to_pb()],
        outputs: vec![pb::State {
            info: Some(pb::StateInfo {
                owners: vec![pb::Party {
                    public_key: to.public_key(),
                }],
                kind: input.info.kind.clone(),
            }),
            state: input.data.clone(),
        }],
        ..Default::default()
    };
    Transaction::new(HASH, tx).expect("identity")
}

fn sign(tx: Transaction, keys: &[&Keypair]) -> Signed {
    let digest = sha256(tx.id.as_bytes());
    let signatures = keys
        .iter()
        .map(|k| Signature::new(k.public_key(), k.sign(&digest).expect("sign")))
        .collect();
    Signed::new(tx, signatures)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn issue_then_transfer_through_namespace() {
    let node = node();
    let alice = Keypair::generate();
    let bob = Keypair::generate();

    let genesis = sign(issue(&alice, 1, b"100"), &[]);
    node.namespace.submit(&genesis).expect("genesis commits");
    let coin = node
        .repo
        .get_state(&StateId::new(genesis.id().clone(), 0), false)
        .expect("coin is live");
    assert_eq!(coin.info.owners, vec![Party::new(alice.public_key())]);

    let pay = sign(transfer(&coin, &bob, 2), &[&alice]);
    let receipt_id = node.namespace.submit(&pay).expect("transfer commits");

    assert!(node.repo.get_state(&coin.id, false).unwrap_err().is_not_found());
    assert_eq!(node.repo.get_state(&coin.id, true).unwrap(), coin);

    let out = node
        .repo
        .get_state(&StateId::new(pay.id().clone(), 0), false)
        .unwrap();
    assert_eq!(out.info.owners, vec![Party::new(bob.public_key())]);
    assert_eq!(out.data, b"100");
    assert_eq!(
        node.repo.get_committed(pay.id()).unwrap().receipt_id,
        receipt_id
    );
}

#[test]
fn spend_by_wrong_key_is_rejected() {
    let node = node();
    let alice = Keypair::generate();
    let mallory = Keypair::generate();

    let genesis = sign(issue(&alice, 1, b"5"), &[]);
    node.namespace.submit(&genesis).unwrap();
    let coin = node
        .repo
        .get_state(&StateId::new(genesis.id().clone(), 0), false)
        .unwrap();

    let theft = sign(transfer(&coin, &mallory, 3), &[&mallory]);
    let err = node.namespace.submit(&theft).unwrap_err();
    assert!(err.is_rejected(), "{err}");
    assert!(err.to_string().contains("missing signature from"));

    assert_eq!(node.repo.get_state(&coin.id, false).unwrap(), coin);
    assert!(node.repo.get_committed(theft.id()).unwrap_err().is_not_found());
}

#[test]
fn double_spend_reports_missing_state() {
    let node = node();
    let alice = Keypair::generate();
    let bob = Keypair::generate();

    let genesis = sign(issue(&alice, 1, b"5"), &[]);
    node.namespace.submit(&genesis).unwrap();
    let coin = node
        .repo
        .get_state(&StateId::new(genesis.id().clone(), 0), false)
        .unwrap();

    node.namespace
        .submit(&sign(transfer(&coin, &bob, 4), &[&alice]))
        .unwrap();

    let again = sign(transfer(&coin, &alice, 5), &[&alice]);
    match node.namespace.submit(&again).unwrap_err() {
        SubmitError::MissingState { txid, source } => {
            assert_eq!(&txid, again.id());
            assert!(source.is_not_found());
        }
        other => panic!("expected missing state, got {other}"),
    }
}

#[test]
fn resubmitting_the_same_transaction_already_exists() {
    let node = node();
    let alice = Keypair::generate();
    let genesis = sign(issue(&alice, 6, b"1"), &[]);

    node.namespace.committer().submit(&genesis).unwrap();
    let err = node.namespace.committer().submit(&genesis).unwrap_err();
    assert!(err.is_already_exists());
}

#[test]
fn ledger_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();
    let alice = Keypair::generate();

    let genesis = sign(issue(&alice, 7, b"42"), &[]);
    {
        let db = LedgerDb::open(&path).unwrap();
        let repo = TransactionRepository::new(Arc::new(db.ledger()), HASH);
        Namespace::new("e2e", HASH, Arc::new(repo), Arc::new(SignatureValidator::new()))
            .submit(&genesis)
            .unwrap();
        db.flush().unwrap();
    }

    let node = open_node(dir);
    let tx = node.repo.get_transaction(genesis.id()).unwrap();
    assert_eq!(&tx, &genesis.transaction);
    assert_eq!(
        node.repo
            .get_state(&StateId::new(genesis.id().clone(), 0), false)
            .unwrap()
            .data,
        b"42"
    );
}

#[tokio::test]
async fn committed_transactions_are_sequenced_in_order() {
    let node = node();
    let store = Arc::new(
        TotalOrderStore::open(Arc::new(node.db.total_order()), HASH).expect("open total order"),
    );
    let sequencer = InProcessSequencer::start(store.clone());
    let cancel = CancellationToken::new();
    let alice = Keypair::generate();

    let mut ids: Vec<Id> = Vec::new();
    for salt in 10..14 {
        let signed = sign(issue(&alice, salt, b"1"), &[]);
        node.namespace.submit(&signed).unwrap();
        let entry = TxIdAndHmac::for_namespace(HASH, NAMESPACE_KEY, signed.id()).unwrap();
        sequencer.broadcast(&cancel, entry).await.unwrap();
        ids.push(signed.id().clone());
    }

    for (seq, id) in ids.iter().enumerate() {
        let entry = sequencer.deliver(&cancel, seq as u64).await.unwrap();
        assert_eq!(entry.id, id.as_bytes());
        let expected = TxIdAndHmac::for_namespace(HASH, NAMESPACE_KEY, id).unwrap();
        assert_eq!(entry, expected);
    }

    sequencer.shutdown().await;
    assert_eq!(store.next_sequence(), 4);
}

#[tokio::test]
async fn total_order_recovers_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    let entries: Vec<TxIdAndHmac> = (0u8..3)
        .map(|i| TxIdAndHmac::new(vec![i; 32], vec![i.wrapping_add(100); 32]))
        .collect();

    let accumulator = {
        let db = LedgerDb::open(dir.path()).unwrap();
        let store = Arc::new(TotalOrderStore::open(Arc::new(db.total_order()), HASH).unwrap());
        let sequencer = InProcessSequencer::start(store.clone());
        for entry in &entries {
            sequencer.broadcast(&cancel, entry.clone()).await.unwrap();
        }
        sequencer.deliver(&cancel, 2).await.unwrap();
        sequencer.shutdown().await;
        db.flush().unwrap();
        store.accumulator()
    };

    let db = LedgerDb::open(dir.path()).unwrap();
    let store = Arc::new(TotalOrderStore::open(Arc::new(db.total_order()), HASH).unwrap());
    assert_eq!(store.next_sequence(), 3);
    assert_eq!(store.accumulator(), accumulator);
    for (seq, entry) in entries.iter().enumerate() {
        assert_eq!(&store.get(&cancel, seq as u64).await.unwrap(), entry);
    }

    let sequencer = InProcessSequencer::start(store.clone());
    let next = TxIdAndHmac::new(vec![7; 32], vec![8; 32]);
    sequencer.broadcast(&cancel, next.clone()).await.unwrap();
    assert_eq!(sequencer.deliver(&cancel, 3).await.unwrap(), next);
    sequencer.shutdown().await;
}

#[test]
fn state_info_round_trips_through_storage() {
    let node = node();
    let state = State {
        id: StateId::new(Id::new(vec![0x5a; 32]), 1),
        info: StateInfo {
            kind: "deed".into(),
            owners: vec![Party::new(vec![2; 33]), Party::new(vec![3; 33])],
        },
        data: b"lot 12".to_vec(),
    };
    node.repo.put_state(&state).unwrap();
    assert_eq!(node.repo.get_state(&state.id, false).unwrap(), state);
}
