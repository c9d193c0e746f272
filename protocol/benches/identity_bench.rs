// Identity benchmarks for Strata.
//
// Covers Merkle roots over growing leaf counts, canonical encoding of a
// transaction, full salted transaction-ID derivation, and low-S ECDSA
// signing and verification over a transaction ID.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use strata_protocol::crypto::{ecdsa, sha256, HashAlgorithm, Keypair};
use strata_protocol::encoding::marshal_deterministic;
use strata_protocol::merkle;
use strata_protocol::transaction::{pb, Transaction};

fn sample_tx(outputs: usize) -> pb::Transaction {
    pb::Transaction {
        salt: vec![0x5a; 32],
        inputs: vec![pb::StateReference {
            txid: vec![1; 32],
            output_index: 0,
        }],
        outputs: (0..outputs)
            .map(|i| pb::State {
                info: Some(pb::StateInfo {
                    owners: vec![pb::Party {
                        public_key: vec![2; 33],
                    }],
                    kind: "coin".into(),
                }),
                state: format!("amount={i}").into_bytes(),
            })
            .collect(),
        ..Default::default()
    }
}

fn bench_merkle_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("merkle/root");

    for size in [1usize, 16, 256, 4096] {
        let leaves: Vec<Vec<u8>> = (0..size).map(|i| (i as u64).to_be_bytes().to_vec()).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &leaves, |b, leaves| {
            b.iter(|| merkle::root(HashAlgorithm::Sha256, leaves));
        });
    }

    group.finish();
}

fn bench_marshal(c: &mut Criterion) {
    let tx = sample_tx(8);

    c.bench_function("encoding/marshal_transaction", |b| {
        b.iter(|| marshal_deterministic(black_box(&tx)).unwrap());
    });
}

fn bench_transaction_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction/id");

    for outputs in [1usize, 10, 100] {
        let tx = sample_tx(outputs);

        group.throughput(Throughput::Elements(outputs as u64));
        group.bench_with_input(BenchmarkId::from_parameter(outputs), &tx, |b, tx| {
            b.iter(|| Transaction::new(HashAlgorithm::Sha256, tx.clone()).unwrap());
        });
    }

    group.finish();
}

fn bench_sign_verify(c: &mut Criterion) {
    let keypair = Keypair::generate();
    let tx = Transaction::new(HashAlgorithm::Sha256, sample_tx(1)).unwrap();
    let digest = sha256(tx.id.as_bytes());
    let signature = keypair.sign(&digest).unwrap();
    let public_key = keypair.public_key();

    c.bench_function("ecdsa/sign_txid", |b| {
        b.iter(|| keypair.sign(black_box(&digest)).unwrap());
    });
    c.bench_function("ecdsa/verify_txid", |b| {
        b.iter(|| ecdsa::verify(&public_key, &signature, black_box(&digest)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_merkle_root,
    bench_marshal,
    bench_transaction_id,
    bench_sign_verify,
);
criterion_main!(benches);
