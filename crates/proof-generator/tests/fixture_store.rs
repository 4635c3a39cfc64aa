mod common;

use proof_generator::{
    BlockSelector, FixtureError, FixtureStore, ProofError, ProofLayout, ProofTarget,
};
use serde_json::json;

use common::*;

#[tokio::test]
async fn test_record_from_rpc() {
    let source = load_fixtures();
    let rpc = FixtureRpc::new(source.clone(), BLOCK_B0FA43);
    let mixed_case = format!("0x{}:0x0,0x2", HOLDER_A[2..].to_uppercase());
    let targets: Vec<ProofTarget> = vec![
        mixed_case.parse().unwrap(),
        fixture_target(HOLDER_B).parse().unwrap(),
    ];

    let mut store = FixtureStore::new();
    let number = store
        .record(&rpc, BlockSelector::Latest, &targets)
        .await
        .unwrap();

    assert_eq!(number, BLOCK_B0FA43);
    assert_eq!(store.block_numbers().collect::<Vec<_>>(), vec![BLOCK_B0FA43]);
    assert_eq!(store.block(BLOCK_B0FA43), source.block(BLOCK_B0FA43));
    assert_eq!(
        store.holders(BLOCK_B0FA43).collect::<Vec<_>>(),
        vec![HOLDER_A, HOLDER_B]
    );
    assert_eq!(
        store.proofs(BLOCK_B0FA43, HOLDER_A),
        source.proofs(BLOCK_B0FA43, HOLDER_A)
    );
    assert_eq!(
        rpc.proof_blocks(),
        vec![BlockSelector::Number(BLOCK_B0FA43); 2]
    );

    // The recorded store serves the same blobs as the one it was recorded from.
    assert_eq!(
        store
            .serialized_proofs(BLOCK_B0FA43, HOLDER_A, ProofLayout::Grouped)
            .unwrap(),
        source
            .serialized_proofs(BLOCK_B0FA43, HOLDER_A, ProofLayout::Grouped)
            .unwrap()
    );
}

#[tokio::test]
async fn test_record_forged_header_stores_nothing() {
    let mut source = load_fixtures();
    let mut block = source.block(BLOCK_B0FA43).unwrap().clone();
    block["hash"] = json!(flip_last_bit(block["hash"].as_str().unwrap()));
    source.insert_block(BLOCK_B0FA43, block);
    let rpc = FixtureRpc::new(source, BLOCK_B0FA43);

    let mut store = FixtureStore::new();
    let target: ProofTarget = fixture_target(HOLDER_A).parse().unwrap();
    let err = store
        .record(&rpc, BlockSelector::Number(BLOCK_B0FA43), &[target])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FixtureError::Proof(ProofError::HeaderIntegrity { .. })
    ));
    assert_eq!(rpc.proof_calls(), 0);
    assert_eq!(store, FixtureStore::new());
}

#[tokio::test]
async fn test_record_failed_proof_stores_nothing() {
    let rpc = FixtureRpc::new(load_fixtures(), BLOCK_B0FA43).failing(HOLDER_B);
    let targets: Vec<ProofTarget> = [HOLDER_A, HOLDER_B]
        .iter()
        .map(|holder| fixture_target(holder).parse().unwrap())
        .collect();

    let mut store = FixtureStore::new();
    let err = store
        .record(&rpc, BlockSelector::Latest, &targets)
        .await
        .unwrap_err();

    match err {
        FixtureError::Proof(ProofError::ProofFetch { address, .. }) => {
            assert_eq!(address, HOLDER_B)
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(rpc.proof_calls(), 2);
    assert_eq!(store, FixtureStore::new());
}
