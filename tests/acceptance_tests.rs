//! Acceptance-controller tests: tip extension, rejection rollback, side
//! branches, and chain-switch requests.

mod common;

use std::sync::Arc;

use common::*;

use chain_commit::*;

#[test]
fn tip_extension_commits_and_advances() {
    let mut h = harness();
    let funding = seed_utxo(&h.ledger, 1, 1000);
    let cb = coinbase(&[get_block_subsidy(1)], 1);
    let tx = spend(&[funding], &[600], &[0x51]);
    let cb_out = OutPoint {
        hash: cb.hash,
        index: 0,
    };
    let mut block = build_block(&h.genesis, 1, vec![cb, tx]);
    let hash = block.hash();

    h.chain.accept_block(&mut block).unwrap();

    assert_eq!(h.chain.tip(), hash);
    assert_eq!(h.chain.tip_height(), 1);
    assert!(block.trusted);

    // Ledger reflects the delta.
    assert!(h.ledger.lookup(&funding).is_none());
    let record = h.ledger.lookup(&cb_out).unwrap();
    assert_eq!(record.value, get_block_subsidy(1));
    assert_eq!(record.height, 1);

    // Persisted as trusted and flushed once.
    let appended = h.store.appended.lock().unwrap();
    assert_eq!(appended.as_slice(), &[(1, hash, true)]);
    assert_eq!(*h.store.flushes.lock().unwrap(), 1);
}

#[test]
fn rejected_block_rolls_the_index_back() {
    let mut h = harness();
    let funding = seed_utxo(&h.ledger, 1, 1000);
    let cb = coinbase(&[get_block_subsidy(1)], 1);
    // Spends the same output twice.
    let tx = spend(&[funding, funding], &[100], &[0x51]);
    let mut block = build_block(&h.genesis, 1, vec![cb, tx]);

    let err = h.chain.accept_block(&mut block).unwrap_err();
    assert!(matches!(err, CommitError::DoubleSpend(_)));

    // Tip, index, ledger, and store are untouched.
    assert_eq!(h.chain.tip(), h.genesis);
    assert_eq!(h.chain.tip_height(), 0);
    assert_eq!(h.ledger.len(), 1);
    assert!(h.store.appended.lock().unwrap().is_empty());
    assert_eq!(*h.store.flushes.lock().unwrap(), 0);

    // The same chain still accepts a valid block afterwards.
    let mut good = build_block(&h.genesis, 1, vec![coinbase(&[get_block_subsidy(1)], 2)]);
    h.chain.accept_block(&mut good).unwrap();
    assert_eq!(h.chain.tip_height(), 1);
}

#[test]
fn sequential_blocks_extend_the_chain() {
    let mut h = harness();
    let mut parent = h.genesis;
    for height in 1..=5u64 {
        let mut block = build_block(
            &parent,
            height as u32,
            vec![coinbase(&[get_block_subsidy(height)], height as u8)],
        );
        let hash = block.hash();
        h.chain.accept_block(&mut block).unwrap();
        assert_eq!(h.chain.tip(), hash);
        assert_eq!(h.chain.tip_height(), height);
        parent = hash;
    }
    assert_eq!(h.store.appended.lock().unwrap().len(), 5);
    // One coinbase output per block.
    assert_eq!(h.ledger.len(), 5);
}

#[test]
fn equal_height_side_branch_is_stored_without_switching() {
    let mut h = harness();
    let mut tip_block = build_block(&h.genesis, 1, vec![coinbase(&[get_block_subsidy(1)], 1)]);
    h.chain.accept_block(&mut tip_block).unwrap();
    let tip = h.chain.tip();

    // Same parent, different coinbase: a competing height-1 block.
    let mut rival = build_block(&h.genesis, 2, vec![coinbase(&[get_block_subsidy(1)], 2)]);
    let rival_hash = rival.hash();
    h.chain.accept_block(&mut rival).unwrap();

    assert_eq!(h.chain.tip(), tip);
    assert!(!rival.trusted);
    assert!(h.reorg.switches.lock().unwrap().is_empty());

    // Stored uncommitted: no extra flush, appended without the trusted flag.
    let appended = h.store.appended.lock().unwrap();
    assert_eq!(appended.len(), 2);
    assert_eq!(appended[1], (1, rival_hash, false));
}

#[test]
fn taller_side_branch_requests_one_chain_switch() {
    let mut h = harness();
    let mut tip_block = build_block(&h.genesis, 1, vec![coinbase(&[get_block_subsidy(1)], 1)]);
    h.chain.accept_block(&mut tip_block).unwrap();
    let tip = h.chain.tip();

    let mut rival = build_block(&h.genesis, 2, vec![coinbase(&[get_block_subsidy(1)], 2)]);
    let rival_hash = rival.hash();
    h.chain.accept_block(&mut rival).unwrap();

    // The rival's child overtakes the tip.
    let mut child = build_block(&rival_hash, 3, vec![coinbase(&[get_block_subsidy(2)], 3)]);
    let child_hash = child.hash();
    h.chain.accept_block(&mut child).unwrap();

    // Tip unchanged; exactly one switch request, naming the branch head.
    assert_eq!(h.chain.tip(), tip);
    assert_eq!(h.chain.tip_height(), 1);
    assert_eq!(h.reorg.switches.lock().unwrap().as_slice(), &[child_hash]);

    // Side-branch commitment never touched the ledger.
    assert_eq!(h.ledger.len(), 1);
}

#[test]
fn do_not_sync_defers_flushing() {
    let genesis_block = Block::new(Block::header_bytes(1, &[0; 32], &[0; 32], 0, 0, 0), vec![]);
    let store = Arc::new(RecordingStore::default());
    let mut chain = Chain::new(
        genesis_block.hash(),
        genesis_block.header,
        Arc::new(MemoryLedger::new()),
        store.clone(),
        Arc::new(MarkerVerifier),
        Arc::new(CountingReorg::default()),
        ChainConfig {
            verify_workers: 2,
            do_not_sync: true,
        },
    );

    let mut block = build_block(
        &genesis_block.hash(),
        1,
        vec![coinbase(&[get_block_subsidy(1)], 1)],
    );
    chain.accept_block(&mut block).unwrap();

    assert_eq!(store.appended.lock().unwrap().len(), 1);
    assert_eq!(*store.flushes.lock().unwrap(), 0);
}

#[test]
#[should_panic(expected = "parent block not in index")]
fn unknown_parent_panics() {
    let mut h = harness();
    let mut orphan = build_block(&[0x42; 32], 1, vec![coinbase(&[get_block_subsidy(1)], 1)]);
    let _ = h.chain.accept_block(&mut orphan);
}
