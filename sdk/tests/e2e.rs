//! End-to-end tests for the transfer lifecycle.
//!
//! Build, freeze, sign, execute, fetch the receipt, all against the scripted
//! ledger in `common`. The ledger also records every request, so the tests
//! can check what actually went over the wire.

mod common;

use common::{client, operator_key, MockLedger, Reply, OPERATOR};

use hiero_sdk::wire::{self, OperationBody, TransactionBody};
use hiero_sdk::{
    AccountBalanceQuery, AccountId, Error, PrivateKey, Status, TokenId, TransactionId, TransferTransaction,
};

const ALICE: AccountId = AccountId::new(0, 0, 1001);
const BOB: AccountId = AccountId::new(0, 0, 1002);
const TOKEN: TokenId = TokenId::new(0, 0, 5005);

fn transfer() -> TransferTransaction {
    TransferTransaction::new()
        .add_hbar_transfer(ALICE, -500)
        .unwrap()
        .add_hbar_transfer(BOB, 500)
        .unwrap()
        .add_token_transfer(TOKEN, ALICE, -100)
        .unwrap()
        .add_token_transfer(TOKEN, BOB, 100)
        .unwrap()
        .memo("e2e")
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn transfer_lifecycle() {
    let ledger = MockLedger::new();
    let client = client(&ledger, 3);
    let alice_key = PrivateKey::from_bytes(&[1u8; 32]);

    let mut tx = transfer()
        .node_account_ids(vec![AccountId::new(0, 0, 3)])
        .unwrap()
        .freeze_with(&client)
        .unwrap()
        .sign(&alice_key);

    let response = tx.execute(&client).await.unwrap();
    assert_eq!(response.node_id, AccountId::new(0, 0, 3));
    assert_eq!(response.transaction_id.account_id, OPERATOR);
    assert_eq!(response.hash.len(), 48);
    assert_eq!(response.hash_hex().len(), 96);

    let receipt = response.get_receipt(&client).await.unwrap();
    assert_eq!(receipt.status, Status::Success);
    assert_eq!(receipt.transaction_id, response.transaction_id);

    // One submission then one receipt query, both to the accepting node.
    assert_eq!(ledger.nodes_called(), vec![3, 3]);

    let calls = ledger.calls();
    let signed = calls[0].submitted().unwrap();
    let body: TransactionBody = wire::decode(&signed.body_bytes).unwrap();
    assert_eq!(body.memo, "e2e");
    assert_eq!(body.transaction_fee, 100_000_000);
    assert_eq!(body.node_account_id, AccountId::new(0, 0, 3));
    assert_eq!(TransactionId::from_wire(&body.transaction_id).unwrap(), response.transaction_id);

    let OperationBody::CryptoTransfer(transfer) = body.operation;
    assert_eq!(transfer.transfers.len(), 2);
    assert_eq!(transfer.transfers.iter().map(|t| t.amount).sum::<i64>(), 0);
    assert_eq!(transfer.token_transfers.len(), 1);
    assert_eq!(transfer.token_transfers[0].token, TOKEN);
    assert_eq!(transfer.token_transfers[0].transfers.len(), 2);
    assert_eq!(transfer.token_transfers[0].transfers.iter().map(|t| t.amount).sum::<i64>(), 0);

    // Alice signed explicitly, the operator was added at execute.
    assert_eq!(signed.sig_map.len(), 2);
    for pair in &signed.sig_map {
        let key = hiero_sdk::PublicKey::from_bytes(pair.public_key).unwrap();
        let signature = hiero_sdk::Signature::from_bytes(pair.signature.clone().try_into().unwrap());
        assert!(key.verify(&signed.body_bytes, &signature));
    }
    assert!(tx.contains(&operator_key().public_key()));
    assert!(tx.contains(&alice_key.public_key()));
}

#[tokio::test(start_paused = true)]
async fn failed_receipt_surfaces_the_status() {
    let ledger = MockLedger::new();
    ledger.script(3, [Reply::Precheck(Status::Ok), Reply::Receipt(Status::InsufficientAccountBalance)]);
    let client = client(&ledger, 1);

    let mut tx = transfer().freeze_with(&client).unwrap();
    let response = tx.execute(&client).await.unwrap();
    let err = response.get_receipt(&client).await.unwrap_err();

    match err {
        Error::ReceiptStatus { status, transaction_id } => {
            assert_eq!(status, Status::InsufficientAccountBalance);
            assert_eq!(transaction_id, response.transaction_id);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn receipt_polls_until_consensus() {
    let ledger = MockLedger::new();
    ledger.script(
        3,
        [
            Reply::Precheck(Status::Ok),
            Reply::Precheck(Status::ReceiptNotFound),
            Reply::Receipt(Status::Unknown),
            Reply::Receipt(Status::Success),
        ],
    );
    let client = client(&ledger, 1);

    let mut tx = transfer().freeze_with(&client).unwrap();
    let receipt = tx.execute(&client).await.unwrap().get_receipt(&client).await.unwrap();
    assert_eq!(receipt.status, Status::Success);
    assert_eq!(ledger.calls().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn permanent_precheck_is_reported_with_transaction_id() {
    let ledger = MockLedger::new();
    ledger.script(3, [Reply::Precheck(Status::InsufficientPayerBalance)]);
    let client = client(&ledger, 1);

    let mut tx = transfer().freeze_with(&client).unwrap();
    let err = tx.execute(&client).await.unwrap_err();
    match err {
        Error::Precheck { status, transaction_id, node, attempts } => {
            assert_eq!(status, Status::InsufficientPayerBalance);
            assert_eq!(transaction_id, Some(tx.transaction_id()));
            assert_eq!(node, AccountId::new(0, 0, 3));
            assert_eq!(attempts, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn expired_transaction_is_not_retried() {
    let ledger = MockLedger::new();
    ledger.script(3, [Reply::Precheck(Status::TransactionExpired)]);
    let client = client(&ledger, 3);

    let mut tx = transfer()
        .node_account_ids(vec![AccountId::new(0, 0, 3), AccountId::new(0, 0, 4)])
        .unwrap()
        .freeze_with(&client)
        .unwrap();
    let err = tx.execute(&client).await.unwrap_err();
    assert!(matches!(err, Error::Expired { status: Status::TransactionExpired, attempts: 1, .. }));
    assert_eq!(ledger.nodes_called(), vec![3]);
}

#[tokio::test(start_paused = true)]
async fn retries_resend_the_same_content() {
    let ledger = MockLedger::new();
    ledger.script(3, [Reply::Precheck(Status::Busy)]);
    let client = client(&ledger, 2);

    let mut tx = transfer()
        .node_account_ids(vec![AccountId::new(0, 0, 3), AccountId::new(0, 0, 4)])
        .unwrap()
        .freeze_with(&client)
        .unwrap();
    let response = tx.execute(&client).await.unwrap();
    assert_eq!(response.node_id, AccountId::new(0, 0, 4));

    let calls = ledger.calls();
    let first: TransactionBody = wire::decode(&calls[0].submitted().unwrap().body_bytes).unwrap();
    let second: TransactionBody = wire::decode(&calls[1].submitted().unwrap().body_bytes).unwrap();
    assert_eq!(first.node_account_id, AccountId::new(0, 0, 3));
    assert_eq!(second.node_account_id, AccountId::new(0, 0, 4));
    assert_eq!(TransactionBody { node_account_id: first.node_account_id, ..second }, first);
}

#[tokio::test(start_paused = true)]
async fn unsigned_transaction_without_operator_is_refused() {
    let ledger = MockLedger::new();
    let network = hiero_sdk::Network::from_addresses(&["10.0.0.1:50211"]).unwrap();
    let bare = hiero_sdk::Client::with_transport(network, ledger.clone());

    let mut tx = transfer()
        .transaction_id(TransactionId::generate(ALICE))
        .freeze_with(&bare)
        .unwrap();
    assert!(matches!(tx.execute(&bare).await, Err(Error::IllegalState(_))));
    assert!(ledger.calls().is_empty());

    // Signed by hand, it goes through without an operator.
    let mut tx = tx.sign(&PrivateKey::generate());
    assert!(tx.execute(&bare).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn account_balance_query() {
    let ledger = MockLedger::new();
    ledger.set_balance(42_000);
    ledger.script(3, [Reply::Precheck(Status::Busy)]);
    let client = client(&ledger, 2);

    let balance = AccountBalanceQuery::new(ALICE).execute(&client).await.unwrap();
    assert_eq!(balance.account_id, ALICE);
    assert_eq!(balance.hbars, 42_000);

    let err = {
        ledger.script(3, [Reply::Precheck(Status::InvalidAccountId)]);
        AccountBalanceQuery::new(ALICE)
            .node_account_ids(vec![AccountId::new(0, 0, 3)])
            .execute(&client)
            .await
            .unwrap_err()
    };
    assert_eq!(err.status(), Some(Status::InvalidAccountId));
}
