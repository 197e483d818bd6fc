use serde_json::json;
use tokio::sync::oneshot;
use xian_dapp::{
    config::NodeConfig,
    core::{
        notification::{MemoryNotifier, Severity, Toast},
        store::Observable,
        util::ReqwestClient,
    },
    node::NodeClient,
    wallet::{
        CounterDapp, Dapp, DappEvent, TransactionErrors, TransactionOutcome, TransactionResult,
        WalletInfo, WALLET_LOCKED, WALLET_NOT_INSTALLED, WALLET_NOT_INSTALLED_MESSAGE,
    },
};


use mock_node::{counter_response, query_response, serve_once, MockNode, Reply};

const COUNTER_URL: &str = "http://127.0.0.1:26657/abci_query?path=%22/get/con_counter.counter%22";

fn wallet_info(address: &str, locked: bool) -> WalletInfo {
    serde_json::from_value(json!({ "address": address, "locked": locked })).unwrap()
}

#[test]
fn unlocked_wallet_shows_truncated_address() {
    let dapp = mock_node::dapp();

    dapp.handle_wallet_info(&wallet_info(
        "e0d8c1b5a4f3e2d1c0b9a8f7e6d5c4b3a2f1e0d9",
        false,
    ));

    assert_eq!(dapp.store().wallet_address.get(), "e0d8c1b5a4...");
    assert_eq!(dapp.notifier().count(Severity::Warning), 0);
    assert!(dapp.notifier().toasts().is_empty());
}

#[test]
fn locked_wallet_overrides_address() {
    let dapp = mock_node::dapp();
    let mut address = dapp.store().wallet_address.subscribe();

    dapp.handle_wallet_info(&wallet_info(
        "e0d8c1b5a4f3e2d1c0b9a8f7e6d5c4b3a2f1e0d9",
        true,
    ));

    assert!(address.has_changed().unwrap());
    assert_eq!(*address.borrow_and_update(), WALLET_LOCKED);
    assert_eq!(dapp.notifier().count(Severity::Warning), 1);
    assert_eq!(
        dapp.notifier().toasts(),
        vec![Toast::new(
            "Your wallet is locked. Please unlock it to interact with the dapp.",
            Severity::Warning
        )]
    );
}

// Any wallet error is reported as a missing extension, whatever it says.
#[test]
fn wallet_error_always_reports_not_installed() {
    for error in [
        json!(null),
        json!(""),
        json!("User rejected the connection request"),
        json!({ "code": 4001 }),
    ] {
        let dapp = mock_node::dapp();

        dapp.handle_wallet_error(&error);

        assert_eq!(dapp.store().wallet_address.get(), WALLET_NOT_INSTALLED);
        assert_eq!(
            dapp.notifier().toasts(),
            vec![Toast::new(WALLET_NOT_INSTALLED_MESSAGE, Severity::Danger)]
        );
    }
}

#[tokio::test]
async fn rejected_transaction_skips_refresh() {
    let dapp = mock_node::dapp();

    let outcome = dapp
        .handle_transaction(TransactionResult::from(json!({
            "errors": ["Transaction stamps exceeded"]
        })))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TransactionOutcome::Rejected(TransactionErrors(json!(["Transaction stamps exceeded"])))
    );
    assert_eq!(
        dapp.notifier().toasts(),
        vec![Toast::new(
            "Transaction failed: Transaction stamps exceeded",
            Severity::Danger
        )]
    );
    assert!(dapp.mock().requests().is_empty());
    assert_eq!(dapp.store().counter.get(), 0);
}

#[tokio::test]
async fn accepted_transaction_refreshes_counter_once() {
    let dapp = mock_node::dapp();
    dapp.mock().push(Reply::Now(counter_response("42")));

    let outcome = dapp
        .handle_transaction(TransactionResult::from(json!({
            "success": true,
            "tx_hash": "9A1F6C"
        })))
        .await
        .unwrap();

    assert_eq!(outcome, TransactionOutcome::Accepted { counter: 42 });
    assert_eq!(dapp.store().counter.get(), 42);
    assert_eq!(dapp.mock().requests(), vec![COUNTER_URL.to_owned()]);
    assert_eq!(
        dapp.notifier().toasts(),
        vec![Toast::new("Transaction succeeded", Severity::Success)]
    );
}

#[tokio::test]
async fn non_numeric_counter_reads_as_zero() {
    let dapp = mock_node::dapp();
    dapp.store().counter.set(7);
    dapp.mock().push(Reply::Now(counter_response("abc")));

    let value = dapp
        .node()
        .refresh_counter(&dapp.store().counter)
        .await
        .unwrap();

    assert_eq!(value, 0);
    assert_eq!(dapp.store().counter.get(), 0);
}

#[tokio::test]
async fn missing_counter_value_reads_as_zero() {
    let dapp = mock_node::dapp();
    dapp.mock().push(Reply::Now(query_response(json!(null))));

    assert_eq!(dapp.node().query_counter().await.unwrap(), 0);
}

#[tokio::test]
async fn refresh_failure_is_returned_after_success_toast() {
    let dapp = mock_node::dapp();
    dapp.store().counter.set(5);
    dapp.mock().push(Reply::Fail("connection refused"));

    let err = dapp
        .handle_transaction(TransactionResult::Accepted(json!({})))
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("connection refused"));
    assert_eq!(dapp.notifier().count(Severity::Success), 1);
    assert_eq!(dapp.store().counter.get(), 5);
}

#[tokio::test]
async fn malformed_query_response_is_an_error() {
    let dapp = mock_node::dapp();
    dapp.mock().push(Reply::Now(
        http::Response::builder()
            .status(200)
            .body(br#"{"jsonrpc":"2.0","id":-1,"error":{"code":-32603}}"#.to_vec())
            .unwrap(),
    ));
    dapp.mock().push(Reply::Now(
        http::Response::builder()
            .status(502)
            .body(b"bad gateway".to_vec())
            .unwrap(),
    ));
    dapp.mock().push(Reply::Now(
        http::Response::builder()
            .status(200)
            .body(b"<html></html>".to_vec())
            .unwrap(),
    ));

    let missing = dapp.node().query_counter().await.unwrap_err();
    assert!(missing.to_string().contains("result.response"));

    let unsuccessful = dapp.node().query_counter().await.unwrap_err();
    assert!(unsuccessful.to_string().contains("502"));

    assert!(dapp.node().query_counter().await.is_err());
}

#[tokio::test]
async fn transaction_error_is_reported_separately() {
    let dapp = mock_node::dapp();

    dapp.handle_transaction_error("request timed out");

    assert_eq!(
        dapp.notifier().toasts(),
        vec![Toast::new("Transaction error: request timed out", Severity::Danger)]
    );
    assert!(dapp.mock().requests().is_empty());
}

#[tokio::test]
async fn later_issued_refresh_wins() {
    let dapp = mock_node::dapp();
    let (first_tx, first_rx) = oneshot::channel();
    let (second_tx, second_rx) = oneshot::channel();
    dapp.mock().push(Reply::Later(first_rx));
    dapp.mock().push(Reply::Later(second_rx));

    let cell = dapp.store().counter.clone();
    let mut changes = cell.subscribe();

    let (first, second, ()) = tokio::join!(
        dapp.node().refresh_counter(&cell),
        dapp.node().refresh_counter(&cell),
        async {
            second_tx.send(counter_response("2")).unwrap();
            changes.changed().await.unwrap();
            first_tx.send(counter_response("1")).unwrap();
        }
    );

    assert_eq!(first.unwrap(), 1);
    assert_eq!(second.unwrap(), 2);
    assert_eq!(cell.get(), 2);
}

#[tokio::test]
async fn refreshes_of_different_cells_are_independent() {
    let dapp = mock_node::dapp();
    let (a_tx, a_rx) = oneshot::channel();
    let (b_tx, b_rx) = oneshot::channel();
    dapp.mock().push(Reply::Later(a_rx));
    dapp.mock().push(Reply::Later(b_rx));

    let cell_a = Observable::new(-1);
    let cell_b = Observable::new(-1);
    let mut b_changes = cell_b.subscribe();

    let (a, b, ()) = tokio::join!(
        dapp.node().refresh_counter(&cell_a),
        dapp.node().refresh_counter(&cell_b),
        async {
            b_tx.send(counter_response("9")).unwrap();
            b_changes.changed().await.unwrap();
            a_tx.send(counter_response("5")).unwrap();
        }
    );

    assert_eq!((a.unwrap(), b.unwrap()), (5, 9));
    assert_eq!(cell_a.get(), 5);
    assert_eq!(cell_b.get(), 9);
}

#[tokio::test]
async fn events_dispatch_to_handlers() {
    let dapp = mock_node::dapp();
    dapp.mock().push(Reply::Now(counter_response("3")));

    for event in [
        DappEvent::WalletInfo(wallet_info("abcdefghijklmnop", false)),
        DappEvent::Transaction(TransactionResult::from(json!({ "errors": "bad nonce" }))),
        DappEvent::Transaction(TransactionResult::from(json!({ "success": true }))),
        DappEvent::TransactionError("rejected by user".to_owned()),
        DappEvent::WalletError(json!(null)),
    ] {
        dapp.handle_event(event).await.unwrap();
    }

    let messages: Vec<_> = dapp
        .notifier()
        .toasts()
        .into_iter()
        .map(|toast| (toast.severity, toast.message))
        .collect();
    assert_eq!(
        messages,
        vec![
            (Severity::Danger, "Transaction failed: bad nonce".to_owned()),
            (Severity::Success, "Transaction succeeded".to_owned()),
            (Severity::Danger, "Transaction error: rejected by user".to_owned()),
            (Severity::Danger, WALLET_NOT_INSTALLED_MESSAGE.to_owned()),
        ]
    );
    assert_eq!(dapp.store().counter.get(), 3);
    assert_eq!(dapp.store().wallet_address.get(), WALLET_NOT_INSTALLED);
}

#[tokio::test]
async fn counter_dapp_wires_components() {
    let node = MockNode::default();
    node.push(Reply::Now(counter_response("11")));
    let dapp = CounterDapp::new(
        NodeConfig::new("http://127.0.0.1:26657/").unwrap(),
        node,
        MemoryNotifier::new(),
    );

    let outcome = dapp
        .handle_transaction(TransactionResult::Accepted(json!({ "success": true })))
        .await
        .unwrap();

    assert_eq!(outcome, TransactionOutcome::Accepted { counter: 11 });
    assert_eq!(dapp.node().http_client().requests(), vec![COUNTER_URL.to_owned()]);
}

#[tokio::test]
async fn reqwest_client_queries_node_over_http() {
    let (url, server) = serve_once(counter_response("27")).await;
    let node = NodeClient::new(NodeConfig::new(url).unwrap(), ReqwestClient::new().unwrap());
    let cell = Observable::new(0);

    assert_eq!(node.refresh_counter(&cell).await.unwrap(), 27);
    assert_eq!(cell.get(), 27);

    let head = server.await.unwrap();
    assert!(head.starts_with("GET /abci_query?path=%22/get/con_counter.counter%22 HTTP/1.1\r\n"));
    assert!(head.to_ascii_lowercase().contains("accept: application/json"));
}

#[tokio::test]
async fn reqwest_client_surfaces_error_status() {
    let (url, server) = serve_once(
        http::Response::builder()
            .status(500)
            .body(b"internal error".to_vec())
            .unwrap(),
    )
    .await;
    let node = NodeClient::new(NodeConfig::new(url).unwrap(), ReqwestClient::new().unwrap());

    let err = node.query_counter().await.unwrap_err();
    assert!(err.to_string().contains("500"));
    assert!(err.to_string().contains("internal error"));
    server.await.unwrap();
}
