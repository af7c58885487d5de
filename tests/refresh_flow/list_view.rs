use tokio::runtime::Handle;

use loan_payments::{GatewayError, InMemoryGateway, PaymentListView, RefreshToken, StatusClass};

use crate::support::{eventually, loan, ScriptedGateway};

#[tokio::test]
async fn mount_fetches_once_for_the_initial_token() {
    let gateway = ScriptedGateway::new();
    let token = RefreshToken::new();
    let list = PaymentListView::new(gateway.clone(), Handle::current());

    list.mount(&token.reader());
    gateway.wait_for_fetches(1).await;
    gateway.resolve(0, Ok(vec![loan(1, "Tom's Loan", "On Time")]));
    list.settled().await;

    let snapshot = list.snapshot();
    assert_eq!(snapshot.fetches_started, 1);
    assert_eq!(snapshot.token, Some(0));
    assert!(snapshot.mounted);
    assert_eq!(list.rows()[0].status_class, StatusClass::OnTime);
}

#[tokio::test]
async fn every_bump_starts_exactly_one_fetch() {
    let gateway = std::sync::Arc::new(InMemoryGateway::seeded());
    let token = RefreshToken::new();
    let list = PaymentListView::new(gateway.clone(), Handle::current());
    list.mount(&token.reader());
    list.settled().await;

    token.bump();
    list.settled().await;
    token.bump();
    list.settled().await;

    assert_eq!(gateway.fetch_count(), 3);
    assert_eq!(list.snapshot().token, Some(2));
}

#[tokio::test]
async fn latest_initiated_fetch_wins_over_a_late_stale_response() {
    let gateway = ScriptedGateway::new();
    let token = RefreshToken::new();
    let list = PaymentListView::new(gateway.clone(), Handle::current());
    list.mount(&token.reader());
    gateway.wait_for_fetches(1).await;
    gateway.resolve(0, Ok(vec![loan(1, "initial", "Unpaid")]));
    list.settled().await;

    // t0: first refresh starts.
    token.bump();
    gateway.wait_for_fetches(2).await;
    // t1: second refresh starts before the first has answered.
    token.bump();
    gateway.wait_for_fetches(3).await;

    // t1.5: the newer fetch answers first.
    gateway.resolve(2, Ok(vec![loan(1, "from t1", "Late")]));
    list.settled().await;
    assert_eq!(list.loans()[0].name, "from t1");

    // t2: the older fetch answers last and must be ignored.
    gateway.resolve(1, Ok(vec![loan(1, "from t0", "Defaulted")]));
    eventually(|| list.snapshot().stale_dropped == 1).await;

    let snapshot = list.snapshot();
    assert_eq!(snapshot.loans[0].name, "from t1");
    assert_eq!(snapshot.token, Some(2));
    assert_eq!(list.rows()[0].status_class, StatusClass::Late);
}

#[tokio::test]
async fn stale_response_arriving_first_is_also_dropped() {
    let gateway = ScriptedGateway::new();
    let token = RefreshToken::new();
    let list = PaymentListView::new(gateway.clone(), Handle::current());
    list.mount(&token.reader());
    gateway.wait_for_fetches(1).await;
    token.bump();
    gateway.wait_for_fetches(2).await;

    gateway.resolve(0, Ok(vec![loan(1, "stale", "Unpaid")]));
    eventually(|| list.snapshot().stale_dropped == 1).await;
    assert!(list.loans().is_empty());

    gateway.resolve(1, Ok(vec![loan(1, "fresh", "On Time")]));
    list.settled().await;
    assert_eq!(list.loans()[0].name, "fresh");
}

#[tokio::test]
async fn failed_fetch_keeps_the_last_good_list_and_reports_the_error() {
    let gateway = ScriptedGateway::new();
    let token = RefreshToken::new();
    let list = PaymentListView::new(gateway.clone(), Handle::current());
    list.mount(&token.reader());
    gateway.wait_for_fetches(1).await;
    gateway.resolve(0, Ok(vec![loan(1, "kept", "On Time")]));
    list.settled().await;

    token.bump();
    gateway.wait_for_fetches(2).await;
    gateway.resolve(1, Err(GatewayError::Transport("connection refused".into())));
    list.settled().await;

    let snapshot = list.snapshot();
    assert_eq!(snapshot.loans[0].name, "kept");
    assert_eq!(snapshot.token, Some(0));
    assert_eq!(
        snapshot.last_error,
        Some(GatewayError::Transport("connection refused".into()))
    );

    // The next good fetch clears the error.
    token.bump();
    gateway.wait_for_fetches(3).await;
    gateway.resolve(2, Ok(vec![loan(1, "recovered", "On Time")]));
    list.settled().await;
    assert_eq!(list.snapshot().last_error, None);
}

#[tokio::test]
async fn unmount_ignores_in_flight_responses_and_later_bumps() {
    let gateway = ScriptedGateway::new();
    let token = RefreshToken::new();
    let list = PaymentListView::new(gateway.clone(), Handle::current());
    list.mount(&token.reader());
    gateway.wait_for_fetches(1).await;

    list.unmount();
    list.settled().await;
    gateway.resolve(0, Ok(vec![loan(1, "too late", "On Time")]));
    tokio::task::yield_now().await;

    token.bump();
    tokio::task::yield_now().await;

    let snapshot = list.snapshot();
    assert!(snapshot.loans.is_empty());
    assert!(!snapshot.mounted);
    assert_eq!(snapshot.fetches_started, 1);
    assert_eq!(gateway.fetch_calls(), 1);
    assert_eq!(token.listener_count(), 0);
}

#[tokio::test]
async fn remount_ignores_the_fetch_started_before_unmount() {
    let gateway = ScriptedGateway::new();
    let token = RefreshToken::new();
    let list = PaymentListView::new(gateway.clone(), Handle::current());
    list.mount(&token.reader());
    gateway.wait_for_fetches(1).await;

    list.unmount();
    token.bump();
    list.mount(&token.reader());
    gateway.wait_for_fetches(2).await;
    eventually(|| gateway.fetch_abandoned(0)).await;

    gateway.resolve(0, Ok(vec![loan(1, "before unmount", "Defaulted")]));
    tokio::task::yield_now().await;
    let snapshot = list.snapshot();
    assert!(snapshot.loans.is_empty());
    assert_eq!(snapshot.token, None);

    gateway.resolve(1, Ok(vec![loan(1, "after remount", "On Time")]));
    list.settled().await;

    let snapshot = list.snapshot();
    assert_eq!(snapshot.loans[0].name, "after remount");
    assert_eq!(snapshot.token, Some(1));
    assert_eq!(snapshot.fetches_started, 2);
    assert!(snapshot.mounted);
    assert_eq!(token.listener_count(), 1);
}

#[tokio::test]
async fn dropping_the_view_abandons_its_in_flight_fetch() {
    let gateway = ScriptedGateway::new();
    let token = RefreshToken::new();
    let list = PaymentListView::new(gateway.clone(), Handle::current());
    list.mount(&token.reader());
    gateway.wait_for_fetches(1).await;
    assert!(!gateway.fetch_abandoned(0));

    drop(list);

    eventually(|| gateway.fetch_abandoned(0)).await;
    assert_eq!(token.listener_count(), 0);
    token.bump();
    tokio::task::yield_now().await;
    assert_eq!(gateway.fetch_calls(), 1);
}

#[tokio::test]
async fn dropping_the_view_unsubscribes() {
    let gateway = std::sync::Arc::new(InMemoryGateway::seeded());
    let token = RefreshToken::new();
    {
        let list = PaymentListView::new(gateway.clone(), Handle::current());
        list.mount(&token.reader());
        assert_eq!(token.listener_count(), 1);
    }
    assert_eq!(token.listener_count(), 0);
}

#[tokio::test]
async fn refetch_without_mutation_renders_the_same_rows() {
    let gateway = std::sync::Arc::new(InMemoryGateway::seeded());
    let token = RefreshToken::new();
    let list = PaymentListView::new(gateway.clone(), Handle::current());
    list.mount(&token.reader());
    list.settled().await;
    let first = list.rows();
    let first_table = list.render_table();

    list.on_token_changed(token.current());
    list.settled().await;

    assert_eq!(gateway.fetch_count(), 2);
    assert_eq!(list.rows(), first);
    assert_eq!(list.render_table(), first_table);
}

#[tokio::test]
async fn seeded_rows_render_placeholder_and_classes() {
    let gateway = std::sync::Arc::new(InMemoryGateway::seeded());
    let token = RefreshToken::new();
    let list = PaymentListView::new(gateway, Handle::current());
    list.mount(&token.reader());
    list.settled().await;

    let rows = list.rows();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].payment_date, "2024-03-04");
    assert_eq!(rows[0].status_class.css_class(), "on-time-loan");
    assert_eq!(rows[3].payment_date, "-");
    assert_eq!(rows[3].status_class.css_class(), "unpaid-loan");
}
