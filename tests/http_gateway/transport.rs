use std::sync::Arc;
use std::time::Duration;

use loan_payments::{
    ClientConfig, GatewayError, HttpGateway, LoanApp, LoanGateway, LogNotices, PaymentSubmission,
    SubmitOutcome,
};

use crate::server::start_server;

fn gateway(base: &str, path: &str) -> HttpGateway {
    let config = ClientConfig::new(format!("{base}{path}")).with_timeout(Duration::from_secs(5));
    HttpGateway::new(&config).unwrap()
}

#[tokio::test]
async fn fetches_loans() {
    let (base, state) = start_server().await;
    let loans = gateway(&base, "/graphql").fetch_loans().await.unwrap();

    assert_eq!(loans.len(), 2);
    assert_eq!(loans[0].name, "Tom's Loan");
    assert_eq!(loans[1].payment_date, None);

    let requests = state.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].get("variables").is_none());
}

#[tokio::test]
async fn fetches_loan_payments() {
    let (base, _state) = start_server().await;
    let payments = gateway(&base, "/graphql").fetch_loan_payments().await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].loan_id, 1);
}

#[tokio::test]
async fn mutation_sends_variables() {
    let (base, state) = start_server().await;
    let submission = PaymentSubmission::new(4, 150.5).with_payment_date("2024-06-01");
    let update = gateway(&base, "/graphql")
        .update_loan_payment(&submission)
        .await
        .unwrap();

    assert!(update.success);
    assert_eq!(update.loan_payment.unwrap().payment_date.as_deref(), Some("2024-06-01"));

    let requests = state.requests.lock().unwrap();
    assert_eq!(requests[0]["variables"]["loanId"], 4);
    assert_eq!(requests[0]["variables"]["amount"], 150.5);
    assert_eq!(requests[0]["variables"]["paymentDate"], "2024-06-01");
}

#[tokio::test]
async fn rejection_is_not_an_error() {
    let (base, _state) = start_server().await;
    let update = gateway(&base, "/graphql")
        .update_loan_payment(&PaymentSubmission::new(4, -10.0))
        .await
        .unwrap();
    assert!(!update.success);
    assert_eq!(update.message, "Amount must be positive");
}

#[tokio::test]
async fn server_error_status_is_reported() {
    let (base, _state) = start_server().await;
    let err = gateway(&base, "/broken").fetch_loans().await.unwrap_err();
    assert_eq!(err, GatewayError::Status(500));
}

#[tokio::test]
async fn garbage_body_is_a_decode_error() {
    let (base, _state) = start_server().await;
    let err = gateway(&base, "/garbage").fetch_loans().await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}

#[tokio::test]
async fn graphql_errors_are_surfaced() {
    let (base, _state) = start_server().await;
    let err = gateway(&base, "/null-data").fetch_loans().await.unwrap_err();
    assert_eq!(err, GatewayError::GraphQl(vec!["resolver exploded".into()]));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway(&format!("http://{addr}"), "/graphql")
        .fetch_loans()
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn app_over_http_refreshes_after_payment() {
    let (base, state) = start_server().await;
    let buffer = Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut app = LoanApp::new(
        Arc::new(gateway(&base, "/graphql")),
        Arc::new(LogNotices::with_buffer(buffer.clone())),
    );
    app.list().settled().await;
    assert_eq!(app.list().rows()[1].payment_date, "-");

    let outcome = app.submit_payment("1", "150.50", None).await;
    app.list().settled().await;

    assert!(matches!(outcome, SubmitOutcome::Updated { token: 1, .. }));
    assert_eq!(app.list().snapshot().token, Some(1));
    // mount fetch, mutation, refetch
    assert_eq!(state.requests.lock().unwrap().len(), 3);
    assert_eq!(*buffer.lock().unwrap(), vec!["Payment updated successfully!"]);
}
