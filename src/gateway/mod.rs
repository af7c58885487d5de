//! The seam between the views and the remote loan service.
//!
//! ## Implementations
//!
//! - [`InMemoryGateway`] serves a seeded loan book from memory.
//! - `HttpGateway` (feature `http`) posts GraphQL documents with reqwest.

mod graphql;
mod in_memory;

#[cfg(feature = "http")]
mod http;

use std::future::Future;

use crate::error::GatewayError;
use crate::loan::{LoanPayment, LoanRecord, PaymentSubmission, PaymentUpdate};

pub use graphql::{
    decode_loan_payments, decode_loans, decode_payment_update, GraphQlRequest,
    LOANS_QUERY, LOAN_PAYMENTS_QUERY, UPDATE_LOAN_PAYMENT_MUTATION,
};
pub use in_memory::InMemoryGateway;

#[cfg(feature = "http")]
pub use http::HttpGateway;

/// Operations the loan service offers.
///
/// Futures must be `Send`: the list view runs fetches on spawned tasks.
pub trait LoanGateway: Send + Sync + 'static {
    /// Full loan list. No paging, filtering or sorting.
    fn fetch_loans(&self) -> impl Future<Output = Result<Vec<LoanRecord>, GatewayError>> + Send;

    /// Raw payment records.
    fn fetch_loan_payments(
        &self,
    ) -> impl Future<Output = Result<Vec<LoanPayment>, GatewayError>> + Send;

    /// Record a payment. `Ok` with `success: false` is an application-level
    /// rejection, `Err` is a transport or decode failure.
    fn update_loan_payment(
        &self,
        submission: &PaymentSubmission,
    ) -> impl Future<Output = Result<PaymentUpdate, GatewayError>> + Send;
}
