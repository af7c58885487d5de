//! GraphQL documents and response envelopes for the loan service.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::loan::{LoanPayment, LoanRecord, PaymentUpdate};

pub const LOANS_QUERY: &str = "query Loans {
  loans {
    id
    name
    principal
    interestRate
    dueDate
    paymentDate
    status
  }
}";

pub const LOAN_PAYMENTS_QUERY: &str = "query LoanPayments {
  loanPayments {
    id
    loanId
    paymentDate
  }
}";

pub const UPDATE_LOAN_PAYMENT_MUTATION: &str =
    "mutation UpdateLoanPayment($loanId: Int!, $amount: Float!, $paymentDate: Date) {
  updateLoanPayment(loanId: $loanId, amount: $amount, paymentDate: $paymentDate) {
    success
    message
    loanPayment {
      id
      loanId
      paymentDate
    }
  }
}";

/// Body of a GraphQL POST.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<&'a V>,
}

impl<'a> GraphQlRequest<'a, ()> {
    pub fn query(query: &'a str) -> Self {
        Self {
            query,
            variables: None,
        }
    }
}

impl<'a, V: Serialize> GraphQlRequest<'a, V> {
    pub fn with_variables(query: &'a str, variables: &'a V) -> Self {
        Self {
            query,
            variables: Some(variables),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<ErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct LoansData {
    loans: Option<Vec<LoanRecord>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoanPaymentsData {
    loan_payments: Option<Vec<LoanPayment>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateLoanPaymentData {
    update_loan_payment: Option<PaymentUpdate>,
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, GatewayError> {
    let response: GraphQlResponse<T> = serde_json::from_slice(body)?;
    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        return Err(GatewayError::GraphQl(
            errors.into_iter().map(|e| e.message).collect(),
        ));
    }
    response.data.ok_or(GatewayError::MissingData("data"))
}

/// Messages from an `errors` array, if the body has one. Used for non-2xx
/// responses that still carry a GraphQL envelope.
#[cfg_attr(not(feature = "http"), allow(dead_code))]
pub(crate) fn error_messages(body: &[u8]) -> Option<Vec<String>> {
    let response: GraphQlResponse<serde_json::Value> = serde_json::from_slice(body).ok()?;
    let errors = response.errors?;
    if errors.is_empty() {
        return None;
    }
    Some(errors.into_iter().map(|e| e.message).collect())
}

pub fn decode_loans(body: &[u8]) -> Result<Vec<LoanRecord>, GatewayError> {
    decode::<LoansData>(body)?
        .loans
        .ok_or(GatewayError::MissingData("loans"))
}

pub fn decode_loan_payments(body: &[u8]) -> Result<Vec<LoanPayment>, GatewayError> {
    decode::<LoanPaymentsData>(body)?
        .loan_payments
        .ok_or(GatewayError::MissingData("loanPayments"))
}

pub fn decode_payment_update(body: &[u8]) -> Result<PaymentUpdate, GatewayError> {
    decode::<UpdateLoanPaymentData>(body)?
        .update_loan_payment
        .ok_or(GatewayError::MissingData("updateLoanPayment"))
}
