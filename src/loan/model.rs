use serde::{Deserialize, Deserializer, Serialize};

/// One row of the `loans` query. Replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub principal: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub interest_rate: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub due_date: String,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
}

/// One row of the `loanPayments` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPayment {
    pub id: i64,
    pub loan_id: i64,
    #[serde(default)]
    pub payment_date: Option<String>,
}

/// A parsed payment, ready to send. Only built from validated form input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSubmission {
    pub loan_id: i64,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
}

impl PaymentSubmission {
    pub fn new(loan_id: i64, amount: f64) -> Self {
        Self {
            loan_id,
            amount,
            payment_date: None,
        }
    }

    pub fn with_payment_date(mut self, payment_date: impl Into<String>) -> Self {
        self.payment_date = Some(payment_date.into());
        self
    }
}

/// Result of the `updateLoanPayment` mutation.
///
/// `message` is only shown to the user when `success` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    #[serde(default, deserialize_with = "null_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub message: String,
    #[serde(default)]
    pub loan_payment: Option<LoanPayment>,
}

impl PaymentUpdate {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            loan_payment: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            loan_payment: None,
        }
    }

    pub fn with_payment(mut self, payment: LoanPayment) -> Self {
        self.loan_payment = Some(payment);
        self
    }
}

// GraphQL fields are nullable unless declared otherwise.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
