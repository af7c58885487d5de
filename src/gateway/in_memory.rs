use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Local;

use super::LoanGateway;
use crate::error::GatewayError;
use crate::loan::{LoanPayment, LoanRecord, PaymentSubmission, PaymentUpdate};

pub const UNKNOWN_LOAN: &str = "Loan with the provided ID does not exist.";
pub const NON_POSITIVE_AMOUNT: &str = "Amount must be positive";
pub const PAYMENT_CREATED: &str = "Loan payment record created successfully.";
pub const PAYMENT_UPDATED: &str = "Loan payment updated successfully.";

#[derive(Debug, Default)]
struct LoanBook {
    loans: Vec<LoanRecord>,
    payments: Vec<LoanPayment>,
}

impl LoanBook {
    fn latest_payment_date(&self, loan_id: i64) -> Option<String> {
        // ISO dates order lexicographically.
        self.payments
            .iter()
            .filter(|p| p.loan_id == loan_id)
            .filter_map(|p| p.payment_date.clone())
            .max()
    }
}

/// Loan service held in memory, answering the same contract as the remote one.
///
/// Loan statuses are stored as given; this gateway does not derive them.
/// Cloning shares the book.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    book: Arc<RwLock<LoanBook>>,
    fetches: Arc<AtomicU64>,
    updates: Arc<AtomicU64>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Four loans, three of them with a recorded payment.
    pub fn seeded() -> Self {
        Self::new()
            .with_loan(seed_loan(1, "Tom's Loan", 10_000.0, 5.0, "On Time"))
            .with_loan(seed_loan(2, "Chris Wailaka", 500_000.0, 3.5, "On Time"))
            .with_loan(seed_loan(3, "NP Mobile Money", 30_000.0, 4.5, "On Time"))
            .with_loan(seed_loan(4, "Esther's Autoparts", 40_000.0, 1.5, "Unpaid"))
            .with_payment(1, "2024-03-04")
            .with_payment(2, "2024-03-15")
            .with_payment(3, "2024-04-05")
    }

    pub fn with_loan(self, loan: LoanRecord) -> Self {
        self.book
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .loans
            .push(loan);
        self
    }

    pub fn with_payment(self, loan_id: i64, payment_date: &str) -> Self {
        {
            let mut book = self.book.write().unwrap_or_else(PoisonError::into_inner);
            let id = book.payments.len() as i64 + 1;
            book.payments.push(LoanPayment {
                id,
                loan_id,
                payment_date: Some(payment_date.to_string()),
            });
        }
        self
    }

    /// Number of `fetch_loans` calls served.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `update_loan_payment` calls served.
    pub fn update_count(&self) -> u64 {
        self.updates.load(Ordering::SeqCst)
    }

    fn poisoned() -> GatewayError {
        GatewayError::Transport("in-memory loan book lock poisoned".to_string())
    }
}

fn seed_loan(id: i64, name: &str, principal: f64, rate: f64, status: &str) -> LoanRecord {
    LoanRecord {
        id,
        name: name.to_string(),
        principal,
        interest_rate: rate,
        due_date: "2025-03-01".to_string(),
        payment_date: None,
        status: status.to_string(),
    }
}

impl LoanGateway for InMemoryGateway {
    async fn fetch_loans(&self) -> Result<Vec<LoanRecord>, GatewayError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let book = self.book.read().map_err(|_| Self::poisoned())?;
        Ok(book
            .loans
            .iter()
            .map(|loan| LoanRecord {
                payment_date: book.latest_payment_date(loan.id),
                ..loan.clone()
            })
            .collect())
    }

    async fn fetch_loan_payments(&self) -> Result<Vec<LoanPayment>, GatewayError> {
        let book = self.book.read().map_err(|_| Self::poisoned())?;
        Ok(book.payments.clone())
    }

    async fn update_loan_payment(
        &self,
        submission: &PaymentSubmission,
    ) -> Result<PaymentUpdate, GatewayError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut book = self.book.write().map_err(|_| Self::poisoned())?;

        if !book.loans.iter().any(|l| l.id == submission.loan_id) {
            return Ok(PaymentUpdate::rejected(UNKNOWN_LOAN));
        }
        if submission.amount.is_nan() || submission.amount <= 0.0 {
            return Ok(PaymentUpdate::rejected(NON_POSITIVE_AMOUNT));
        }

        let payment_date = submission
            .payment_date
            .clone()
            .unwrap_or_else(|| Local::now().date_naive().to_string());

        if let Some(existing) = book
            .payments
            .iter_mut()
            .find(|p| p.loan_id == submission.loan_id)
        {
            existing.payment_date = Some(payment_date);
            let record = existing.clone();
            return Ok(PaymentUpdate::accepted(PAYMENT_UPDATED).with_payment(record));
        }

        let record = LoanPayment {
            id: book.payments.len() as i64 + 1,
            loan_id: submission.loan_id,
            payment_date: Some(payment_date),
        };
        book.payments.push(record.clone());
        Ok(PaymentUpdate::accepted(PAYMENT_CREATED).with_payment(record))
    }
}
