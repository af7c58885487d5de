//! Payment submission form.
//!
//! `submit` takes `&mut self`, so a form can never have two submissions in
//! flight. The refresh token is bumped only on a confirmed success.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{GatewayError, InputError};
use crate::gateway::LoanGateway;
use crate::loan::{PaymentSubmission, PaymentUpdate};
use crate::notice::{Notice, NoticeSink};
use crate::refresh::RefreshTrigger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
}

/// What a call to [`PaymentForm::submit`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Service confirmed; fields cleared and token bumped to `token`.
    Updated { token: u64, update: PaymentUpdate },
    /// Service answered `success: false`. Nothing changed locally.
    Rejected { message: String },
    /// No usable answer from the service. Nothing changed locally.
    TransportFailed(GatewayError),
    /// Input did not parse; no request was sent.
    InvalidInput(InputError),
}

/// Turn raw field text into a submission.
///
/// Only numeric shape is checked here. Sign, range and loan existence are the
/// service's call.
pub fn parse_submission(
    loan_id: &str,
    amount: &str,
    payment_date: Option<&str>,
) -> Result<PaymentSubmission, InputError> {
    let loan_id_text = loan_id.trim();
    let loan_id = loan_id_text
        .parse::<i64>()
        .map_err(|_| InputError::LoanId(loan_id_text.to_string()))?;

    let amount_text = amount.trim();
    let amount = amount_text
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite())
        .ok_or_else(|| InputError::Amount(amount_text.to_string()))?;

    let mut submission = PaymentSubmission::new(loan_id, amount);
    if let Some(date) = payment_date.map(str::trim).filter(|d| !d.is_empty()) {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| InputError::PaymentDate(date.to_string()))?;
        submission = submission.with_payment_date(date.to_string());
    }
    Ok(submission)
}

/// Holds the form in [`FormState::Submitting`] and puts it back to idle when
/// dropped, including when the submit future itself is dropped mid-request.
struct Submitting<'a>(&'a mut FormState);

impl<'a> Submitting<'a> {
    fn enter(state: &'a mut FormState) -> Self {
        *state = FormState::Submitting;
        Submitting(state)
    }
}

impl Drop for Submitting<'_> {
    fn drop(&mut self) {
        *self.0 = FormState::Idle;
    }
}

pub struct PaymentForm<G> {
    gateway: Arc<G>,
    trigger: RefreshTrigger,
    notices: Arc<dyn NoticeSink>,
    loan_id: String,
    amount: String,
    payment_date: String,
    state: FormState,
}

impl<G: LoanGateway> PaymentForm<G> {
    pub fn new(gateway: Arc<G>, trigger: RefreshTrigger, notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            gateway,
            trigger,
            notices,
            loan_id: String::new(),
            amount: String::new(),
            payment_date: String::new(),
            state: FormState::Idle,
        }
    }

    pub fn set_loan_id(&mut self, text: impl Into<String>) {
        self.loan_id = text.into();
    }

    pub fn set_amount(&mut self, text: impl Into<String>) {
        self.amount = text.into();
    }

    /// Optional; left empty the service picks the date.
    pub fn set_payment_date(&mut self, text: impl Into<String>) {
        self.payment_date = text.into();
    }

    pub fn loan_id(&self) -> &str {
        &self.loan_id
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn payment_date(&self) -> &str {
        &self.payment_date
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn clear(&mut self) {
        self.loan_id.clear();
        self.amount.clear();
        self.payment_date.clear();
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        let submission =
            match parse_submission(&self.loan_id, &self.amount, Some(self.payment_date.as_str())) {
                Ok(submission) => submission,
                Err(err) => {
                    debug!(error = %err, "payment input rejected locally");
                    self.notices.notify(&Notice::InvalidInput {
                        reason: err.to_string(),
                    });
                    return SubmitOutcome::InvalidInput(err);
                }
            };

        let result = {
            let _submitting = Submitting::enter(&mut self.state);
            self.gateway.update_loan_payment(&submission).await
        };

        match result {
            Ok(update) if update.success => {
                self.clear();
                let token = self.trigger.bump();
                info!(loan_id = submission.loan_id, token, "payment recorded");
                self.notices.notify(&Notice::PaymentUpdated);
                SubmitOutcome::Updated { token, update }
            }
            Ok(update) => {
                info!(loan_id = submission.loan_id, message = %update.message, "payment rejected");
                self.notices.notify(&Notice::PaymentRejected {
                    message: update.message.clone(),
                });
                SubmitOutcome::Rejected {
                    message: update.message,
                }
            }
            Err(err) => {
                warn!(loan_id = submission.loan_id, error = %err, "payment request failed");
                self.notices.notify(&Notice::TransportFailed {
                    reason: err.to_string(),
                });
                SubmitOutcome::TransportFailed(err)
            }
        }
    }
}
