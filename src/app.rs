use std::sync::Arc;

use tokio::runtime::Handle;

use crate::gateway::LoanGateway;
use crate::notice::NoticeSink;
use crate::refresh::RefreshToken;
use crate::view::{PaymentForm, PaymentListView, SubmitOutcome};

/// Top of the component tree.
///
/// Owns the refresh token, mounts the list view on it, and gives the form the
/// only write handle. Dropping the app unmounts the list.
pub struct LoanApp<G: LoanGateway> {
    token: RefreshToken,
    list: PaymentListView<G>,
    form: PaymentForm<G>,
}

impl<G: LoanGateway> LoanApp<G> {
    /// Build and mount on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(gateway: Arc<G>, notices: Arc<dyn NoticeSink>) -> Self {
        Self::with_runtime(gateway, notices, Handle::current())
    }

    pub fn with_runtime(gateway: Arc<G>, notices: Arc<dyn NoticeSink>, runtime: Handle) -> Self {
        let token = RefreshToken::new();
        let list = PaymentListView::new(Arc::clone(&gateway), runtime);
        let form = PaymentForm::new(gateway, token.trigger(), notices);
        list.mount(&token.reader());
        Self { token, list, form }
    }

    pub fn token(&self) -> u64 {
        self.token.current()
    }

    pub fn list(&self) -> &PaymentListView<G> {
        &self.list
    }

    pub fn form(&self) -> &PaymentForm<G> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PaymentForm<G> {
        &mut self.form
    }

    /// Fill the form and submit it.
    pub async fn submit_payment(
        &mut self,
        loan_id: &str,
        amount: &str,
        payment_date: Option<&str>,
    ) -> SubmitOutcome {
        self.form.set_loan_id(loan_id);
        self.form.set_amount(amount);
        self.form.set_payment_date(payment_date.unwrap_or_default());
        self.form.submit().await
    }

    pub fn shutdown(&self) {
        self.list.unmount();
    }
}
