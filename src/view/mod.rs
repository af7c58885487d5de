//! The two views that share the refresh token: the loan list and the
//! payment form.

mod form;
mod list;

pub use form::{parse_submission, FormState, PaymentForm, SubmitOutcome};
pub use list::{
    render_table, ListSnapshot, LoanRow, PaymentListView, NO_PAYMENT_DATE, TABLE_HEADERS,
};
