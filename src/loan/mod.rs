//! Loan and payment records as exchanged with the loan service.

mod model;
mod status;

pub use model::{LoanPayment, LoanRecord, PaymentSubmission, PaymentUpdate};
pub use status::{status_class, StatusClass};
