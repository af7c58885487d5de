//! Client for a GraphQL loan service.
//!
//! A [`LoanApp`] wires a [`PaymentListView`] and a [`PaymentForm`] to a shared
//! [`RefreshToken`]. A confirmed payment bumps the token; the list sees the
//! bump and re-fetches, keeping only the newest response.
//!
//! ```ignore
//! use std::sync::Arc;
//! use loan_payments::{InMemoryGateway, LoanApp, LogNotices};
//!
//! let mut app = LoanApp::new(Arc::new(InMemoryGateway::seeded()), Arc::new(LogNotices::new()));
//! app.list().settled().await;
//! println!("{}", app.list().render_table());
//!
//! app.submit_payment("3", "150.50", None).await;
//! app.list().settled().await;
//! ```

mod app;
mod config;
mod error;
mod interest;
mod notice;
mod refresh;

pub mod gateway;
pub mod loan;
pub mod view;

pub use app::LoanApp;
pub use config::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, ENDPOINT_VAR, TIMEOUT_VAR};
pub use error::{ConfigError, GatewayError, InputError};
pub use gateway::{InMemoryGateway, LoanGateway};
pub use interest::{InterestCalculator, InterestTerms};
pub use loan::{status_class, LoanPayment, LoanRecord, PaymentSubmission, PaymentUpdate, StatusClass};
pub use notice::{LogNotices, Notice, NoticeSink, NOTICE_EVENT};
pub use refresh::{RefreshReader, RefreshToken, RefreshTrigger, Subscription};
pub use view::{FormState, LoanRow, PaymentForm, PaymentListView, SubmitOutcome};

#[cfg(feature = "emitter")]
pub use notice::EmitterNotices;

#[cfg(feature = "http")]
pub use gateway::HttpGateway;

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
