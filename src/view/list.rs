//! Loan list view: re-fetches on every token change and only ever shows the
//! response of the latest fetch it started.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::gateway::LoanGateway;
use crate::loan::{status_class, LoanRecord, StatusClass};
use crate::refresh::{RefreshReader, Subscription};

/// Placeholder shown for a loan without a payment date.
pub const NO_PAYMENT_DATE: &str = "-";

pub const TABLE_HEADERS: [&str; 7] = [
    "ID",
    "Name",
    "Principal",
    "Interest Rate",
    "Due Date",
    "Payment Date",
    "Status",
];

/// A loan as displayed: every cell is text, plus the status category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanRow {
    pub id: String,
    pub name: String,
    pub principal: String,
    pub interest_rate: String,
    pub due_date: String,
    pub payment_date: String,
    pub status: String,
    pub status_class: StatusClass,
}

impl LoanRow {
    pub fn from_record(loan: &LoanRecord) -> Self {
        Self {
            id: loan.id.to_string(),
            name: loan.name.clone(),
            principal: loan.principal.to_string(),
            interest_rate: loan.interest_rate.to_string(),
            due_date: loan.due_date.clone(),
            payment_date: loan
                .payment_date
                .clone()
                .unwrap_or_else(|| NO_PAYMENT_DATE.to_string()),
            status: loan.status.clone(),
            status_class: status_class(&loan.status),
        }
    }

    fn cells(&self) -> [&str; 7] {
        [
            &self.id,
            &self.name,
            &self.principal,
            &self.interest_rate,
            &self.due_date,
            &self.payment_date,
            &self.status,
        ]
    }
}

/// Plain-text table with one row per loan.
pub fn render_table(rows: &[LoanRow]) -> String {
    let mut widths = TABLE_HEADERS.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut line = |cells: [&str; 7]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };
    line(TABLE_HEADERS);
    for row in rows {
        line(row.cells());
    }
    out
}

/// Point-in-time copy of the view state.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    pub loans: Vec<LoanRecord>,
    /// Token whose fetch produced `loans`; `None` before the first response.
    pub token: Option<u64>,
    /// Error from the latest fetch, if it failed. `loans` then still holds the
    /// last good list.
    pub last_error: Option<GatewayError>,
    pub fetches_started: u64,
    pub stale_dropped: u64,
    pub mounted: bool,
}

#[derive(Default)]
struct ListState {
    loans: Vec<LoanRecord>,
    token: Option<u64>,
    last_error: Option<GatewayError>,
    latest_seq: u64,
    fetches_started: u64,
    stale_dropped: u64,
    disposed: bool,
    in_flight: Vec<JoinHandle<()>>,
}

struct ListCore<G> {
    gateway: Arc<G>,
    state: Mutex<ListState>,
    settled: watch::Sender<u64>,
    runtime: Handle,
}

impl<G: LoanGateway> ListCore<G> {
    fn lock(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_token_changed(self: &Arc<Self>, token: u64) {
        let seq = {
            let mut state = self.lock();
            if state.disposed {
                return;
            }
            state.latest_seq += 1;
            state.fetches_started += 1;
            state.in_flight.retain(|task| !task.is_finished());
            state.latest_seq
        };
        debug!(token, seq, "fetching loans");

        let core = Arc::clone(self);
        let task = self.runtime.spawn(async move {
            let result = core.gateway.fetch_loans().await;
            core.apply(seq, token, result);
        });
        self.lock().in_flight.push(task);
    }

    fn apply(&self, seq: u64, token: u64, result: Result<Vec<LoanRecord>, GatewayError>) {
        let mut state = self.lock();
        if state.disposed {
            debug!(seq, "dropping loan list response after unmount");
            return;
        }
        if seq != state.latest_seq {
            state.stale_dropped += 1;
            debug!(seq, latest = state.latest_seq, "dropping stale loan list response");
            return;
        }
        match result {
            Ok(loans) => {
                debug!(token, count = loans.len(), "loan list replaced");
                state.loans = loans;
                state.token = Some(token);
                state.last_error = None;
            }
            Err(err) => {
                warn!(token, error = %err, "loan list fetch failed");
                state.last_error = Some(err);
            }
        }
        drop(state);
        self.settled.send_replace(seq);
    }
}

/// The loan table. Mount it on a [`RefreshReader`] and it keeps itself in
/// sync; call [`PaymentListView::on_token_changed`] to drive it by hand.
pub struct PaymentListView<G> {
    core: Arc<ListCore<G>>,
    subscription: Mutex<Option<(RefreshReader, Subscription)>>,
}

impl<G: LoanGateway> PaymentListView<G> {
    /// Fetch tasks are spawned on `runtime`.
    pub fn new(gateway: Arc<G>, runtime: Handle) -> Self {
        let (settled, _) = watch::channel(0);
        Self {
            core: Arc::new(ListCore {
                gateway,
                state: Mutex::new(ListState::default()),
                settled,
                runtime,
            }),
            subscription: Mutex::new(None),
        }
    }

    /// Subscribe to `reader` and fetch once for its current value.
    /// Mounting again replaces the previous subscription.
    pub fn mount(&self, reader: &RefreshReader) {
        self.release_subscription();
        self.core.lock().disposed = false;

        let core = Arc::clone(&self.core);
        let subscription = reader.subscribe(move |token| core.on_token_changed(token));
        *self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some((reader.clone(), subscription));

        self.core.on_token_changed(reader.current());
    }

    /// Stop listening, abort in-flight fetches, and ignore any response that
    /// still arrives.
    pub fn unmount(&self) {
        self.release_subscription();
        let (tasks, latest) = {
            let mut state = self.core.lock();
            state.disposed = true;
            (std::mem::take(&mut state.in_flight), state.latest_seq)
        };
        for task in &tasks {
            task.abort();
        }
        // Nobody will apply `latest` any more.
        self.core.settled.send_replace(latest);
        debug!(aborted = tasks.len(), "loan list unmounted");
    }

    fn release_subscription(&self) {
        let previous = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((reader, subscription)) = previous {
            reader.unsubscribe(&subscription);
        }
    }

    /// Start exactly one fetch for `token`.
    pub fn on_token_changed(&self, token: u64) {
        self.core.on_token_changed(token);
    }

    /// Resolves once the latest started fetch has been applied (or the view
    /// was unmounted).
    pub async fn settled(&self) {
        let mut rx = self.core.settled.subscribe();
        loop {
            let latest = self.core.lock().latest_seq;
            if *rx.borrow_and_update() >= latest {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn loans(&self) -> Vec<LoanRecord> {
        self.core.lock().loans.clone()
    }

    pub fn rows(&self) -> Vec<LoanRow> {
        self.core.lock().loans.iter().map(LoanRow::from_record).collect()
    }

    pub fn render_table(&self) -> String {
        render_table(&self.rows())
    }

    pub fn snapshot(&self) -> ListSnapshot {
        let mounted = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        let state = self.core.lock();
        ListSnapshot {
            loans: state.loans.clone(),
            token: state.token,
            last_error: state.last_error.clone(),
            fetches_started: state.fetches_started,
            stale_dropped: state.stale_dropped,
            mounted,
        }
    }
}

impl<G> Drop for PaymentListView<G> {
    fn drop(&mut self) {
        let previous = self
            .subscription
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((reader, subscription)) = previous {
            reader.unsubscribe(&subscription);
        }
        let mut state = self.core.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.disposed = true;
        for task in state.in_flight.drain(..) {
            task.abort();
        }
    }
}
