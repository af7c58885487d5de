//! GraphQL-over-HTTP gateway.
//!
//! Requires the `http` feature. Every operation is a single `POST` of a
//! `{ "query", "variables" }` body to the configured endpoint.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use super::graphql::{self, GraphQlRequest};
use super::LoanGateway;
use crate::config::ClientConfig;
use crate::error::GatewayError;
use crate::loan::{LoanPayment, LoanRecord, PaymentSubmission, PaymentUpdate};

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    endpoint: String,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, config.endpoint.clone()))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<V: Serialize>(
        &self,
        request: &GraphQlRequest<'_, V>,
    ) -> Result<Vec<u8>, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "loan service unreachable");
                GatewayError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = body.len(), "loan service replied");

        if !status.is_success() {
            // GraphQL servers answer bad documents with 400 and an `errors` array.
            if let Some(messages) = graphql::error_messages(&body) {
                return Err(GatewayError::GraphQl(messages));
            }
            warn!(status = status.as_u16(), "loan service returned an error status");
            return Err(GatewayError::Status(status.as_u16()));
        }
        Ok(body.to_vec())
    }
}

impl LoanGateway for HttpGateway {
    async fn fetch_loans(&self) -> Result<Vec<LoanRecord>, GatewayError> {
        let body = self.post(&GraphQlRequest::query(graphql::LOANS_QUERY)).await?;
        graphql::decode_loans(&body)
    }

    async fn fetch_loan_payments(&self) -> Result<Vec<LoanPayment>, GatewayError> {
        let body = self
            .post(&GraphQlRequest::query(graphql::LOAN_PAYMENTS_QUERY))
            .await?;
        graphql::decode_loan_payments(&body)
    }

    async fn update_loan_payment(
        &self,
        submission: &PaymentSubmission,
    ) -> Result<PaymentUpdate, GatewayError> {
        let request =
            GraphQlRequest::with_variables(graphql::UPDATE_LOAN_PAYMENT_MUTATION, submission);
        let body = self.post(&request).await?;
        graphql::decode_payment_update(&body)
    }
}
