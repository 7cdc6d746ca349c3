use crate::domain::payment::Payment;
use crate::domain::ports::{GatewayDecision, PaymentGateway};
use crate::error::{PortalError, Result};
use async_trait::async_trait;
use clap::ValueEnum;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayPolicy {
    /// Every settlement check succeeds.
    #[default]
    Approve,
    /// Every settlement check is declined.
    Reject,
    /// The provider cannot be reached.
    Unavailable,
}

/// Placeholder for the Telesom Zaad and Dahabshiil settlement APIs.
#[derive(Debug, Clone, Default)]
pub struct StubGateway {
    policy: GatewayPolicy,
}

impl StubGateway {
    pub fn new(policy: GatewayPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn confirm(&self, payment: &Payment) -> Result<GatewayDecision> {
        debug!(
            transaction = %payment.transaction_id,
            method = %payment.payment_method,
            policy = ?self.policy,
            "stub settlement check"
        );
        match self.policy {
            GatewayPolicy::Approve => Ok(GatewayDecision::Approved),
            GatewayPolicy::Reject => Ok(GatewayDecision::Rejected),
            GatewayPolicy::Unavailable => Err(PortalError::UpstreamFailure(format!(
                "{} gateway unreachable",
                payment.payment_method
            ))),
        }
    }
}
