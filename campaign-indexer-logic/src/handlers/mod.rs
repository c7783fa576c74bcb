//! Per-event-kind projection handlers. Every handler is idempotent: the
//! store's conditional writes resolve repeated delivery of the same on-chain
//! event to [`Effect::Duplicate`].

pub mod campaigns;
pub mod contributions;
pub mod milestones;
pub mod refunds;
pub mod votes;

use crate::{error::HandlerError, events::DecodedCall, store::ProjectionStore};
use async_trait::async_trait;

/// What applying an event did. `prior` carries pre-event field values for
/// effects the rollback coordinator cannot otherwise reverse.
#[derive(Debug, PartialEq)]
pub enum Effect {
    Applied { prior: Option<serde_json::Value> },
    Duplicate,
}

impl Effect {
    pub fn applied() -> Self {
        Self::Applied { prior: None }
    }

    pub fn applied_with_prior(prior: serde_json::Value) -> Self {
        Self::Applied { prior: Some(prior) }
    }
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn apply(
        &self,
        store: &dyn ProjectionStore,
        call: &DecodedCall,
    ) -> Result<Effect, HandlerError>;
}
