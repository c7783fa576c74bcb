//! The batch pipeline: one verified notification in, one outcome summary out.

use crate::{
    error::StoreError,
    events::confirmed_calls,
    payload::{Block, Payload},
    rollback::RollbackCoordinator,
    router::{EventRouter, TxOutcome},
    settings::IngestSettings,
    store::ProjectionStore,
};
use serde::Serialize;
use std::{cmp::Reverse, sync::Arc};
use tracing::instrument;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub applied: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub ignored: usize,
    pub rolled_back: usize,
}

pub struct Ingester {
    store: Arc<dyn ProjectionStore>,
    router: EventRouter,
}

impl Ingester {
    pub fn new(store: Arc<dyn ProjectionStore>, settings: IngestSettings) -> Self {
        let router = EventRouter::new(&settings);
        Self { store, router }
    }

    /// Processes one notification batch. Transactions run sequentially in
    /// batch order; a failing handler is recorded and does not abort the
    /// batch. Retracted blocks are rolled back after the applied ones,
    /// highest first.
    #[instrument(skip_all, fields(
        apply_blocks = payload.apply.len(),
        rollback_blocks = payload.rollback.len(),
    ))]
    pub async fn process(&self, payload: &Payload) -> Result<BatchOutcome, StoreError> {
        let mut outcome = BatchOutcome::default();

        for block in &payload.apply {
            for call in confirmed_calls(block) {
                match self.router.dispatch(self.store.as_ref(), &call).await? {
                    Some(TxOutcome::Applied) => outcome.applied += 1,
                    Some(TxOutcome::Duplicate) => outcome.duplicates += 1,
                    Some(TxOutcome::Failed) => outcome.failed += 1,
                    None => outcome.ignored += 1,
                }
            }
        }

        if !payload.rollback.is_empty() {
            let coordinator = RollbackCoordinator::new(self.store.as_ref());
            let mut retracted: Vec<&Block> = payload.rollback.iter().collect();
            retracted.sort_by_key(|block| Reverse(block.height()));
            for block in retracted {
                outcome.rolled_back += coordinator.rollback_block(block).await?;
            }
        }

        tracing::info!(
            applied = outcome.applied,
            duplicates = outcome.duplicates,
            failed = outcome.failed,
            ignored = outcome.ignored,
            rolled_back = outcome.rolled_back,
            "processed notification batch"
        );
        Ok(outcome)
    }
}
