//! Maps contract function names to registered handlers and drives one
//! dispatch: audit append, handler application, outcome recording.

use crate::{
    events::{outcome, DecodedCall, EventKind},
    handlers::{
        campaigns::{CampaignCreated, FundsClaimed},
        contributions::ContributionMade,
        milestones::{MilestoneCreated, MilestoneReleased},
        refunds::RefundProcessed,
        votes::VoteCast,
        Effect, EventHandler,
    },
    settings::IngestSettings,
    store::ProjectionStore,
    types::NewEventLog,
};
use std::collections::HashMap;

struct Registered {
    kind: EventKind,
    handler: Box<dyn EventHandler>,
}

/// What one dispatched transaction amounted to. `None` from
/// [`EventRouter::dispatch`] means the function name had no handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Applied,
    Duplicate,
    Failed,
}

pub struct EventRouter {
    handlers: HashMap<&'static str, Registered>,
}

impl EventRouter {
    pub fn new(settings: &IngestSettings) -> Self {
        let mut handlers: HashMap<&'static str, Registered> = HashMap::new();
        let mut register = |function: &'static str, kind: EventKind, handler: Box<dyn EventHandler>| {
            handlers.insert(function, Registered { kind, handler });
        };
        register(
            "create-campaign",
            EventKind::CampaignCreated,
            Box::new(CampaignCreated),
        );
        register(
            "contribute",
            EventKind::ContributionMade,
            Box::new(ContributionMade),
        );
        register("claim-funds", EventKind::FundsClaimed, Box::new(FundsClaimed));
        register("refund", EventKind::RefundProcessed, Box::new(RefundProcessed));
        register(
            "add-milestone",
            EventKind::MilestoneCreated,
            Box::new(MilestoneCreated),
        );
        register(
            "vote-on-milestone",
            EventKind::VoteCast,
            Box::new(VoteCast {
                validate_voting_power: settings.validate_voting_power,
            }),
        );
        register(
            "release-milestone-funds",
            EventKind::MilestoneReleased,
            Box::new(MilestoneReleased),
        );
        Self { handlers }
    }

    /// Dispatches one confirmed call. The audit record is appended before the
    /// handler runs, unconditionally, so the trail reflects delivery rather
    /// than effect. Handler failures are contained here: they end up as an
    /// error marker on the audit row, and only audit-write failures propagate.
    pub async fn dispatch(
        &self,
        store: &dyn ProjectionStore,
        call: &DecodedCall,
    ) -> Result<Option<TxOutcome>, crate::error::StoreError> {
        let Some(registered) = self.handlers.get(call.function_name.as_str()) else {
            tracing::debug!(
                function = %call.function_name,
                contract = %call.contract_id,
                "no handler registered, ignoring"
            );
            return Ok(None);
        };

        let log_id = store
            .append_event_log(NewEventLog {
                event_kind: registered.kind,
                campaign_id: call.args.opt_uint("campaign-id"),
                tx_id: call.tx_id.clone(),
                block_height: call.block_height,
                sender: call.sender.clone(),
                data: call.args.to_json(),
            })
            .await?;

        match registered.handler.apply(store, call).await {
            Ok(Effect::Applied { prior }) => {
                store.record_outcome(log_id, outcome::APPLIED, prior).await?;
                Ok(Some(TxOutcome::Applied))
            }
            Ok(Effect::Duplicate) => {
                tracing::debug!(
                    kind = %registered.kind,
                    tx_id = %call.tx_id,
                    "duplicate delivery, already applied"
                );
                store.record_outcome(log_id, outcome::DUPLICATE, None).await?;
                Ok(Some(TxOutcome::Duplicate))
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    kind = %registered.kind,
                    tx_id = %call.tx_id,
                    "failed to apply event, skipping"
                );
                let marker = format!("{}{err}", outcome::FAILED_PREFIX);
                store.record_outcome(log_id, &marker, None).await?;
                Ok(Some(TxOutcome::Failed))
            }
        }
    }
}
