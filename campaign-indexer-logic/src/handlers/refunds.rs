use super::{Effect, EventHandler};
use crate::{error::HandlerError, events::DecodedCall, store::ProjectionStore, types::NewRefund};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Pre-event state a refund records for rollback: exactly which
/// contributions it marked, and what that took off the campaign totals.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefundPrior {
    pub refunded_tx_ids: Vec<String>,
    pub amount: u64,
    pub count: u64,
}

/// `refund`: records the refund, marks every non-refunded contribution of
/// the sender for that campaign, and takes their sum/count off the campaign
/// totals so `raised` keeps matching the non-refunded contributions.
pub struct RefundProcessed;

#[async_trait]
impl EventHandler for RefundProcessed {
    async fn apply(
        &self,
        store: &dyn ProjectionStore,
        call: &DecodedCall,
    ) -> Result<Effect, HandlerError> {
        let campaign_id = call.args.uint("campaign-id")?;
        if store.campaign(campaign_id).await?.is_none() {
            return Err(HandlerError::UnknownCampaign(campaign_id));
        }
        let inserted = store
            .insert_refund(NewRefund {
                tx_id: call.tx_id.clone(),
                campaign_id,
                contributor: call.sender.clone(),
                amount: call.args.uint_or_zero("amount"),
                timestamp: call.block_timestamp,
                block_height: call.block_height,
            })
            .await?;
        if !inserted {
            return Ok(Effect::Duplicate);
        }

        let marked = store.active_contributions(campaign_id, &call.sender).await?;
        let prior = RefundPrior {
            refunded_tx_ids: marked.iter().map(|c| c.tx_id.clone()).collect(),
            amount: marked.iter().map(|c| c.amount).sum(),
            count: marked.len() as u64,
        };
        store
            .set_contributions_refunded(&prior.refunded_tx_ids, true)
            .await?;
        store
            .add_campaign_totals(
                campaign_id,
                -(prior.amount as i64),
                -(prior.count as i64),
                call.block_timestamp,
            )
            .await?;
        tracing::info!(
            campaign_id,
            contributor = %call.sender,
            amount = prior.amount,
            "refund processed"
        );
        Ok(Effect::applied_with_prior(
            serde_json::to_value(&prior).unwrap_or_default(),
        ))
    }
}
