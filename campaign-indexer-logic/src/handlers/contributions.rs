use super::{Effect, EventHandler};
use crate::{
    error::HandlerError, events::DecodedCall, store::ProjectionStore, types::NewContribution,
};
use async_trait::async_trait;

/// `contribute`: records the contribution and bumps the campaign totals.
/// The transaction id is the idempotency key; the totals update only runs
/// when the insert actually happened, so redelivery cannot double-count.
pub struct ContributionMade;

#[async_trait]
impl EventHandler for ContributionMade {
    async fn apply(
        &self,
        store: &dyn ProjectionStore,
        call: &DecodedCall,
    ) -> Result<Effect, HandlerError> {
        let campaign_id = call.args.uint("campaign-id")?;
        let amount = call.args.uint("amount")?;
        if amount == 0 {
            return Err(HandlerError::NonPositiveAmount);
        }
        if store.campaign(campaign_id).await?.is_none() {
            return Err(HandlerError::UnknownCampaign(campaign_id));
        }
        let inserted = store
            .insert_contribution(NewContribution {
                tx_id: call.tx_id.clone(),
                campaign_id,
                contributor: call.sender.clone(),
                amount,
                timestamp: call.block_timestamp,
                block_height: call.block_height,
            })
            .await?;
        if !inserted {
            return Ok(Effect::Duplicate);
        }
        store
            .add_campaign_totals(campaign_id, amount as i64, 1, call.block_timestamp)
            .await?;
        tracing::info!(campaign_id, amount, "contribution recorded");
        Ok(Effect::applied())
    }
}
