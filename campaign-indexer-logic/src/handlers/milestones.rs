use super::{Effect, EventHandler};
use crate::{
    error::HandlerError, events::DecodedCall, store::ProjectionStore, types::NewMilestone,
};
use async_trait::async_trait;
use serde_json::json;

/// `add-milestone`: inserts the milestone with zeroed tallies. The
/// (campaign, milestone) pair is the idempotency key.
pub struct MilestoneCreated;

#[async_trait]
impl EventHandler for MilestoneCreated {
    async fn apply(
        &self,
        store: &dyn ProjectionStore,
        call: &DecodedCall,
    ) -> Result<Effect, HandlerError> {
        let campaign_id = call.args.uint("campaign-id")?;
        let milestone_id = call.args.uint("milestone-id")?;
        if store.campaign(campaign_id).await?.is_none() {
            return Err(HandlerError::UnknownCampaign(campaign_id));
        }
        let inserted = store
            .insert_milestone(NewMilestone {
                campaign_id,
                milestone_id,
                title: call.args.text_or_empty("title"),
                description: call.args.text_or_empty("description"),
                amount: call.args.uint("amount")?,
                voting_deadline: call.args.opt_uint("voting-deadline").map(|v| v as i64),
            })
            .await?;
        if inserted {
            tracing::info!(campaign_id, milestone_id, "milestone created");
            Ok(Effect::applied())
        } else {
            Ok(Effect::Duplicate)
        }
    }
}

/// `release-milestone-funds`: marks the milestone released and approved.
/// The status gate makes redelivery a no-op.
pub struct MilestoneReleased;

#[async_trait]
impl EventHandler for MilestoneReleased {
    async fn apply(
        &self,
        store: &dyn ProjectionStore,
        call: &DecodedCall,
    ) -> Result<Effect, HandlerError> {
        let campaign_id = call.args.uint("campaign-id")?;
        let milestone_id = call.args.uint("milestone-id")?;
        let milestone = store
            .milestone(campaign_id, milestone_id)
            .await?
            .ok_or(HandlerError::UnknownMilestone(campaign_id, milestone_id))?;
        let released = store
            .release_milestone(campaign_id, milestone_id, call.block_timestamp)
            .await?;
        if released {
            tracing::info!(campaign_id, milestone_id, "milestone funds released");
            Ok(Effect::applied_with_prior(json!({
                "status": milestone.status.as_i16(),
                "approved": milestone.approved,
                "released_at": milestone.released_at,
            })))
        } else {
            Ok(Effect::Duplicate)
        }
    }
}
