use super::{Effect, EventHandler};
use crate::{
    error::HandlerError,
    events::DecodedCall,
    store::ProjectionStore,
    types::{CampaignStatus, NewCampaign},
};
use async_trait::async_trait;
use serde_json::json;

/// `create-campaign`: inserts the campaign with zeroed totals. The campaign
/// id doubles as the idempotency key.
pub struct CampaignCreated;

#[async_trait]
impl EventHandler for CampaignCreated {
    async fn apply(
        &self,
        store: &dyn ProjectionStore,
        call: &DecodedCall,
    ) -> Result<Effect, HandlerError> {
        let campaign_id = call.args.uint("campaign-id")?;
        let inserted = store
            .insert_campaign(NewCampaign {
                campaign_id,
                creator: call.sender.clone(),
                title: call.args.text_or_empty("title"),
                description: call.args.text_or_empty("description"),
                goal: call.args.uint("goal")?,
                deadline: call.args.uint("deadline")?,
                milestone_enabled: call.args.boolean_or("milestone-enabled", false),
                created_at: call.block_timestamp,
            })
            .await?;
        if inserted {
            tracing::info!(campaign_id, "campaign created");
            Ok(Effect::applied())
        } else {
            Ok(Effect::Duplicate)
        }
    }
}

/// `claim-funds`: the campaign moves from active to successful. The status
/// gate makes redelivery a no-op.
pub struct FundsClaimed;

#[async_trait]
impl EventHandler for FundsClaimed {
    async fn apply(
        &self,
        store: &dyn ProjectionStore,
        call: &DecodedCall,
    ) -> Result<Effect, HandlerError> {
        let campaign_id = call.args.uint("campaign-id")?;
        let campaign = store
            .campaign(campaign_id)
            .await?
            .ok_or(HandlerError::UnknownCampaign(campaign_id))?;
        let transitioned = store
            .transition_campaign_status(
                campaign_id,
                CampaignStatus::Active,
                CampaignStatus::Successful,
                call.block_timestamp,
            )
            .await?;
        if transitioned {
            tracing::info!(campaign_id, "funds claimed");
            Ok(Effect::applied_with_prior(
                json!({ "status": campaign.status.as_i16() }),
            ))
        } else {
            Ok(Effect::Duplicate)
        }
    }
}
