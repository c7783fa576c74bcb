use super::{Effect, EventHandler};
use crate::{error::HandlerError, events::DecodedCall, store::ProjectionStore, types::NewVote};
use async_trait::async_trait;

/// `vote-on-milestone`: records the vote and adds its power to the matching
/// tally. Voting power arrives in the event; when `validate_voting_power` is
/// on it must equal the voter's non-refunded contribution total.
pub struct VoteCast {
    pub validate_voting_power: bool,
}

#[async_trait]
impl EventHandler for VoteCast {
    async fn apply(
        &self,
        store: &dyn ProjectionStore,
        call: &DecodedCall,
    ) -> Result<Effect, HandlerError> {
        let campaign_id = call.args.uint("campaign-id")?;
        let milestone_id = call.args.uint("milestone-id")?;
        let vote = call.args.boolean("vote")?;
        let voting_power = call.args.uint_or_zero("voting-power");

        if store.milestone(campaign_id, milestone_id).await?.is_none() {
            return Err(HandlerError::UnknownMilestone(campaign_id, milestone_id));
        }
        if self.validate_voting_power {
            let recorded: u64 = store
                .active_contributions(campaign_id, &call.sender)
                .await?
                .iter()
                .map(|c| c.amount)
                .sum();
            if recorded != voting_power {
                return Err(HandlerError::VotingPowerMismatch {
                    supplied: voting_power,
                    recorded,
                });
            }
        }

        let inserted = store
            .insert_vote(NewVote {
                tx_id: call.tx_id.clone(),
                campaign_id,
                milestone_id,
                voter: call.sender.clone(),
                vote,
                voting_power,
                timestamp: call.block_timestamp,
            })
            .await?;
        if !inserted {
            return Ok(Effect::Duplicate);
        }
        let (yes_delta, no_delta) = if vote {
            (voting_power as i64, 0)
        } else {
            (0, voting_power as i64)
        };
        store
            .add_vote_totals(campaign_id, milestone_id, yes_delta, no_delta, 1)
            .await?;
        tracing::info!(campaign_id, milestone_id, vote, voting_power, "vote recorded");
        Ok(Effect::applied())
    }
}
