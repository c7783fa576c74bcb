//! Compensation for retracted blocks: every audit record written for a block
//! that a reorg threw away gets its effect reversed, in reverse append order.

use crate::{
    error::StoreError,
    events::{outcome, EventKind},
    handlers::refunds::RefundPrior,
    payload::Block,
    store::ProjectionStore,
    types::{CampaignStatus, EventLogRecord, MilestoneStatus},
};
use std::cmp::Reverse;

pub struct RollbackCoordinator<'a> {
    store: &'a dyn ProjectionStore,
}

impl<'a> RollbackCoordinator<'a> {
    pub fn new(store: &'a dyn ProjectionStore) -> Self {
        Self { store }
    }

    /// Reverses everything recorded for the block's height and returns how
    /// many effects were actually undone. Safe to run repeatedly for the
    /// same block: processed records are marked and skipped next time, and
    /// each inverse is guarded by the row it reverses still existing.
    pub async fn rollback_block(&self, block: &Block) -> Result<usize, StoreError> {
        let height = block.height();
        let mut records = self.store.event_logs_at_height(height).await?;
        if records.is_empty() {
            tracing::info!(height, "retracted block has no recorded events, nothing to undo");
            return Ok(0);
        }
        tracing::info!(height, events = records.len(), "rolling back retracted block");

        records.sort_by_key(|record| Reverse(record.id));
        let mut reverted = 0;
        for record in records {
            if self.revert(&record, block.timestamp).await? {
                reverted += 1;
            }
            self.store.mark_rolled_back(record.id).await?;
        }
        Ok(reverted)
    }

    /// Applies the inverse of one audit record's effect. Returns false when
    /// there was nothing to undo (duplicate/failed deliveries, rows already
    /// gone, effects something else still depends on).
    async fn revert(&self, record: &EventLogRecord, timestamp: i64) -> Result<bool, StoreError> {
        if record.outcome != outcome::APPLIED {
            return Ok(false);
        }
        let Some(kind) = EventKind::from_label(&record.event_kind) else {
            tracing::warn!(kind = %record.event_kind, id = record.id, "unknown event kind in audit log");
            return Ok(false);
        };

        match kind {
            EventKind::CampaignCreated => {
                let Some(campaign_id) = record.campaign_id else {
                    return Ok(false);
                };
                let deleted = self.store.delete_campaign_if_unreferenced(campaign_id).await?;
                if !deleted {
                    tracing::warn!(
                        campaign_id,
                        "campaign still referenced or already gone, leaving in place"
                    );
                }
                Ok(deleted)
            }
            EventKind::ContributionMade => {
                let Some(contribution) = self.store.contribution_by_tx(&record.tx_id).await? else {
                    return Ok(false);
                };
                if !contribution.refunded {
                    self.store
                        .add_campaign_totals(
                            contribution.campaign_id,
                            -(contribution.amount as i64),
                            -1,
                            timestamp,
                        )
                        .await?;
                }
                self.store.delete_contribution(&record.tx_id).await?;
                Ok(true)
            }
            EventKind::FundsClaimed => {
                let Some(campaign_id) = record.campaign_id else {
                    return Ok(false);
                };
                let prior_status = record
                    .prior
                    .as_ref()
                    .and_then(|prior| prior.get("status"))
                    .and_then(serde_json::Value::as_i64)
                    .and_then(|status| CampaignStatus::from_i16(status as i16));
                let Some(status) = prior_status else {
                    tracing::warn!(campaign_id, id = record.id, "no prior status recorded, cannot revert");
                    return Ok(false);
                };
                self.store
                    .force_campaign_status(campaign_id, status, timestamp)
                    .await?;
                Ok(true)
            }
            EventKind::RefundProcessed => {
                if !self.store.delete_refund(&record.tx_id).await? {
                    return Ok(false);
                }
                let Some(campaign_id) = record.campaign_id else {
                    return Ok(false);
                };
                let prior: RefundPrior = match record
                    .prior
                    .clone()
                    .map(serde_json::from_value)
                    .transpose()
                {
                    Ok(Some(prior)) => prior,
                    _ => {
                        tracing::warn!(id = record.id, "refund prior payload missing or malformed");
                        return Ok(false);
                    }
                };
                self.store
                    .set_contributions_refunded(&prior.refunded_tx_ids, false)
                    .await?;
                self.store
                    .add_campaign_totals(
                        campaign_id,
                        prior.amount as i64,
                        prior.count as i64,
                        timestamp,
                    )
                    .await?;
                Ok(true)
            }
            EventKind::MilestoneCreated => {
                let (Some(campaign_id), Some(milestone_id)) =
                    (record.campaign_id, milestone_id_of(record))
                else {
                    return Ok(false);
                };
                let deleted = self
                    .store
                    .delete_milestone_if_unreferenced(campaign_id, milestone_id)
                    .await?;
                if !deleted {
                    tracing::warn!(
                        campaign_id,
                        milestone_id,
                        "milestone still referenced or already gone, leaving in place"
                    );
                }
                Ok(deleted)
            }
            EventKind::VoteCast => {
                let Some(vote) = self.store.vote_by_tx(&record.tx_id).await? else {
                    return Ok(false);
                };
                let (yes_delta, no_delta) = if vote.vote {
                    (-(vote.voting_power as i64), 0)
                } else {
                    (0, -(vote.voting_power as i64))
                };
                self.store
                    .add_vote_totals(vote.campaign_id, vote.milestone_id, yes_delta, no_delta, -1)
                    .await?;
                self.store.delete_vote(&record.tx_id).await?;
                Ok(true)
            }
            EventKind::MilestoneReleased => {
                let (Some(campaign_id), Some(milestone_id)) =
                    (record.campaign_id, milestone_id_of(record))
                else {
                    return Ok(false);
                };
                let Some(prior) = record.prior.as_ref() else {
                    tracing::warn!(
                        campaign_id,
                        milestone_id,
                        "no prior release state recorded, cannot revert"
                    );
                    return Ok(false);
                };
                let status = prior
                    .get("status")
                    .and_then(serde_json::Value::as_i64)
                    .and_then(|status| MilestoneStatus::from_i16(status as i16))
                    .unwrap_or(MilestoneStatus::Approved);
                let approved = prior
                    .get("approved")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false);
                let released_at = prior.get("released_at").and_then(serde_json::Value::as_i64);
                self.store
                    .restore_milestone_release_state(
                        campaign_id,
                        milestone_id,
                        status,
                        approved,
                        released_at,
                    )
                    .await?;
                Ok(true)
            }
        }
    }
}

fn milestone_id_of(record: &EventLogRecord) -> Option<u64> {
    record
        .data
        .get("milestone-id")
        .and_then(serde_json::Value::as_u64)
}
