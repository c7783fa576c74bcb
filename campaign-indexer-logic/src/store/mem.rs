//! In-memory projection store. Backs the test-suites and small embedded
//! deployments; the lock serialises writers, matching the per-key
//! serialisation the Postgres backend gets from atomic updates.

use super::ProjectionStore;
use crate::{
    error::StoreError,
    events::outcome,
    types::{
        Campaign, CampaignStatus, Contribution, EventLogRecord, Milestone, MilestoneStatus,
        NewCampaign, NewContribution, NewEventLog, NewMilestone, NewRefund, NewVote, Refund, Vote,
    },
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    campaigns: BTreeMap<u64, Campaign>,
    contributions: BTreeMap<String, Contribution>,
    milestones: BTreeMap<(u64, u64), Milestone>,
    votes: BTreeMap<String, Vote>,
    refunds: BTreeMap<String, Refund>,
    event_logs: Vec<EventLogRecord>,
    next_log_id: i64,
}

fn apply_delta(value: u64, delta: i64) -> u64 {
    (value as i64).saturating_add(delta).max(0) as u64
}

#[async_trait]
impl ProjectionStore for InMemoryStore {
    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        if inner.campaigns.contains_key(&campaign.campaign_id) {
            return Ok(false);
        }
        inner.campaigns.insert(
            campaign.campaign_id,
            Campaign {
                campaign_id: campaign.campaign_id,
                creator: campaign.creator,
                title: campaign.title,
                description: campaign.description,
                goal: campaign.goal,
                raised: 0,
                deadline: campaign.deadline,
                status: CampaignStatus::Active,
                milestone_enabled: campaign.milestone_enabled,
                backer_count: 0,
                created_at: campaign.created_at,
                updated_at: campaign.created_at,
            },
        );
        Ok(true)
    }

    async fn campaign(&self, campaign_id: u64) -> Result<Option<Campaign>, StoreError> {
        Ok(self.inner.read().campaigns.get(&campaign_id).cloned())
    }

    async fn add_campaign_totals(
        &self,
        campaign_id: u64,
        raised_delta: i64,
        backers_delta: i64,
        updated_at: i64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if let Some(campaign) = inner.campaigns.get_mut(&campaign_id) {
            campaign.raised = apply_delta(campaign.raised, raised_delta);
            campaign.backer_count = apply_delta(campaign.backer_count, backers_delta);
            campaign.updated_at = updated_at;
        }
        Ok(())
    }

    async fn transition_campaign_status(
        &self,
        campaign_id: u64,
        from: CampaignStatus,
        to: CampaignStatus,
        updated_at: i64,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        match inner.campaigns.get_mut(&campaign_id) {
            Some(campaign) if campaign.status == from => {
                campaign.status = to;
                campaign.updated_at = updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn force_campaign_status(
        &self,
        campaign_id: u64,
        status: CampaignStatus,
        updated_at: i64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if let Some(campaign) = inner.campaigns.get_mut(&campaign_id) {
            campaign.status = status;
            campaign.updated_at = updated_at;
        }
        Ok(())
    }

    async fn delete_campaign_if_unreferenced(&self, campaign_id: u64) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        let referenced = inner
            .contributions
            .values()
            .any(|c| c.campaign_id == campaign_id)
            || inner.milestones.keys().any(|(c, _)| *c == campaign_id);
        if referenced {
            return Ok(false);
        }
        Ok(inner.campaigns.remove(&campaign_id).is_some())
    }

    async fn insert_contribution(&self, contribution: NewContribution) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        if inner.contributions.contains_key(&contribution.tx_id) {
            return Ok(false);
        }
        inner.contributions.insert(
            contribution.tx_id.clone(),
            Contribution {
                tx_id: contribution.tx_id,
                campaign_id: contribution.campaign_id,
                contributor: contribution.contributor,
                amount: contribution.amount,
                timestamp: contribution.timestamp,
                block_height: contribution.block_height,
                refunded: false,
            },
        );
        Ok(true)
    }

    async fn contribution_by_tx(&self, tx_id: &str) -> Result<Option<Contribution>, StoreError> {
        Ok(self.inner.read().contributions.get(tx_id).cloned())
    }

    async fn active_contributions(
        &self,
        campaign_id: u64,
        contributor: &str,
    ) -> Result<Vec<Contribution>, StoreError> {
        let inner = self.inner.read();
        let mut matching: Vec<Contribution> = inner
            .contributions
            .values()
            .filter(|c| c.campaign_id == campaign_id && c.contributor == contributor && !c.refunded)
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            (a.block_height, &a.tx_id).cmp(&(b.block_height, &b.tx_id))
        });
        Ok(matching)
    }

    async fn set_contributions_refunded(
        &self,
        tx_ids: &[String],
        refunded: bool,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.write();
        let mut changed = 0;
        for tx_id in tx_ids {
            if let Some(contribution) = inner.contributions.get_mut(tx_id) {
                contribution.refunded = refunded;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete_contribution(&self, tx_id: &str) -> Result<bool, StoreError> {
        Ok(self.inner.write().contributions.remove(tx_id).is_some())
    }

    async fn insert_milestone(&self, milestone: NewMilestone) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        let key = (milestone.campaign_id, milestone.milestone_id);
        if inner.milestones.contains_key(&key) {
            return Ok(false);
        }
        inner.milestones.insert(
            key,
            Milestone {
                campaign_id: milestone.campaign_id,
                milestone_id: milestone.milestone_id,
                title: milestone.title,
                description: milestone.description,
                amount: milestone.amount,
                status: MilestoneStatus::Pending,
                voting_deadline: milestone.voting_deadline,
                released_at: None,
                yes_votes: 0,
                no_votes: 0,
                total_voters: 0,
                approved: false,
            },
        );
        Ok(true)
    }

    async fn milestone(
        &self,
        campaign_id: u64,
        milestone_id: u64,
    ) -> Result<Option<Milestone>, StoreError> {
        Ok(self
            .inner
            .read()
            .milestones
            .get(&(campaign_id, milestone_id))
            .cloned())
    }

    async fn add_vote_totals(
        &self,
        campaign_id: u64,
        milestone_id: u64,
        yes_delta: i64,
        no_delta: i64,
        voters_delta: i64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if let Some(milestone) = inner.milestones.get_mut(&(campaign_id, milestone_id)) {
            milestone.yes_votes = apply_delta(milestone.yes_votes, yes_delta);
            milestone.no_votes = apply_delta(milestone.no_votes, no_delta);
            milestone.total_voters = apply_delta(milestone.total_voters, voters_delta);
        }
        Ok(())
    }

    async fn release_milestone(
        &self,
        campaign_id: u64,
        milestone_id: u64,
        released_at: i64,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        match inner.milestones.get_mut(&(campaign_id, milestone_id)) {
            Some(milestone) if milestone.status != MilestoneStatus::Released => {
                milestone.status = MilestoneStatus::Released;
                milestone.approved = true;
                milestone.released_at = Some(released_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn restore_milestone_release_state(
        &self,
        campaign_id: u64,
        milestone_id: u64,
        status: MilestoneStatus,
        approved: bool,
        released_at: Option<i64>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if let Some(milestone) = inner.milestones.get_mut(&(campaign_id, milestone_id)) {
            milestone.status = status;
            milestone.approved = approved;
            milestone.released_at = released_at;
        }
        Ok(())
    }

    async fn delete_milestone_if_unreferenced(
        &self,
        campaign_id: u64,
        milestone_id: u64,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        let referenced = inner
            .votes
            .values()
            .any(|v| v.campaign_id == campaign_id && v.milestone_id == milestone_id);
        if referenced {
            return Ok(false);
        }
        Ok(inner.milestones.remove(&(campaign_id, milestone_id)).is_some())
    }

    async fn insert_vote(&self, vote: NewVote) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        if inner.votes.contains_key(&vote.tx_id) {
            return Ok(false);
        }
        inner.votes.insert(vote.tx_id.clone(), vote);
        Ok(true)
    }

    async fn vote_by_tx(&self, tx_id: &str) -> Result<Option<Vote>, StoreError> {
        Ok(self.inner.read().votes.get(tx_id).cloned())
    }

    async fn delete_vote(&self, tx_id: &str) -> Result<bool, StoreError> {
        Ok(self.inner.write().votes.remove(tx_id).is_some())
    }

    async fn insert_refund(&self, refund: NewRefund) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        if inner.refunds.contains_key(&refund.tx_id) {
            return Ok(false);
        }
        inner.refunds.insert(refund.tx_id.clone(), refund);
        Ok(true)
    }

    async fn delete_refund(&self, tx_id: &str) -> Result<bool, StoreError> {
        Ok(self.inner.write().refunds.remove(tx_id).is_some())
    }

    async fn append_event_log(&self, entry: NewEventLog) -> Result<i64, StoreError> {
        let mut inner = self.inner.write();
        inner.next_log_id += 1;
        let id = inner.next_log_id;
        inner.event_logs.push(EventLogRecord {
            id,
            event_kind: entry.event_kind.as_str().to_string(),
            campaign_id: entry.campaign_id,
            tx_id: entry.tx_id,
            block_height: entry.block_height,
            sender: entry.sender,
            data: entry.data,
            outcome: outcome::DELIVERED.to_string(),
            prior: None,
            rolled_back: false,
        });
        Ok(id)
    }

    async fn record_outcome(
        &self,
        log_id: i64,
        outcome: &str,
        prior: Option<serde_json::Value>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if let Some(record) = inner.event_logs.iter_mut().find(|r| r.id == log_id) {
            record.outcome = outcome.to_string();
            record.prior = prior;
        }
        Ok(())
    }

    async fn event_logs_at_height(
        &self,
        block_height: u64,
    ) -> Result<Vec<EventLogRecord>, StoreError> {
        Ok(self
            .inner
            .read()
            .event_logs
            .iter()
            .filter(|r| r.block_height == block_height && !r.rolled_back)
            .cloned()
            .collect())
    }

    async fn mark_rolled_back(&self, log_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if let Some(record) = inner.event_logs.iter_mut().find(|r| r.id == log_id) {
            record.rolled_back = true;
        }
        Ok(())
    }
}
