//! The projection store owns the five entity collections and the audit log.
//! Handlers reach them only through these narrow operations; idempotency is
//! enforced by conditional writes (insert-if-absent, guarded transitions)
//! rather than read-then-write.

pub mod mem;
pub mod postgres;

pub use mem::InMemoryStore;
pub use postgres::PostgresStore;

use crate::{
    error::StoreError,
    types::{
        Campaign, CampaignStatus, Contribution, EventLogRecord, Milestone, MilestoneStatus,
        NewCampaign, NewContribution, NewEventLog, NewMilestone, NewRefund, NewVote, Vote,
    },
};
use async_trait::async_trait;

#[async_trait]
pub trait ProjectionStore: Send + Sync {
    // campaigns
    /// Returns false when a campaign with the same id already exists.
    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<bool, StoreError>;
    async fn campaign(&self, campaign_id: u64) -> Result<Option<Campaign>, StoreError>;
    /// Atomic in-place adjustment of `raised` and `backer_count`.
    async fn add_campaign_totals(
        &self,
        campaign_id: u64,
        raised_delta: i64,
        backers_delta: i64,
        updated_at: i64,
    ) -> Result<(), StoreError>;
    /// Conditional status change; returns false when the campaign was not in
    /// `from` (including when it does not exist).
    async fn transition_campaign_status(
        &self,
        campaign_id: u64,
        from: CampaignStatus,
        to: CampaignStatus,
        updated_at: i64,
    ) -> Result<bool, StoreError>;
    /// Unconditional status restore, used by rollback only.
    async fn force_campaign_status(
        &self,
        campaign_id: u64,
        status: CampaignStatus,
        updated_at: i64,
    ) -> Result<(), StoreError>;
    /// Deletes the campaign unless contributions or milestones still
    /// reference it; returns whether a row was deleted.
    async fn delete_campaign_if_unreferenced(&self, campaign_id: u64) -> Result<bool, StoreError>;

    // contributions
    async fn insert_contribution(&self, contribution: NewContribution) -> Result<bool, StoreError>;
    async fn contribution_by_tx(&self, tx_id: &str) -> Result<Option<Contribution>, StoreError>;
    /// Non-refunded contributions of one contributor to one campaign, in
    /// chain order.
    async fn active_contributions(
        &self,
        campaign_id: u64,
        contributor: &str,
    ) -> Result<Vec<Contribution>, StoreError>;
    async fn set_contributions_refunded(
        &self,
        tx_ids: &[String],
        refunded: bool,
    ) -> Result<u64, StoreError>;
    async fn delete_contribution(&self, tx_id: &str) -> Result<bool, StoreError>;

    // milestones
    async fn insert_milestone(&self, milestone: NewMilestone) -> Result<bool, StoreError>;
    async fn milestone(
        &self,
        campaign_id: u64,
        milestone_id: u64,
    ) -> Result<Option<Milestone>, StoreError>;
    /// Atomic in-place adjustment of the vote tallies.
    async fn add_vote_totals(
        &self,
        campaign_id: u64,
        milestone_id: u64,
        yes_delta: i64,
        no_delta: i64,
        voters_delta: i64,
    ) -> Result<(), StoreError>;
    /// Marks the milestone released unless it already is; returns whether the
    /// transition happened.
    async fn release_milestone(
        &self,
        campaign_id: u64,
        milestone_id: u64,
        released_at: i64,
    ) -> Result<bool, StoreError>;
    /// Restores the release-related fields, used by rollback only.
    async fn restore_milestone_release_state(
        &self,
        campaign_id: u64,
        milestone_id: u64,
        status: MilestoneStatus,
        approved: bool,
        released_at: Option<i64>,
    ) -> Result<(), StoreError>;
    async fn delete_milestone_if_unreferenced(
        &self,
        campaign_id: u64,
        milestone_id: u64,
    ) -> Result<bool, StoreError>;

    // votes
    async fn insert_vote(&self, vote: NewVote) -> Result<bool, StoreError>;
    async fn vote_by_tx(&self, tx_id: &str) -> Result<Option<Vote>, StoreError>;
    async fn delete_vote(&self, tx_id: &str) -> Result<bool, StoreError>;

    // refunds
    async fn insert_refund(&self, refund: NewRefund) -> Result<bool, StoreError>;
    async fn delete_refund(&self, tx_id: &str) -> Result<bool, StoreError>;

    // audit log
    /// Appends a delivery record and returns its id.
    async fn append_event_log(&self, entry: NewEventLog) -> Result<i64, StoreError>;
    async fn record_outcome(
        &self,
        log_id: i64,
        outcome: &str,
        prior: Option<serde_json::Value>,
    ) -> Result<(), StoreError>;
    /// Not-yet-rolled-back records for one block height, in append order.
    async fn event_logs_at_height(
        &self,
        block_height: u64,
    ) -> Result<Vec<EventLogRecord>, StoreError>;
    async fn mark_rolled_back(&self, log_id: i64) -> Result<(), StoreError>;
}
