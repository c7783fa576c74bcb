use super::ProjectionStore;
use crate::{
    error::StoreError,
    events::outcome,
    types::{
        Campaign, CampaignStatus, Contribution, EventLogRecord, Milestone, MilestoneStatus,
        NewCampaign, NewContribution, NewEventLog, NewMilestone, NewRefund, NewVote, Vote,
    },
};
use async_trait::async_trait;
use campaign_indexer_entity::{campaigns, contributions, event_logs, milestones, refunds, votes};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveValue::{NotSet, Set},
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

pub struct PostgresStore {
    db: DatabaseConnection,
}

impl PostgresStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// `do_nothing` conflicts surface as [`DbErr::RecordNotInserted`]; map them
/// to the "already recorded" answer instead of an error.
fn insert_if_absent<T>(result: Result<T, DbErr>) -> Result<bool, StoreError> {
    match result {
        Ok(_) => Ok(true),
        Err(DbErr::RecordNotInserted) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl ProjectionStore for PostgresStore {
    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<bool, StoreError> {
        let model = campaigns::ActiveModel {
            campaign_id: Set(campaign.campaign_id as i64),
            creator: Set(campaign.creator),
            title: Set(campaign.title),
            description: Set(campaign.description),
            goal: Set(campaign.goal as i64),
            raised: Set(0),
            deadline: Set(campaign.deadline as i64),
            status: Set(CampaignStatus::Active.as_i16()),
            milestone_enabled: Set(campaign.milestone_enabled),
            backer_count: Set(0),
            created_at: Set(campaign.created_at),
            updated_at: Set(campaign.created_at),
        };
        insert_if_absent(
            campaigns::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(campaigns::Column::CampaignId)
                        .do_nothing()
                        .to_owned(),
                )
                .exec(&self.db)
                .await,
        )
    }

    async fn campaign(&self, campaign_id: u64) -> Result<Option<Campaign>, StoreError> {
        Ok(campaigns::Entity::find_by_id(campaign_id as i64)
            .one(&self.db)
            .await?
            .map(Campaign::from))
    }

    async fn add_campaign_totals(
        &self,
        campaign_id: u64,
        raised_delta: i64,
        backers_delta: i64,
        updated_at: i64,
    ) -> Result<(), StoreError> {
        campaigns::Entity::update_many()
            .col_expr(
                campaigns::Column::Raised,
                Expr::col(campaigns::Column::Raised).add(raised_delta),
            )
            .col_expr(
                campaigns::Column::BackerCount,
                Expr::col(campaigns::Column::BackerCount).add(backers_delta),
            )
            .col_expr(campaigns::Column::UpdatedAt, Expr::value(updated_at))
            .filter(campaigns::Column::CampaignId.eq(campaign_id as i64))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn transition_campaign_status(
        &self,
        campaign_id: u64,
        from: CampaignStatus,
        to: CampaignStatus,
        updated_at: i64,
    ) -> Result<bool, StoreError> {
        let result = campaigns::Entity::update_many()
            .col_expr(campaigns::Column::Status, Expr::value(to.as_i16()))
            .col_expr(campaigns::Column::UpdatedAt, Expr::value(updated_at))
            .filter(campaigns::Column::CampaignId.eq(campaign_id as i64))
            .filter(campaigns::Column::Status.eq(from.as_i16()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn force_campaign_status(
        &self,
        campaign_id: u64,
        status: CampaignStatus,
        updated_at: i64,
    ) -> Result<(), StoreError> {
        campaigns::Entity::update_many()
            .col_expr(campaigns::Column::Status, Expr::value(status.as_i16()))
            .col_expr(campaigns::Column::UpdatedAt, Expr::value(updated_at))
            .filter(campaigns::Column::CampaignId.eq(campaign_id as i64))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn delete_campaign_if_unreferenced(&self, campaign_id: u64) -> Result<bool, StoreError> {
        let contributions = contributions::Entity::find()
            .filter(contributions::Column::CampaignId.eq(campaign_id as i64))
            .count(&self.db)
            .await?;
        let milestones = milestones::Entity::find()
            .filter(milestones::Column::CampaignId.eq(campaign_id as i64))
            .count(&self.db)
            .await?;
        if contributions > 0 || milestones > 0 {
            return Ok(false);
        }
        let result = campaigns::Entity::delete_by_id(campaign_id as i64)
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_contribution(&self, contribution: NewContribution) -> Result<bool, StoreError> {
        let model = contributions::ActiveModel {
            tx_id: Set(contribution.tx_id),
            campaign_id: Set(contribution.campaign_id as i64),
            contributor: Set(contribution.contributor),
            amount: Set(contribution.amount as i64),
            timestamp: Set(contribution.timestamp),
            block_height: Set(contribution.block_height as i64),
            refunded: Set(false),
        };
        insert_if_absent(
            contributions::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(contributions::Column::TxId)
                        .do_nothing()
                        .to_owned(),
                )
                .exec(&self.db)
                .await,
        )
    }

    async fn contribution_by_tx(&self, tx_id: &str) -> Result<Option<Contribution>, StoreError> {
        Ok(contributions::Entity::find_by_id(tx_id)
            .one(&self.db)
            .await?
            .map(Contribution::from))
    }

    async fn active_contributions(
        &self,
        campaign_id: u64,
        contributor: &str,
    ) -> Result<Vec<Contribution>, StoreError> {
        Ok(contributions::Entity::find()
            .filter(contributions::Column::CampaignId.eq(campaign_id as i64))
            .filter(contributions::Column::Contributor.eq(contributor))
            .filter(contributions::Column::Refunded.eq(false))
            .order_by_asc(contributions::Column::BlockHeight)
            .order_by_asc(contributions::Column::TxId)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Contribution::from)
            .collect())
    }

    async fn set_contributions_refunded(
        &self,
        tx_ids: &[String],
        refunded: bool,
    ) -> Result<u64, StoreError> {
        if tx_ids.is_empty() {
            return Ok(0);
        }
        let result = contributions::Entity::update_many()
            .col_expr(contributions::Column::Refunded, Expr::value(refunded))
            .filter(contributions::Column::TxId.is_in(tx_ids.iter().map(String::as_str)))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete_contribution(&self, tx_id: &str) -> Result<bool, StoreError> {
        let result = contributions::Entity::delete_by_id(tx_id)
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_milestone(&self, milestone: NewMilestone) -> Result<bool, StoreError> {
        let model = milestones::ActiveModel {
            campaign_id: Set(milestone.campaign_id as i64),
            milestone_id: Set(milestone.milestone_id as i64),
            title: Set(milestone.title),
            description: Set(milestone.description),
            amount: Set(milestone.amount as i64),
            status: Set(MilestoneStatus::Pending.as_i16()),
            voting_deadline: Set(milestone.voting_deadline),
            released_at: Set(None),
            yes_votes: Set(0),
            no_votes: Set(0),
            total_voters: Set(0),
            approved: Set(false),
        };
        insert_if_absent(
            milestones::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        milestones::Column::CampaignId,
                        milestones::Column::MilestoneId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec(&self.db)
                .await,
        )
    }

    async fn milestone(
        &self,
        campaign_id: u64,
        milestone_id: u64,
    ) -> Result<Option<Milestone>, StoreError> {
        Ok(
            milestones::Entity::find_by_id((campaign_id as i64, milestone_id as i64))
                .one(&self.db)
                .await?
                .map(Milestone::from),
        )
    }

    async fn add_vote_totals(
        &self,
        campaign_id: u64,
        milestone_id: u64,
        yes_delta: i64,
        no_delta: i64,
        voters_delta: i64,
    ) -> Result<(), StoreError> {
        milestones::Entity::update_many()
            .col_expr(
                milestones::Column::YesVotes,
                Expr::col(milestones::Column::YesVotes).add(yes_delta),
            )
            .col_expr(
                milestones::Column::NoVotes,
                Expr::col(milestones::Column::NoVotes).add(no_delta),
            )
            .col_expr(
                milestones::Column::TotalVoters,
                Expr::col(milestones::Column::TotalVoters).add(voters_delta),
            )
            .filter(milestones::Column::CampaignId.eq(campaign_id as i64))
            .filter(milestones::Column::MilestoneId.eq(milestone_id as i64))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn release_milestone(
        &self,
        campaign_id: u64,
        milestone_id: u64,
        released_at: i64,
    ) -> Result<bool, StoreError> {
        let result = milestones::Entity::update_many()
            .col_expr(
                milestones::Column::Status,
                Expr::value(MilestoneStatus::Released.as_i16()),
            )
            .col_expr(milestones::Column::Approved, Expr::value(true))
            .col_expr(milestones::Column::ReleasedAt, Expr::value(Some(released_at)))
            .filter(milestones::Column::CampaignId.eq(campaign_id as i64))
            .filter(milestones::Column::MilestoneId.eq(milestone_id as i64))
            .filter(milestones::Column::Status.ne(MilestoneStatus::Released.as_i16()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn restore_milestone_release_state(
        &self,
        campaign_id: u64,
        milestone_id: u64,
        status: MilestoneStatus,
        approved: bool,
        released_at: Option<i64>,
    ) -> Result<(), StoreError> {
        milestones::Entity::update_many()
            .col_expr(milestones::Column::Status, Expr::value(status.as_i16()))
            .col_expr(milestones::Column::Approved, Expr::value(approved))
            .col_expr(milestones::Column::ReleasedAt, Expr::value(released_at))
            .filter(milestones::Column::CampaignId.eq(campaign_id as i64))
            .filter(milestones::Column::MilestoneId.eq(milestone_id as i64))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn delete_milestone_if_unreferenced(
        &self,
        campaign_id: u64,
        milestone_id: u64,
    ) -> Result<bool, StoreError> {
        let votes = votes::Entity::find()
            .filter(votes::Column::CampaignId.eq(campaign_id as i64))
            .filter(votes::Column::MilestoneId.eq(milestone_id as i64))
            .count(&self.db)
            .await?;
        if votes > 0 {
            return Ok(false);
        }
        let result = milestones::Entity::delete_by_id((campaign_id as i64, milestone_id as i64))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_vote(&self, vote: NewVote) -> Result<bool, StoreError> {
        let model = votes::ActiveModel {
            tx_id: Set(vote.tx_id),
            campaign_id: Set(vote.campaign_id as i64),
            milestone_id: Set(vote.milestone_id as i64),
            voter: Set(vote.voter),
            vote: Set(vote.vote),
            voting_power: Set(vote.voting_power as i64),
            timestamp: Set(vote.timestamp),
        };
        insert_if_absent(
            votes::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(votes::Column::TxId)
                        .do_nothing()
                        .to_owned(),
                )
                .exec(&self.db)
                .await,
        )
    }

    async fn vote_by_tx(&self, tx_id: &str) -> Result<Option<Vote>, StoreError> {
        Ok(votes::Entity::find_by_id(tx_id)
            .one(&self.db)
            .await?
            .map(Vote::from))
    }

    async fn delete_vote(&self, tx_id: &str) -> Result<bool, StoreError> {
        let result = votes::Entity::delete_by_id(tx_id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_refund(&self, refund: NewRefund) -> Result<bool, StoreError> {
        let model = refunds::ActiveModel {
            tx_id: Set(refund.tx_id),
            campaign_id: Set(refund.campaign_id as i64),
            contributor: Set(refund.contributor),
            amount: Set(refund.amount as i64),
            timestamp: Set(refund.timestamp),
            block_height: Set(refund.block_height as i64),
        };
        insert_if_absent(
            refunds::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(refunds::Column::TxId)
                        .do_nothing()
                        .to_owned(),
                )
                .exec(&self.db)
                .await,
        )
    }

    async fn delete_refund(&self, tx_id: &str) -> Result<bool, StoreError> {
        let result = refunds::Entity::delete_by_id(tx_id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn append_event_log(&self, entry: NewEventLog) -> Result<i64, StoreError> {
        let model = event_logs::ActiveModel {
            id: NotSet,
            event_kind: Set(entry.event_kind.as_str().to_string()),
            campaign_id: Set(entry.campaign_id.map(|id| id as i64)),
            tx_id: Set(entry.tx_id),
            block_height: Set(entry.block_height as i64),
            sender: Set(entry.sender),
            data: Set(entry.data),
            outcome: Set(outcome::DELIVERED.to_string()),
            prior: Set(None),
            rolled_back: Set(false),
            processed_at: Set(chrono::Utc::now()),
        };
        let result = event_logs::Entity::insert(model).exec(&self.db).await?;
        Ok(result.last_insert_id)
    }

    async fn record_outcome(
        &self,
        log_id: i64,
        outcome: &str,
        prior: Option<serde_json::Value>,
    ) -> Result<(), StoreError> {
        event_logs::Entity::update_many()
            .col_expr(event_logs::Column::Outcome, Expr::value(outcome))
            .col_expr(event_logs::Column::Prior, Expr::value(prior))
            .filter(event_logs::Column::Id.eq(log_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn event_logs_at_height(
        &self,
        block_height: u64,
    ) -> Result<Vec<EventLogRecord>, StoreError> {
        Ok(event_logs::Entity::find()
            .filter(event_logs::Column::BlockHeight.eq(block_height as i64))
            .filter(event_logs::Column::RolledBack.eq(false))
            .order_by_asc(event_logs::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(EventLogRecord::from)
            .collect())
    }

    async fn mark_rolled_back(&self, log_id: i64) -> Result<(), StoreError> {
        event_logs::Entity::update_many()
            .col_expr(event_logs::Column::RolledBack, Expr::value(true))
            .filter(event_logs::Column::Id.eq(log_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
