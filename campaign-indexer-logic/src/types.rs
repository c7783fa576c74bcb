//! Domain-side views of the projection entities. The store converts between
//! these and the database models; handlers never see SeaORM types.

use campaign_indexer_entity::{campaigns, contributions, event_logs, milestones, refunds, votes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignStatus {
    Active,
    Successful,
    Failed,
    Cancelled,
}

impl CampaignStatus {
    pub fn as_i16(&self) -> i16 {
        match self {
            Self::Active => 1,
            Self::Successful => 2,
            Self::Failed => 3,
            Self::Cancelled => 4,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            1 => Some(Self::Active),
            2 => Some(Self::Successful),
            3 => Some(Self::Failed),
            4 => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneStatus {
    Pending,
    Voting,
    Approved,
    Rejected,
    Released,
}

impl MilestoneStatus {
    pub fn as_i16(&self) -> i16 {
        match self {
            Self::Pending => 0,
            Self::Voting => 1,
            Self::Approved => 2,
            Self::Rejected => 3,
            Self::Released => 4,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Pending),
            1 => Some(Self::Voting),
            2 => Some(Self::Approved),
            3 => Some(Self::Rejected),
            4 => Some(Self::Released),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    pub campaign_id: u64,
    pub creator: String,
    pub title: String,
    pub description: String,
    pub goal: u64,
    pub raised: u64,
    pub deadline: u64,
    pub status: CampaignStatus,
    pub milestone_enabled: bool,
    pub backer_count: u64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<campaigns::Model> for Campaign {
    fn from(model: campaigns::Model) -> Self {
        Self {
            campaign_id: model.campaign_id as u64,
            creator: model.creator,
            title: model.title,
            description: model.description,
            goal: model.goal as u64,
            raised: model.raised.max(0) as u64,
            deadline: model.deadline as u64,
            status: CampaignStatus::from_i16(model.status).unwrap_or(CampaignStatus::Active),
            milestone_enabled: model.milestone_enabled,
            backer_count: model.backer_count.max(0) as u64,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCampaign {
    pub campaign_id: u64,
    pub creator: String,
    pub title: String,
    pub description: String,
    pub goal: u64,
    pub deadline: u64,
    pub milestone_enabled: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub tx_id: String,
    pub campaign_id: u64,
    pub contributor: String,
    pub amount: u64,
    pub timestamp: i64,
    pub block_height: u64,
    pub refunded: bool,
}

impl From<contributions::Model> for Contribution {
    fn from(model: contributions::Model) -> Self {
        Self {
            tx_id: model.tx_id,
            campaign_id: model.campaign_id as u64,
            contributor: model.contributor,
            amount: model.amount.max(0) as u64,
            timestamp: model.timestamp,
            block_height: model.block_height as u64,
            refunded: model.refunded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContribution {
    pub tx_id: String,
    pub campaign_id: u64,
    pub contributor: String,
    pub amount: u64,
    pub timestamp: i64,
    pub block_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    pub campaign_id: u64,
    pub milestone_id: u64,
    pub title: String,
    pub description: String,
    pub amount: u64,
    pub status: MilestoneStatus,
    pub voting_deadline: Option<i64>,
    pub released_at: Option<i64>,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub total_voters: u64,
    pub approved: bool,
}

impl From<milestones::Model> for Milestone {
    fn from(model: milestones::Model) -> Self {
        Self {
            campaign_id: model.campaign_id as u64,
            milestone_id: model.milestone_id as u64,
            title: model.title,
            description: model.description,
            amount: model.amount.max(0) as u64,
            status: MilestoneStatus::from_i16(model.status).unwrap_or(MilestoneStatus::Pending),
            voting_deadline: model.voting_deadline,
            released_at: model.released_at,
            yes_votes: model.yes_votes.max(0) as u64,
            no_votes: model.no_votes.max(0) as u64,
            total_voters: model.total_voters.max(0) as u64,
            approved: model.approved,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMilestone {
    pub campaign_id: u64,
    pub milestone_id: u64,
    pub title: String,
    pub description: String,
    pub amount: u64,
    pub voting_deadline: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub tx_id: String,
    pub campaign_id: u64,
    pub milestone_id: u64,
    pub voter: String,
    pub vote: bool,
    pub voting_power: u64,
    pub timestamp: i64,
}

impl From<votes::Model> for Vote {
    fn from(model: votes::Model) -> Self {
        Self {
            tx_id: model.tx_id,
            campaign_id: model.campaign_id as u64,
            milestone_id: model.milestone_id as u64,
            voter: model.voter,
            vote: model.vote,
            voting_power: model.voting_power.max(0) as u64,
            timestamp: model.timestamp,
        }
    }
}

pub type NewVote = Vote;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refund {
    pub tx_id: String,
    pub campaign_id: u64,
    pub contributor: String,
    pub amount: u64,
    pub timestamp: i64,
    pub block_height: u64,
}

impl From<refunds::Model> for Refund {
    fn from(model: refunds::Model) -> Self {
        Self {
            tx_id: model.tx_id,
            campaign_id: model.campaign_id as u64,
            contributor: model.contributor,
            amount: model.amount.max(0) as u64,
            timestamp: model.timestamp,
            block_height: model.block_height as u64,
        }
    }
}

pub type NewRefund = Refund;

#[derive(Debug, Clone, PartialEq)]
pub struct EventLogRecord {
    pub id: i64,
    pub event_kind: String,
    pub campaign_id: Option<u64>,
    pub tx_id: String,
    pub block_height: u64,
    pub sender: String,
    pub data: serde_json::Value,
    pub outcome: String,
    pub prior: Option<serde_json::Value>,
    pub rolled_back: bool,
}

impl From<event_logs::Model> for EventLogRecord {
    fn from(model: event_logs::Model) -> Self {
        Self {
            id: model.id,
            event_kind: model.event_kind,
            campaign_id: model.campaign_id.map(|id| id as u64),
            tx_id: model.tx_id,
            block_height: model.block_height as u64,
            sender: model.sender,
            data: model.data,
            outcome: model.outcome,
            prior: model.prior,
            rolled_back: model.rolled_back,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEventLog {
    pub event_kind: crate::events::EventKind,
    pub campaign_id: Option<u64>,
    pub tx_id: String,
    pub block_height: u64,
    pub sender: String,
    pub data: serde_json::Value,
}
