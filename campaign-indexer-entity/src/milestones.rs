use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "milestones")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub campaign_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub milestone_id: i64,
    pub title: String,
    pub description: String,
    pub amount: i64,
    pub status: i16,
    pub voting_deadline: Option<i64>,
    pub released_at: Option<i64>,
    pub yes_votes: i64,
    pub no_votes: i64,
    pub total_voters: i64,
    pub approved: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
