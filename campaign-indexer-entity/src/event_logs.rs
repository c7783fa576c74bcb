use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "event_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub event_kind: String,
    pub campaign_id: Option<i64>,
    pub tx_id: String,
    pub block_height: i64,
    pub sender: String,
    pub data: Json,
    pub outcome: String,
    pub prior: Option<Json>,
    pub rolled_back: bool,
    pub processed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
