use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            CREATE TABLE "campaigns" (
                "campaign_id" bigint PRIMARY KEY,
                "creator" varchar NOT NULL,
                "title" varchar NOT NULL,
                "description" varchar NOT NULL,
                "goal" bigint NOT NULL,
                "raised" bigint NOT NULL DEFAULT 0,
                "deadline" bigint NOT NULL,
                "status" smallint NOT NULL DEFAULT 1,
                "milestone_enabled" boolean NOT NULL DEFAULT false,
                "backer_count" bigint NOT NULL DEFAULT 0,
                "created_at" bigint NOT NULL,
                "updated_at" bigint NOT NULL
            );

            CREATE TABLE "contributions" (
                "tx_id" varchar PRIMARY KEY,
                "campaign_id" bigint NOT NULL,
                "contributor" varchar NOT NULL,
                "amount" bigint NOT NULL,
                "timestamp" bigint NOT NULL,
                "block_height" bigint NOT NULL,
                "refunded" boolean NOT NULL DEFAULT false
            );

            CREATE INDEX "contributions_campaign_id_index"
                ON "contributions" ("campaign_id");
            CREATE INDEX "contributions_contributor_index"
                ON "contributions" ("campaign_id", "contributor");

            CREATE TABLE "milestones" (
                "campaign_id" bigint NOT NULL,
                "milestone_id" bigint NOT NULL,
                "title" varchar NOT NULL,
                "description" varchar NOT NULL,
                "amount" bigint NOT NULL,
                "status" smallint NOT NULL DEFAULT 0,
                "voting_deadline" bigint,
                "released_at" bigint,
                "yes_votes" bigint NOT NULL DEFAULT 0,
                "no_votes" bigint NOT NULL DEFAULT 0,
                "total_voters" bigint NOT NULL DEFAULT 0,
                "approved" boolean NOT NULL DEFAULT false,
                PRIMARY KEY ("campaign_id", "milestone_id")
            );

            CREATE TABLE "votes" (
                "tx_id" varchar PRIMARY KEY,
                "campaign_id" bigint NOT NULL,
                "milestone_id" bigint NOT NULL,
                "voter" varchar NOT NULL,
                "vote" boolean NOT NULL,
                "voting_power" bigint NOT NULL,
                "timestamp" bigint NOT NULL
            );

            CREATE INDEX "votes_milestone_index"
                ON "votes" ("campaign_id", "milestone_id");

            CREATE TABLE "refunds" (
                "tx_id" varchar PRIMARY KEY,
                "campaign_id" bigint NOT NULL,
                "contributor" varchar NOT NULL,
                "amount" bigint NOT NULL,
                "timestamp" bigint NOT NULL,
                "block_height" bigint NOT NULL
            );

            CREATE TABLE "event_logs" (
                "id" bigserial PRIMARY KEY,
                "event_kind" varchar NOT NULL,
                "campaign_id" bigint,
                "tx_id" varchar NOT NULL,
                "block_height" bigint NOT NULL,
                "sender" varchar NOT NULL,
                "data" jsonb NOT NULL,
                "outcome" varchar NOT NULL DEFAULT 'delivered',
                "prior" jsonb,
                "rolled_back" boolean NOT NULL DEFAULT false,
                "processed_at" timestamptz NOT NULL DEFAULT now()
            );

            CREATE INDEX "event_logs_block_height_index"
                ON "event_logs" ("block_height");
            CREATE INDEX "event_logs_tx_id_index"
                ON "event_logs" ("tx_id");

            COMMENT ON TABLE "event_logs" IS 'Append-only audit of webhook deliveries; basis for reorg rollback';
        "#;
        crate::from_sql(manager, sql).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            DROP TABLE "event_logs";
            DROP TABLE "refunds";
            DROP TABLE "votes";
            DROP TABLE "milestones";
            DROP TABLE "contributions";
            DROP TABLE "campaigns";
        "#;
        crate::from_sql(manager, sql).await
    }
}
