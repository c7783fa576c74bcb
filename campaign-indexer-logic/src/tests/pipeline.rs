use super::*;
use crate::{
    settings::IngestSettings,
    store::ProjectionStore,
    types::{CampaignStatus, MilestoneStatus},
};
use pretty_assertions::assert_eq;

const CREATOR: &str = "ST1CREATOR";
const ALICE: &str = "ST2ALICE";
const BOB: &str = "ST3BOB";

#[tokio::test]
async fn create_and_contribute_in_one_block() {
    let (store, ingester) = setup();
    let payload = notification(
        vec![block(
            100,
            1700000000,
            vec![
                create_campaign_tx("0xc0", CREATOR, 1, 1000),
                contribute_tx("0xc1", ALICE, 1, 100),
            ],
        )],
        vec![],
    );

    let outcome = ingester.process(&payload).await.unwrap();
    assert_eq!(outcome.applied, 2);
    assert_eq!(outcome.failed, 0);

    let campaign = store.campaign(1).await.unwrap().unwrap();
    assert_eq!(campaign.goal, 1000);
    assert_eq!(campaign.raised, 100);
    assert_eq!(campaign.backer_count, 1);
    assert_eq!(campaign.status, CampaignStatus::Active);
    assert_eq!(campaign.creator, CREATOR);
}

#[tokio::test]
async fn duplicate_contribution_is_counted_once() {
    let (store, ingester) = setup();
    let first = notification(
        vec![block(
            100,
            1700000000,
            vec![
                create_campaign_tx("0xc0", CREATOR, 1, 1000),
                contribute_tx("0xc1", ALICE, 1, 100),
            ],
        )],
        vec![],
    );
    ingester.process(&first).await.unwrap();

    // the indexer redelivers the same transaction in a later notification
    let second = notification(
        vec![block(100, 1700000000, vec![contribute_tx("0xc1", ALICE, 1, 100)])],
        vec![],
    );
    let outcome = ingester.process(&second).await.unwrap();
    assert_eq!(outcome.applied, 0);
    assert_eq!(outcome.duplicates, 1);

    let campaign = store.campaign(1).await.unwrap().unwrap();
    assert_eq!(campaign.raised, 100);
    assert_eq!(campaign.backer_count, 1);
}

#[tokio::test]
async fn replaying_a_whole_batch_is_idempotent() {
    let (store, ingester) = setup();
    let payload = notification(
        vec![block(
            100,
            1700000000,
            vec![
                create_campaign_tx("0xc0", CREATOR, 1, 1000),
                contribute_tx("0xc1", ALICE, 1, 100),
                contribute_tx("0xc2", BOB, 1, 250),
                add_milestone_tx("0xm1", CREATOR, 1, 1),
                vote_tx("0xv1", ALICE, 1, 1, true, 100),
            ],
        )],
        vec![],
    );

    ingester.process(&payload).await.unwrap();
    let campaign_after_first = store.campaign(1).await.unwrap().unwrap();
    let milestone_after_first = store.milestone(1, 1).await.unwrap().unwrap();

    let outcome = ingester.process(&payload).await.unwrap();
    assert_eq!(outcome.applied, 0);
    assert_eq!(outcome.duplicates, 5);

    assert_eq!(store.campaign(1).await.unwrap().unwrap(), campaign_after_first);
    assert_eq!(store.milestone(1, 1).await.unwrap().unwrap(), milestone_after_first);
}

#[tokio::test]
async fn vote_tallies_split_by_ballot() {
    let (store, ingester) = setup();
    let payload = notification(
        vec![block(
            100,
            1700000000,
            vec![
                create_campaign_tx("0xc0", CREATOR, 1, 1000),
                add_milestone_tx("0xm1", CREATOR, 1, 1),
                vote_tx("0xv1", ALICE, 1, 1, true, 500),
                vote_tx("0xv2", BOB, 1, 1, false, 300),
            ],
        )],
        vec![],
    );
    ingester.process(&payload).await.unwrap();

    let milestone = store.milestone(1, 1).await.unwrap().unwrap();
    assert_eq!(milestone.yes_votes, 500);
    assert_eq!(milestone.no_votes, 300);
    assert_eq!(milestone.total_voters, 2);
}

#[tokio::test]
async fn unrelated_campaigns_are_order_independent() {
    let batch_one = |hash_prefix: &str| {
        vec![
            create_campaign_tx(&format!("{hash_prefix}a0"), CREATOR, 1, 1000),
            contribute_tx(&format!("{hash_prefix}a1"), ALICE, 1, 100),
        ]
    };
    let batch_two = |hash_prefix: &str| {
        vec![
            create_campaign_tx(&format!("{hash_prefix}b0"), BOB, 2, 5000),
            contribute_tx(&format!("{hash_prefix}b1"), BOB, 2, 700),
        ]
    };

    let (store_ab, ingester_ab) = setup();
    let mut txs = batch_one("0x");
    txs.extend(batch_two("0x"));
    ingester_ab
        .process(&notification(vec![block(100, 1700000000, txs)], vec![]))
        .await
        .unwrap();

    let (store_ba, ingester_ba) = setup();
    let mut txs = batch_two("0x");
    txs.extend(batch_one("0x"));
    ingester_ba
        .process(&notification(vec![block(100, 1700000000, txs)], vec![]))
        .await
        .unwrap();

    assert_eq!(
        store_ab.campaign(1).await.unwrap(),
        store_ba.campaign(1).await.unwrap()
    );
    assert_eq!(
        store_ab.campaign(2).await.unwrap(),
        store_ba.campaign(2).await.unwrap()
    );
}

#[tokio::test]
async fn unknown_functions_are_ignored() {
    let (store, ingester) = setup();
    let payload = notification(
        vec![block(
            100,
            1700000000,
            vec![tx(
                "0xq1",
                ALICE,
                "get-campaign",
                &[("campaign-id", "u1")],
            )],
        )],
        vec![],
    );
    let outcome = ingester.process(&payload).await.unwrap();
    assert_eq!(outcome.ignored, 1);
    assert_eq!(outcome.applied, 0);
    assert!(store.event_logs_at_height(100).await.unwrap().is_empty());
}

#[tokio::test]
async fn failing_handler_does_not_abort_the_batch() {
    let (store, ingester) = setup();
    let payload = notification(
        vec![block(
            100,
            1700000000,
            vec![
                // campaign 9 was never created
                contribute_tx("0xbad", ALICE, 9, 100),
                create_campaign_tx("0xc0", CREATOR, 1, 1000),
                contribute_tx("0xc1", ALICE, 1, 100),
            ],
        )],
        vec![],
    );
    let outcome = ingester.process(&payload).await.unwrap();
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.applied, 2);

    let campaign = store.campaign(1).await.unwrap().unwrap();
    assert_eq!(campaign.raised, 100);

    // the failure is recorded in the audit trail
    let logs = store.event_logs_at_height(100).await.unwrap();
    assert_eq!(logs.len(), 3);
    assert!(logs[0].outcome.starts_with("failed: "));
}

#[tokio::test]
async fn funds_claimed_is_gated_on_status() {
    let (store, ingester) = setup();
    ingester
        .process(&notification(
            vec![block(
                100,
                1700000000,
                vec![
                    create_campaign_tx("0xc0", CREATOR, 1, 1000),
                    contribute_tx("0xc1", ALICE, 1, 1000),
                ],
            )],
            vec![],
        ))
        .await
        .unwrap();

    let claim = notification(
        vec![block(101, 1700000600, vec![claim_funds_tx("0xf1", CREATOR, 1)])],
        vec![],
    );
    let outcome = ingester.process(&claim).await.unwrap();
    assert_eq!(outcome.applied, 1);
    assert_eq!(
        store.campaign(1).await.unwrap().unwrap().status,
        CampaignStatus::Successful
    );

    // redelivered claim hits the status gate
    let redelivered = notification(
        vec![block(101, 1700000600, vec![claim_funds_tx("0xf2", CREATOR, 1)])],
        vec![],
    );
    let outcome = ingester.process(&redelivered).await.unwrap();
    assert_eq!(outcome.duplicates, 1);
}

#[tokio::test]
async fn refund_keeps_raised_equal_to_active_contributions() {
    let (store, ingester) = setup();
    ingester
        .process(&notification(
            vec![block(
                100,
                1700000000,
                vec![
                    create_campaign_tx("0xc0", CREATOR, 1, 1000),
                    contribute_tx("0xc1", ALICE, 1, 100),
                    contribute_tx("0xc2", ALICE, 1, 200),
                    contribute_tx("0xc3", BOB, 1, 50),
                ],
            )],
            vec![],
        ))
        .await
        .unwrap();

    let campaign = store.campaign(1).await.unwrap().unwrap();
    assert_eq!(campaign.raised, 350);
    assert_eq!(campaign.backer_count, 3);

    ingester
        .process(&notification(
            vec![block(101, 1700000600, vec![refund_tx("0xr1", ALICE, 1, 300)])],
            vec![],
        ))
        .await
        .unwrap();

    let campaign = store.campaign(1).await.unwrap().unwrap();
    assert_eq!(campaign.raised, 50);
    assert_eq!(campaign.backer_count, 1);

    // conservation: raised equals the sum over non-refunded contributions
    let alice_active: u64 = store
        .active_contributions(1, ALICE)
        .await
        .unwrap()
        .iter()
        .map(|c| c.amount)
        .sum();
    let bob_active: u64 = store
        .active_contributions(1, BOB)
        .await
        .unwrap()
        .iter()
        .map(|c| c.amount)
        .sum();
    assert_eq!(alice_active, 0);
    assert_eq!(campaign.raised, alice_active + bob_active);

    assert!(store.contribution_by_tx("0xc1").await.unwrap().unwrap().refunded);
    assert!(store.contribution_by_tx("0xc2").await.unwrap().unwrap().refunded);
    assert!(!store.contribution_by_tx("0xc3").await.unwrap().unwrap().refunded);
}

#[tokio::test]
async fn milestone_release_sets_terminal_state() {
    let (store, ingester) = setup();
    ingester
        .process(&notification(
            vec![block(
                100,
                1700000000,
                vec![
                    create_campaign_tx("0xc0", CREATOR, 1, 1000),
                    add_milestone_tx("0xm1", CREATOR, 1, 1),
                    release_milestone_tx("0xm2", CREATOR, 1, 1),
                ],
            )],
            vec![],
        ))
        .await
        .unwrap();

    let milestone = store.milestone(1, 1).await.unwrap().unwrap();
    assert_eq!(milestone.status, MilestoneStatus::Released);
    assert!(milestone.approved);
    assert_eq!(milestone.released_at, Some(1700000000));
}

#[tokio::test]
async fn voting_power_validation_rejects_mismatches() {
    let (store, ingester) = setup_with(IngestSettings {
        validate_voting_power: true,
    });
    ingester
        .process(&notification(
            vec![block(
                100,
                1700000000,
                vec![
                    create_campaign_tx("0xc0", CREATOR, 1, 1000),
                    contribute_tx("0xc1", ALICE, 1, 500),
                    add_milestone_tx("0xm1", CREATOR, 1, 1),
                ],
            )],
            vec![],
        ))
        .await
        .unwrap();

    // claimed power exceeds Alice's recorded contributions
    let outcome = ingester
        .process(&notification(
            vec![block(101, 1700000600, vec![vote_tx("0xv1", ALICE, 1, 1, true, 900)])],
            vec![],
        ))
        .await
        .unwrap();
    assert_eq!(outcome.failed, 1);
    assert_eq!(store.milestone(1, 1).await.unwrap().unwrap().total_voters, 0);

    // matching power goes through
    let outcome = ingester
        .process(&notification(
            vec![block(102, 1700000700, vec![vote_tx("0xv2", ALICE, 1, 1, true, 500)])],
            vec![],
        ))
        .await
        .unwrap();
    assert_eq!(outcome.applied, 1);
    assert_eq!(store.milestone(1, 1).await.unwrap().unwrap().yes_votes, 500);
}

#[tokio::test]
async fn failed_transactions_have_no_effect() {
    let (store, ingester) = setup();
    let mut failed_tx = contribute_tx("0xc1", ALICE, 1, 100);
    failed_tx["metadata"]["success"] = serde_json::Value::Bool(false);

    let payload = notification(
        vec![block(
            100,
            1700000000,
            vec![create_campaign_tx("0xc0", CREATOR, 1, 1000), failed_tx],
        )],
        vec![],
    );
    let outcome = ingester.process(&payload).await.unwrap();
    assert_eq!(outcome.applied, 1);

    let campaign = store.campaign(1).await.unwrap().unwrap();
    assert_eq!(campaign.raised, 0);
    assert_eq!(campaign.backer_count, 0);
}
