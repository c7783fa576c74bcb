//! End-to-end pipeline tests over the in-memory store backend.

mod pipeline;

use crate::{ingest::Ingester, payload::Payload, settings::IngestSettings, store::InMemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;

pub const CAMPAIGN_CONTRACT: &str = "ST1DEPLOYER.campaign";

pub fn tx(hash: &str, sender: &str, function: &str, args: &[(&str, &str)]) -> Value {
    let function_args: Vec<Value> = args
        .iter()
        .map(|(name, repr)| json!({"name": name, "repr": repr}))
        .collect();
    json!({
        "transaction_identifier": {"hash": hash},
        "metadata": {
            "success": true,
            "sender": sender,
            "contract_call": {
                "contract_id": CAMPAIGN_CONTRACT,
                "function_name": function,
                "function_args": function_args,
            }
        }
    })
}

pub fn block(height: u64, timestamp: i64, transactions: Vec<Value>) -> Value {
    json!({
        "block_identifier": {"index": height, "hash": format!("0xblock{height}")},
        "timestamp": timestamp,
        "transactions": transactions,
    })
}

pub fn notification(apply: Vec<Value>, rollback: Vec<Value>) -> Payload {
    serde_json::from_value(json!({"apply": apply, "rollback": rollback}))
        .expect("notification fixture must deserialize")
}

pub fn setup() -> (Arc<InMemoryStore>, Ingester) {
    setup_with(IngestSettings::default())
}

pub fn setup_with(settings: IngestSettings) -> (Arc<InMemoryStore>, Ingester) {
    let store = Arc::new(InMemoryStore::default());
    let ingester = Ingester::new(store.clone(), settings);
    (store, ingester)
}

pub fn create_campaign_tx(hash: &str, creator: &str, campaign_id: u64, goal: u64) -> Value {
    tx(
        hash,
        creator,
        "create-campaign",
        &[
            ("campaign-id", &format!("u{campaign_id}")),
            ("title", "\"Test Campaign\""),
            ("description", "\"A campaign used in tests\""),
            ("goal", &format!("u{goal}")),
            ("deadline", "u2000"),
            ("milestone-enabled", "true"),
        ],
    )
}

pub fn contribute_tx(hash: &str, contributor: &str, campaign_id: u64, amount: u64) -> Value {
    tx(
        hash,
        contributor,
        "contribute",
        &[
            ("campaign-id", &format!("u{campaign_id}")),
            ("amount", &format!("u{amount}")),
        ],
    )
}

pub fn add_milestone_tx(hash: &str, creator: &str, campaign_id: u64, milestone_id: u64) -> Value {
    tx(
        hash,
        creator,
        "add-milestone",
        &[
            ("campaign-id", &format!("u{campaign_id}")),
            ("milestone-id", &format!("u{milestone_id}")),
            ("title", "\"MVP\""),
            ("description", "\"Ship the MVP\""),
            ("amount", "u200"),
            ("voting-deadline", "u3000"),
        ],
    )
}

pub fn vote_tx(
    hash: &str,
    voter: &str,
    campaign_id: u64,
    milestone_id: u64,
    vote: bool,
    power: u64,
) -> Value {
    tx(
        hash,
        voter,
        "vote-on-milestone",
        &[
            ("campaign-id", &format!("u{campaign_id}")),
            ("milestone-id", &format!("u{milestone_id}")),
            ("vote", if vote { "true" } else { "false" }),
            ("voting-power", &format!("u{power}")),
        ],
    )
}

pub fn refund_tx(hash: &str, contributor: &str, campaign_id: u64, amount: u64) -> Value {
    tx(
        hash,
        contributor,
        "refund",
        &[
            ("campaign-id", &format!("u{campaign_id}")),
            ("amount", &format!("u{amount}")),
        ],
    )
}

pub fn claim_funds_tx(hash: &str, sender: &str, campaign_id: u64) -> Value {
    tx(
        hash,
        sender,
        "claim-funds",
        &[("campaign-id", &format!("u{campaign_id}"))],
    )
}

pub fn release_milestone_tx(hash: &str, sender: &str, campaign_id: u64, milestone_id: u64) -> Value {
    tx(
        hash,
        sender,
        "release-milestone-funds",
        &[
            ("campaign-id", &format!("u{campaign_id}")),
            ("milestone-id", &format!("u{milestone_id}")),
        ],
    )
}
