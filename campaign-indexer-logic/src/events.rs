//! Typed extraction of confirmed contract calls from parsed blocks, and the
//! event-kind labels used in the audit log.

use crate::{
    clarity::{CallArgs, ClarityValue},
    payload::Block,
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CampaignCreated,
    ContributionMade,
    FundsClaimed,
    RefundProcessed,
    MilestoneCreated,
    VoteCast,
    MilestoneReleased,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CampaignCreated => "campaign-created",
            Self::ContributionMade => "contribution-made",
            Self::FundsClaimed => "funds-claimed",
            Self::RefundProcessed => "refund-processed",
            Self::MilestoneCreated => "milestone-created",
            Self::VoteCast => "vote-cast",
            Self::MilestoneReleased => "milestone-released",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "campaign-created" => Some(Self::CampaignCreated),
            "contribution-made" => Some(Self::ContributionMade),
            "funds-claimed" => Some(Self::FundsClaimed),
            "refund-processed" => Some(Self::RefundProcessed),
            "milestone-created" => Some(Self::MilestoneCreated),
            "vote-cast" => Some(Self::VoteCast),
            "milestone-released" => Some(Self::MilestoneReleased),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit outcome markers recorded on event-log rows.
pub mod outcome {
    pub const DELIVERED: &str = "delivered";
    pub const APPLIED: &str = "applied";
    pub const DUPLICATE: &str = "duplicate";
    pub const FAILED_PREFIX: &str = "failed: ";
}

/// One confirmed contract call, ready for dispatch.
#[derive(Debug, Clone)]
pub struct DecodedCall {
    pub tx_id: String,
    pub block_height: u64,
    pub block_timestamp: i64,
    pub sender: String,
    pub contract_id: String,
    pub function_name: String,
    pub args: CallArgs,
}

/// Confirmed contract calls of a block, in chain order. Transactions that
/// failed on-chain or are not contract calls are skipped.
pub fn confirmed_calls(block: &Block) -> Vec<DecodedCall> {
    block
        .transactions
        .iter()
        .filter_map(|tx| {
            if !tx.metadata.success {
                return None;
            }
            let call = tx.metadata.contract_call.as_ref()?;
            let mut args = CallArgs::default();
            for arg in &call.function_args {
                if let (Some(name), Some(repr)) = (&arg.name, &arg.repr) {
                    args.insert(name.clone(), ClarityValue::parse(repr));
                }
            }
            Some(DecodedCall {
                tx_id: tx.transaction_identifier.hash.clone(),
                block_height: block.height(),
                block_timestamp: block.timestamp,
                sender: tx.metadata.sender.clone(),
                contract_id: call.contract_id.clone(),
                function_name: call.function_name.clone(),
                args,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Payload;
    use pretty_assertions::assert_eq;

    #[test]
    fn skips_failed_and_non_call_transactions() {
        let payload: Payload = serde_json::from_value(serde_json::json!({
            "apply": [{
                "block_identifier": {"index": 5, "hash": "0x05"},
                "timestamp": 1700000000,
                "transactions": [
                    {
                        "transaction_identifier": {"hash": "0xaa"},
                        "metadata": {
                            "success": false,
                            "sender": "ST1A",
                            "contract_call": {
                                "contract_id": "ST1D.campaign",
                                "function_name": "contribute",
                                "function_args": [{"name": "amount", "repr": "u10"}]
                            }
                        }
                    },
                    {
                        "transaction_identifier": {"hash": "0xbb"},
                        "metadata": {"success": true, "sender": "ST1B"}
                    },
                    {
                        "transaction_identifier": {"hash": "0xcc"},
                        "metadata": {
                            "success": true,
                            "sender": "ST1C",
                            "contract_call": {
                                "contract_id": "ST1D.campaign",
                                "function_name": "contribute",
                                "function_args": [
                                    {"name": "campaign-id", "repr": "u1"},
                                    {"name": "amount", "repr": "u10"},
                                    {"repr": "u999"}
                                ]
                            }
                        }
                    }
                ]
            }]
        }))
        .unwrap();

        let calls = confirmed_calls(&payload.apply[0]);
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.tx_id, "0xcc");
        assert_eq!(call.sender, "ST1C");
        assert_eq!(call.block_height, 5);
        assert_eq!(call.args.uint("amount").unwrap(), 10);
        // the unnamed argument is dropped
        assert!(call.args.get("").is_none());
    }

    #[test]
    fn event_kind_labels_round_trip() {
        for kind in [
            EventKind::CampaignCreated,
            EventKind::ContributionMade,
            EventKind::FundsClaimed,
            EventKind::RefundProcessed,
            EventKind::MilestoneCreated,
            EventKind::VoteCast,
            EventKind::MilestoneReleased,
        ] {
            assert_eq!(EventKind::from_label(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::from_label("mystery-event"), None);
    }
}
