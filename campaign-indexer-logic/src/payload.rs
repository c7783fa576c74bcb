//! Serde model of the indexer's webhook notification body: ordered lists of
//! newly confirmed (`apply`) and retracted (`rollback`) blocks. A pure data
//! model; extraction of typed contract calls lives in [`crate::events`].

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub apply: Vec<Block>,
    #[serde(default)]
    pub rollback: Vec<Block>,
    #[serde(default)]
    pub chainhook: Option<ChainhookInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainhookInfo {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub predicate: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    pub block_identifier: BlockIdentifier,
    #[serde(default)]
    pub parent_block_identifier: Option<BlockIdentifier>,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn height(&self) -> u64 {
        self.block_identifier.index
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockIdentifier {
    pub index: u64,
    #[serde(default)]
    pub hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub transaction_identifier: TransactionIdentifier,
    #[serde(default)]
    pub metadata: TransactionMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionIdentifier {
    pub hash: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionMetadata {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub contract_call: Option<ContractCall>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractCall {
    pub contract_id: String,
    pub function_name: String,
    #[serde(default)]
    pub function_args: Vec<FunctionArg>,
}

/// One named argument in its native textual representation. Entries missing
/// either field are skipped during extraction, as the upstream occasionally
/// pads the list with unnamed values.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionArg {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub repr: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_notification() {
        let payload: Payload = serde_json::from_value(serde_json::json!({
            "apply": [{
                "block_identifier": {"index": 100, "hash": "0xabc"},
                "parent_block_identifier": {"index": 99, "hash": "0xdef"},
                "timestamp": 1700000000,
                "transactions": [{
                    "transaction_identifier": {"hash": "0x01"},
                    "operations": [],
                    "metadata": {
                        "success": true,
                        "sender": "ST1SENDER",
                        "fee": "180",
                        "contract_call": {
                            "contract_id": "ST1DEPLOYER.campaign",
                            "function_name": "contribute",
                            "function_args": [
                                {"name": "campaign-id", "repr": "u1"},
                                {"name": "amount", "repr": "u100"}
                            ]
                        }
                    }
                }]
            }],
            "rollback": [],
            "chainhook": {"uuid": "hook-1", "predicate": {"scope": "contract_call"}}
        }))
        .unwrap();

        assert_eq!(payload.apply.len(), 1);
        assert!(payload.rollback.is_empty());
        let block = &payload.apply[0];
        assert_eq!(block.height(), 100);
        assert_eq!(block.transactions.len(), 1);
        let tx = &block.transactions[0];
        assert!(tx.metadata.success);
        let call = tx.metadata.contract_call.as_ref().unwrap();
        assert_eq!(call.function_name, "contribute");
        assert_eq!(call.function_args.len(), 2);
    }

    #[test]
    fn tolerates_missing_optional_sections() {
        let payload: Payload = serde_json::from_str("{}").unwrap();
        assert!(payload.apply.is_empty());
        assert!(payload.rollback.is_empty());
        assert!(payload.chainhook.is_none());
    }
}
