//! Outbound client for the chainhook node: builds the contract-call
//! predicate documents this service consumes and registers them so the node
//! starts delivering to the webhook endpoint.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

#[derive(Debug, Clone, Serialize)]
pub struct ChainhookDefinition {
    pub name: String,
    pub version: u32,
    pub chains: Vec<String>,
    pub networks: BTreeMap<String, NetworkHook>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkHook {
    pub if_this: Predicate,
    pub then_that: Action,
    pub decode_clarity_values: bool,
    pub include_contract_abi: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Predicate {
    pub scope: String,
    pub contract_identifier: String,
    pub method: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Action {
    pub http_post: HttpPost,
}

#[derive(Debug, Clone, Serialize)]
pub struct HttpPost {
    pub url: String,
    pub authorization_header: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainhookRegistration {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// The (name, contract kind, function) triples this service subscribes to.
const PLATFORM_HOOKS: &[(&str, ContractKind, &str)] = &[
    ("campaign-created", ContractKind::Campaign, "create-campaign"),
    ("contribution-made", ContractKind::Campaign, "contribute"),
    ("funds-claimed", ContractKind::Campaign, "claim-funds"),
    ("refund-processed", ContractKind::Campaign, "refund"),
    ("milestone-created", ContractKind::Milestone, "add-milestone"),
    ("vote-cast", ContractKind::Milestone, "vote-on-milestone"),
    (
        "milestone-released",
        ContractKind::Milestone,
        "release-milestone-funds",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContractKind {
    Campaign,
    Milestone,
}

/// One definition per subscribed contract call, delivering to `webhook_url`
/// with the shared secret as the authorization header.
pub fn platform_definitions(
    network: &str,
    campaign_contract: &str,
    milestone_contract: &str,
    webhook_url: &Url,
    secret: &str,
) -> Vec<ChainhookDefinition> {
    PLATFORM_HOOKS
        .iter()
        .map(|(name, contract, method)| {
            let contract_id = match contract {
                ContractKind::Campaign => campaign_contract,
                ContractKind::Milestone => milestone_contract,
            };
            ChainhookDefinition {
                name: name.to_string(),
                version: 1,
                chains: vec!["stacks".to_string()],
                networks: BTreeMap::from([(
                    network.to_string(),
                    NetworkHook {
                        if_this: Predicate {
                            scope: "contract_call".to_string(),
                            contract_identifier: contract_id.to_string(),
                            method: method.to_string(),
                        },
                        then_that: Action {
                            http_post: HttpPost {
                                url: webhook_url.to_string(),
                                authorization_header: format!("Bearer {secret}"),
                            },
                        },
                        decode_clarity_values: true,
                        include_contract_abi: true,
                    },
                )]),
            }
        })
        .collect()
}

pub struct ChainhookClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl ChainhookClient {
    pub fn new(base_url: Url, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = self
            .base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone());
        let mut request = self.http.request(method, url);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }
        request
    }

    pub async fn register(
        &self,
        definition: &ChainhookDefinition,
    ) -> Result<ChainhookRegistration, ClientError> {
        let response = self
            .request(reqwest::Method::POST, "v1/chainhooks")
            .json(definition)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }

    pub async fn deregister(&self, uuid: &str) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("v1/chainhooks/{uuid}"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// Registers every platform definition, logging per-hook failures and
    /// carrying on; delivery registration must never block ingestion.
    pub async fn register_platform_hooks(
        &self,
        definitions: &[ChainhookDefinition],
    ) -> Vec<ChainhookRegistration> {
        let mut registered = Vec::new();
        for definition in definitions {
            match self.register(definition).await {
                Ok(registration) => {
                    tracing::info!(name = %definition.name, uuid = %registration.uuid, "registered chainhook");
                    registered.push(registration);
                }
                Err(err) => {
                    tracing::error!(name = %definition.name, error = %err, "failed to register chainhook");
                }
            }
        }
        registered
    }
}
