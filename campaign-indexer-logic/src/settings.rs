use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct IngestSettings {
    /// Cross-check each vote's supplied voting power against the voter's
    /// recorded non-refunded contribution total; mismatches fail the event.
    pub validate_voting_power: bool,
}
