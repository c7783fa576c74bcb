use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("db error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("store inconsistency: {0}")]
    Inconsistent(String),
}

/// Failure to apply a single event. Recovered per-transaction: the router
/// records the error on the audit row and continues with the batch.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("missing argument `{0}`")]
    MissingArgument(&'static str),
    #[error("argument `{0}` is not a {1}")]
    BadArgument(&'static str, &'static str),
    #[error("campaign {0} is not indexed")]
    UnknownCampaign(u64),
    #[error("milestone {1} of campaign {0} is not indexed")]
    UnknownMilestone(u64, u64),
    #[error("amount must be positive")]
    NonPositiveAmount,
    #[error("voting power {supplied} does not match recorded contributions {recorded}")]
    VotingPowerMismatch { supplied: u64, recorded: u64 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chainhook node returned {status}: {body}")]
    Status { status: u16, body: String },
}
