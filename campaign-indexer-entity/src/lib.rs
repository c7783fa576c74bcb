pub mod campaigns;
pub mod contributions;
pub mod event_logs;
pub mod milestones;
pub mod refunds;
pub mod votes;

pub mod prelude {
    pub use super::{
        campaigns::Entity as Campaigns, contributions::Entity as Contributions,
        event_logs::Entity as EventLogs, milestones::Entity as Milestones,
        refunds::Entity as Refunds, votes::Entity as Votes,
    };
}
