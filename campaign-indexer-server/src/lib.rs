pub mod routes;
mod server;
mod settings;
mod tracing;

pub use crate::tracing::init_logs;
pub use server::run;
pub use settings::Settings;
