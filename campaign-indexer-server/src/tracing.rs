use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, prelude::*, Layer};

pub fn init_logs() -> Result<(), anyhow::Error> {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .boxed();
    tracing_subscriber::registry().with(stdout_layer).try_init()?;
    Ok(())
}
