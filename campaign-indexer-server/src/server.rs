use crate::{
    routes,
    settings::{DatabaseSettings, Settings},
};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use campaign_indexer_logic::{
    client::{platform_definitions, ChainhookClient},
    ingest::Ingester,
    store::PostgresStore,
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseBackend, DatabaseConnection, ConnectionTrait, Statement};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub async fn run(settings: Settings) -> Result<(), anyhow::Error> {
    crate::tracing::init_logs()?;
    anyhow::ensure!(
        !settings.webhook.secret.is_empty(),
        "webhook secret must be configured"
    );

    let db = initialize_postgres(&settings.database).await?;
    let store = Arc::new(PostgresStore::new(db));
    let ingester = Arc::new(Ingester::new(store, settings.ingest.clone()));

    register_chainhooks(&settings);

    let state = web::Data::new(routes::AppState {
        ingester,
        webhook_secret: settings.webhook.secret.clone(),
    });

    tracing::info!(addr = %settings.server.addr, "starting http server");
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .configure(|config| routes::configure(config, state.clone()))
    })
    .bind(settings.server.addr)
    .context("failed to bind server")?
    .run()
    .await?;
    Ok(())
}

async fn initialize_postgres(settings: &DatabaseSettings) -> anyhow::Result<DatabaseConnection> {
    // Create database if not exists
    if settings.create_database {
        let (db_base_url, db_name) = {
            let mut db_url: url::Url = settings.url.parse().context("invalid database url")?;
            let db_name = db_url
                .path_segments()
                .and_then(|mut segments| segments.next())
                .ok_or(anyhow::anyhow!("missing database name"))?
                .to_string();
            db_url.set_path("");
            if db_name.is_empty() {
                Err(anyhow::anyhow!("database name is empty"))?
            }
            (db_url, db_name)
        };
        tracing::info!("creating database '{db_name}'");
        let db = Database::connect(format!("{db_base_url}/postgres")).await?;
        let result = db
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!(r#"CREATE DATABASE "{db_name}""#),
            ))
            .await;
        match result {
            Ok(_) => tracing::info!("database '{db_name}' created"),
            Err(e) => {
                if e.to_string().contains("already exists") {
                    tracing::info!("database '{db_name}' already exists");
                } else {
                    return Err(anyhow::anyhow!(e));
                }
            }
        };
    }

    let db = Database::connect(&settings.url).await?;
    if settings.run_migrations {
        Migrator::up(&db, None).await?;
    }
    Ok(db)
}

/// Registers this service's contract-call predicates against the configured
/// chainhook node. Best-effort: failures are logged, ingestion serves anyway.
fn register_chainhooks(settings: &Settings) {
    let (Some(node_url), Some(webhook_url)) = (
        settings.chainhook.node_url.clone(),
        settings.chainhook.webhook_url.clone(),
    ) else {
        return;
    };
    if settings.chainhook.campaign_contract.is_empty()
        || settings.chainhook.milestone_contract.is_empty()
    {
        tracing::warn!("chainhook node configured but contract ids are missing, skipping registration");
        return;
    }

    let definitions = platform_definitions(
        &settings.chainhook.network,
        &settings.chainhook.campaign_contract,
        &settings.chainhook.milestone_contract,
        &webhook_url,
        &settings.webhook.secret,
    );
    let client = ChainhookClient::new(node_url, settings.chainhook.api_key.clone());
    tokio::spawn(async move {
        client.register_platform_hooks(&definitions).await;
    });
}
