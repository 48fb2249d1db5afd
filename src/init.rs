use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::telemetry::{self};
use crate::telemetry::ops::init::Phase as InitPhase;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Create or upgrade the `media` schema
#[derive(Args, Debug)]
pub struct InitCmd {
    /// Apply pending migrations (plan-only by default)
    #[arg(long, default_value_t = false)]
    pub apply: bool,
}

#[derive(Debug, Serialize)]
pub struct MigrationPlan {
    pub pending: Vec<PendingMigration>,
}

#[derive(Debug, Serialize)]
pub struct PendingMigration {
    pub version: i64,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct MigrationResult {
    pub applied: usize,
}

pub async fn connect(dsn: &str, max_connections: u32) -> Result<PgPool> {
    let log = telemetry::init();
    let _s = log.span(&InitPhase::Connect).entered();
    PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(dsn)
        .await
        .context("connect to Postgres")
}

pub async fn run(pool: &PgPool, args: InitCmd) -> Result<()> {
    let log = telemetry::init();
    let mode = if args.apply { "apply" } else { "plan" };
    let _g = log.root_span_kv([("mode", mode.to_string())]).entered();

    let migrator = sqlx::migrate!();
    let applied = applied_versions(pool).await?;
    let pending: Vec<PendingMigration> = migrator
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .map(|m| PendingMigration { version: m.version, description: m.description.to_string() })
        .collect();

    if !args.apply {
        let _s = log.span(&InitPhase::Plan).entered();
        log.info(format!("📝 Init plan: {} pending migration(s)", pending.len()));
        for m in &pending {
            log.info(format!("   {} {}", m.version, m.description));
        }
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            log.plan(&MigrationPlan { pending })?;
        }
        return Ok(());
    }

    let _s = log.span(&InitPhase::Migrate).entered();
    migrator.run(pool).await.context("apply migrations")?;
    log.info(format!("✅ Schema ready ({} migration(s) applied)", pending.len()));
    if telemetry::config::json_mode() {
        log.result(&MigrationResult { applied: pending.len() })?;
    }
    Ok(())
}

async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>> {
    let tracked: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await?;
    if !tracked {
        return Ok(Vec::new());
    }
    let versions = sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success ORDER BY version")
        .fetch_all(pool)
        .await?;
    Ok(versions)
}
