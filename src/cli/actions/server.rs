use crate::{
    api::{
        self,
        email::{EmailSender, LogEmailSender, SmtpConfig, SmtpEmailSender},
        AppState,
    },
    cli::globals::GlobalArgs,
    store::{self, LocalCache, PgUserStore, UserStore},
};
use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub db_username: Option<String>,
    pub db_password: Option<SecretString>,
    pub cache_path: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<SecretString>,
    pub smtp_from: Option<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, the SMTP settings are
/// invalid, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let mut globals = GlobalArgs::new();
    globals.set_db_credentials(args.db_username, args.db_password);
    globals.set_smtp_credentials(args.smtp_username, args.smtp_password);

    debug!("Global args: {:?}", globals);

    let dsn = dsn_with_credentials(&args.dsn, &globals)?;

    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let pg_store = PgUserStore::new(pool);
    pg_store
        .ensure_schema()
        .await
        .context("Failed to apply database schema")?;

    info!("Connected to database");

    let mailer: Arc<dyn EmailSender> = if let Some((username, password)) =
        globals.smtp_credentials()
    {
        let mut config = SmtpConfig::new(username.to_string(), password.clone())
            .with_host(args.smtp_host)
            .with_port(args.smtp_port);
        if let Some(from) = args.smtp_from {
            config = config.with_from(from);
        }
        Arc::new(SmtpEmailSender::new(&config).context("Invalid SMTP configuration")?)
    } else {
        warn!("SMTP credentials not configured, OTP emails will only be logged");
        Arc::new(LogEmailSender)
    };

    let store: Arc<dyn UserStore> = Arc::new(pg_store);
    let cache = Arc::new(LocalCache::new(args.cache_path));

    // Mirror the current collection before serving; a failure here is not fatal.
    match store::resync(store.as_ref(), &cache).await {
        Ok(records) => info!(records, path = %cache.path().display(), "Local cache synced"),
        Err(err) => error!("Initial cache sync failed: {err}"),
    }

    let state = Arc::new(AppState::new(store, mailer, cache));

    api::new(args.port, state).await
}

/// Replace the DSN credentials with the configured ones, if any.
fn dsn_with_credentials(dsn: &str, globals: &GlobalArgs) -> Result<String> {
    let mut dsn = Url::parse(dsn).context("Invalid database DSN")?;

    if let Some(username) = &globals.db_username {
        dsn.set_username(username)
            .map_err(|()| anyhow!("Error setting username"))?;
    }

    if let Some(password) = &globals.db_password {
        dsn.set_password(Some(password.expose_secret()))
            .map_err(|()| anyhow!("Error setting password"))?;
    }

    Ok(dsn.to_string())
}
