use dotenvy::dotenv;
use konfess::api::{self, AppState};
use konfess::bot::commands::run_dispatcher;
use konfess::bot::transport::{BotTransport, TelegramTransport};
use konfess::config::Settings;
use konfess::db::Database;
use konfess::storage::{MediaStore, S3MediaStorage};
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting sensitive data
struct RedactionPatterns {
    token1: Regex,
    token2: Regex,
    token3: Regex,
    s3_1: Regex,
    s3_2: Regex,
    jwt: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            token1: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
            token2: Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
            token3: Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
            s3_1: Regex::new(r"S3_ACCESS_KEY_ID=[^\s&]+")?,
            s3_2: Regex::new(r"S3_SECRET_ACCESS_KEY=[^\s&]+")?,
            jwt: Regex::new(r"JWT_SECRET=[^\s&]+")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let mut output = input.to_string();
        output = self
            .token1
            .replace_all(&output, "$1[TELEGRAM_TOKEN]$3")
            .to_string();
        output = self
            .token2
            .replace_all(&output, "[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .token3
            .replace_all(&output, "$1[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .s3_1
            .replace_all(&output, "S3_ACCESS_KEY_ID=[MASKED]")
            .to_string();
        output = self
            .s3_2
            .replace_all(&output, "S3_SECRET_ACCESS_KEY=[MASKED]")
            .to_string();
        output = self
            .jwt
            .replace_all(&output, "JWT_SECRET=[MASKED]")
            .to_string();
        output
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // We return the original buffer length to satisfy the contract,
        // even if the redacted string length differs.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), self.patterns.clone())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenv().ok();

    // Initialize redaction patterns early (before logging)
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    // Setup logging with redaction
    init_logging(patterns);

    info!("Starting Konfess backend...");

    // Load settings
    let settings = init_settings();

    // Initialize database
    let db = init_db(&settings).await;

    // Initialize media storage
    let media = init_storage(&settings).await;

    // Initialize Bot
    let bot = Bot::new(settings.telegram_token.clone());
    let transport: Arc<dyn BotTransport> = Arc::new(TelegramTransport::new(bot.clone()));

    let state = AppState {
        db: db.clone(),
        transport: transport.clone(),
        media,
        settings: settings.clone(),
    };

    // Run the command dispatcher alongside the HTTP server
    let dispatcher = tokio::spawn(run_dispatcher(
        bot,
        Arc::new(db),
        transport,
        settings.clone(),
    ));

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {addr}");
    axum::serve(listener, api::router(state)).await?;

    dispatcher.abort();
    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter::new(io::stderr, patterns);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

async fn init_db(settings: &Settings) -> Database {
    match Database::connect(&settings.database_url).await {
        Ok(db) => {
            info!("Database initialized.");
            db
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    }
}

async fn init_storage(settings: &Settings) -> Arc<dyn MediaStore> {
    match S3MediaStorage::new(settings).await {
        Ok(s) => {
            info!("Media storage initialized.");
            if s.check_connection().await.is_ok() {
                // Success message already logged in check_connection
            } else {
                error!("Media storage connection check returned error.");
            }
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to initialize media storage: {}", e);
            std::process::exit(1);
        }
    }
}
