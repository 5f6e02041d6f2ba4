use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dalil::config::{DalilConfig, LoggingConfig};
use dalil::content::{render_summary, Catalog};
use dalil::form::{FormInput, FormSubmissionController, HttpTransport, SubmissionOutcome};
use dalil::page::PageQuery;
use dalil::presenter::{ConsoleView, PresenterTimings, StatusPresenter};
use dalil::ratelimit::{
    Clock, MonotonicClock, RateLimitPolicy, RateLimitStore, StorageSweeper,
};
use dalil::storage::{FileStorage, LocalStorage};
use dalil::theme::{Theme, ThemeStore};

#[derive(Parser, Debug)]
#[command(name = "dalil", version, about = "Dalil contact form and algorithm catalog")]
struct Cli {
    /// Configuration file (YAML, TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit the contact form
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
        /// Hidden bot-trap field
        #[arg(long, default_value = "")]
        honeypot: String,
    },
    /// Show the remaining quota and cooldown
    Status,
    /// Prune stored submission history
    Sweep {
        /// Keep sweeping on the configured interval until interrupted
        #[arg(long)]
        watch: bool,
    },
    /// Print an algorithm page
    Show { id: String },
    /// Handle a page URL: success banner and/or algorithm page
    Open { url: String },
    /// Read or change the theme preference
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
}

#[derive(Subcommand, Debug)]
enum ThemeAction {
    Get,
    Set { theme: Theme },
    Toggle,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = DalilConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logging);

    info!(version = env!("CARGO_PKG_VERSION"), "Dalil starting");

    let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(&config.storage.path));
    let store =
        RateLimitStore::with_retention(storage.clone(), config.rate_limiting.retention());
    let policy = RateLimitPolicy::new(config.rate_limiting.policy());
    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());

    match cli.command {
        Command::Submit {
            name,
            email,
            message,
            honeypot,
        } => {
            let presenter = Arc::new(StatusPresenter::new(
                Arc::new(ConsoleView),
                PresenterTimings::from(&config.form),
            ));
            let transport = Arc::new(HttpTransport::new(config.form.endpoint.clone())?);
            let controller = FormSubmissionController::new(
                config.form.form_name.clone(),
                policy,
                store,
                transport,
                clock,
                presenter.clone(),
            );

            let input = FormInput::new(name, email, message).with_honeypot(honeypot);
            let outcome = controller.submit(input).await;
            presenter.shutdown();

            if let SubmissionOutcome::Sent = outcome {
                let gate = controller.check_gate();
                println!("remaining quota: {}", gate.remaining_quota);
            }
        }
        Command::Status => {
            let now = clock.now_millis();
            let state = store.load();
            println!("submissions in window: {}", policy.count_in_window(&state, now));
            println!("remaining quota: {}", policy.remaining_quota(&state, now));
            println!(
                "cooldown seconds: {}",
                policy.remaining_cooldown_seconds(&state, now)
            );
        }
        Command::Sweep { watch } => {
            let dropped = store.sweep(clock.now_millis());
            println!("dropped {} expired submissions", dropped);

            if watch {
                let sweeper = StorageSweeper::start(
                    store,
                    clock,
                    config.rate_limiting.sweep_interval(),
                )?;
                shutdown_signal().await;
                sweeper.stop();
            }
        }
        Command::Show { id } => {
            let catalog = Catalog::load(&config.content.data_source).await?;
            show_algorithm(&catalog, &id)?;
        }
        Command::Open { url } => {
            let query = PageQuery::parse(&url)?;
            if let Some(form) = query.success_banner() {
                println!("✓ form `{}` submitted successfully", form);
            }
            if let Some(id) = query.id.as_deref() {
                let catalog = Catalog::load(&config.content.data_source).await?;
                show_algorithm(&catalog, id)?;
            }
        }
        Command::Theme { action } => {
            let themes = ThemeStore::new(storage);
            let theme = match action {
                ThemeAction::Get => themes.current(),
                ThemeAction::Set { theme } => {
                    themes.set(theme)?;
                    theme
                }
                ThemeAction::Toggle => themes.toggle()?,
            };
            println!("{}", theme);
        }
    }

    Ok(())
}

fn show_algorithm(catalog: &Catalog, id: &str) -> anyhow::Result<()> {
    let algo = catalog
        .find(id)
        .ok_or_else(|| anyhow::anyhow!("no algorithm with id `{}`", id))?;
    print!("{}", render_summary(algo));
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping");
        }
        _ = terminate => {
            info!("Received SIGTERM, stopping");
        }
    }
}
