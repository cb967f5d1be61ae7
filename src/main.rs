mod ui;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{Args as ClapArgs, Parser, Subcommand};
use egui::Vec2;
use log::{error, info};
use racewatch::{
    AppConfig, RacewatchError, SessionCatalog,
    session::{SessionRecord, aggregate},
    store::{FileSessionStore, HttpSessionStore, SessionStore},
    view::OverviewModel,
    writer,
};
use ui::DashboardApp;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs, Debug, Clone)]
#[group(multiple = false)]
struct StoreArgs {
    /// Base URL of the session store. Defaults to the one saved in the config file
    #[arg(short, long)]
    store_url: Option<String>,

    /// Read sessions from a JSON file with the same layout as the store
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the dashboard
    Dashboard {
        #[command(flatten)]
        store: StoreArgs,

        /// How long a catalog snapshot is served before it is fetched again
        #[arg(long)]
        ttl_ms: Option<u64>,

        /// Live session refresh interval
        #[arg(long)]
        tick_ms: Option<u64>,
    },
    /// Write the samples of one session as JSON lines
    Export {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(long)]
        session: String,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Log the overview and per category statistics
    Summary {
        #[command(flatten)]
        store: StoreArgs,
    },
}

fn open_store(args: &StoreArgs, config: &AppConfig) -> Result<Arc<dyn SessionStore>, RacewatchError> {
    if let Some(input) = &args.input {
        return Ok(Arc::new(FileSessionStore::new(input.clone())?));
    }
    let url = args.store_url.as_deref().unwrap_or(config.store_url.as_str());
    if url.is_empty() {
        return Err(RacewatchError::InvalidUserInput {
            field: "store-url".to_string(),
            reason: "no store configured, pass --store-url or --input".to_string(),
        });
    }
    Ok(Arc::new(HttpSessionStore::new(url, config.request_timeout())?))
}

fn dashboard(
    store_args: &StoreArgs,
    ttl_ms: Option<u64>,
    tick_ms: Option<u64>,
    mut config: AppConfig,
) -> Result<(), RacewatchError> {
    let effective = config.with_overrides(ttl_ms, tick_ms);
    let store = open_store(store_args, &effective)?;
    // only a URL given on the command line is remembered
    if let Some(url) = &store_args.store_url {
        config.store_url = url.clone();
    }
    info!("Opening dashboard on {}", store.describe());

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_inner_size(Vec2::new(1280., 800.))
        .with_title("Racewatch");

    eframe::run_native(
        "Racewatch",
        native_options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(store, config, &effective, cc)))),
    )
    .map_err(|e| RacewatchError::DashboardStartError {
        reason: e.to_string(),
    })
}

fn export(
    store_args: &StoreArgs,
    session_id: &str,
    output: &Path,
    config: &AppConfig,
) -> Result<(), RacewatchError> {
    let store = open_store(store_args, config)?;
    let raw = store
        .fetch_session(session_id)?
        .ok_or_else(|| RacewatchError::SessionNotFound {
            id: session_id.to_string(),
        })?;
    let record = SessionRecord::from_raw(session_id, raw);
    writer::write_session(output, &record)?;
    Ok(())
}

fn summary(store_args: &StoreArgs, config: &AppConfig) -> Result<(), RacewatchError> {
    let store = open_store(store_args, config)?;
    let catalog = SessionCatalog::from_raw(store.fetch_all()?);
    let overview = OverviewModel::build(&catalog);
    if overview.is_empty() {
        info!("No sessions recorded on {}", store.describe());
        return Ok(());
    }

    info!(
        "{} sessions in {} categories",
        overview.total_sessions, overview.active_categories
    );
    if let Some(best) = &overview.season_best {
        info!(
            "Season best {:.1} km/h ({}, session {})",
            best.speed_kph, best.category, best.session_id
        );
    }
    if let Some(live) = catalog.find_live() {
        info!("Session {} ({}) is live", live.id, live.category);
    }
    for (category, _) in &overview.sessions_by_type {
        let stats = aggregate(&catalog, category);
        if stats.has_data() {
            info!(
                "{}: {} runs, {} with telemetry, mean {:.1} km/h, best mean {:.1} km/h, record {:.1} km/h",
                category,
                stats.run_count,
                stats.session_count,
                stats.mean_of_means,
                stats.best_mean,
                stats.record_max
            );
        } else {
            info!("{}: {} runs, no telemetry", category, stats.run_count);
        }
    }
    Ok(())
}

fn main() {
    colog::init();

    let cli = Args::parse();
    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .expect("Could not set Ctrl-C handler");

    let config = AppConfig::from_local_file().unwrap_or_default();
    let result = match &cli.command {
        Commands::Dashboard {
            store,
            ttl_ms,
            tick_ms,
        } => dashboard(store, *ttl_ms, *tick_ms, config),
        Commands::Export {
            store,
            session,
            output,
        } => export(store, session, output, &config),
        Commands::Summary { store } => summary(store, &config),
    };
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
