mod api;
mod app;
mod catalog;
mod cli;
mod config;
mod error;
mod materialize;
mod models;
mod picker;
mod registry;
mod repo;
mod store;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::api::ApiClient;
use crate::catalog::Catalog;
use crate::cli::{Cli, Commands, InitArgs};
use crate::config::Config;
use crate::models::TemplateKind;
use crate::registry::CatalogStatus;

const LOG_FILE: &str = "gitman.log";

/// Logs go to `<root>/gitman.log` since the picker owns the terminal.
fn init_tracing(debug: bool, root: &Path) {
    let filter = if debug {
        EnvFilter::new("gitman=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gitman=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    match OpenOptions::new().create(true).append(true).open(root.join(LOG_FILE)) {
        Ok(file) => registry
            .with(fmt::layer().with_target(false).with_ansi(false).with_writer(Mutex::new(file)))
            .init(),
        Err(_) => registry
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .init(),
    }
}

/// Everything a command needs: settings, the HTTP client (absent when offline)
/// and the configuration root the stores live under.
struct Session {
    root: PathBuf,
    config: Config,
    client: Option<ApiClient>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let root = match cli.config_dir.clone() {
        Some(dir) => dir,
        None => config::default_root()?,
    };
    config::ensure_root(&root)?;
    init_tracing(cli.debug, &root);
    tracing::debug!("gitman starting with args: {:?}", cli);

    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let config = Config::load(&root, &cwd)?;
    let client = if cli.offline {
        None
    } else {
        Some(ApiClient::new(&config.gitignore_api, &config.license_api)?)
    };
    let ctx = Session { root, config, client };

    match cli.command {
        Commands::Init(args) => init(&ctx, args).await,
        Commands::Gitignore(args) => {
            let mut catalog = ctx.open(TemplateKind::Gitignore);
            let path = absolute(&args.path)?;
            add_artifact(&ctx, &mut catalog, &path, args.templates).await?;
            Ok(())
        }
        Commands::License(args) => {
            let mut catalog = ctx.open(TemplateKind::License);
            let path = absolute(&args.path)?;
            add_artifact(&ctx, &mut catalog, &path, args.license.into_iter().collect()).await?;
            Ok(())
        }
        Commands::List { kind } => {
            let mut catalog = ctx.open(kind);
            catalog.settle().await;
            let registry = catalog.registry();
            for name in registry.snapshot() {
                println!("{name}");
            }
            if let CatalogStatus::Degraded { reason } = registry.status() {
                eprintln!("Remote {kind} catalog unavailable, showing local templates only: {reason}");
            }
            Ok(())
        }
    }
}

impl Session {
    fn open(&self, kind: TemplateKind) -> Catalog {
        Catalog::open(kind, &self.root, self.client.as_ref())
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Failed to resolve path {}", path.display()))
}

/// Picks (or takes from the command line) templates and writes the artifact.
async fn add_artifact(ctx: &Session, catalog: &mut Catalog, target: &Path, requested: Vec<String>) -> Result<()> {
    let kind = catalog.kind();
    let selection = if requested.is_empty() {
        picker::pick(catalog.registry(), kind).await?
    } else {
        catalog.settle().await;
        catalog.canonical_names(&requested)
    };

    let written = catalog
        .materializer(ctx.client.as_ref(), ctx.config.cache_policy(kind))
        .materialize(&selection, target)
        .await
        .with_context(|| format!("could not produce {}", kind.artifact_name()))?;

    match written {
        Some(path) => println!("Successfully added {}!", path.display()),
        None => println!("No {kind} template selected, skipping {}.", kind.artifact_name()),
    }
    Ok(())
}

async fn init(ctx: &Session, args: InitArgs) -> Result<()> {
    // Both listings start before git runs so the pickers rarely wait on the network.
    let mut gitignores = ctx.open(TemplateKind::Gitignore);
    let mut licenses = ctx.open(TemplateKind::License);

    let path = repo::target_dir(&absolute(&args.path)?, args.name.as_deref())?;
    repo::init_repository(&path).context("Failed to initialize git repository")?;
    println!("Repository initialized successfully!");

    if let Err(err) = add_artifact(ctx, &mut gitignores, &path, args.gitignores).await {
        tracing::warn!("{:#}", err);
        println!(".gitignore could not be added to the repository: {err:#}");
    }
    if let Err(err) = add_artifact(ctx, &mut licenses, &path, args.license.into_iter().collect()).await {
        tracing::warn!("{:#}", err);
        println!("LICENSE could not be added to the repository: {err:#}");
    }

    for (key, value) in [("user.name", &args.user_name), ("user.email", &args.user_email)] {
        let Some(value) = value.as_deref().filter(|v| !v.is_empty()) else {
            continue;
        };
        if let Err(err) = repo::set_config(&path, key, value) {
            println!("Failed to set git {key}: {err}");
        }
    }

    if let Some(url) = args.remote.as_deref().filter(|u| !u.is_empty()) {
        repo::add_remote(&path, url).context("Failed to add remote")?;
        println!("Remote added successfully!");
    }

    println!("Successfully initialized repository!");
    Ok(())
}
