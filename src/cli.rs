use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::models::TemplateKind;

/// gitman - scaffold git repositories with .gitignore and LICENSE templates.
#[derive(Debug, Parser)]
#[command(name = "gitman")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration root holding templates, cache and config.yaml
    #[arg(long, global = true, env = "GITMAN_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Do not contact the remote template catalogs
    #[arg(long, global = true)]
    pub offline: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize a repository, then add .gitignore, LICENSE, identity and remote
    Init(InitArgs),

    /// Add a .gitignore assembled from one or more templates
    Gitignore(GitignoreArgs),

    /// Add a LICENSE file
    License(LicenseArgs),

    /// Print every known template name
    List {
        #[arg(value_enum)]
        kind: TemplateKind,
    },
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Where to create the repository
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Repository name; a different name creates a sibling directory
    #[arg(long)]
    pub name: Option<String>,

    /// Gitignore templates to combine, in order (skips the picker)
    #[arg(long = "gitignore", value_name = "TEMPLATE")]
    pub gitignores: Vec<String>,

    /// License key (skips the picker)
    #[arg(long)]
    pub license: Option<String>,

    /// Local git user.name
    #[arg(long)]
    pub user_name: Option<String>,

    /// Local git user.email
    #[arg(long)]
    pub user_email: Option<String>,

    /// URL added as the `origin` remote
    #[arg(long)]
    pub remote: Option<String>,
}

#[derive(Debug, Args)]
pub struct GitignoreArgs {
    /// Repository directory
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Templates to combine, in order (skips the picker)
    #[arg(short, long = "template", value_name = "TEMPLATE")]
    pub templates: Vec<String>,
}

#[derive(Debug, Args)]
pub struct LicenseArgs {
    /// Repository directory
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// License key (skips the picker)
    #[arg(short, long)]
    pub license: Option<String>,
}
