use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use log::debug;

use modelcard::{
    commands::{CardHandler, SettingsHandler},
    ctx::AppContext,
};

#[derive(Parser)]
#[command(name = "modelcard")]
#[command(version, about = "Create, edit and export model cards")]
struct Cli {
    /// Workspace directory. Defaults to the current directory.
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,
    /// Settings file. Defaults to `.modelcard.toml` in the workspace.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the bundled templates
    Templates,
    /// List saved cards
    List {
        /// Only show cards whose model name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a saved card
    Show { index: usize },
    /// Create a card and open it in the editor
    New {
        /// Bundled template (`v1`, `2`, or its label)
        #[arg(short, long, conflicts_with = "schema")]
        template: Option<String>,
        /// JSON schema file to build the form from
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },
    /// Open a saved card in the editor
    Edit { index: usize },
    /// Delete a saved card
    Delete { index: usize },
    /// Write a card to a JSON file
    Export {
        index: usize,
        /// Output file. Defaults to `<model name>.json` in the export directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Edit the settings file
    Settings,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    if let Err(e) = run() {
        eprintln!("{}", format!("error: {e:#}").red());
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let workspace = match cli.workspace {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let mut ctx = AppContext::load(workspace, cli.config)?;
    debug!("store at {}", ctx.store_path().display());

    let mut out = io::stdout().lock();
    match cli.command {
        Commands::Templates => CardHandler::templates(&mut out)?,
        Commands::List { search } => CardHandler::list(&ctx, search.as_deref(), &mut out)?,
        Commands::Show { index } => CardHandler::show(&ctx, index, &mut out)?,
        Commands::New { template, schema } => {
            CardHandler::new_card(&ctx, template.as_deref(), schema, io::stdin().lock(), &mut out)?
        }
        Commands::Edit { index } => CardHandler::edit(&ctx, index, io::stdin().lock(), &mut out)?,
        Commands::Delete { index } => CardHandler::delete(&ctx, index, &mut out)?,
        Commands::Export { index, out: dest } => {
            CardHandler::export(&ctx, index, dest, &mut out)?;
        }
        Commands::Settings => SettingsHandler::handle(&mut ctx, io::stdin().lock(), &mut out)?,
    }
    Ok(())
}
