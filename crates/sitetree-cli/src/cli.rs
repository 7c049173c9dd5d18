use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands;
use crate::error::Result;

#[derive(Debug, Parser)]
#[command(
    name = "sitetree",
    about = "Inspect and edit a hierarchical page file",
    version
)]
pub struct Cli {
    /// Page file to operate on.
    #[arg(long, global = true, default_value = "pages.json")]
    pub store: PathBuf,

    /// Editor configuration (TOML, or JSON with a `.json` extension).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render the page tree.
    Tree {
        /// Use ASCII guides instead of box drawing.
        #[arg(long)]
        ascii: bool,
    },

    /// Print the full route of a page.
    Route { id: String },

    /// List every page below a page.
    Descendants { id: String },

    /// List visible navigation entries.
    Menu,

    /// Create a page.
    Add(AddArgs),

    /// Move a page to a new parent and position.
    Move(MoveArgs),

    /// Flip a page's active flag (or its menu flag with `--menu`).
    Toggle {
        id: String,
        #[arg(long)]
        menu: bool,
    },

    /// Delete a page; its children become root pages unless `--cascade`.
    Delete {
        id: String,
        #[arg(long)]
        cascade: bool,
    },

    /// Validate tree invariants.
    Check,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub slug: String,
    /// Parent page id; omitted for a root page.
    #[arg(long)]
    pub parent: Option<String>,
    /// Position among siblings; defaults to the end.
    #[arg(long)]
    pub position: Option<usize>,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    pub id: String,
    /// Target parent id, or `root`.
    #[arg(long)]
    pub parent: String,
    /// Gap index within the target group.
    #[arg(long)]
    pub index: usize,
}

pub fn run_from_env() -> Result<()> {
    crate::init_logging();
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with_output(cli, &mut out)
}

pub fn run_with_output(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let ctx = commands::Context::new(&cli)?;
    match cli.command {
        Commands::Tree { ascii } => commands::tree(&ctx, ascii, out),
        Commands::Route { id } => commands::route(&ctx, &id, out),
        Commands::Descendants { id } => commands::descendants(&ctx, &id, out),
        Commands::Menu => commands::menu(&ctx, out),
        Commands::Add(args) => commands::add(&ctx, args, out),
        Commands::Move(args) => commands::move_page(&ctx, args, out),
        Commands::Toggle { id, menu } => commands::toggle(&ctx, &id, menu, out),
        Commands::Delete { id, cascade } => commands::delete(&ctx, &id, cascade, out),
        Commands::Check => commands::check(&ctx, out),
    }
}
