//! ORGV CLI - Version control for organization charts.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "orgv")]
#[command(about = "Version control for organization charts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new ORGV repository
    Init,
    /// Add a node to the working tree
    Add {
        /// Node name
        name: String,
        /// Parent node hash (hex); omit for a root node
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Rename a node in the working tree
    Edit {
        /// Node hash (hex)
        hash: String,
        /// New name
        name: String,
    },
    /// Remove a node from the working tree
    Rm {
        /// Node hash (hex)
        hash: String,
        /// Remove the whole subtree
        #[arg(short, long)]
        recursive: bool,
    },
    /// Show the working tree or a commit's snapshot
    Show {
        /// Commit id to show instead of the working tree
        #[arg(short, long)]
        commit: Option<String>,
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Commit the working tree as a new snapshot
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
        /// Author override (defaults to configured identity)
        #[arg(long)]
        author: Option<String>,
    },
    /// Restore the working tree from a commit
    Checkout {
        /// Commit id
        commit: String,
    },
    /// Show commit history
    Log {
        /// Only commits by this author
        #[arg(long)]
        author: Option<String>,
        /// Maximum number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Attach a tag to a commit
    Tag {
        /// Commit id
        commit: String,
        /// Tag name (1-50 characters)
        name: String,
    },
    /// Publish a commit to the shared line
    Share {
        /// Commit id
        commit: String,
        /// Publication note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// List shared commits
    Shares,
    /// Three-way merge against a remote commit
    Merge {
        /// Common base commit id
        base: String,
        /// Remote commit id
        remote: String,
        /// Merge this commit instead of the working tree
        #[arg(long)]
        local: Option<String>,
        /// Commit the auto-merged result when there are no conflicts
        #[arg(long)]
        apply: bool,
        /// Commit message for --apply
        #[arg(short, long)]
        message: Option<String>,
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Add { name, parent } => commands::node::add(&name, parent.as_deref()),
        Commands::Edit { hash, name } => commands::node::edit(&hash, &name),
        Commands::Rm { hash, recursive } => commands::node::rm(&hash, recursive),
        Commands::Show { commit, format } => commands::show::run(commit.as_deref(), &format),
        Commands::Commit { message, author } => {
            commands::commit::run(message.as_deref(), author.as_deref())
        }
        Commands::Checkout { commit } => commands::commit::checkout(&commit),
        Commands::Log {
            author,
            limit,
            format,
        } => commands::log::run(author.as_deref(), limit, &format),
        Commands::Tag { commit, name } => commands::tag::run(&commit, &name),
        Commands::Share { commit, note } => commands::share::run(&commit, note.as_deref()),
        Commands::Shares => commands::share::list(),
        Commands::Merge {
            base,
            remote,
            local,
            apply,
            message,
            format,
        } => commands::merge::run(
            &base,
            &remote,
            local.as_deref(),
            apply,
            message.as_deref(),
            &format,
        ),
    }
}
