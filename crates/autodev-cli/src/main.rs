mod cmd;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "autodev",
    about = "Autodev agents — turn issues into change requests and review them",
    version,
    propagate_version = true
)]
struct Cli {
    /// Repository full name (owner/name); falls back to GITHUB_REPOSITORY
    #[arg(long, short = 'r', global = true)]
    repo: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the code agent: read an issue, apply changes, open a change request
    Code {
        /// Issue number
        #[arg(long, short = 'i')]
        issue: u64,

        /// Max iterations for the fix cycle
        #[arg(long, default_value = "5")]
        max_iters: u32,

        /// Working-tree path (default: GITHUB_WORKSPACE or .)
        #[arg(long)]
        cwd: Option<String>,
    },

    /// Run the reviewer agent: analyze a change request and post a verdict
    Review {
        /// Pull request number
        #[arg(long, short = 'p')]
        pr: u64,

        /// CI conclusion for context (success/failure/unknown)
        #[arg(long, default_value = "success")]
        ci_conclusion: String,

        /// CI summary text
        #[arg(long, default_value = "")]
        ci_summary: String,

        /// Only print the verdict, do not publish
        #[arg(long)]
        no_publish: bool,
    },

    /// Run the HTTP server
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, default_value = "8000")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Code {
            issue,
            max_iters,
            cwd,
        } => cmd::code::run(cli.repo.as_deref(), issue, max_iters, cwd.as_deref(), cli.json),
        Commands::Review {
            pr,
            ci_conclusion,
            ci_summary,
            no_publish,
        } => cmd::review::run(
            cli.repo.as_deref(),
            pr,
            &ci_conclusion,
            &ci_summary,
            no_publish,
            cli.json,
        ),
        Commands::Serve { host, port } => cmd::serve::run(&host, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
