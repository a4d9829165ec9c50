use crate::demo::{run_analyze, AnalyzeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand, ValueEnum};
use union_action::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Union Action",
    about = "Run the WhatsApp chat-ops agent and ethics backend, or analyze a case locally",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP services (default command)
    Serve(ServeArgs),
    /// Run the ethical analysis on a single case and print the survey modules
    Analyze(AnalyzeArgs),
}

/// Which services one process hosts.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum ServeMode {
    /// Agent and backend side by side
    #[default]
    Bundled,
    /// Only the ethics/survey backend
    Backend,
    /// Only the chat-ops webhook agent
    Agent,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    #[arg(long, value_enum, default_value_t = ServeMode::Bundled)]
    pub(crate) mode: ServeMode,
    /// Override the configured host (the backend's host in backend mode)
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port (the backend's port in backend mode)
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Analyze(args) => run_analyze(args),
    }
}
