use crate::report::{run_breakdown, run_target, run_what_if, BreakdownArgs, TargetArgs, WhatIfArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use grade_engine::config::AppConfig;
use grade_engine::error::AppError;
use grade_engine::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "gradecheck",
    about = "Analyze course grades: category breakdowns, what-if projections, and target scores",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a grade analysis against a course JSON export
    Grades {
        #[command(subcommand)]
        command: GradesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum GradesCommand {
    /// Show the grade by category with strongest/weakest groups and projections
    Breakdown(BreakdownArgs),
    /// Project the grade with hypothetical scores
    WhatIf(WhatIfArgs),
    /// Find the score needed on one assignment to reach a target grade
    Target(TargetArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
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
        Command::Grades { command } => {
            let config = AppConfig::load()?;
            telemetry::init(&config.telemetry)?;
            match command {
                GradesCommand::Breakdown(args) => run_breakdown(args),
                GradesCommand::WhatIf(args) => run_what_if(args),
                GradesCommand::Target(args) => run_target(args),
            }
        }
    }
}
