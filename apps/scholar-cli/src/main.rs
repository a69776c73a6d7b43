//! scholar CLI - refresh and inspect academic records synced from Engage
//!
//! Refresh commands run as jobs on the in-process queue and stream their
//! statuses to stdout as JSON lines; logs go to stderr.

use clap::{Parser, Subcommand};

mod app;
mod commands;
mod config;
mod error;
mod logging;

use app::App;
use config::AppConfig;
use error::CliResult;

/// scholar CLI - academic records sync
#[derive(Parser)]
#[command(name = "scholar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a range of pupils with Engage
    RefreshStudents(commands::refresh::RefreshStudentsArgs),

    /// Reconcile one pupil's marks over a period range
    RefreshMarks(commands::refresh::RefreshMarksArgs),

    /// Show (or delete) a student
    Student(commands::student::StudentArgs),

    /// Show a student's marks
    Marks(commands::marks::MarksArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = AppConfig::from_env()?;
    logging::init_logging(&config.rust_log)?;

    let app = App::build(&config).await?;
    let result = match cli.command {
        Commands::RefreshStudents(args) => {
            commands::refresh::refresh_students(&app.queue, args).await
        }
        Commands::RefreshMarks(args) => commands::refresh::refresh_marks(&app.queue, args).await,
        Commands::Student(args) => commands::student::execute(app.students.as_ref(), args).await,
        Commands::Marks(args) => commands::marks::execute(app.marks.as_ref(), args).await,
    };

    app.shutdown().await?;
    result
}
