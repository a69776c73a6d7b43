//! Mark lookup command

use clap::Args;
use scholar_core::{MarkService, MarksFilter, Period, Pid};

use crate::error::CliResult;

/// Arguments for the marks command
#[derive(Args)]
pub struct MarksArgs {
    /// Pupil id
    pub pid: i64,

    /// Period to show, as YEAR[/TERM[/COLUMN]]
    #[arg(long)]
    pub period: Option<Period>,

    /// Last period of a range starting at --period
    #[arg(long, requires = "period")]
    pub to: Option<Period>,
}

pub async fn execute(marks: &dyn MarkService, args: MarksArgs) -> CliResult<()> {
    let pid = Pid::new(args.pid);
    let found = match (&args.period, &args.to) {
        (Some(from), Some(to)) => {
            marks
                .find_marks_by_period_range(from, to, MarksFilter::by_pid(pid))
                .await?
        }
        (Some(period), None) => marks.find_marks_by_period(pid, period).await?,
        (None, _) => marks.find_marks_by_pid(pid).await?,
    };

    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}
