//! Student lookup command

use clap::Args;
use scholar_core::{Pid, StudentService};

use crate::error::CliResult;

/// Arguments for the student command
#[derive(Args)]
pub struct StudentArgs {
    /// Pupil id
    pub pid: i64,

    /// Delete the stored student instead of showing it
    #[arg(long)]
    pub delete: bool,
}

pub async fn execute(students: &dyn StudentService, args: StudentArgs) -> CliResult<()> {
    let pid = Pid::new(args.pid);
    if args.delete {
        students.delete_student(pid).await?;
        return Ok(());
    }

    let student = students.find_student_by_pid(pid).await?;
    println!("{}", serde_json::to_string_pretty(&student)?);
    Ok(())
}
