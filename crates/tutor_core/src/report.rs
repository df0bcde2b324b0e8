//! crates/tutor_core/src/report.rs
//!
//! Guardian reports: the student's recent ledger entries are handed to the
//! model, which writes a short letter for the teacher to pass on.

use serde::Deserialize;
use tracing::info;

use crate::domain::{AttemptRecord, Student};
use crate::ports::{complete_as, LanguageModelService, PortError, PortResult};
use crate::prompts;

/// How many of the latest records the report is based on.
pub const REPORT_WINDOW: usize = 10;

#[derive(Debug, Deserialize)]
struct ParentReport {
    report: String,
}

/// Writes a fresh report from the student's latest records.
///
/// Nothing is cached; every call goes to the model.
pub async fn generate_report(
    model: &dyn LanguageModelService,
    student: &Student,
    records: &[AttemptRecord],
) -> PortResult<String> {
    if records.is_empty() {
        return Err(PortError::Validation(format!(
            "{} has no results to report on yet.",
            student.name
        )));
    }
    let recent = &records[records.len().saturating_sub(REPORT_WINDOW)..];
    let prompt = prompts::report_prompt(student, recent);
    let parsed: ParentReport = complete_as(model, prompts::REPORT_SYSTEM, &prompt).await?;
    info!(
        "Generated guardian report for {} from {} records",
        student.id,
        recent.len()
    );
    Ok(parsed.report)
}
