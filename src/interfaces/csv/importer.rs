use super::grade_reader::{GradeReader, GradeRow};
use crate::application::portal::Portal;
use crate::application::records::GradeSubmission;
use crate::domain::grade::Gpa;
use crate::domain::user::{User, UserId};
use crate::error::{PortalError, Result};
use std::collections::BTreeMap;
use std::io::Read;
use tracing::{info, warn};

/// A row that could not be read or recorded. `line` is the 1-based line the
/// record starts on, counting the header.
#[derive(Debug)]
pub struct RejectedRow {
    pub line: u64,
    pub error: PortalError,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub recorded: usize,
    pub rejected: Vec<RejectedRow>,
    /// GPA of every student with a recorded row, ordered by student number.
    pub gpas: Vec<(String, Gpa)>,
}

/// Records every row of a grade CSV as `submitter`, then recomputes the GPA
/// of each student it touched. Bad rows are collected, never fatal.
pub async fn import_grades<R: Read>(
    portal: &Portal,
    submitter: &User,
    source: R,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    let mut touched: BTreeMap<String, UserId> = BTreeMap::new();

    for (line, row) in GradeReader::new(source).grades()? {
        let outcome = match row {
            Ok(row) => record_row(portal, submitter, row).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok((student_number, student)) => {
                report.recorded += 1;
                touched.insert(student_number, student);
            }
            Err(error) => {
                warn!(line, %error, "grade row rejected");
                report.rejected.push(RejectedRow { line, error });
            }
        }
    }

    for (student_number, student) in touched {
        let gpa = portal.records.calculate_gpa(student).await?;
        report.gpas.push((student_number, gpa));
    }
    info!(
        recorded = report.recorded,
        rejected = report.rejected.len(),
        "grade import finished"
    );
    Ok(report)
}

async fn record_row(portal: &Portal, submitter: &User, row: GradeRow) -> Result<(String, UserId)> {
    let course = portal
        .catalog
        .find_by_code(&row.course_code)
        .await?
        .ok_or_else(|| PortalError::not_found(format!("Course {} not found", row.course_code)))?;

    let grade = portal
        .records
        .record_grade(
            submitter,
            GradeSubmission {
                student_id: row.student_id.clone(),
                course_id: course.id,
                grade: row.grade,
                semester: row.semester,
                academic_year: row.academic_year,
            },
        )
        .await?;
    Ok((row.student_id, grade.student))
}
