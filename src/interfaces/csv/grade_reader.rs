use crate::domain::grade::LetterGrade;
use crate::error::{PortalError, Result};
use serde::Deserialize;
use std::io::Read;

/// One line of a grade import file.
///
/// Students and courses are named by their human identifiers, the student
/// number and the course code, and resolved against the directory and the
/// catalog at import time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GradeRow {
    pub student_id: String,
    pub course_code: String,
    pub grade: LetterGrade,
    pub semester: String,
    pub academic_year: String,
}

/// Reads grade rows from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// yielding one `Result<GradeRow>` per record so a bad row never stops the
/// import. Each result carries the line its record starts on.
pub struct GradeReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> GradeReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes rows in file order, paired with their 1-based
    /// starting line. Quoted fields may span lines.
    pub fn grades(mut self) -> Result<impl Iterator<Item = (u64, Result<GradeRow>)>> {
        let headers = self.reader.headers()?.clone();
        Ok(self.reader.into_records().map(move |record| match record {
            Ok(record) => {
                let line = record.position().map_or(0, |position| position.line());
                let row = record.deserialize(Some(&headers)).map_err(PortalError::from);
                (line, row)
            }
            Err(e) => {
                let line = e.position().map_or(0, |position| position.line());
                (line, Err(PortalError::from(e)))
            }
        }))
    }
}
