use crate::domain::grade::Gpa;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct GpaRecord<'a> {
    student_id: &'a str,
    gpa: String,
}

/// Writes `student_id,gpa` lines, GPA to two decimal places.
pub struct GpaWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> GpaWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header and one row per student, in the order given.
    pub fn write_summary<'a, I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, Gpa)>,
    {
        let mut wrote_any = false;
        for (student_id, gpa) in rows {
            self.writer.serialize(GpaRecord {
                student_id,
                gpa: gpa.to_string(),
            })?;
            wrote_any = true;
        }
        if !wrote_any {
            self.writer.write_record(["student_id", "gpa"])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
