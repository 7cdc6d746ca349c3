//! Bulk grade import and GPA summary export.

pub mod gpa_writer;
pub mod grade_reader;
pub mod importer;
