use super::course::{CourseId, CreditHours, required};
use super::user::UserId;
use crate::error::{PortalError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeId(pub Uuid);

impl GradeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GradeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub fn points(&self) -> Decimal {
        match self {
            LetterGrade::A => Decimal::from(4),
            LetterGrade::B => Decimal::from(3),
            LetterGrade::C => Decimal::from(2),
            LetterGrade::D => Decimal::ONE,
            LetterGrade::F => Decimal::ZERO,
        }
    }
}

impl FromStr for LetterGrade {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(LetterGrade::A),
            "B" => Ok(LetterGrade::B),
            "C" => Ok(LetterGrade::C),
            "D" => Ok(LetterGrade::D),
            "F" => Ok(LetterGrade::F),
            _ => Err(PortalError::validation(format!(
                "grade must be A, B, C, D, or F, got {:?}",
                s.trim()
            ))),
        }
    }
}

impl TryFrom<String> for LetterGrade {
    type Error = PortalError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An enrollment period, e.g. semester "Fall" of academic year "2024-2025".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub semester: String,
    pub academic_year: String,
}

impl Term {
    pub fn new(semester: &str, academic_year: &str) -> Result<Self> {
        Ok(Self {
            semester: required("semester", semester)?,
            academic_year: required("academic year", academic_year)?,
        })
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.semester, self.academic_year)
    }
}

/// The tuple the store keeps unique: one grade per student, course and term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnrollmentKey {
    pub student: UserId,
    pub course: CourseId,
    pub term: Term,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: GradeId,
    pub student: UserId,
    pub course: CourseId,
    #[serde(rename = "grade")]
    pub letter: LetterGrade,
    #[serde(flatten)]
    pub term: Term,
    pub submitted_by: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Grade {
    pub fn enrollment_key(&self) -> EnrollmentKey {
        EnrollmentKey {
            student: self.student,
            course: self.course,
            term: self.term.clone(),
        }
    }
}

/// Optional term restriction applied to grade listings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeFilter {
    pub semester: Option<String>,
    pub academic_year: Option<String>,
}

impl GradeFilter {
    pub fn matches(&self, grade: &Grade) -> bool {
        self.semester
            .as_deref()
            .is_none_or(|semester| grade.term.semester == semester)
            && self
                .academic_year
                .as_deref()
                .is_none_or(|year| grade.term.academic_year == year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeOrder {
    /// Semester descending, then academic year descending.
    #[default]
    Term,
    /// Most recently recorded first.
    Recent,
}

impl GradeOrder {
    pub fn sort(&self, grades: &mut [Grade]) {
        match self {
            GradeOrder::Term => grades.sort_by(|a, b| {
                b.term
                    .semester
                    .cmp(&a.term.semester)
                    .then_with(|| b.term.academic_year.cmp(&a.term.academic_year))
            }),
            GradeOrder::Recent => grades.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}

/// Credit-weighted grade point average, kept at full precision.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Gpa(Decimal);

impl Gpa {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Two decimal places, the precision shown to students.
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl fmt::Display for Gpa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

/// Computes the GPA over `(letter, credit hours)` pairs.
///
/// Pairs whose course could not be resolved carry `None` and weigh
/// `CreditHours::DEFAULT`. An empty input yields zero.
pub fn compute_gpa<I>(records: I) -> Gpa
where
    I: IntoIterator<Item = (LetterGrade, Option<CreditHours>)>,
{
    let (points, credits) = records.into_iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(points, credits), (letter, hours)| {
            let weight = Decimal::from(hours.unwrap_or(CreditHours::DEFAULT));
            (points + letter.points() * weight, credits + weight)
        },
    );

    if credits.is_zero() {
        Gpa::ZERO
    } else {
        Gpa(points / credits)
    }
}
