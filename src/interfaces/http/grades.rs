//! Grade endpoints.
//!
//! ```text
//! POST   /api/grades
//! PUT    /api/grades/{id}
//! DELETE /api/grades/{id}
//! GET    /api/grades/student?studentId=&semester=&academicYear=&order=
//! GET    /api/grades/course/{courseId}?semester=&academicYear=
//! ```

use super::auth::Caller;
use super::error::ApiResult;
use super::state::AppState;
use crate::application::access::{STAFF, require_role};
use crate::application::records::{GradeSubmission, RosterEntry};
use crate::domain::course::CourseId;
use crate::domain::grade::{Grade, GradeFilter, GradeId, GradeOrder};
use crate::domain::user::{Role, User};
use crate::error::PortalError;
use actix_web::{HttpResponse, delete, get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct GradeResponse {
    message: &'static str,
    grade: Grade,
}

#[derive(Debug, Serialize)]
pub struct StudentGradesResponse {
    pub grades: Vec<Grade>,
    #[serde(with = "rust_decimal::serde::float")]
    pub gpa: Decimal,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGradesQuery {
    pub student_id: Option<String>,
    pub semester: Option<String>,
    pub academic_year: Option<String>,
    #[serde(default)]
    pub order: GradeOrder,
}

#[post("/grades")]
pub async fn record_grade(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<GradeSubmission>,
) -> ApiResult<HttpResponse> {
    let grade = state.records.record_grade(&caller, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(GradeResponse {
        message: "Grade added successfully",
        grade,
    }))
}

#[put("/grades/{id}")]
pub async fn update_grade(
    state: web::Data<AppState>,
    caller: Caller,
    id: web::Path<GradeId>,
    body: web::Json<GradeSubmission>,
) -> ApiResult<HttpResponse> {
    let grade = state
        .records
        .update_grade(&caller, id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(GradeResponse {
        message: "Grade updated successfully",
        grade,
    }))
}

#[delete("/grades/{id}")]
pub async fn delete_grade(
    state: web::Data<AppState>,
    caller: Caller,
    id: web::Path<GradeId>,
) -> ApiResult<HttpResponse> {
    state.records.delete_grade(&caller, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Grade deleted successfully" })))
}

/// Students always get their own record. Staff name the student by number.
async fn whose_grades(state: &AppState, caller: &User, student_id: Option<&str>) -> ApiResult<User> {
    if caller.has_role(Role::Student) {
        return match student_id {
            Some(requested) if caller.student_id.as_deref() != Some(requested.trim()) => {
                Err(PortalError::Forbidden("Access denied".to_string()))
            }
            _ => Ok(caller.clone()),
        };
    }
    let student_id = student_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| PortalError::validation("Student ID is required"))?;
    state.records.resolve_student(student_id).await
}

#[get("/grades/student")]
pub async fn student_grades(
    state: web::Data<AppState>,
    caller: Caller,
    query: web::Query<StudentGradesQuery>,
) -> ApiResult<web::Json<StudentGradesResponse>> {
    let query = query.into_inner();
    let student = whose_grades(&state, &caller, query.student_id.as_deref()).await?;
    let filter = GradeFilter {
        semester: query.semester,
        academic_year: query.academic_year,
    };

    let grades = state
        .records
        .list_grades(student.id, &filter, query.order)
        .await?;
    let gpa = state.records.calculate_gpa(student.id).await?;
    Ok(web::Json(StudentGradesResponse {
        grades,
        gpa: gpa.rounded(),
    }))
}

#[get("/grades/course/{course_id}")]
pub async fn course_grades(
    state: web::Data<AppState>,
    caller: Caller,
    course_id: web::Path<CourseId>,
    filter: web::Query<GradeFilter>,
) -> ApiResult<web::Json<Vec<RosterEntry>>> {
    require_role(&caller, STAFF)?;
    let roster = state
        .records
        .list_course_grades(course_id.into_inner(), &filter)
        .await?;
    Ok(web::Json(roster))
}
