//! REST/JSON adapter over the portal services.

pub mod auth;
pub mod courses;
pub mod error;
pub mod grades;
pub mod payments;
pub mod state;

pub use error::ApiResult;
pub use state::AppState;

use crate::error::PortalError;
use actix_web::{HttpResponse, get, web};

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Registers every route and maps malformed bodies, queries and paths onto
/// `invalid_request` errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| PortalError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| PortalError::validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| PortalError::validation(err.to_string()).into()),
    )
    .service(health)
    .service(
        web::scope("/api")
            .service(grades::record_grade)
            .service(grades::update_grade)
            .service(grades::delete_grade)
            .service(grades::student_grades)
            .service(grades::course_grades)
            .service(payments::initiate)
            .service(payments::verify)
            .service(payments::history)
            .service(courses::create)
            .service(courses::update)
            .service(courses::deactivate)
            .service(courses::list)
            .service(courses::by_instructor)
            .service(courses::get_course),
    );
}
