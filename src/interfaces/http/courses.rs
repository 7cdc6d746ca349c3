//! Course catalog endpoints.

use super::auth::Caller;
use super::error::ApiResult;
use super::state::AppState;
use crate::domain::course::{Course, CourseChanges, CourseDraft, CourseFilter, CourseId};
use crate::domain::user::UserId;
use actix_web::{HttpResponse, delete, get, post, put, web};

#[post("/courses")]
pub async fn create(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<CourseDraft>,
) -> ApiResult<HttpResponse> {
    let course = state.catalog.create(&caller, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(course))
}

#[put("/courses/{id}")]
pub async fn update(
    state: web::Data<AppState>,
    caller: Caller,
    id: web::Path<CourseId>,
    body: web::Json<CourseChanges>,
) -> ApiResult<web::Json<Course>> {
    let course = state
        .catalog
        .update(&caller, id.into_inner(), body.into_inner())
        .await?;
    Ok(web::Json(course))
}

#[delete("/courses/{id}")]
pub async fn deactivate(
    state: web::Data<AppState>,
    caller: Caller,
    id: web::Path<CourseId>,
) -> ApiResult<web::Json<Course>> {
    Ok(web::Json(
        state.catalog.deactivate(&caller, id.into_inner()).await?,
    ))
}

#[get("/courses")]
pub async fn list(
    state: web::Data<AppState>,
    _caller: Caller,
    filter: web::Query<CourseFilter>,
) -> ApiResult<web::Json<Vec<Course>>> {
    Ok(web::Json(state.catalog.list(&filter).await?))
}

#[get("/courses/{id}")]
pub async fn get_course(
    state: web::Data<AppState>,
    _caller: Caller,
    id: web::Path<CourseId>,
) -> ApiResult<web::Json<Course>> {
    Ok(web::Json(state.catalog.get(id.into_inner()).await?))
}

#[get("/courses/instructor/{id}")]
pub async fn by_instructor(
    state: web::Data<AppState>,
    _caller: Caller,
    id: web::Path<UserId>,
) -> ApiResult<web::Json<Vec<Course>>> {
    Ok(web::Json(state.catalog.by_instructor(id.into_inner()).await?))
}
