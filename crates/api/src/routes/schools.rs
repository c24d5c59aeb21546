//! Provisioning routes: schools, principals, classes, students and fee
//! structures.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use garde::Validate;

use crate::middleware::session::AuthSession;
use crate::{ApiError, AppState};
use scholaris_shared::auth::{
    CreatePrincipalRequest, EnrollStudentRequest, PrincipalResponse, RegisterSchoolRequest,
    StudentResponse,
};
use scholaris_shared::fees::{
    AssignFeeStructureRequest, ClassResponse, CreateClassRequest, FeeStructureResponse,
    SetClassFeeStructureRequest,
};
use scholaris_shared::types::{ClassId, SchoolId, StudentId, UserId};

/// Creates the provisioning router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schools", post(register_school))
        .route("/schools/{school_id}/users", post(create_principal))
        .route("/users/{user_id}/deactivate", post(deactivate_principal))
        .route("/schools/{school_id}/students", post(enroll_student))
        .route("/students/{student_id}/fee-structure", post(assign_fee_structure))
        .route("/schools/{school_id}/classes", post(create_class))
        .route("/classes/{class_id}/fee-structure", post(set_class_fee_structure))
}

/// POST /schools - Register a school with its first admin.
async fn register_school(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(payload): Json<RegisterSchoolRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;
    let (school, admin) = state
        .provisioner
        .register_school(&auth.session, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(school.into_response(admin))))
}

/// POST /schools/{school_id}/users - Create a principal in a school.
async fn create_principal(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(school_id): Path<SchoolId>,
    Json(payload): Json<CreatePrincipalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;
    let principal = state
        .provisioner
        .create_principal(&auth.session, school_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(PrincipalResponse::from(principal))))
}

/// POST /users/{user_id}/deactivate - Deactivate a principal and end its sessions.
async fn deactivate_principal(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .provisioner
        .deactivate_principal(&auth.session, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /schools/{school_id}/students - Enroll a student.
async fn enroll_student(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(school_id): Path<SchoolId>,
    Json(payload): Json<EnrollStudentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;
    let student = state
        .provisioner
        .enroll_student(&auth.session, school_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(StudentResponse::from(student))))
}

/// POST /students/{student_id}/fee-structure - Assign or amend the fee.
async fn assign_fee_structure(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(student_id): Path<StudentId>,
    Json(payload): Json<AssignFeeStructureRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;
    let structure = state
        .provisioner
        .assign_fee_structure(&auth.session, student_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(FeeStructureResponse::from(structure))))
}

/// POST /schools/{school_id}/classes - Create a class.
async fn create_class(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(school_id): Path<SchoolId>,
    Json(payload): Json<CreateClassRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;
    let class = state
        .provisioner
        .create_class(&auth.session, school_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(ClassResponse::from(class))))
}

/// POST /classes/{class_id}/fee-structure - Set the class fee for a year and
/// apply it to every active student of the class.
async fn set_class_fee_structure(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(class_id): Path<ClassId>,
    Json(payload): Json<SetClassFeeStructureRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;
    let (fee, assigned) = state
        .provisioner
        .set_class_fee_structure(&auth.session, class_id, payload)
        .await?;

    Ok((StatusCode::OK, Json(fee.into_response(assigned))))
}
