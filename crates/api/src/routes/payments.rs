//! Payment ledger routes.
//!
//! Access is checked here, before the ledger runs: recording needs the
//! school admin of the student's school; reading also admits super admins
//! and the student linked to the record.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use garde::Validate;
use tracing::info;

use crate::middleware::session::AuthSession;
use crate::{ApiError, AppState};
use scholaris_core::auth::{AuthorizationError, Role, Session, authorize, authorize_any};
use scholaris_core::fees::{RecordPayment, Student};
use scholaris_shared::fees::{
    FeeStatusResponse, OutstandingBalanceResponse, OutstandingFilter, PaymentResponse,
    RecordPaymentRequest,
};
use scholaris_shared::types::{PageRequest, PageResponse, SchoolId, StudentId};

/// Creates the payments router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/students/{student_id}/payments",
            get(payment_history).post(record_payment),
        )
        .route("/students/{student_id}/fee-status", get(fee_status))
        .route("/schools/{school_id}/outstanding", get(outstanding_balances))
}

/// Read access to a student's fee data.
fn can_view(session: &Session, student: &Student) -> Result<(), AuthorizationError> {
    if session.role == Role::Student {
        return if student.user_id == Some(session.user_id) {
            Ok(())
        } else {
            Err(AuthorizationError::forbidden())
        };
    }
    authorize_any(
        session,
        &[Role::SuperAdmin, Role::SchoolAdmin],
        Some(student.school_id),
    )
}

/// POST /students/{student_id}/payments - Record a payment.
async fn record_payment(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(student_id): Path<StudentId>,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&auth.session, Role::SchoolAdmin, None)?;
    let student = state.ledger.student_scope(student_id).await?;
    authorize(&auth.session, Role::SchoolAdmin, Some(student.school_id))?;
    payload.validate()?;

    let payment = state
        .ledger
        .record_payment(
            &auth.session,
            RecordPayment {
                student_id,
                amount: payload.amount,
                mode: payload.mode,
                reference: payload.reference,
                remarks: payload.remarks,
            },
        )
        .await?;

    info!(
        receipt_no = %payment.receipt_no,
        student_id = %student_id,
        recorded_by = %auth.session.user_id,
        "Payment recorded"
    );
    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

/// GET /students/{student_id}/payments - Payment history, newest first.
async fn payment_history(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(student_id): Path<StudentId>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<PaymentResponse>>, ApiError> {
    let student = state.ledger.student_scope(student_id).await?;
    can_view(&auth.session, &student)?;

    let payments: Vec<PaymentResponse> = state
        .ledger
        .payment_history(student_id)
        .await?
        .into_iter()
        .map(PaymentResponse::from)
        .collect();

    Ok(Json(page.normalized().paginate(payments)))
}

/// GET /students/{student_id}/fee-status - Paid and remaining amounts.
async fn fee_status(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(student_id): Path<StudentId>,
) -> Result<Json<FeeStatusResponse>, ApiError> {
    let student = state.ledger.student_scope(student_id).await?;
    can_view(&auth.session, &student)?;

    let status = state.ledger.fee_status(student_id).await?;
    Ok(Json(status.into()))
}

/// GET /schools/{school_id}/outstanding - Students with a balance left,
/// earliest due first. `overdue_only=true` keeps the defaulters.
async fn outstanding_balances(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(school_id): Path<SchoolId>,
    Query(filter): Query<OutstandingFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<OutstandingBalanceResponse>>, ApiError> {
    authorize_any(
        &auth.session,
        &[Role::SuperAdmin, Role::SchoolAdmin],
        Some(school_id),
    )?;

    let balances: Vec<OutstandingBalanceResponse> = state
        .ledger
        .outstanding_balances(school_id, filter.overdue_only)
        .await?
        .into_iter()
        .map(OutstandingBalanceResponse::from)
        .collect();

    Ok(Json(page.normalized().paginate(balances)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scholaris_shared::types::{SchoolId, SessionId, UserId};

    fn session(role: Role, school_id: Option<SchoolId>) -> Session {
        let now = Utc::now();
        Session {
            id: SessionId::new(),
            token_hash: String::new(),
            user_id: UserId::new(),
            role,
            school_id,
            created_at: now,
            last_seen_at: now,
            expires_at: now,
        }
    }

    fn student(school_id: SchoolId, user_id: Option<UserId>) -> Student {
        Student {
            id: StudentId::new(),
            school_id,
            school_code: 1,
            user_id,
            class_id: None,
            admission_no: "A-1".into(),
            full_name: "Asha".into(),
            is_active: true,
        }
    }

    #[test]
    fn test_linked_student_may_view_own_record() {
        let viewer = session(Role::Student, Some(SchoolId::new()));
        let own = student(viewer.school_id.unwrap(), Some(viewer.user_id));
        let other = student(viewer.school_id.unwrap(), Some(UserId::new()));
        assert!(can_view(&viewer, &own).is_ok());
        assert!(can_view(&viewer, &other).is_err());
    }

    #[test]
    fn test_admins_view_within_scope() {
        let school = SchoolId::new();
        let record = student(school, None);
        assert!(can_view(&session(Role::SuperAdmin, None), &record).is_ok());
        assert!(can_view(&session(Role::SchoolAdmin, Some(school)), &record).is_ok());
        assert!(can_view(&session(Role::SchoolAdmin, Some(SchoolId::new())), &record).is_err());
        assert!(can_view(&session(Role::Teacher, Some(school)), &record).is_err());
    }
}
