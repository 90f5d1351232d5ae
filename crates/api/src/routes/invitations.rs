//! Invitation routes.
//!
//! Issuing, listing, and revoking are admin operations; acceptance is the
//! one unauthenticated write in the API, reached by the invitee with the
//! token from their email. The plaintext token appears exactly once, in
//! the issue response; stored rows carry only the hash and responses
//! never echo it.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::PageQuery;
use crate::{AppState, middleware::AuthUser};
use rentora_db::InvitationRepository;
use rentora_db::entities::invitation_tokens;
use rentora_db::repositories::{AcceptInvitationInput, InviteTenantInput};
use rentora_shared::types::PageResponse;

/// Creates the public invitation routes (no auth).
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/invitations/accept", post(accept_invitation))
}

/// Creates the authenticated invitation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invitations", post(invite_tenant))
        .route("/invitations", get(list_invitations))
        .route("/invitations/{invitation_id}", delete(revoke_invitation))
}

/// Request body for issuing an invitation.
#[derive(Debug, Deserialize)]
struct InviteTenantRequest {
    contract_id: Uuid,
    email: String,
    percentage: Decimal,
    valid_for_days: Option<i64>,
}

/// Request body for accepting an invitation.
#[derive(Debug, Deserialize)]
struct AcceptInvitationRequest {
    token: String,
    full_name: String,
}

/// An invitation as returned to clients. The token hash stays server-side.
#[derive(Debug, Serialize)]
struct InvitationResponse {
    id: Uuid,
    contract_id: Uuid,
    email: String,
    percentage: Decimal,
    expires_at: DateTime<FixedOffset>,
    used_at: Option<DateTime<FixedOffset>>,
    created_at: DateTime<FixedOffset>,
}

impl From<invitation_tokens::Model> for InvitationResponse {
    fn from(model: invitation_tokens::Model) -> Self {
        Self {
            id: model.id,
            contract_id: model.contract_id,
            email: model.email,
            percentage: model.percentage,
            expires_at: model.expires_at,
            used_at: model.used_at,
            created_at: model.created_at,
        }
    }
}

/// Response for a freshly issued invitation.
#[derive(Debug, Serialize)]
struct IssuedInvitationResponse {
    invitation: InvitationResponse,
    /// The plaintext token, shown only here.
    token: String,
}

/// POST /invitations - Issue an invitation for a contract.
async fn invite_tenant(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<InviteTenantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvitationRepository::new((*state.db).clone());
    let issued = repo
        .invite(
            auth.context(),
            InviteTenantInput {
                contract_id: payload.contract_id,
                email: payload.email,
                percentage: payload.percentage,
                valid_for_days: payload.valid_for_days,
            },
        )
        .await?;

    info!(
        invitation_id = %issued.invitation.id,
        contract_id = %issued.invitation.contract_id,
        "Invitation issued"
    );
    Ok((
        StatusCode::CREATED,
        Json(IssuedInvitationResponse {
            invitation: issued.invitation.into(),
            token: issued.token,
        }),
    ))
}

/// GET /invitations - List invitations, newest first.
async fn list_invitations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvitationRepository::new((*state.db).clone());
    let invitations = repo.list(auth.context(), page.page_request()).await?;

    let response = PageResponse {
        data: invitations
            .data
            .into_iter()
            .map(InvitationResponse::from)
            .collect::<Vec<_>>(),
        meta: invitations.meta,
    };
    Ok(Json(response))
}

/// DELETE /invitations/{invitation_id} - Revoke an unused invitation.
async fn revoke_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invitation_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvitationRepository::new((*state.db).clone());
    repo.revoke(auth.context(), invitation_id).await?;

    info!(invitation_id = %invitation_id, "Invitation revoked");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /invitations/accept - Redeem an invitation token.
async fn accept_invitation(
    State(state): State<AppState>,
    Json(payload): Json<AcceptInvitationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvitationRepository::new((*state.db).clone());
    let accepted = repo
        .accept(
            &payload.token,
            AcceptInvitationInput {
                full_name: payload.full_name,
            },
        )
        .await?;

    info!(
        user_id = %accepted.user.id,
        contract_id = %accepted.link.contract_id,
        "Invitation accepted"
    );
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "user": accepted.user,
            "tenant_contract": accepted.link
        })),
    ))
}
