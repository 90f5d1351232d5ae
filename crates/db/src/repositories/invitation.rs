//! Invitation repository: tenant onboarding.
//!
//! An admin issues a single-use invitation for a contract; the invitee
//! redeems it to become a tenant user linked to that contract, atomically.
//! The token is returned exactly once at issue time and stored only as a
//! SHA-256 hash. The token embeds the organization ID so the acceptance
//! transaction can establish its storage context before any lookup; the
//! secret half is 32 random bytes.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use rentora_core::context::{RequestContext, Role};
use rentora_core::tenancy;
use rentora_shared::error::{AppError, AppResult};
use rentora_shared::types::{PageRequest, PageResponse};

use crate::context::set_context;
use crate::coordinator::with_context;
use crate::entities::sea_orm_active_enums::UserRole;
use crate::entities::{contracts, invitation_tokens, tenant_contracts, users};
use crate::error::{is_unique_violation, storage_error, RepoError};
use crate::policy;
use crate::repositories::{not_found, require_admin};

use sea_orm::TransactionTrait;

/// Default invitation validity.
const DEFAULT_VALIDITY_DAYS: i64 = 14;

/// Input for issuing an invitation.
#[derive(Debug, Clone)]
pub struct InviteTenantInput {
    /// Contract the invitee will be linked to.
    pub contract_id: Uuid,
    /// Email the invitation is addressed to.
    pub email: String,
    /// Share granted on acceptance.
    pub percentage: Decimal,
    /// Validity in days; defaults to 14.
    pub valid_for_days: Option<i64>,
}

/// An issued invitation. The `token` field is the only time the plaintext
/// token exists outside the invitee's hands.
#[derive(Debug, Clone)]
pub struct IssuedInvitation {
    /// The stored invitation row (hash only).
    pub invitation: invitation_tokens::Model,
    /// The plaintext token to deliver to the invitee.
    pub token: String,
}

/// Input for accepting an invitation.
#[derive(Debug, Clone)]
pub struct AcceptInvitationInput {
    /// Display name for the new tenant user.
    pub full_name: String,
}

/// Result of a successful acceptance.
#[derive(Debug, Clone)]
pub struct AcceptedInvitation {
    /// The created tenant user.
    pub user: users::Model,
    /// The created contract link.
    pub link: tenant_contracts::Model,
}

/// Invitation repository.
#[derive(Debug, Clone)]
pub struct InvitationRepository {
    db: DatabaseConnection,
}

impl InvitationRepository {
    /// Creates a new invitation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Hashes a token for storage.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Issues an invitation for a contract. Admin-only.
    ///
    /// The share is validated against the contract's current headroom as a
    /// courtesy; the hard check happens again at acceptance, because other
    /// shares may land in between.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the
    /// contract is missing, `Validation` for an out-of-range share,
    /// `Conflict` if the contract is terminated or the share cannot fit,
    /// or a storage error.
    pub async fn invite(
        &self,
        ctx: &RequestContext,
        input: InviteTenantInput,
    ) -> AppResult<IssuedInvitation> {
        let token = generate_token(ctx.organization_id);
        let token_hash = Self::hash_token(&token);

        let ctx = *ctx;
        let invitation = with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;
                if !tenancy::is_valid_share(input.percentage) {
                    return Err(AppError::Validation(
                        "percentage must be in (0, 100]".to_string(),
                    )
                    .into());
                }

                let contract = contracts::Entity::find_by_id(input.contract_id)
                    .filter(contracts::Column::OrganizationId.eq(ctx.organization_id))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("contract", input.contract_id))?;
                if !contract.is_active {
                    return Err(
                        AppError::Conflict("contract is terminated".to_string()).into()
                    );
                }

                let existing: Vec<Decimal> = tenant_contracts::Entity::find()
                    .select_only()
                    .column(tenant_contracts::Column::Percentage)
                    .filter(tenant_contracts::Column::ContractId.eq(contract.id))
                    .into_tuple()
                    .all(txn)
                    .await?;
                if !tenancy::share_fits(&existing, input.percentage) {
                    return Err(AppError::Conflict(format!(
                        "share {}% does not fit the contract (current total {}%)",
                        input.percentage,
                        tenancy::share_sum(&existing)
                    ))
                    .into());
                }

                let validity = input.valid_for_days.unwrap_or(DEFAULT_VALIDITY_DAYS);
                let now = chrono::Utc::now();
                let invitation = invitation_tokens::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    organization_id: Set(ctx.organization_id),
                    contract_id: Set(contract.id),
                    token_hash: Set(token_hash),
                    email: Set(input.email),
                    percentage: Set(input.percentage),
                    expires_at: Set((now + chrono::Duration::days(validity)).into()),
                    used_at: Set(None),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };

                Ok::<_, RepoError>(invitation.insert(txn).await?)
            })
        })
        .await
        .map_err(AppError::from)?;

        Ok(IssuedInvitation { invitation, token })
    }

    /// Lists invitations of the caller's organization. Admin-only.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, or a storage error.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<invitation_tokens::Model>> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;

                let query =
                    invitation_tokens::Entity::find().filter(policy::invitations_filter(&ctx));

                let total = query.clone().count(txn).await?;
                let data = query
                    .order_by_desc(invitation_tokens::Column::CreatedAt)
                    .offset(page.offset())
                    .limit(page.limit())
                    .all(txn)
                    .await?;

                Ok::<_, RepoError>(PageResponse::new(data, &page, total))
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Revokes an unused invitation. Admin-only.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the
    /// invitation is missing, `Conflict` if it was already used, or a
    /// storage error.
    pub async fn revoke(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;

                let invitation = invitation_tokens::Entity::find_by_id(id)
                    .filter(policy::invitations_filter(&ctx))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("invitation", id))?;
                if invitation.used_at.is_some() {
                    return Err::<_, RepoError>(
                        AppError::Conflict("invitation was already used".to_string()).into()
                    );
                }

                invitation_tokens::Entity::delete_by_id(invitation.id)
                    .exec(txn)
                    .await?;
                Ok(())
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Accepts an invitation, creating the tenant user and the contract
    /// link in one transaction.
    ///
    /// This is the one unauthenticated entry point in the data layer: the
    /// caller proves possession of the token instead of a session. The
    /// organization is recovered from the token itself, the transaction is
    /// scoped to it, and the token row is looked up by hash. All of it
    /// commits or none of it does; a failure after user creation leaves no
    /// half-onboarded tenant behind.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown or used token, `Conflict` for an
    /// expired token, an over-committed contract, or an already registered
    /// email, or a storage error.
    pub async fn accept(
        &self,
        token: &str,
        input: AcceptInvitationInput,
    ) -> AppResult<AcceptedInvitation> {
        let organization_id = organization_from_token(token)
            .ok_or_else(|| AppError::NotFound("invitation".to_string()))?;
        let token_hash = Self::hash_token(token);

        // System context for the onboarding transaction. There is no
        // authenticated user yet; the admin scope is what lets the flow
        // read the token row and write the user and link.
        let ctx = RequestContext::new(organization_id, Uuid::nil(), Role::LandlordAdmin);

        let txn = self.db.begin().await.map_err(storage_error)?;
        set_context(&txn, &ctx).await.map_err(storage_error)?;

        let result = accept_in_txn(&txn, organization_id, &token_hash, input).await;
        match result {
            Ok(accepted) => {
                txn.commit().await.map_err(storage_error)?;
                Ok(accepted)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(error = %rollback_err, "onboarding rollback failed");
                }
                Err(AppError::from(err))
            }
        }
    }
}

async fn accept_in_txn(
    txn: &sea_orm::DatabaseTransaction,
    organization_id: Uuid,
    token_hash: &str,
    input: AcceptInvitationInput,
) -> Result<AcceptedInvitation, RepoError> {
    let invitation = invitation_tokens::Entity::find()
        .filter(invitation_tokens::Column::TokenHash.eq(token_hash))
        .filter(invitation_tokens::Column::UsedAt.is_null())
        .one(txn)
        .await?
        .ok_or_else(|| RepoError::App(AppError::NotFound("invitation".to_string())))?;

    let now = chrono::Utc::now();
    if invitation.expires_at < now {
        return Err(AppError::Conflict("invitation has expired".to_string()).into());
    }

    // Lock the contract: acceptance competes with direct share additions.
    let contract = contracts::Entity::find_by_id(invitation.contract_id)
        .filter(contracts::Column::OrganizationId.eq(organization_id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| not_found("contract", invitation.contract_id))?;
    if !contract.is_active {
        return Err(AppError::Conflict("contract is terminated".to_string()).into());
    }

    let existing: Vec<Decimal> = tenant_contracts::Entity::find()
        .select_only()
        .column(tenant_contracts::Column::Percentage)
        .filter(tenant_contracts::Column::ContractId.eq(contract.id))
        .into_tuple()
        .all(txn)
        .await?;
    if !tenancy::share_fits(&existing, invitation.percentage) {
        return Err(AppError::Conflict(format!(
            "share {}% no longer fits the contract",
            invitation.percentage
        ))
        .into());
    }

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        email: Set(invitation.email.clone()),
        full_name: Set(input.full_name),
        role: Set(UserRole::Tenant),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let user = match user.insert(txn).await {
        Ok(user) => user,
        Err(err) if is_unique_violation(&err) => {
            return Err(AppError::Conflict(format!(
                "email '{}' is already registered",
                invitation.email
            ))
            .into());
        }
        Err(err) => return Err(err.into()),
    };

    let link = tenant_contracts::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        tenant_id: Set(user.id),
        contract_id: Set(contract.id),
        percentage: Set(invitation.percentage),
        is_main_tenant: Set(existing.is_empty()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let link = link.insert(txn).await?;

    let mut used: invitation_tokens::ActiveModel = invitation.into();
    used.used_at = Set(Some(now.into()));
    used.update(txn).await?;

    Ok(AcceptedInvitation { user, link })
}

/// Generates a fresh invitation token: the organization ID followed by 32
/// random bytes, base64-url encoded.
fn generate_token(organization_id: Uuid) -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 48];
    bytes[..16].copy_from_slice(organization_id.as_bytes());
    rand::rng().fill_bytes(&mut bytes[16..]);
    base64_url::encode(&bytes)
}

/// Recovers the organization ID embedded in a token. Returns `None` for
/// anything that does not decode to the expected shape.
fn organization_from_token(token: &str) -> Option<Uuid> {
    let bytes = base64_url::decode(token).ok()?;
    if bytes.len() != 48 {
        return None;
    }
    Uuid::from_slice(&bytes[..16]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trips_organization() {
        let org = Uuid::new_v4();
        let token = generate_token(org);
        assert_eq!(organization_from_token(&token), Some(org));
    }

    #[test]
    fn test_garbage_tokens_rejected() {
        assert_eq!(organization_from_token(""), None);
        assert_eq!(organization_from_token("not-a-token"), None);
        assert_eq!(organization_from_token("$$$$"), None);
    }

    #[test]
    fn test_tokens_are_unique_per_issue() {
        let org = Uuid::new_v4();
        assert_ne!(generate_token(org), generate_token(org));
    }

    #[test]
    fn test_hash_is_stable_and_hex() {
        let token = generate_token(Uuid::new_v4());
        let hash = InvitationRepository::hash_token(&token);
        assert_eq!(hash, InvitationRepository::hash_token(&token));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
