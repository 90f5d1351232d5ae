//! Integration tests for the invitation onboarding flow.
//!
//! Issue, accept, single-use semantics, and the atomicity of the
//! acceptance transaction. Requires a running `PostgreSQL` database with
//! migrations applied.

mod common;

use rust_decimal::Decimal;
use sea_orm::EntityTrait;

use rentora_db::entities::{invitation_tokens, users};
use rentora_db::repositories::{AcceptInvitationInput, InviteTenantInput};
use rentora_db::InvitationRepository;
use rentora_shared::error::AppError;

fn invite_input(contract_id: uuid::Uuid, email: &str, percentage: Decimal) -> InviteTenantInput {
    InviteTenantInput {
        contract_id,
        email: email.to_string(),
        percentage,
        valid_for_days: None,
    }
}

#[tokio::test]
async fn test_invite_and_accept_onboards_tenant() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "inv-accept").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;
    let contract = common::seed_contract(&admin_db, org.organization_id, building, "1A").await;

    let db = common::connect_app().await;
    let repo = InvitationRepository::new(db);

    let issued = repo
        .invite(
            &org.admin,
            invite_input(contract, "new-tenant-inv-accept@example.com", Decimal::new(50, 0)),
        )
        .await
        .expect("invite must succeed");

    // The stored row holds only the hash.
    assert_ne!(issued.invitation.token_hash, issued.token);
    assert!(issued.invitation.used_at.is_none());

    let accepted = repo
        .accept(
            &issued.token,
            AcceptInvitationInput {
                full_name: "Nina Neu".to_string(),
            },
        )
        .await
        .expect("accept must succeed");

    assert_eq!(accepted.user.email, "new-tenant-inv-accept@example.com");
    assert_eq!(accepted.user.organization_id, org.organization_id);
    assert_eq!(accepted.link.contract_id, contract);
    assert_eq!(accepted.link.percentage, Decimal::new(50, 0));
    assert!(accepted.link.is_main_tenant, "first tenant on the contract");

    let stored = invitation_tokens::Entity::find_by_id(issued.invitation.id)
        .one(&admin_db)
        .await
        .expect("lookup must succeed")
        .expect("token row must still exist");
    assert!(stored.used_at.is_some(), "token must be marked used");

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_invitation_is_single_use() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "inv-single").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;
    let contract = common::seed_contract(&admin_db, org.organization_id, building, "1A").await;

    let db = common::connect_app().await;
    let repo = InvitationRepository::new(db);

    let issued = repo
        .invite(
            &org.admin,
            invite_input(contract, "tenant-inv-single@example.com", Decimal::new(40, 0)),
        )
        .await
        .expect("invite must succeed");

    repo.accept(
        &issued.token,
        AcceptInvitationInput {
            full_name: "First Caller".to_string(),
        },
    )
    .await
    .expect("first accept must succeed");

    let err = repo
        .accept(
            &issued.token,
            AcceptInvitationInput {
                full_name: "Second Caller".to_string(),
            },
        )
        .await
        .expect_err("second accept must fail");
    assert!(matches!(err, AppError::NotFound(_)));

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_failed_acceptance_leaves_no_partial_state() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "inv-atomic").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;
    let contract = common::seed_contract(&admin_db, org.organization_id, building, "1A").await;

    let db = common::connect_app().await;
    let repo = InvitationRepository::new(db);

    let issued = repo
        .invite(
            &org.admin,
            invite_input(contract, "late-tenant-inv-atomic@example.com", Decimal::new(60, 0)),
        )
        .await
        .expect("invite must succeed");

    // The contract fills up after the invitation was issued.
    common::seed_link(
        &admin_db,
        org.organization_id,
        org.tenant.user_id,
        contract,
        Decimal::new(80, 0),
    )
    .await;

    let err = repo
        .accept(
            &issued.token,
            AcceptInvitationInput {
                full_name: "Too Late".to_string(),
            },
        )
        .await
        .expect_err("60% no longer fits next to 80%");
    assert!(matches!(err, AppError::Conflict(_)));

    // No half-onboarded user may survive the rollback.
    let orphan = users::Entity::find()
        .all(&admin_db)
        .await
        .expect("lookup must succeed")
        .into_iter()
        .find(|u| u.email == "late-tenant-inv-atomic@example.com");
    assert!(orphan.is_none(), "failed acceptance must not create a user");

    // The token stays unused and can be revoked.
    let stored = invitation_tokens::Entity::find_by_id(issued.invitation.id)
        .one(&admin_db)
        .await
        .expect("lookup must succeed")
        .expect("token row must still exist");
    assert!(stored.used_at.is_none());

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_expired_invitation_rejected() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "inv-expired").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;
    let contract = common::seed_contract(&admin_db, org.organization_id, building, "1A").await;

    let db = common::connect_app().await;
    let repo = InvitationRepository::new(db);

    let issued = repo
        .invite(
            &org.admin,
            InviteTenantInput {
                contract_id: contract,
                email: "slow-tenant-inv-expired@example.com".to_string(),
                percentage: Decimal::new(30, 0),
                valid_for_days: Some(0),
            },
        )
        .await
        .expect("invite must succeed");

    let err = repo
        .accept(
            &issued.token,
            AcceptInvitationInput {
                full_name: "Slow Tenant".to_string(),
            },
        )
        .await
        .expect_err("expired invitation must be rejected");
    assert!(matches!(err, AppError::Conflict(_)));

    common::cleanup_org(&admin_db, org.organization_id).await;
}
