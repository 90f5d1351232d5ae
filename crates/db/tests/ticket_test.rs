//! Integration tests for the ticket flow.
//!
//! Covers creation defaults, the tenant write allow-list, status
//! transition validation, and resolution timestamp behavior. Requires a
//! running `PostgreSQL` database with migrations applied.

mod common;

use rust_decimal::Decimal;

use rentora_core::ticket::{TicketPatch, TicketPriority, TicketStatus};
use rentora_db::entities::sea_orm_active_enums as db_enums;
use rentora_db::repositories::CreateTicketInput;
use rentora_db::TicketRepository;
use rentora_shared::error::AppError;

fn create_input(building_id: uuid::Uuid, contract_id: Option<uuid::Uuid>) -> CreateTicketInput {
    CreateTicketInput {
        building_id,
        contract_id,
        title: "Leaking sink".to_string(),
        description: "The kitchen sink drips".to_string(),
        priority: None,
        category: None,
    }
}

#[tokio::test]
async fn test_ticket_creation_defaults() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "tkt-create").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;
    let contract = common::seed_contract(&admin_db, org.organization_id, building, "1A").await;
    common::seed_link(
        &admin_db,
        org.organization_id,
        org.tenant.user_id,
        contract,
        Decimal::ONE_HUNDRED,
    )
    .await;

    let db = common::connect_app().await;
    let repo = TicketRepository::new(db);

    let ticket = repo
        .create(&org.tenant, create_input(building, Some(contract)))
        .await
        .expect("tenant create against held contract must succeed");

    assert_eq!(ticket.status, db_enums::TicketStatus::Open);
    assert_eq!(ticket.priority, db_enums::TicketPriority::Medium);
    assert_eq!(ticket.category, db_enums::TicketCategory::General);
    assert_eq!(ticket.created_by_id, org.tenant.user_id);
    assert_eq!(ticket.contract_id, Some(contract));
    assert!(ticket.resolved_at.is_none());

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_tenant_cannot_file_against_unheld_contract() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "tkt-unheld").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;
    let other = common::seed_contract(&admin_db, org.organization_id, building, "2B").await;

    let db = common::connect_app().await;
    let err = TicketRepository::new(db)
        .create(&org.tenant, create_input(building, Some(other)))
        .await
        .expect_err("unheld contract must be rejected");
    assert!(matches!(err, AppError::NotFound(_)));

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_tenant_patch_keeps_only_description() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "tkt-allowlist").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;
    let contract = common::seed_contract(&admin_db, org.organization_id, building, "1A").await;
    common::seed_link(
        &admin_db,
        org.organization_id,
        org.tenant.user_id,
        contract,
        Decimal::ONE_HUNDRED,
    )
    .await;

    let db = common::connect_app().await;
    let repo = TicketRepository::new(db);
    let ticket = repo
        .create(&org.tenant, create_input(building, Some(contract)))
        .await
        .expect("create must succeed");

    // A hostile patch: status jump, retitle, self-assignment. Only the
    // description may land.
    let patched = repo
        .update(
            &org.tenant,
            ticket.id,
            TicketPatch {
                title: Some("hacked".to_string()),
                description: Some("It drips faster now".to_string()),
                status: Some(TicketStatus::Closed),
                priority: Some(TicketPriority::Urgent),
                category: None,
                assigned_to_id: Some(Some(org.tenant.user_id)),
                resolved_at: None,
            },
        )
        .await
        .expect("tenant update must succeed");

    assert_eq!(patched.description, "It drips faster now");
    assert_eq!(patched.title, "Leaking sink", "title must not change");
    assert_eq!(patched.status, db_enums::TicketStatus::Open);
    assert_eq!(patched.priority, db_enums::TicketPriority::Medium);
    assert!(patched.assigned_to_id.is_none());

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_invalid_transition_rejected() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "tkt-transition").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;

    let db = common::connect_app().await;
    let repo = TicketRepository::new(db);
    let ticket = repo
        .create(&org.admin, create_input(building, None))
        .await
        .expect("create must succeed");

    // open -> resolved skips in_progress.
    let err = repo
        .update(
            &org.admin,
            ticket.id,
            TicketPatch {
                status: Some(TicketStatus::Resolved),
                ..TicketPatch::default()
            },
        )
        .await
        .expect_err("open -> resolved must be rejected");
    assert!(matches!(err, AppError::Validation(_)));

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_resolution_timestamp_idempotent_and_cleared_on_reopen() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "tkt-resolve").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;

    let db = common::connect_app().await;
    let repo = TicketRepository::new(db);
    let ticket = repo
        .create(&org.admin, create_input(building, None))
        .await
        .expect("create must succeed");

    let set_status = |status: TicketStatus| TicketPatch {
        status: Some(status),
        ..TicketPatch::default()
    };

    repo.update(&org.admin, ticket.id, set_status(TicketStatus::InProgress))
        .await
        .expect("open -> in_progress");
    let resolved = repo
        .update(&org.admin, ticket.id, set_status(TicketStatus::Resolved))
        .await
        .expect("in_progress -> resolved");
    let first_stamp = resolved.resolved_at.expect("resolved_at must be stamped");

    // Settling again keeps the original timestamp.
    let re_resolved = repo
        .update(&org.admin, ticket.id, set_status(TicketStatus::Resolved))
        .await
        .expect("resolved -> resolved is a no-op");
    assert_eq!(re_resolved.resolved_at, Some(first_stamp));

    let closed = repo
        .update(&org.admin, ticket.id, set_status(TicketStatus::Closed))
        .await
        .expect("resolved -> closed");
    assert_eq!(closed.resolved_at, Some(first_stamp));

    // Reopening clears it.
    let reopened = repo
        .update(&org.admin, ticket.id, set_status(TicketStatus::Open))
        .await
        .expect("closed -> open (admin reopen)");
    assert!(reopened.resolved_at.is_none());

    common::cleanup_org(&admin_db, org.organization_id).await;
}
