//! Integration tests for the composite contract and building flows.
//!
//! Covers contract termination (deactivation, bulk ticket close with
//! resolution stamp, note document) and building removal (active-contract
//! guard, history cleanup). Requires a running `PostgreSQL` database with
//! migrations applied.

mod common;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use rentora_db::entities::sea_orm_active_enums as db_enums;
use rentora_db::entities::{
    buildings, consumption_records, contracts, documents, invitation_tokens, tickets,
};
use rentora_db::repositories::{CreateTicketInput, TerminateContractInput};
use rentora_db::{BuildingRepository, ContractRepository, TicketRepository};
use rentora_shared::error::AppError;

fn ticket_input(building_id: Uuid, contract_id: Option<Uuid>) -> CreateTicketInput {
    CreateTicketInput {
        building_id,
        contract_id,
        title: "Broken heater".to_string(),
        description: "No heat in the living room".to_string(),
        priority: None,
        category: None,
    }
}

fn terminate_input(note: Option<&str>) -> TerminateContractInput {
    TerminateContractInput {
        end_date: NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
        note: note.map(str::to_string),
    }
}

#[tokio::test]
async fn test_terminate_closes_tickets_and_stamps_resolution() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "term-close").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Eichenhof").await;
    let contract = common::seed_contract(&admin_db, org.organization_id, building, "3C").await;
    common::seed_link(
        &admin_db,
        org.organization_id,
        org.tenant.user_id,
        contract,
        Decimal::ONE_HUNDRED,
    )
    .await;

    let db = common::connect_app().await;
    let ticket = TicketRepository::new(db.clone())
        .create(&org.tenant, ticket_input(building, Some(contract)))
        .await
        .expect("ticket create must succeed");

    let terminated = ContractRepository::new(db)
        .terminate(&org.admin, contract, terminate_input(Some("Moved out")))
        .await
        .expect("terminate must succeed");

    assert!(!terminated.is_active);
    assert_eq!(
        terminated.end_date,
        Some(NaiveDate::from_ymd_opt(2026, 9, 30).unwrap())
    );

    let closed = tickets::Entity::find_by_id(ticket.id)
        .one(&admin_db)
        .await
        .expect("ticket query must succeed")
        .expect("ticket must still exist");
    assert_eq!(closed.status, db_enums::TicketStatus::Closed);
    assert!(
        closed.resolved_at.is_some(),
        "force-closed ticket must carry resolved_at"
    );

    let notes = documents::Entity::find()
        .filter(documents::Column::ContractId.eq(contract))
        .all(&admin_db)
        .await
        .expect("document query must succeed");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Moved out");

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_terminate_twice_is_conflict() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "term-twice").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Eichenhof").await;
    let contract = common::seed_contract(&admin_db, org.organization_id, building, "1A").await;

    let db = common::connect_app().await;
    let repo = ContractRepository::new(db);
    repo.terminate(&org.admin, contract, terminate_input(None))
        .await
        .expect("first terminate must succeed");
    let err = repo
        .terminate(&org.admin, contract, terminate_input(None))
        .await
        .expect_err("second terminate must be rejected");
    assert!(matches!(err, AppError::Conflict(_)));

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_building_delete_refused_while_contract_active() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "bldg-active").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Eichenhof").await;
    common::seed_contract(&admin_db, org.organization_id, building, "1A").await;

    let db = common::connect_app().await;
    let err = BuildingRepository::new(db)
        .delete(&org.admin, building)
        .await
        .expect_err("delete with an active contract must be rejected");
    assert!(matches!(err, AppError::Conflict(_)));

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_building_delete_removes_history() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "bldg-history").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Eichenhof").await;
    let contract = common::seed_contract(&admin_db, org.organization_id, building, "2B").await;
    common::seed_link(
        &admin_db,
        org.organization_id,
        org.tenant.user_id,
        contract,
        Decimal::ONE_HUNDRED,
    )
    .await;

    // Contract history: a reading and a pending invitation.
    consumption_records::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(org.organization_id),
        contract_id: Set(contract),
        consumption_type: Set(db_enums::ConsumptionType::Electricity),
        period: Set("2026-07".to_string()),
        reading: Set(Decimal::new(1234, 1)),
        cost: Set(Decimal::new(8_050, 2)),
        ..Default::default()
    }
    .insert(&admin_db)
    .await
    .expect("Failed to create consumption record");
    invitation_tokens::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(org.organization_id),
        contract_id: Set(contract),
        token_hash: Set(format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        )),
        email: Set("next-tenant@example.com".to_string()),
        percentage: Set(Decimal::ONE_HUNDRED),
        expires_at: Set((chrono::Utc::now() + chrono::Duration::days(7)).into()),
        used_at: Set(None),
        ..Default::default()
    }
    .insert(&admin_db)
    .await
    .expect("Failed to create invitation token");

    let db = common::connect_app().await;
    let ticket = TicketRepository::new(db.clone())
        .create(&org.tenant, ticket_input(building, Some(contract)))
        .await
        .expect("ticket create must succeed");

    ContractRepository::new(db.clone())
        .terminate(&org.admin, contract, terminate_input(Some("Demolition")))
        .await
        .expect("terminate must succeed");

    // Inactive contract, closed tickets, readings, and an invitation all
    // still point at the building's records; removal must absorb them.
    BuildingRepository::new(db)
        .delete(&org.admin, building)
        .await
        .expect("delete of a building with history must succeed");

    assert!(
        buildings::Entity::find_by_id(building)
            .one(&admin_db)
            .await
            .expect("building query must succeed")
            .is_none()
    );
    assert!(
        tickets::Entity::find_by_id(ticket.id)
            .one(&admin_db)
            .await
            .expect("ticket query must succeed")
            .is_none()
    );
    assert!(
        contracts::Entity::find_by_id(contract)
            .one(&admin_db)
            .await
            .expect("contract query must succeed")
            .is_none()
    );

    // The termination note survives, detached from the deleted anchors.
    let notes = documents::Entity::find()
        .filter(documents::Column::OrganizationId.eq(org.organization_id))
        .all(&admin_db)
        .await
        .expect("document query must succeed");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Demolition");
    assert!(notes[0].building_id.is_none());
    assert!(notes[0].contract_id.is_none());

    common::cleanup_org(&admin_db, org.organization_id).await;
}
