//! Integration tests for tenant-role scoping.
//!
//! A tenant's visibility narrows per entity: contracts and consumption to
//! what they hold, documents to public/own/held, invitations to nothing.
//! Requires a running `PostgreSQL` database with migrations applied.

mod common;

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use rentora_db::entities::documents;
use rentora_db::repositories::{
    ConsumptionFilter, ContractFilter, DocumentFilter,
};
use rentora_db::{
    ConsumptionRepository, ContractRepository, DocumentRepository, InvitationRepository,
    UserRepository,
};
use rentora_shared::error::AppError;
use rentora_shared::types::PageRequest;

#[tokio::test]
async fn test_tenant_without_contracts_sees_empty_lists_not_errors() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "scope-empty").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;
    common::seed_contract(&admin_db, org.organization_id, building, "1A").await;

    let db = common::connect_app().await;

    // The tenant has no contract links: contract-scoped entities collapse
    // to an explicit denial, observed as empty pages.
    let contracts = ContractRepository::new(db.clone())
        .list(&org.tenant, ContractFilter::default(), PageRequest::default())
        .await
        .expect("listing must succeed for a tenant with no contracts");
    assert!(contracts.data.is_empty());
    assert_eq!(contracts.meta.total, 0);

    let consumption = ConsumptionRepository::new(db.clone())
        .list(
            &org.tenant,
            ConsumptionFilter::default(),
            PageRequest::default(),
        )
        .await
        .expect("listing must succeed for a tenant with no contracts");
    assert!(consumption.data.is_empty());

    // Users stay visible organization-wide regardless of holdings.
    let users = UserRepository::new(db)
        .list(&org.tenant, PageRequest::default())
        .await
        .expect("user listing must succeed");
    assert_eq!(users.data.len(), 2);

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_tenant_sees_held_contract_and_its_consumption_only() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "scope-held").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;
    let held = common::seed_contract(&admin_db, org.organization_id, building, "1A").await;
    let other = common::seed_contract(&admin_db, org.organization_id, building, "2B").await;
    common::seed_link(
        &admin_db,
        org.organization_id,
        org.tenant.user_id,
        held,
        Decimal::ONE_HUNDRED,
    )
    .await;

    let db = common::connect_app().await;
    let repo = ContractRepository::new(db);

    let page = repo
        .list(&org.tenant, ContractFilter::default(), PageRequest::default())
        .await
        .expect("listing must succeed");
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, held);

    let err = repo
        .get(&org.tenant, other)
        .await
        .expect_err("unheld contract must read as not-found");
    assert!(matches!(err, AppError::NotFound(_)));

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_public_documents_visible_to_unrelated_tenant() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "scope-docs").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;

    // One public and one private admin upload, neither tied to anything
    // the tenant holds.
    let public_id = Uuid::new_v4();
    documents::ActiveModel {
        id: Set(public_id),
        organization_id: Set(org.organization_id),
        building_id: Set(Some(building)),
        contract_id: Set(None),
        ticket_id: Set(None),
        uploaded_by_id: Set(org.admin.user_id),
        file_name: Set("house-rules.pdf".to_string()),
        title: Set("House rules".to_string()),
        is_public: Set(true),
        ..Default::default()
    }
    .insert(&admin_db)
    .await
    .expect("Failed to create public document");

    documents::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(org.organization_id),
        building_id: Set(Some(building)),
        contract_id: Set(None),
        ticket_id: Set(None),
        uploaded_by_id: Set(org.admin.user_id),
        file_name: Set("insurance.pdf".to_string()),
        title: Set("Insurance policy".to_string()),
        is_public: Set(false),
        ..Default::default()
    }
    .insert(&admin_db)
    .await
    .expect("Failed to create private document");

    let db = common::connect_app().await;
    let page = DocumentRepository::new(db)
        .list(&org.tenant, DocumentFilter::default(), PageRequest::default())
        .await
        .expect("listing must succeed");

    assert_eq!(page.data.len(), 1, "only the public document is visible");
    assert_eq!(page.data[0].id, public_id);

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_invitations_denied_to_tenants() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "scope-inv").await;

    let db = common::connect_app().await;
    let err = InvitationRepository::new(db)
        .list(&org.tenant, PageRequest::default())
        .await
        .expect_err("tenants must not list invitations");

    assert!(matches!(err, AppError::AccessDenied(_)));
    // Indistinguishable from a missing resource at the boundary.
    assert_eq!(err.status_code(), 404);
    assert_eq!(err.error_code(), "NOT_FOUND");

    common::cleanup_org(&admin_db, org.organization_id).await;
}
