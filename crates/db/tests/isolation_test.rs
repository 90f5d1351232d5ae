//! Integration tests for organization isolation.
//!
//! Verifies that the policy conditions and the RLS backstop keep rows of
//! one organization invisible to contexts of another. Requires a running
//! `PostgreSQL` database with migrations applied.

#![allow(clippy::similar_names)]

mod common;

use rentora_db::entities::buildings;
use rentora_db::{BuildingRepository, ScopedConnectionExt};
use rentora_shared::error::AppError;
use rentora_shared::types::PageRequest;
use sea_orm::EntityTrait;

#[tokio::test]
async fn test_buildings_isolated_between_organizations() {
    let admin_db = common::connect_admin().await;
    let org_a = common::seed_org(&admin_db, "iso-a").await;
    let org_b = common::seed_org(&admin_db, "iso-b").await;
    let building_a = common::seed_building(&admin_db, org_a.organization_id, "Lindenhof").await;
    let building_b = common::seed_building(&admin_db, org_b.organization_id, "Seeblick").await;

    let db = common::connect_app().await;
    let repo = BuildingRepository::new(db);

    let page_a = repo
        .list(&org_a.admin, PageRequest::default())
        .await
        .expect("Org A list should succeed");
    assert_eq!(page_a.data.len(), 1, "Org A should see exactly 1 building");
    assert_eq!(page_a.data[0].id, building_a);

    let page_b = repo
        .list(&org_b.admin, PageRequest::default())
        .await
        .expect("Org B list should succeed");
    assert_eq!(page_b.data.len(), 1, "Org B should see exactly 1 building");
    assert_eq!(page_b.data[0].id, building_b);

    // Cross-organization access by ID reads as not-found, never as a
    // distinguishable denial.
    let err = repo
        .get(&org_a.admin, building_b)
        .await
        .expect_err("Org A must not fetch Org B's building");
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(err.status_code(), 404);

    common::cleanup_org(&admin_db, org_a.organization_id).await;
    common::cleanup_org(&admin_db, org_b.organization_id).await;
}

#[tokio::test]
async fn test_rls_backstop_filters_unscoped_queries() {
    let admin_db = common::connect_admin().await;
    let org_a = common::seed_org(&admin_db, "rls-a").await;
    let org_b = common::seed_org(&admin_db, "rls-b").await;
    common::seed_building(&admin_db, org_a.organization_id, "Lindenhof").await;
    common::seed_building(&admin_db, org_b.organization_id, "Seeblick").await;

    let db = common::connect_app().await;

    // A raw entity query with no application-side filter: the database
    // policies alone must restrict it to the bound organization.
    let scoped = db
        .with_context(&org_a.admin)
        .await
        .expect("Failed to create scoped connection");
    let visible = buildings::Entity::find()
        .all(scoped.transaction())
        .await
        .expect("Failed to query buildings");
    scoped.rollback().await.expect("Failed to rollback");

    assert_eq!(visible.len(), 1, "RLS should hide the other org's rows");
    assert_eq!(visible[0].organization_id, org_a.organization_id);

    common::cleanup_org(&admin_db, org_a.organization_id).await;
    common::cleanup_org(&admin_db, org_b.organization_id).await;
}
