//! Integration test for the share-sum invariant under concurrency.
//!
//! Two simultaneous additions that each fit the snapshot but not each
//! other must serialize on the contract row lock; exactly one commits.
//! Requires a running `PostgreSQL` database with migrations applied.

mod common;

use rust_decimal::Decimal;

use rentora_db::entities::sea_orm_active_enums::UserRole;
use rentora_db::repositories::AddTenantInput;
use rentora_db::TenantContractRepository;
use rentora_shared::error::AppError;

#[tokio::test]
async fn test_concurrent_share_additions_admit_exactly_one() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "share-race").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;
    let contract = common::seed_contract(&admin_db, org.organization_id, building, "1A").await;
    let tenant_a = common::seed_user(&admin_db, org.organization_id, "race-a", UserRole::Tenant).await;
    let tenant_b = common::seed_user(&admin_db, org.organization_id, "race-b", UserRole::Tenant).await;

    let db = common::connect_app().await;
    let repo = TenantContractRepository::new(db);

    let input = |tenant_id| AddTenantInput {
        contract_id: contract,
        tenant_id,
        percentage: Decimal::new(60, 0),
        is_main_tenant: false,
    };

    // 60% + 60%: both fit an empty contract individually, not together.
    let (first, second) = tokio::join!(
        repo.add_tenant(&org.admin, input(tenant_a)),
        repo.add_tenant(&org.admin, input(tenant_b)),
    );

    let successes = usize::from(first.is_ok()) + usize::from(second.is_ok());
    assert_eq!(successes, 1, "exactly one addition must commit");

    let conflict = if first.is_err() { first } else { second };
    assert!(matches!(
        conflict.expect_err("one addition must fail"),
        AppError::Conflict(_)
    ));

    let links = repo
        .list_for_contract(&org.admin, contract)
        .await
        .expect("listing must succeed");
    assert_eq!(links.len(), 1, "the losing addition must leave no row");
    assert_eq!(links[0].percentage, Decimal::new(60, 0));

    common::cleanup_org(&admin_db, org.organization_id).await;
}

#[tokio::test]
async fn test_share_over_hundred_rejected_sequentially() {
    let admin_db = common::connect_admin().await;
    let org = common::seed_org(&admin_db, "share-seq").await;
    let building = common::seed_building(&admin_db, org.organization_id, "Lindenhof").await;
    let contract = common::seed_contract(&admin_db, org.organization_id, building, "1A").await;
    let tenant_a = common::seed_user(&admin_db, org.organization_id, "seq-a", UserRole::Tenant).await;
    let tenant_b = common::seed_user(&admin_db, org.organization_id, "seq-b", UserRole::Tenant).await;

    let db = common::connect_app().await;
    let repo = TenantContractRepository::new(db);

    repo.add_tenant(
        &org.admin,
        AddTenantInput {
            contract_id: contract,
            tenant_id: tenant_a,
            percentage: Decimal::new(70, 0),
            is_main_tenant: true,
        },
    )
    .await
    .expect("first 70% must fit");

    let err = repo
        .add_tenant(
            &org.admin,
            AddTenantInput {
                contract_id: contract,
                tenant_id: tenant_b,
                percentage: Decimal::new(40, 0),
                is_main_tenant: false,
            },
        )
        .await
        .expect_err("70% + 40% must be rejected");
    assert!(matches!(err, AppError::Conflict(_)));

    common::cleanup_org(&admin_db, org.organization_id).await;
}
