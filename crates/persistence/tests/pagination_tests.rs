//! List windows, metadata and sort handling.

#![cfg(feature = "sqlite")]

mod common;

use crm_persistence::backends::sqlite::SqliteBackend;
use crm_persistence::core::{self, ResourceStore};
use crm_persistence::models::Models;
use crm_persistence::types::{Cabinet, ListParams, Metadata, SubscriptionFilter};
use crm_persistence::StoreError;

use common::create_models;

async fn seed_cabinets(models: &Models, count: usize) {
    for i in 0..count {
        core::create(
            &models.cabinets,
            Cabinet::new(format!("Room {:02}", i), "Main street"),
        )
        .await
        .unwrap();
    }
}

#[tokio::test]
async fn test_metadata_for_middle_and_last_page() {
    let models = create_models();
    seed_cabinets(&models, 25).await;

    let page = models
        .cabinets
        .list(&(), &ListParams::new(2, 10).with_sort("name"))
        .await
        .unwrap();
    assert_eq!(page.len(), 10);
    assert_eq!(page.items[0].name, "Room 10");
    assert_eq!(
        page.metadata,
        Metadata {
            current_page: 2,
            page_size: 10,
            first_page: 1,
            last_page: 3,
            total_records: 25,
        }
    );
    assert!(page.metadata.has_next());

    let last = models
        .cabinets
        .list(&(), &ListParams::new(3, 10).with_sort("name"))
        .await
        .unwrap();
    assert_eq!(last.len(), 5);
    assert_eq!(last.metadata.last_page, 3);
    assert!(!last.metadata.has_next());
}

#[tokio::test]
async fn test_page_past_end_is_empty() {
    let models = create_models();
    seed_cabinets(&models, 3).await;

    let page = models
        .cabinets
        .list(&(), &ListParams::new(5, 10))
        .await
        .unwrap();

    assert!(page.is_empty());
    assert_eq!(page.metadata, Metadata::default());
}

#[tokio::test]
async fn test_empty_table() {
    let models = create_models();

    let page = models
        .subscriptions
        .list(&SubscriptionFilter::default(), &ListParams::default())
        .await
        .unwrap();

    assert!(page.is_empty());
    assert_eq!(page.metadata.total_records, 0);
}

#[tokio::test]
async fn test_sort_directions() {
    let models = create_models();
    for name in ["b", "a", "c"] {
        core::create(&models.cabinets, Cabinet::new(name, "X"))
            .await
            .unwrap();
    }

    let names = |page: crm_persistence::Page<Cabinet>| -> Vec<String> {
        page.items.into_iter().map(|c| c.name).collect()
    };

    let asc = models
        .cabinets
        .list(&(), &ListParams::default().with_sort("name"))
        .await
        .unwrap();
    assert_eq!(names(asc), vec!["a", "b", "c"]);

    let desc = models
        .cabinets
        .list(&(), &ListParams::default().with_sort("-name"))
        .await
        .unwrap();
    assert_eq!(names(desc), vec!["c", "b", "a"]);
}

#[tokio::test]
async fn test_ties_are_broken_by_id() {
    let models = create_models();
    let mut ids = Vec::new();
    for _ in 0..5 {
        let c = core::create(&models.cabinets, Cabinet::new("Same", "Same"))
            .await
            .unwrap();
        ids.push(c.meta.id);
    }
    ids.sort_by_key(|id| id.to_string());

    let page = models
        .cabinets
        .list(&(), &ListParams::default().with_sort("-address"))
        .await
        .unwrap();

    let listed: Vec<_> = page.items.iter().map(|c| c.meta.id).collect();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn test_window_validation() {
    let models = create_models();

    let check = |params: ListParams| {
        let store = models.cabinets.clone();
        async move { store.list(&(), &params).await.unwrap_err() }
    };

    let err = check(ListParams::new(0, 10)).await;
    assert_eq!(
        err.validation_errors().unwrap().get("page"),
        Some("must be greater than zero")
    );

    let err = check(ListParams::new(10_000_001, 10)).await;
    assert_eq!(
        err.validation_errors().unwrap().get("page"),
        Some("must be a maximum of 10 million")
    );

    let err = check(ListParams::new(1, 0)).await;
    assert!(err.validation_errors().unwrap().contains("page_size"));

    let err = check(ListParams::new(1, 101)).await;
    assert_eq!(
        err.validation_errors().unwrap().get("page_size"),
        Some("must be a maximum of 100")
    );
}

#[tokio::test]
async fn test_bad_sort_is_rejected_before_the_database() {
    // No schema: any statement that reaches the database fails
    let models = Models::new(SqliteBackend::in_memory().unwrap());

    let err = models
        .cabinets
        .list(&(), &ListParams::default().with_sort("password"))
        .await
        .unwrap_err();
    assert_eq!(
        err.validation_errors().unwrap().get("sort"),
        Some("invalid sort value")
    );

    let err = models
        .cabinets
        .list(&(), &ListParams::default().with_sort("name"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unknown { .. }));
}
