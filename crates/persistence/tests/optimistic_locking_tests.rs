//! Optimistic concurrency: stale tokens and concurrent writers.

#![cfg(feature = "sqlite")]

mod common;

use std::sync::Arc;

use tokio::sync::Barrier;

use crm_persistence::config::SqliteBackendConfig;
use crm_persistence::core::{self, ResourceStore};
use crm_persistence::models::Models;
use crm_persistence::types::{Cabinet, CabinetPatch, Gender, TeacherPatch};
use crm_persistence::StoreError;

use common::{create_file_backend, create_models, init_tracing, teacher};

// ============================================================================
// Sequential
// ============================================================================

#[tokio::test]
async fn test_version_increments_by_one_per_update() {
    let models = create_models();
    let mut current = core::create(&models.cabinets, Cabinet::new("A", "X"))
        .await
        .unwrap();

    for expected in 2..=5 {
        current.address = format!("X{}", expected);
        current = models.cabinets.update(current).await.unwrap();
        assert_eq!(current.meta.version, expected);
    }
}

#[tokio::test]
async fn test_second_writer_with_same_read_loses() {
    let models = create_models();
    let created = core::create(&models.teachers, teacher("Anna Petrova", Gender::Female))
        .await
        .unwrap();

    let mut first = created.clone();
    first.phone = "111".to_string();
    let mut second = created.clone();
    second.phone = "222".to_string();

    models.teachers.update(first).await.unwrap();
    let err = models.teachers.update(second).await.unwrap_err();

    assert!(err.is_edit_conflict());
    let stored = models.teachers.get(created.meta.id).await.unwrap();
    assert_eq!(stored.phone, "111");
    assert_eq!(stored.meta.version, 2);
}

#[tokio::test]
async fn test_conflict_carries_supplied_version() {
    let models = create_models();
    let created = core::create(&models.cabinets, Cabinet::new("A", "X"))
        .await
        .unwrap();
    let mut stale = created.clone();
    stale.meta.version = 7;

    match models.cabinets.update(stale).await {
        Err(StoreError::EditConflict { id, version, .. }) => {
            assert_eq!(id, created.meta.id.to_string());
            assert_eq!(version, 7);
        }
        other => panic!("expected EditConflict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_patch_after_delete_is_not_found() {
    let models = create_models();
    let created = core::create(&models.teachers, teacher("Anna Petrova", Gender::Female))
        .await
        .unwrap();
    models.teachers.delete(created.meta.id).await.unwrap();

    let err = core::patch(&models.teachers, created.meta.id, TeacherPatch::default())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

// ============================================================================
// Concurrent
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_have_one_winner() {
    init_tracing();
    const WRITERS: usize = 8;

    let dir = tempfile::tempdir().unwrap();
    let backend = create_file_backend(
        &dir.path().join("race.db"),
        SqliteBackendConfig {
            max_connections: WRITERS as u32,
            busy_timeout_ms: 5000,
            operation_timeout_ms: 10_000,
            ..Default::default()
        },
    );
    let models = Models::new(backend);
    let created = core::create(&models.cabinets, Cabinet::new("A", "X"))
        .await
        .unwrap();

    let barrier = Arc::new(Barrier::new(WRITERS));
    let mut handles = Vec::new();
    for i in 0..WRITERS {
        let store = models.cabinets.clone();
        let barrier = Arc::clone(&barrier);
        let mut edit = created.clone();
        edit.name = format!("writer-{}", i);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            store.update(edit).await
        }));
    }

    let mut winners = Vec::new();
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(updated) => winners.push(updated),
            Err(e) if e.is_edit_conflict() => conflicts += 1,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(conflicts, WRITERS - 1);
    let stored = models.cabinets.get(created.meta.id).await.unwrap();
    assert_eq!(stored.meta.version, 2);
    assert_eq!(stored.name, winners[0].name);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_patches_never_lose_an_acknowledged_write() {
    const WRITERS: usize = 6;

    let dir = tempfile::tempdir().unwrap();
    let backend = create_file_backend(
        &dir.path().join("patch.db"),
        SqliteBackendConfig {
            busy_timeout_ms: 5000,
            operation_timeout_ms: 10_000,
            ..Default::default()
        },
    );
    let models = Models::new(backend);
    let created = core::create(&models.cabinets, Cabinet::new("A", "X"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..WRITERS {
        let store = models.cabinets.clone();
        let id = created.meta.id;
        handles.push(tokio::spawn(async move {
            core::patch(
                &store,
                id,
                CabinetPatch {
                    address: Some(format!("addr-{}", i)),
                    ..Default::default()
                },
            )
            .await
        }));
    }

    let mut acknowledged = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => acknowledged += 1,
            Err(e) => assert!(e.is_edit_conflict(), "unexpected error: {:?}", e),
        }
    }

    // Every acknowledged write moved the version exactly once
    let stored = models.cabinets.get(created.meta.id).await.unwrap();
    assert!(acknowledged >= 1);
    assert_eq!(stored.meta.version, 1 + acknowledged as i64);
}
