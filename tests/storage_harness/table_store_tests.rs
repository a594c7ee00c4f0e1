//! Macro-generated test suite for `TableStore` contract validation.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use agency_sync::storage::InMemoryTableStore;
//!
//! table_store_tests!(InMemoryTableStore::new());
//! ```
//!
//! # Generated Tests
//!
//! ## Insert
//! - `test_insert_returns_generated_columns` — id and timestamps filled in
//! - `test_insert_keeps_supplied_id` — a caller-chosen id survives
//! - `test_insert_resolves_embeds` — `clients(name)` on the returned row
//!
//! ## Select
//! - `test_select_scoped_to_owner` — other owners' rows never leak
//! - `test_select_newest_first` — `created_at` descending by default
//! - `test_select_dangling_embed_is_null` — deleted related row embeds as null
//!
//! ## Update & Delete
//! - `test_update_merges_columns` — only sent columns change
//! - `test_update_absent_id` — succeeds without effect
//! - `test_delete_removes_row` / `test_delete_absent_id`
//!
//! ## Concurrency
//! - `test_concurrent_inserts` — parallel inserts from spawned tasks

/// Generate a full `TableStore` conformance test suite.
///
/// `$factory` is evaluated inside each async test, so it may `.await`. The
/// store must be `Clone + 'static` for the concurrency test.
#[macro_export]
macro_rules! table_store_tests {
    ($factory:expr) => {
        mod table_store_contract_tests {
            use super::*;
            use agency_sync::core::query::{Embed, Order, SelectQuery};
            use agency_sync::core::store::TableStore;
            use serde_json::json;
            use uuid::Uuid;

            const CLIENT_EMBED: &[Embed] = &[Embed::new("clients", "client_id", &["name"])];

            // ==================================================================
            // Insert
            // ==================================================================

            #[tokio::test]
            async fn test_insert_returns_generated_columns() {
                let store = $factory;
                let owner = Uuid::new_v4();

                let inserted = store
                    .insert("clients", row(json!({ "name": "Acme", "user_id": owner })), &[])
                    .await
                    .unwrap();

                let _ = row_id(&inserted);
                assert_eq!(inserted["name"], "Acme");
                assert_eq!(inserted["user_id"], json!(owner));
                assert!(inserted["created_at"].is_string());
                assert!(inserted["updated_at"].is_string());
            }

            #[tokio::test]
            async fn test_insert_keeps_supplied_id() {
                let store = $factory;
                let id = Uuid::new_v4();

                let inserted = store
                    .insert(
                        "clients",
                        row(json!({ "id": id, "name": "Acme", "user_id": Uuid::new_v4() })),
                        &[],
                    )
                    .await
                    .unwrap();
                assert_eq!(row_id(&inserted), id);
            }

            #[tokio::test]
            async fn test_insert_resolves_embeds() {
                let store = $factory;
                let owner = Uuid::new_v4();

                let client = store
                    .insert("clients", row(json!({ "name": "Acme", "user_id": owner })), &[])
                    .await
                    .unwrap();
                let project = store
                    .insert(
                        "projects",
                        row(json!({
                            "name": "Site",
                            "user_id": owner,
                            "client_id": row_id(&client)
                        })),
                        CLIENT_EMBED,
                    )
                    .await
                    .unwrap();
                assert_eq!(project["clients"], json!({ "name": "Acme" }));

                let orphan = store
                    .insert(
                        "projects",
                        row(json!({ "name": "Internal", "user_id": owner, "client_id": null })),
                        CLIENT_EMBED,
                    )
                    .await
                    .unwrap();
                assert!(orphan["clients"].is_null());
            }

            // ==================================================================
            // Select
            // ==================================================================

            #[tokio::test]
            async fn test_select_scoped_to_owner() {
                let store = $factory;
                let alice = Uuid::new_v4();
                let bob = Uuid::new_v4();

                for (name, owner) in [("A1", alice), ("B1", bob), ("A2", alice)] {
                    store
                        .insert("clients", row(json!({ "name": name, "user_id": owner })), &[])
                        .await
                        .unwrap();
                }

                let rows = store
                    .select(&SelectQuery::owned("clients", alice))
                    .await
                    .unwrap();
                assert_eq!(rows.len(), 2);
                assert!(rows.iter().all(|r| r["user_id"] == json!(alice)));

                let rows = store
                    .select(&SelectQuery::owned("clients", Uuid::new_v4()))
                    .await
                    .unwrap();
                assert!(rows.is_empty());
            }

            #[tokio::test]
            async fn test_select_newest_first() {
                let store = $factory;
                let owner = Uuid::new_v4();

                for (name, at) in [
                    ("January", "2024-01-01T00:00:00Z"),
                    ("March", "2024-03-01T00:00:00Z"),
                    ("February", "2024-02-01T00:00:00Z"),
                ] {
                    store
                        .insert(
                            "clients",
                            row(json!({ "name": name, "user_id": owner, "created_at": at })),
                            &[],
                        )
                        .await
                        .unwrap();
                }

                let rows = store
                    .select(&SelectQuery::owned("clients", owner))
                    .await
                    .unwrap();
                let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
                assert_eq!(names, vec!["March", "February", "January"]);

                let rows = store
                    .select(&SelectQuery::owned("clients", owner).ordered(Order::CreatedAsc))
                    .await
                    .unwrap();
                assert_eq!(rows[0]["name"], "January");
            }

            #[tokio::test]
            async fn test_select_dangling_embed_is_null() {
                let store = $factory;
                let owner = Uuid::new_v4();

                let client = store
                    .insert("clients", row(json!({ "name": "Acme", "user_id": owner })), &[])
                    .await
                    .unwrap();
                let client_id = row_id(&client);
                store
                    .insert(
                        "projects",
                        row(json!({ "name": "Site", "user_id": owner, "client_id": client_id })),
                        CLIENT_EMBED,
                    )
                    .await
                    .unwrap();

                store.delete("clients", &client_id).await.unwrap();

                let rows = store
                    .select(&SelectQuery::owned("projects", owner).with_embeds(CLIENT_EMBED))
                    .await
                    .unwrap();
                assert_eq!(rows.len(), 1);
                assert!(rows[0]["clients"].is_null());
                assert_eq!(rows[0]["client_id"], json!(client_id));
            }

            // ==================================================================
            // Update & Delete
            // ==================================================================

            #[tokio::test]
            async fn test_update_merges_columns() {
                let store = $factory;
                let owner = Uuid::new_v4();

                let inserted = store
                    .insert(
                        "clients",
                        row(json!({ "name": "Acme", "phone": "555", "user_id": owner })),
                        &[],
                    )
                    .await
                    .unwrap();
                let id = row_id(&inserted);

                store
                    .update("clients", &id, row(json!({ "name": "Acme Corp" })))
                    .await
                    .unwrap();

                let rows = store
                    .select(&SelectQuery::owned("clients", owner))
                    .await
                    .unwrap();
                assert_eq!(rows[0]["name"], "Acme Corp");
                assert_eq!(rows[0]["phone"], "555");
                assert_eq!(row_id(&rows[0]), id);
            }

            #[tokio::test]
            async fn test_update_absent_id() {
                let store = $factory;
                store
                    .update("clients", &Uuid::new_v4(), row(json!({ "name": "Ghost" })))
                    .await
                    .unwrap();
            }

            #[tokio::test]
            async fn test_delete_removes_row() {
                let store = $factory;
                let owner = Uuid::new_v4();

                let keep = store
                    .insert("clients", row(json!({ "name": "Keep", "user_id": owner })), &[])
                    .await
                    .unwrap();
                let dropped = store
                    .insert("clients", row(json!({ "name": "Drop", "user_id": owner })), &[])
                    .await
                    .unwrap();

                store.delete("clients", &row_id(&dropped)).await.unwrap();

                let rows = store
                    .select(&SelectQuery::owned("clients", owner))
                    .await
                    .unwrap();
                assert_eq!(rows.len(), 1);
                assert_eq!(row_id(&rows[0]), row_id(&keep));
            }

            #[tokio::test]
            async fn test_delete_absent_id() {
                let store = $factory;
                store.delete("clients", &Uuid::new_v4()).await.unwrap();
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_inserts() {
                let store = $factory;
                let owner = Uuid::new_v4();

                let handles: Vec<_> = (0..10)
                    .map(|i| {
                        let store = store.clone();
                        tokio::spawn(async move {
                            store
                                .insert(
                                    "clients",
                                    row(json!({ "name": format!("Client {}", i), "user_id": owner })),
                                    &[],
                                )
                                .await
                        })
                    })
                    .collect();

                for handle in handles {
                    handle.await.unwrap().unwrap();
                }

                let rows = store
                    .select(&SelectQuery::owned("clients", owner))
                    .await
                    .unwrap();
                assert_eq!(rows.len(), 10);
            }
        }
    };
}
