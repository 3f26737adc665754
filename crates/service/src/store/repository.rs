use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ServiceError;
use crate::upstream::UpstreamResponse;

/// Authenticated REST access to the data store's tables.
///
/// `insert` takes a JSON array of rows and the reply echoes the stored rows
/// (including generated ids). `select_eq` returns a JSON array of matching
/// rows.
#[async_trait]
pub trait RestStore: Send + Sync {
    /// Whether a credential is available at all. Without one, writes are
    /// skipped (best-effort) or refused (must-succeed).
    fn is_configured(&self) -> bool;
    async fn insert(&self, table: &str, rows: &Value) -> Result<UpstreamResponse, ServiceError>;
    async fn select_eq(&self, table: &str, column: &str, value: &str) -> Result<UpstreamResponse, ServiceError>;
}

/// Simple in-memory store for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Mutex, PoisonError};

    use serde_json::json;
    use uuid::Uuid;

    pub struct MockRestStore {
        tables: Mutex<HashMap<String, Vec<Value>>>, // key: table name
        configured: bool,
        failing: AtomicBool,
        echo_ids: AtomicBool,
        inserts: AtomicUsize,
        selects: AtomicUsize,
    }

    impl Default for MockRestStore {
        fn default() -> Self {
            Self {
                tables: Mutex::new(HashMap::new()),
                configured: true,
                failing: AtomicBool::new(false),
                echo_ids: AtomicBool::new(true),
                inserts: AtomicUsize::new(0),
                selects: AtomicUsize::new(0),
            }
        }
    }

    impl MockRestStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// A store with no credential configured.
        pub fn unconfigured() -> Self {
            Self { configured: false, ..Self::default() }
        }

        /// Every call answers 500.
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// When off, inserts echo rows without their id.
        pub fn set_echo_ids(&self, echo: bool) {
            self.echo_ids.store(echo, Ordering::SeqCst);
        }

        pub fn seed(&self, table: &str, row: Value) {
            self.tables
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(table.to_string())
                .or_default()
                .push(row);
        }

        pub fn rows(&self, table: &str) -> Vec<Value> {
            self.tables
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(table)
                .cloned()
                .unwrap_or_default()
        }

        pub fn insert_calls(&self) -> usize {
            self.inserts.load(Ordering::SeqCst)
        }

        pub fn select_calls(&self) -> usize {
            self.selects.load(Ordering::SeqCst)
        }

        fn failure() -> UpstreamResponse {
            UpstreamResponse::json_body(500, &json!({"message": "mock store failure"}))
        }
    }

    #[async_trait]
    impl RestStore for MockRestStore {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn insert(&self, table: &str, rows: &Value) -> Result<UpstreamResponse, ServiceError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Ok(Self::failure());
            }
            let Some(rows) = rows.as_array() else {
                return Ok(UpstreamResponse::json_body(400, &json!({"message": "expected an array"})));
            };

            let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
            let stored = tables.entry(table.to_string()).or_default();
            let mut echoed = Vec::with_capacity(rows.len());
            for row in rows {
                let mut row = row.clone();
                if let Some(obj) = row.as_object_mut() {
                    if let Some(id) = obj.get("id") {
                        if stored.iter().any(|r| r.get("id") == Some(id)) {
                            return Ok(UpstreamResponse::json_body(
                                409,
                                &json!({"code": "23505", "message": "duplicate key value violates unique constraint"}),
                            ));
                        }
                    } else {
                        obj.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
                    }
                }
                stored.push(row.clone());
                if !self.echo_ids.load(Ordering::SeqCst) {
                    if let Some(obj) = row.as_object_mut() {
                        obj.remove("id");
                    }
                }
                echoed.push(row);
            }
            Ok(UpstreamResponse::json_body(201, &Value::Array(echoed)))
        }

        async fn select_eq(&self, table: &str, column: &str, value: &str) -> Result<UpstreamResponse, ServiceError> {
            self.selects.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Ok(Self::failure());
            }
            let matching: Vec<Value> = self
                .rows(table)
                .into_iter()
                .filter(|r| r.get(column).and_then(Value::as_str) == Some(value))
                .collect();
            Ok(UpstreamResponse::json_body(200, &Value::Array(matching)))
        }
    }
}
