use std::sync::Arc;

use models::listing::{self, InsertedRow, Listing, ListingDraft};
use models::profile::{self, Profile, ProfileFields, ProfileRow};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::repository::RestStore;
use crate::auth::domain::Identity;
use crate::errors::ServiceError;

/// Writes and reads rows on behalf of a resolved identity.
pub struct ResourceAdapter {
    store: Arc<dyn RestStore>,
}

impl ResourceAdapter {
    pub fn new(store: Arc<dyn RestStore>) -> Self {
        Self { store }
    }

    /// Insert a listing owned by `identity` and return the store's id for it.
    ///
    /// The seller is always `identity.id`; the draft has no way to name
    /// another one.
    #[instrument(skip(self, identity, draft), fields(seller_id = %identity.id))]
    pub async fn create_listing(&self, identity: &Identity, draft: ListingDraft) -> Result<String, ServiceError> {
        if !self.store.is_configured() {
            return Err(ServiceError::Internal("Data store credentials not configured".into()));
        }

        let row = Listing::owned_by(draft, identity.id.clone());
        let payload = serde_json::to_value([&row]).map_err(|e| {
            warn!(error = %e, "listing encode failed");
            ServiceError::Internal("listing insert failed: unencodable row".into())
        })?;

        let resp = self.store.insert(listing::TABLE, &payload).await?;
        if !resp.is_success() {
            warn!(status = resp.status, "listing insert rejected");
            return Err(ServiceError::Internal(format!("listing insert failed: status={}", resp.status)));
        }

        let inserted: Vec<InsertedRow> = resp.parse().map_err(|e| {
            warn!(error = %e, "listing insert reply unparseable");
            ServiceError::Internal("listing insert failed: invalid response".into())
        })?;
        let id = inserted
            .into_iter()
            .next()
            .and_then(|r| r.id)
            .ok_or_else(|| ServiceError::Internal("listing insert failed: no ID returned".into()))?;

        info!(listing_id = %id, "listing_created");
        Ok(id)
    }

    /// Best-effort profile write. Never fails the caller: problems are
    /// logged and dropped, and a store without credentials is skipped.
    #[instrument(skip(self, identity, fields), fields(user_id = %identity.id))]
    pub async fn store_profile(&self, identity: &Identity, fields: ProfileFields) {
        if identity.id.is_empty() {
            return;
        }
        if !self.store.is_configured() {
            warn!("data store credentials not configured; profile not stored");
            return;
        }
        if let Err(e) = self.try_store_profile(identity, fields).await {
            warn!(error = %e, "failed to store profile");
        }
    }

    async fn try_store_profile(&self, identity: &Identity, fields: ProfileFields) -> Result<(), ServiceError> {
        let row = Profile::new(identity.id.clone(), fields);
        let payload = serde_json::to_value([&row]).map_err(|e| {
            warn!(error = %e, "profile encode failed");
            ServiceError::Internal("profile insert failed: unencodable row".into())
        })?;
        let resp = self.store.insert(profile::TABLE, &payload).await?;
        if !resp.is_success() {
            return Err(ServiceError::Internal(format!(
                "profile insert failed: status={} body={}",
                resp.status, resp.body
            )));
        }
        info!("profile_stored");
        Ok(())
    }

    /// Fetch the profile row keyed by `identity_id`, returned exactly as
    /// stored. Ids are unique, but if several rows come back the first one wins.
    #[instrument(skip(self))]
    pub async fn get_profile(&self, identity_id: &str) -> Result<ProfileRow, ServiceError> {
        if !self.store.is_configured() {
            return Err(ServiceError::Internal("Data store credentials not configured".into()));
        }

        let resp = self.store.select_eq(profile::TABLE, "id", identity_id).await?;
        if !resp.is_success() {
            warn!(status = resp.status, "profile read rejected");
            return Err(ServiceError::Internal(format!("failed to fetch profile: status={}", resp.status)));
        }

        let rows: Vec<Value> = resp.parse().map_err(|e| {
            warn!(error = %e, "profile reply unparseable");
            ServiceError::Internal("failed to fetch profile".into())
        })?;
        let first = rows
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound("Profile not found".into()))?;
        serde_json::from_value(first).map_err(|e| {
            warn!(error = %e, "profile row is not an object");
            ServiceError::Internal("failed to fetch profile".into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::repository::mock::MockRestStore;
    use crate::upstream::UpstreamResponse;
    use chrono::DateTime;
    use serde_json::json;

    fn me() -> Identity {
        Identity { id: "user-1".into(), email: "a@x.com".into() }
    }

    fn draft() -> ListingDraft {
        ListingDraft {
            title: "Lamp".into(),
            description: "Brass".into(),
            category: "home".into(),
            images: vec!["https://img/lamp.jpg".into()],
            starting_bid: 25.into(),
            buy_now_price: Some(60.into()),
            auction_end_time: DateTime::parse_from_rfc3339("2030-01-01T10:00:00Z").unwrap(),
            location: "Bergen".into(),
        }
    }

    fn fields() -> ProfileFields {
        ProfileFields {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            mobile: "123".into(),
            email: "a@x.com".into(),
        }
    }

    #[tokio::test]
    async fn create_listing_returns_generated_id_and_forces_seller() {
        let store = Arc::new(MockRestStore::new());
        let adapter = ResourceAdapter::new(store.clone());

        let id = adapter.create_listing(&me(), draft()).await.unwrap();
        let rows = store.rows("listings");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!(id));
        assert_eq!(rows[0]["seller_id"], "user-1");
        let stored_end = rows[0]["auction_end_time"].as_str().unwrap();
        assert_eq!(DateTime::parse_from_rfc3339(stored_end).unwrap(), draft().auction_end_time);
    }

    #[tokio::test]
    async fn create_listing_without_echoed_id_fails() {
        let store = Arc::new(MockRestStore::new());
        store.set_echo_ids(false);
        let err = ResourceAdapter::new(store).create_listing(&me(), draft()).await.unwrap_err();
        assert_eq!(err, ServiceError::Internal("listing insert failed: no ID returned".into()));
    }

    #[tokio::test]
    async fn create_listing_requires_credentials() {
        let store = Arc::new(MockRestStore::unconfigured());
        let err = ResourceAdapter::new(store.clone()).create_listing(&me(), draft()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test]
    async fn create_listing_store_failure_is_internal() {
        let store = Arc::new(MockRestStore::new());
        store.set_failing(true);
        let err = ResourceAdapter::new(store).create_listing(&me(), draft()).await.unwrap_err();
        assert_eq!(err, ServiceError::Internal("listing insert failed: status=500".into()));
    }

    #[tokio::test]
    async fn store_profile_is_best_effort() {
        let store = Arc::new(MockRestStore::new());
        let adapter = ResourceAdapter::new(store.clone());

        adapter.store_profile(&me(), fields()).await;
        // duplicate id: the store refuses, the caller never notices
        adapter.store_profile(&me(), fields()).await;
        assert_eq!(store.rows("profiles").len(), 1);
        assert_eq!(store.insert_calls(), 2);

        store.set_failing(true);
        adapter.store_profile(&me(), fields()).await;
    }

    #[tokio::test]
    async fn store_profile_skips_without_credentials_or_id() {
        let store = Arc::new(MockRestStore::unconfigured());
        ResourceAdapter::new(store.clone()).store_profile(&me(), fields()).await;
        assert_eq!(store.insert_calls(), 0);

        let store = Arc::new(MockRestStore::new());
        ResourceAdapter::new(store.clone()).store_profile(&Identity::default(), fields()).await;
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test]
    async fn get_profile_reads_first_row() {
        let store = Arc::new(MockRestStore::new());
        store.seed("profiles", json!({"id": "user-1", "first_name": "Ada", "bio": "math"}));
        store.seed("profiles", json!({"id": "user-2", "first_name": "Bob"}));
        let profile = ResourceAdapter::new(store).get_profile("user-1").await.unwrap();
        assert_eq!(profile.get("first_name"), Some(&json!("Ada")));
        assert_eq!(profile.get("bio"), Some(&json!("math")));
    }

    #[tokio::test]
    async fn get_profile_keeps_column_types_and_gaps() {
        let store = Arc::new(MockRestStore::new());
        store.seed("profiles", json!({"id": "user-1", "first_name": "Ada", "mobile": 5551234}));
        store.seed("profiles", json!({"id": "user-2", "display_name": "Bob"}));
        let adapter = ResourceAdapter::new(store);

        let numeric = adapter.get_profile("user-1").await.unwrap();
        assert_eq!(
            serde_json::to_value(&numeric).unwrap(),
            json!({"id": "user-1", "first_name": "Ada", "mobile": 5551234})
        );

        let sparse = adapter.get_profile("user-2").await.unwrap();
        assert_eq!(sparse.into_inner().len(), 2);
    }

    /// Store that answers every call with the same raw reply.
    struct Canned(UpstreamResponse);

    #[async_trait::async_trait]
    impl RestStore for Canned {
        fn is_configured(&self) -> bool {
            true
        }
        async fn insert(&self, _table: &str, _rows: &Value) -> Result<UpstreamResponse, ServiceError> {
            Ok(self.0.clone())
        }
        async fn select_eq(&self, _table: &str, _column: &str, _value: &str) -> Result<UpstreamResponse, ServiceError> {
            Ok(self.0.clone())
        }
    }

    fn canned(status: u16, body: &str) -> ResourceAdapter {
        ResourceAdapter::new(Arc::new(Canned(UpstreamResponse::new(status, body))))
    }

    #[tokio::test]
    async fn unparseable_store_replies_use_fixed_messages() {
        let fetch = ServiceError::Internal("failed to fetch profile".into());
        assert_eq!(canned(200, "not json").get_profile("u").await.unwrap_err(), fetch);
        assert_eq!(canned(200, r#"[["u"]]"#).get_profile("u").await.unwrap_err(), fetch);
        assert_eq!(canned(200, r#"[42]"#).get_profile("u").await.unwrap_err(), fetch);

        let err = canned(201, "<html>").create_listing(&me(), draft()).await.unwrap_err();
        assert_eq!(err, ServiceError::Internal("listing insert failed: invalid response".into()));
    }
}
