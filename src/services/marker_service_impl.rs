use chrono::Utc;
use tracing::debug;

use crate::db::{Store, User};
use crate::services::marker_service::{
    MarkerError, MarkerService, MarkerView, NewMarker, UNKNOWN_CREATOR,
};

/// `MarkerService` backed by the sea-orm store.
pub struct SeaOrmMarkerService {
    store: Store,
}

impl SeaOrmMarkerService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl MarkerService for SeaOrmMarkerService {
    async fn list_markers(&self) -> Result<Vec<MarkerView>, MarkerError> {
        let rows = self.store.list_markers_with_creators().await?;

        Ok(rows
            .into_iter()
            .map(|(marker, creator)| MarkerView {
                id: marker.id,
                lat: marker.lat,
                lon: marker.lon,
                kind: marker.kind,
                label: marker.label,
                description: marker.description,
                created_at: marker.created_at,
                created_by: creator.map_or_else(|| UNKNOWN_CREATOR.to_string(), |u| u.username),
            })
            .collect())
    }

    async fn create_marker(&self, creator: &User, marker: NewMarker) -> Result<i32, MarkerError> {
        let created_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let id = self
            .store
            .insert_marker(
                marker.lat,
                marker.lon,
                &marker.kind,
                &marker.label,
                marker.description.as_deref(),
                creator.id,
                &created_at,
            )
            .await?;

        debug!("Marker {id} ('{}') added by '{}'", marker.label, creator.username);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::user::hash_password;

    async fn store_with_user(username: &str) -> (Store, User) {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("in-memory store");

        let hash = hash_password("pw", None).unwrap();
        let user = store.insert_user(username, &hash, false, true).await.unwrap();

        (store, user)
    }

    fn marker(kind: &str, label: &str, description: Option<&str>) -> NewMarker {
        NewMarker {
            lat: 50.4501,
            lon: 30.5234,
            kind: kind.to_string(),
            label: label.to_string(),
            description: description.map(ToString::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_resolves_creator() {
        let (store, user) = store_with_user("bob").await;
        let service = SeaOrmMarkerService::new(store);

        service
            .create_marker(&user, marker("enemy", "Tank", Some("T-90 platoon")))
            .await
            .unwrap();
        service
            .create_marker(&user, marker("ally", "OP-1", None))
            .await
            .unwrap();

        let markers = service.list_markers().await.unwrap();
        assert_eq!(markers.len(), 2);

        // Insertion order
        assert_eq!(markers[0].label, "Tank");
        assert_eq!(markers[0].kind, "enemy");
        assert_eq!(markers[0].created_by, "bob");
        assert_eq!(markers[0].description.as_deref(), Some("T-90 platoon"));

        // Absent description stays absent
        assert_eq!(markers[1].description, None);
    }

    #[tokio::test]
    async fn test_timestamp_format() {
        let (store, user) = store_with_user("bob").await;
        let service = SeaOrmMarkerService::new(store);

        service
            .create_marker(&user, marker("target", "Bridge", None))
            .await
            .unwrap();

        let markers = service.list_markers().await.unwrap();
        let parsed = chrono::NaiveDateTime::parse_from_str(
            &markers[0].created_at,
            "%Y-%m-%d %H:%M:%S",
        );
        assert!(parsed.is_ok(), "unexpected timestamp: {}", markers[0].created_at);
    }

    #[tokio::test]
    async fn test_arbitrary_kind_is_stored_verbatim() {
        let (store, user) = store_with_user("bob").await;
        let service = SeaOrmMarkerService::new(store);

        // The kind set is open-ended; nothing is validated
        service
            .create_marker(&user, marker("recon-drone", "UAV", None))
            .await
            .unwrap();

        let markers = service.list_markers().await.unwrap();
        assert_eq!(markers[0].kind, "recon-drone");
    }
}
