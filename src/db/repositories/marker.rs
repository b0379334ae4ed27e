use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::entities::{markers, users};

pub struct MarkerRepository {
    conn: DatabaseConnection,
}

impl MarkerRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a marker owned by `created_by`. Values are stored verbatim,
    /// no range or length validation.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        lat: f64,
        lon: f64,
        kind: &str,
        label: &str,
        description: Option<&str>,
        created_by: i32,
        created_at: &str,
    ) -> Result<i32> {
        let active = markers::ActiveModel {
            lat: Set(lat),
            lon: Set(lon),
            kind: Set(kind.to_string()),
            label: Set(label.to_string()),
            description: Set(description.map(ToString::to_string)),
            created_at: Set(created_at.to_string()),
            created_by: Set(created_by),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert marker")?;

        Ok(model.id)
    }

    /// All markers in insertion order, each joined with its creator row.
    /// The creator side is `None` when the referenced user no longer exists.
    pub async fn list_with_creators(&self) -> Result<Vec<(markers::Model, Option<users::Model>)>> {
        let rows = markers::Entity::find()
            .find_also_related(users::Entity)
            .order_by_asc(markers::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query markers")?;

        Ok(rows)
    }
}
