use crate::{
    entities::commerce::{header, Header, HeaderModel},
    errors::ServiceError,
    services::media::{delete_assets, MediaHost},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Storefront header banners
#[derive(Clone)]
pub struct HeaderService {
    db: Arc<DatabaseConnection>,
    media: Arc<dyn MediaHost>,
}

impl HeaderService {
    pub fn new(db: Arc<DatabaseConnection>, media: Arc<dyn MediaHost>) -> Self {
        Self { db, media }
    }

    #[instrument(skip(self))]
    pub async fn list_headers(&self) -> Result<Vec<HeaderModel>, ServiceError> {
        Ok(Header::find()
            .order_by_asc(header::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_header(&self, id: Uuid) -> Result<HeaderModel, ServiceError> {
        Header::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Header", id))
    }

    #[instrument(skip(self))]
    pub async fn create_header(&self, input: CreateHeaderInput) -> Result<HeaderModel, ServiceError> {
        let now = Utc::now();
        let header = header::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            image_url: Set(input.image_url),
            tag: Set(input.tag),
            image_public_id: Set(input.image_public_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!("Created header: {}", header.id);
        Ok(header)
    }

    #[instrument(skip(self))]
    pub async fn update_header(
        &self,
        id: Uuid,
        input: UpdateHeaderInput,
    ) -> Result<HeaderModel, ServiceError> {
        let existing = self.get_header(id).await?;
        let stale_image = match (&existing.image_public_id, &input.image_public_id) {
            (Some(old), Some(new)) if old != new => Some(old.clone()),
            _ => None,
        };

        let mut active: header::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(tag) = input.tag {
            active.tag = Set(tag);
        }
        if let Some(public_id) = input.image_public_id {
            active.image_public_id = Set(Some(public_id));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;

        if let Some(public_id) = stale_image {
            delete_assets(self.media.as_ref(), vec![public_id]).await;
        }

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_header(&self, id: Uuid) -> Result<HeaderModel, ServiceError> {
        let existing = self.get_header(id).await?;
        existing.clone().delete(&*self.db).await?;

        if let Some(public_id) = existing.image_public_id.clone() {
            delete_assets(self.media.as_ref(), vec![public_id]).await;
        }

        info!("Deleted header: {}", id);
        Ok(existing)
    }
}

#[derive(Debug, Clone)]
pub struct CreateHeaderInput {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub tag: String,
    pub image_public_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateHeaderInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub tag: Option<String>,
    pub image_public_id: Option<String>,
}
