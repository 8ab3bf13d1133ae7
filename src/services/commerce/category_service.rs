use crate::{
    entities::commerce::{category, Category, CategoryModel, Gender},
    errors::ServiceError,
    services::media::{delete_assets, MediaHost},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Category management for the storefront catalog
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
    media: Arc<dyn MediaHost>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>, media: Arc<dyn MediaHost>) -> Self {
        Self { db, media }
    }

    /// Lists categories, optionally for a single gender
    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        gender: Option<Gender>,
    ) -> Result<Vec<CategoryModel>, ServiceError> {
        let mut query = Category::find();
        if let Some(gender) = gender {
            query = query.filter(category::Column::Gender.eq(gender));
        }

        Ok(query
            .order_by_asc(category::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: Uuid) -> Result<CategoryModel, ServiceError> {
        Category::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Category", id))
    }

    /// Ids of every category merchandised for one of `genders`
    #[instrument(skip(self))]
    pub async fn category_ids_for_genders(
        &self,
        genders: &[Gender],
    ) -> Result<Vec<Uuid>, ServiceError> {
        Ok(Category::find()
            .select_only()
            .column(category::Column::Id)
            .filter(category::Column::Gender.is_in(genders.iter().copied()))
            .into_tuple::<Uuid>()
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        let now = Utc::now();
        let category = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            image_url: Set(input.image_url),
            gender: Set(input.gender),
            image_public_id: Set(input.image_public_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!("Created category: {}", category.id);
        Ok(category)
    }

    /// Applies the provided fields. A replaced image is removed from the media host.
    #[instrument(skip(self))]
    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        let existing = self.get_category(id).await?;
        let stale_image = match (&existing.image_public_id, &input.image_public_id) {
            (Some(old), Some(new)) if old != new => Some(old.clone()),
            _ => None,
        };

        let mut active: category::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(gender) = input.gender {
            active.gender = Set(gender);
        }
        if let Some(public_id) = input.image_public_id {
            active.image_public_id = Set(Some(public_id));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;

        if let Some(public_id) = stale_image {
            delete_assets(self.media.as_ref(), vec![public_id]).await;
        }

        info!("Updated category: {}", id);
        Ok(updated)
    }

    /// Deletes the category. Its products are left untouched.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: Uuid) -> Result<CategoryModel, ServiceError> {
        let existing = self.get_category(id).await?;
        existing.clone().delete(&*self.db).await?;

        if let Some(public_id) = existing.image_public_id.clone() {
            delete_assets(self.media.as_ref(), vec![public_id]).await;
        }

        info!("Deleted category: {}", id);
        Ok(existing)
    }
}

#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    pub name: String,
    pub image_url: String,
    pub gender: Gender,
    pub image_public_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub gender: Option<Gender>,
    pub image_public_id: Option<String>,
}
