use crate::{
    entities::commerce::{tag, Tag, TagModel},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct TagService {
    db: Arc<DatabaseConnection>,
}

impl TagService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_tags(&self) -> Result<Vec<TagModel>, ServiceError> {
        Ok(Tag::find()
            .order_by_asc(tag::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_tag(&self, id: Uuid) -> Result<TagModel, ServiceError> {
        Tag::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tag", id))
    }

    #[instrument(skip(self))]
    pub async fn create_tag(&self, name: String) -> Result<TagModel, ServiceError> {
        let name = normalize_name(name)?;
        self.ensure_unique_name(&name, None).await?;

        let now = Utc::now();
        let tag = tag::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!("Created tag: {} ({})", tag.name, tag.id);
        Ok(tag)
    }

    #[instrument(skip(self))]
    pub async fn update_tag(&self, id: Uuid, name: String) -> Result<TagModel, ServiceError> {
        let name = normalize_name(name)?;
        let existing = self.get_tag(id).await?;
        self.ensure_unique_name(&name, Some(id)).await?;

        let mut active: tag::ActiveModel = existing.into();
        active.name = Set(name);
        active.updated_at = Set(Utc::now());

        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_tag(&self, id: Uuid) -> Result<TagModel, ServiceError> {
        let existing = self.get_tag(id).await?;
        existing.clone().delete(&*self.db).await?;
        info!("Deleted tag: {}", id);
        Ok(existing)
    }

    /// Tag names are unique ignoring case. Compared in Rust since SQLite's
    /// `LOWER` only folds ASCII.
    async fn ensure_unique_name(
        &self,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Tag::find()
            .select_only()
            .column(tag::Column::Name);
        if let Some(id) = exclude_id {
            query = query.filter(tag::Column::Id.ne(id));
        }
        let names: Vec<String> = query.into_tuple().all(&*self.db).await?;

        if names.iter().any(|existing| same_name(existing, name)) {
            return Err(ServiceError::ValidationError(format!(
                "Tag {} already exists",
                name
            )));
        }

        Ok(())
    }
}

fn normalize_name(name: String) -> Result<String, ServiceError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::ValidationError(
            "Tag name cannot be blank".to_string(),
        ));
    }
    Ok(name)
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        assert_eq!(normalize_name("  Sale ".into()).unwrap(), "Sale");
        assert!(normalize_name("   ".into()).is_err());
    }

    #[test]
    fn names_compare_ignoring_unicode_case() {
        assert!(same_name("Summer", "SUMMER"));
        assert!(same_name("Élégant", "élégant"));
        assert!(same_name("ÇAY", "çay"));
        assert!(!same_name("Sale", "Sales"));
    }
}
