use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[async_trait]
pub trait CategoryRepo: Sync + Send {
    async fn create_category(&self, name: &str) -> Result<Category, CategoryRepoError>;

    async fn get_category(&self, category_id: i32) -> Result<Category, CategoryRepoError>;

    async fn get_all_categories(&self) -> Result<Vec<Category>, CategoryRepoError>;

    async fn rename_category(
        &self,
        category_id: i32,
        name: &str,
    ) -> Result<Category, CategoryRepoError>;

    async fn delete_category(&self, category_id: i32) -> Result<(), CategoryRepoError>;

    /// Sorted, deduplicated subset of `category_ids` that exists in the store.
    async fn find_existing_ids(&self, category_ids: &[i32]) -> Result<Vec<i32>, CategoryRepoError>;
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

impl Category {
    pub const fn new(id: i32, name: String) -> Category {
        Category { id, name }
    }
}

#[derive(Error, Debug)]
pub enum CategoryRepoError {
    #[error("Category with id {0} not found")]
    CategoryNotFound(i32),
    #[error("Category {0} already exists")]
    DuplicateName(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
