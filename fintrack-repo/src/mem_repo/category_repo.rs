use super::{associations, MemStore};
use crate::category_repo::CategoryRepoError::{CategoryNotFound, DuplicateName};
use crate::category_repo::{Category, CategoryRepo, CategoryRepoError};
use async_trait::async_trait;
use std::collections::BTreeSet;

#[async_trait]
impl CategoryRepo for MemStore {
    async fn create_category(&self, name: &str) -> Result<Category, CategoryRepoError> {
        let mut state = self.write_lock()?;

        if state.categories.values().any(|c| c.name == name) {
            return Err(DuplicateName(name.to_owned()));
        }

        let id = state.next_category_id;
        state.next_category_id += 1;

        let category = Category::new(id, name.to_owned());
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, category_id: i32) -> Result<Category, CategoryRepoError> {
        let state = self.read_lock()?;

        state
            .categories
            .get(&category_id)
            .cloned()
            .ok_or(CategoryNotFound(category_id))
    }

    async fn get_all_categories(&self) -> Result<Vec<Category>, CategoryRepoError> {
        let state = self.read_lock()?;

        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn rename_category(
        &self,
        category_id: i32,
        name: &str,
    ) -> Result<Category, CategoryRepoError> {
        let mut state = self.write_lock()?;

        if !state.categories.contains_key(&category_id) {
            return Err(CategoryNotFound(category_id));
        }
        if state
            .categories
            .values()
            .any(|c| c.id != category_id && c.name == name)
        {
            return Err(DuplicateName(name.to_owned()));
        }

        let category = state
            .categories
            .get_mut(&category_id)
            .expect("presence checked above");
        category.name = name.to_owned();
        Ok(category.clone())
    }

    async fn delete_category(&self, category_id: i32) -> Result<(), CategoryRepoError> {
        let mut state = self.write_lock()?;

        if state.categories.remove(&category_id).is_none() {
            return Err(CategoryNotFound(category_id));
        }
        associations::unlink_category(&mut state, category_id);
        Ok(())
    }

    async fn find_existing_ids(&self, category_ids: &[i32]) -> Result<Vec<i32>, CategoryRepoError> {
        let state = self.read_lock()?;

        let existing: BTreeSet<i32> = category_ids
            .iter()
            .filter(|id| state.categories.contains_key(id))
            .copied()
            .collect();
        Ok(existing.into_iter().collect())
    }
}
