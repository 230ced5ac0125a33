use super::{associations, MemStore};
use crate::user_repo::UserRepoError::{DuplicateEmail, DuplicateUsername, UserNotFound};
use crate::user_repo::{NewUser, User, UserRepo, UserRepoError, UserUpdate};
use async_trait::async_trait;
use std::collections::BTreeSet;

#[async_trait]
impl UserRepo for MemStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let mut state = self.write_lock()?;

        if state.users.values().any(|u| u.email == new_user.email) {
            return Err(DuplicateEmail(new_user.email));
        }
        if state.users.values().any(|u| u.username == new_user.username) {
            return Err(DuplicateUsername(new_user.username));
        }

        let id = state.next_user_id;
        state.next_user_id += 1;

        let user = new_user.to_user(id);
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: i32) -> Result<User, UserRepoError> {
        let state = self.read_lock()?;

        state
            .users
            .get(&user_id)
            .cloned()
            .ok_or(UserNotFound(user_id))
    }

    async fn get_all_users(&self) -> Result<Vec<User>, UserRepoError> {
        let state = self.read_lock()?;

        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn update_user(&self, user_id: i32, update: UserUpdate) -> Result<User, UserRepoError> {
        let mut state = self.write_lock()?;

        if !state.users.contains_key(&user_id) {
            return Err(UserNotFound(user_id));
        }

        if let Some(email) = &update.email {
            if state
                .users
                .values()
                .any(|u| u.id != user_id && &u.email == email)
            {
                return Err(DuplicateEmail(email.clone()));
            }
        }
        if let Some(username) = &update.username {
            if state
                .users
                .values()
                .any(|u| u.id != user_id && &u.username == username)
            {
                return Err(DuplicateUsername(username.clone()));
            }
        }

        let user = state
            .users
            .get_mut(&user_id)
            .expect("presence checked above");
        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(about_me) = update.about_me {
            user.about_me = Some(about_me);
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: i32) -> Result<(), UserRepoError> {
        let mut state = self.write_lock()?;

        if state.users.remove(&user_id).is_none() {
            return Err(UserNotFound(user_id));
        }
        associations::unlink_user(&mut state, user_id);
        Ok(())
    }

    async fn find_existing_ids(&self, user_ids: &[i32]) -> Result<Vec<i32>, UserRepoError> {
        let state = self.read_lock()?;

        let existing: BTreeSet<i32> = user_ids
            .iter()
            .filter(|id| state.users.contains_key(id))
            .copied()
            .collect();
        Ok(existing.into_iter().collect())
    }
}
