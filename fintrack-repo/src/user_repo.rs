use async_trait::async_trait;
use thiserror::Error;

#[async_trait]
pub trait UserRepo: Sync + Send {
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError>;

    async fn get_user(&self, user_id: i32) -> Result<User, UserRepoError>;

    async fn get_all_users(&self) -> Result<Vec<User>, UserRepoError>;

    async fn update_user(&self, user_id: i32, update: UserUpdate) -> Result<User, UserRepoError>;

    async fn delete_user(&self, user_id: i32) -> Result<(), UserRepoError>;

    /// Sorted, deduplicated subset of `user_ids` that exists in the store.
    async fn find_existing_ids(&self, user_ids: &[i32]) -> Result<Vec<i32>, UserRepoError>;
}

#[derive(Clone, PartialEq, Debug)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub about_me: Option<String>,
}

impl User {
    pub const fn new(
        id: i32,
        username: String,
        email: String,
        password_hash: String,
        about_me: Option<String>,
    ) -> User {
        User {
            id,
            username,
            email,
            password_hash,
            about_me,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub about_me: Option<String>,
}

impl NewUser {
    pub const fn new(
        username: String,
        email: String,
        password_hash: String,
        about_me: Option<String>,
    ) -> NewUser {
        NewUser {
            username,
            email,
            password_hash,
            about_me,
        }
    }

    pub fn to_user(self, id: i32) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            about_me: self.about_me,
        }
    }
}

/// Field presence is the update signal; `None` leaves the stored value as is.
#[derive(Clone, Debug, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub about_me: Option<String>,
}

#[derive(Error, Debug)]
pub enum UserRepoError {
    #[error("User with id {0} not found")]
    UserNotFound(i32),
    #[error("Email {0} is already in use")]
    DuplicateEmail(String),
    #[error("Username {0} is already in use")]
    DuplicateUsername(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
