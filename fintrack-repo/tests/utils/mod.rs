use fintrack_repo::category_repo::{Category, CategoryRepo};
use fintrack_repo::transaction_repo::TransactionRepo;
use fintrack_repo::user_repo::{NewUser, User, UserRepo};
use rstest::fixture;
use std::sync::Arc;
use uuid::Uuid;

pub type Repos = (
    Arc<dyn UserRepo>,
    Arc<dyn CategoryRepo>,
    Arc<dyn TransactionRepo>,
);

#[fixture]
pub fn repos() -> Repos {
    fintrack_repo::mem_repo::create_repos()
}

#[allow(dead_code)]
pub async fn create_test_user(user_repo: &Arc<dyn UserRepo>) -> User {
    let tag = Uuid::new_v4().simple().to_string();
    let new_user = NewUser::new(
        format!("u-{}", &tag[..12]),
        format!("{}@example.com", tag),
        "not a real hash".to_owned(),
        None,
    );
    user_repo.create_user(new_user).await.unwrap()
}

#[allow(dead_code)]
pub async fn create_test_category(category_repo: &Arc<dyn CategoryRepo>, name: &str) -> Category {
    category_repo.create_category(name).await.unwrap()
}
