mod transaction_utils;
mod utils;

use crate::transaction_utils::generate_new_transaction;
use crate::utils::{create_test_category, create_test_user, repos, Repos};
use fintrack_repo::user_repo::{NewUser, UserRepoError, UserUpdate};
use rstest::rstest;
use uuid::Uuid;

#[rstest]
#[tokio::test]
async fn test_create_and_get_user(repos: Repos) {
    let (user_repo, _category_repo, _transaction_repo) = repos;

    let user = create_test_user(&user_repo).await;

    let stored_user = user_repo.get_user(user.id).await.unwrap();
    assert_eq!(user, stored_user);
}

#[rstest]
#[tokio::test]
async fn test_get_invalid_user(repos: Repos) {
    let (user_repo, _category_repo, _transaction_repo) = repos;

    let result = user_repo.get_user(1234).await;
    assert!(matches!(result, Err(UserRepoError::UserNotFound(1234))));
}

#[rstest]
#[tokio::test]
async fn test_create_duplicate_email(repos: Repos) {
    let (user_repo, _category_repo, _transaction_repo) = repos;

    let user = create_test_user(&user_repo).await;

    let new_user = NewUser::new(
        format!("u-{}", &Uuid::new_v4().simple().to_string()[..12]),
        user.email.clone(),
        "not a real hash".to_owned(),
        None,
    );
    let result = user_repo.create_user(new_user).await;
    assert!(matches!(result, Err(UserRepoError::DuplicateEmail(_))));
}

#[rstest]
#[tokio::test]
async fn test_create_duplicate_username(repos: Repos) {
    let (user_repo, _category_repo, _transaction_repo) = repos;

    let user = create_test_user(&user_repo).await;

    let new_user = NewUser::new(
        user.username.clone(),
        format!("{}@example.com", Uuid::new_v4().simple()),
        "not a real hash".to_owned(),
        None,
    );
    let result = user_repo.create_user(new_user).await;
    assert!(matches!(result, Err(UserRepoError::DuplicateUsername(_))));
}

#[rstest]
#[tokio::test]
async fn test_get_all_users(repos: Repos) {
    let (user_repo, _category_repo, _transaction_repo) = repos;

    let user1 = create_test_user(&user_repo).await;
    let user2 = create_test_user(&user_repo).await;

    let users = user_repo.get_all_users().await.unwrap();
    assert_eq!(users, vec![user1, user2]);
}

#[rstest]
#[tokio::test]
async fn test_update_user(repos: Repos) {
    let (user_repo, _category_repo, _transaction_repo) = repos;

    let user = create_test_user(&user_repo).await;

    let update = UserUpdate {
        about_me: Some("I keep track of every cent".to_owned()),
        password_hash: Some("another fake hash".to_owned()),
        ..UserUpdate::default()
    };
    let updated_user = user_repo.update_user(user.id, update).await.unwrap();
    assert_eq!(updated_user.username, user.username);
    assert_eq!(updated_user.email, user.email);
    assert_eq!(
        updated_user.about_me,
        Some("I keep track of every cent".to_owned())
    );
    assert_eq!(updated_user.password_hash, "another fake hash");

    let stored_user = user_repo.get_user(user.id).await.unwrap();
    assert_eq!(updated_user, stored_user);
}

#[rstest]
#[tokio::test]
async fn test_update_user_duplicate_email(repos: Repos) {
    let (user_repo, _category_repo, _transaction_repo) = repos;

    let user1 = create_test_user(&user_repo).await;
    let user2 = create_test_user(&user_repo).await;

    let update = UserUpdate {
        email: Some(user1.email.clone()),
        ..UserUpdate::default()
    };
    let result = user_repo.update_user(user2.id, update).await;
    assert!(matches!(result, Err(UserRepoError::DuplicateEmail(_))));

    let stored_user = user_repo.get_user(user2.id).await.unwrap();
    assert_eq!(stored_user.email, user2.email);
}

#[rstest]
#[tokio::test]
async fn test_update_invalid_user(repos: Repos) {
    let (user_repo, _category_repo, _transaction_repo) = repos;

    let result = user_repo.update_user(1234, UserUpdate::default()).await;
    assert!(matches!(result, Err(UserRepoError::UserNotFound(1234))));
}

#[rstest]
#[tokio::test]
async fn test_delete_user(repos: Repos) {
    let (user_repo, _category_repo, _transaction_repo) = repos;

    let user = create_test_user(&user_repo).await;
    user_repo.delete_user(user.id).await.unwrap();

    let result = user_repo.get_user(user.id).await;
    assert!(matches!(result, Err(UserRepoError::UserNotFound(_))));
}

#[rstest]
#[tokio::test]
async fn test_delete_invalid_user(repos: Repos) {
    let (user_repo, _category_repo, _transaction_repo) = repos;

    let result = user_repo.delete_user(1234).await;
    assert!(matches!(result, Err(UserRepoError::UserNotFound(1234))));
}

#[rstest]
#[tokio::test]
async fn test_delete_user_cascades_associations(repos: Repos) {
    let (user_repo, category_repo, transaction_repo) = repos;

    let user1 = create_test_user(&user_repo).await;
    let user2 = create_test_user(&user_repo).await;
    let category = create_test_category(&category_repo, "Groceries").await;

    let transaction1 = transaction_repo
        .create_transaction(generate_new_transaction(
            vec![user1.id, user2.id],
            vec![category.id],
        ))
        .await
        .unwrap();
    let transaction2 = transaction_repo
        .create_transaction(generate_new_transaction(
            vec![user1.id, user2.id],
            vec![category.id],
        ))
        .await
        .unwrap();

    user_repo.delete_user(user1.id).await.unwrap();

    // The transactions survive with their other user and categories intact.
    for id in [transaction1.id, transaction2.id] {
        let stored = transaction_repo.get_transaction(id).await.unwrap();
        assert_eq!(stored.user_ids, vec![user2.id]);
        assert_eq!(stored.categories, vec!["Groceries".to_owned()]);
    }
}

#[rstest]
#[tokio::test]
async fn test_find_existing_user_ids(repos: Repos) {
    let (user_repo, _category_repo, _transaction_repo) = repos;

    let user1 = create_test_user(&user_repo).await;
    let user2 = create_test_user(&user_repo).await;

    let existing = user_repo
        .find_existing_ids(&[user2.id, 1234, user1.id, user2.id])
        .await
        .unwrap();
    assert_eq!(existing, vec![user1.id, user2.id]);
}
