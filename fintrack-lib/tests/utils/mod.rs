use fintrack_lib::report::ReportService;
use fintrack_lib::transaction::{TransactionRequest, TransactionService};
use fintrack_repo::category_repo::{Category, CategoryRepo};
use fintrack_repo::transaction_repo::TransactionRepo;
use fintrack_repo::user_repo::{NewUser, User, UserRepo};
use rstest::fixture;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, Level};
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestContext {
    pub user_repo: Arc<dyn UserRepo>,
    pub category_repo: Arc<dyn CategoryRepo>,
    pub transaction_repo: Arc<dyn TransactionRepo>,
    pub transactions: TransactionService,
    pub reports: ReportService,
}

#[fixture]
pub fn context() -> TestContext {
    let (user_repo, category_repo, transaction_repo) = fintrack_repo::mem_repo::create_repos();
    let transactions = TransactionService::new(
        transaction_repo.clone(),
        user_repo.clone(),
        category_repo.clone(),
    );
    let reports = ReportService::new(transaction_repo.clone(), user_repo.clone());
    TestContext {
        user_repo,
        category_repo,
        transaction_repo,
        transactions,
        reports,
    }
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[allow(dead_code)]
pub async fn create_user(context: &TestContext) -> User {
    let tag = Uuid::new_v4().simple().to_string();
    let new_user = NewUser::new(
        format!("u-{}", &tag[..12]),
        format!("{}@example.com", tag),
        "not a real hash".to_owned(),
        None,
    );
    context.user_repo.create_user(new_user).await.unwrap()
}

#[allow(dead_code)]
pub async fn create_category(context: &TestContext, name: &str) -> Category {
    context.category_repo.create_category(name).await.unwrap()
}

#[allow(dead_code)]
pub fn transaction_request(
    amount: i64,
    transaction_type: &str,
    date: Option<&str>,
    user_ids: Vec<i32>,
    category_ids: Vec<i32>,
) -> TransactionRequest {
    TransactionRequest {
        amount: Decimal::from(amount),
        transaction_type: transaction_type.to_owned(),
        description: None,
        date: date.map(str::to_owned),
        user_ids,
        category_ids,
    }
}
