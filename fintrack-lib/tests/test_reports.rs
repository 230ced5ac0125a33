mod utils;

use crate::utils::{
    context, create_category, create_user, tracing_setup, transaction_request, TestContext,
};
use chrono::NaiveDate;
use fintrack_lib::report::ReportError;
use fintrack_repo::transaction_repo::{CategoryTotal, DailyTotal};
use rstest::rstest;
use rust_decimal::Decimal;

#[rstest]
#[tokio::test]
async fn test_monthly_by_category_counts_full_amount_per_category(
    _tracing_setup: &(),
    context: TestContext,
) {
    let user = create_user(&context).await;
    let food = create_category(&context, "food").await;
    let travel = create_category(&context, "travel").await;

    let request = transaction_request(
        100,
        "expense",
        Some("2025-02-15 10:00:00"),
        vec![user.id],
        vec![food.id, travel.id],
    );
    context.transactions.create(request).await.unwrap();

    let totals = context
        .reports
        .monthly_by_category(user.id, "2025-02", None, None)
        .await
        .unwrap();

    // One row per category, each with the full amount.
    assert_eq!(
        totals,
        vec![
            CategoryTotal::new("food".to_owned(), Decimal::from(100)),
            CategoryTotal::new("travel".to_owned(), Decimal::from(100)),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn test_monthly_by_category_excludes_next_month_boundary(
    _tracing_setup: &(),
    context: TestContext,
) {
    let user = create_user(&context).await;
    let food = create_category(&context, "food").await;

    let request = transaction_request(
        100,
        "expense",
        Some("2025-03-01 00:00:00"),
        vec![user.id],
        vec![food.id],
    );
    context.transactions.create(request).await.unwrap();

    let totals = context
        .reports
        .monthly_by_category(user.id, "2025-02", None, None)
        .await
        .unwrap();
    assert!(totals.is_empty());

    let totals = context
        .reports
        .monthly_by_category(user.id, "2025-03", None, None)
        .await
        .unwrap();
    assert_eq!(
        totals,
        vec![CategoryTotal::new("food".to_owned(), Decimal::from(100))]
    );
}

#[rstest]
#[tokio::test]
async fn test_monthly_by_category_filters(_tracing_setup: &(), context: TestContext) {
    let user = create_user(&context).await;
    let food = create_category(&context, "food").await;
    let salary = create_category(&context, "salary").await;

    let request = transaction_request(
        80,
        "expense",
        Some("2025-02-10 09:00:00"),
        vec![user.id],
        vec![food.id],
    );
    context.transactions.create(request).await.unwrap();
    let request = transaction_request(
        2500,
        "revenue",
        Some("2025-02-25 09:00:00"),
        vec![user.id],
        vec![salary.id],
    );
    context.transactions.create(request).await.unwrap();

    let totals = context
        .reports
        .monthly_by_category(user.id, "2025-02", Some("revenue"), None)
        .await
        .unwrap();
    assert_eq!(
        totals,
        vec![CategoryTotal::new("salary".to_owned(), Decimal::from(2500))]
    );

    let totals = context
        .reports
        .monthly_by_category(user.id, "2025-02", None, Some("food"))
        .await
        .unwrap();
    assert_eq!(
        totals,
        vec![CategoryTotal::new("food".to_owned(), Decimal::from(80))]
    );
}

#[rstest]
#[tokio::test]
async fn test_monthly_by_category_invalid_inputs(_tracing_setup: &(), context: TestContext) {
    let user = create_user(&context).await;

    let result = context
        .reports
        .monthly_by_category(user.id, "Feb-2025", None, None)
        .await;
    assert!(matches!(result, Err(ReportError::InvalidMonthFormat(_))));

    let result = context
        .reports
        .monthly_by_category(user.id, "2025-02", Some("transfer"), None)
        .await;
    assert!(matches!(result, Err(ReportError::InvalidType(_))));
}

#[rstest]
#[tokio::test]
async fn test_daily_range_groups_and_orders_by_date(_tracing_setup: &(), context: TestContext) {
    let user = create_user(&context).await;
    let food = create_category(&context, "food").await;

    for (amount, date) in [
        (10, "2025-02-11 09:00:00"),
        (15, "2025-02-11 21:30:00"),
        (20, "2025-02-02 12:00:00"),
    ] {
        let request =
            transaction_request(amount, "expense", Some(date), vec![user.id], vec![food.id]);
        context.transactions.create(request).await.unwrap();
    }
    // Different type stays out of the report.
    let request = transaction_request(
        500,
        "revenue",
        Some("2025-02-11 10:00:00"),
        vec![user.id],
        vec![food.id],
    );
    context.transactions.create(request).await.unwrap();

    let totals = context
        .reports
        .daily_range(user.id, "expense", Some("2025-02-01"), Some("2025-02-28"))
        .await
        .unwrap();

    assert_eq!(
        totals,
        vec![
            DailyTotal::new(
                NaiveDate::from_ymd_opt(2025, 2, 2).unwrap(),
                Decimal::from(20)
            ),
            DailyTotal::new(
                NaiveDate::from_ymd_opt(2025, 2, 11).unwrap(),
                Decimal::from(25)
            ),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn test_daily_range_includes_whole_end_day(_tracing_setup: &(), context: TestContext) {
    let user = create_user(&context).await;
    let food = create_category(&context, "food").await;

    let request = transaction_request(
        30,
        "expense",
        Some("2025-02-28 23:59:59"),
        vec![user.id],
        vec![food.id],
    );
    context.transactions.create(request).await.unwrap();

    let totals = context
        .reports
        .daily_range(user.id, "expense", Some("2025-02-01"), Some("2025-02-28"))
        .await
        .unwrap();
    assert_eq!(
        totals,
        vec![DailyTotal::new(
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
            Decimal::from(30)
        )]
    );
}

#[rstest]
#[tokio::test]
async fn test_daily_range_empty_is_not_an_error(_tracing_setup: &(), context: TestContext) {
    let user = create_user(&context).await;

    let totals = context
        .reports
        .daily_range(user.id, "expense", Some("2025-02-01"), Some("2025-02-28"))
        .await
        .unwrap();
    assert!(totals.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_daily_range_defaults_to_current_month(_tracing_setup: &(), context: TestContext) {
    let user = create_user(&context).await;
    let food = create_category(&context, "food").await;

    // Dated now, so it falls inside the default month-to-date window.
    let request = transaction_request(45, "expense", None, vec![user.id], vec![food.id]);
    context.transactions.create(request).await.unwrap();

    let totals = context
        .reports
        .daily_range(user.id, "expense", None, None)
        .await
        .unwrap();
    let sum: Decimal = totals.iter().map(|t| t.total).sum();
    assert_eq!(sum, Decimal::from(45));
}

#[rstest]
#[tokio::test]
async fn test_daily_range_invalid_inputs(_tracing_setup: &(), context: TestContext) {
    let user = create_user(&context).await;

    let result = context
        .reports
        .daily_range(user.id, "transfer", None, None)
        .await;
    assert!(matches!(result, Err(ReportError::InvalidType(_))));

    let result = context
        .reports
        .daily_range(user.id, "expense", Some("01/02/2025"), None)
        .await;
    assert!(matches!(result, Err(ReportError::InvalidDateFormat(_))));

    let result = context.reports.daily_range(9999, "expense", None, None).await;
    assert!(matches!(result, Err(ReportError::UserNotFound(9999))));
}
