use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use fintrack_repo::transaction_repo::{
    CategoryTotal, DailyTotal, InvalidTransactionType, TransactionRepo, TransactionRepoError,
    TransactionType,
};
use fintrack_repo::user_repo::{UserRepo, UserRepoError};
use std::sync::Arc;
use thiserror::Error;

/// Wire format for month selectors.
pub const MONTH_FORMAT: &str = "%Y-%m";
/// Wire format for date-only bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid month `{0}`, expected format {MONTH_FORMAT}")]
    InvalidMonthFormat(String),
    #[error("Invalid date `{0}`, expected format {DATE_FORMAT}")]
    InvalidDateFormat(String),
    #[error(transparent)]
    InvalidType(#[from] InvalidTransactionType),
    #[error("User with id {0} not found")]
    UserNotFound(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TransactionRepoError> for ReportError {
    fn from(error: TransactionRepoError) -> Self {
        ReportError::Other(error.into())
    }
}

impl From<UserRepoError> for ReportError {
    fn from(error: UserRepoError) -> Self {
        match error {
            UserRepoError::UserNotFound(id) => ReportError::UserNotFound(id),
            other => ReportError::Other(other.into()),
        }
    }
}

pub struct ReportService {
    transaction_repo: Arc<dyn TransactionRepo>,
    user_repo: Arc<dyn UserRepo>,
}

impl ReportService {
    pub fn new(
        transaction_repo: Arc<dyn TransactionRepo>,
        user_repo: Arc<dyn UserRepo>,
    ) -> ReportService {
        ReportService {
            transaction_repo,
            user_repo,
        }
    }

    /// Per-category spending/revenue sums for one user over one calendar
    /// month. A transaction tagged with several categories counts its full
    /// amount towards each of them.
    pub async fn monthly_by_category(
        &self,
        user_id: i32,
        month: &str,
        transaction_type: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<CategoryTotal>, ReportError> {
        let transaction_type = transaction_type
            .map(|t| t.parse::<TransactionType>())
            .transpose()?;
        let month_start = NaiveDate::parse_from_str(&format!("{}-01", month), DATE_FORMAT)
            .map_err(|_| ReportError::InvalidMonthFormat(month.to_owned()))?;
        let next_month_start = month_start
            .checked_add_months(Months::new(1))
            .expect("month start stays in range");

        let totals = self
            .transaction_repo
            .category_totals(
                user_id,
                month_start.and_time(NaiveTime::MIN),
                next_month_start.and_time(NaiveTime::MIN),
                transaction_type,
                category.map(str::to_owned),
            )
            .await?;
        Ok(totals)
    }

    /// Per-day sums of one transaction type for one user. The bounds default
    /// to the current month-to-date and both end days are included.
    pub async fn daily_range(
        &self,
        user_id: i32,
        transaction_type: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<DailyTotal>, ReportError> {
        let transaction_type: TransactionType = transaction_type.parse()?;
        self.user_repo.get_user(user_id).await?;

        let today = Utc::now().date_naive();
        let start = match start_date {
            Some(date) => parse_date(date)?,
            None => today.with_day(1).expect("first of month is a valid date"),
        };
        let end = match end_date {
            Some(date) => parse_date(date)?,
            None => today,
        };

        let totals = self
            .transaction_repo
            .daily_totals(
                user_id,
                transaction_type,
                start.and_time(NaiveTime::MIN),
                whole_day_upper_bound(end),
            )
            .await?;
        Ok(totals)
    }
}

fn parse_date(date: &str) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| ReportError::InvalidDateFormat(date.to_owned()))
}

/// Exclusive bound that covers every instant of `date` itself.
fn whole_day_upper_bound(date: NaiveDate) -> NaiveDateTime {
    date.checked_add_days(Days::new(1))
        .expect("date stays in range")
        .and_time(NaiveTime::MIN)
}
