use sqlx::Connection;
use sqlx::postgres::PgConnection;

use crate::db::DbSettings;
use crate::error::AppError;
use crate::models::listing::{CompanyVacancyCount, VacancyListing};

const LISTING_COLUMNS: &str = "SELECT v.vacancy_name, v.vacancy_salary, v.salary_currency, v.vacancy_link, e.employer_name
FROM vacancies v
JOIN employers e ON v.employer_id = e.employer_id";

/// Read-only reports over a loaded vacancy database.
///
/// Holds one connection for its whole life. `close` consumes the service,
/// so no query can run after the connection is released.
pub struct VacancyQueryService {
    conn: PgConnection,
}

impl VacancyQueryService {
    pub async fn connect(settings: &DbSettings, database: &str) -> Result<Self, AppError> {
        let conn = settings.connect(database).await.inspect_err(|e| {
            tracing::error!("Failed to connect to database '{database}': {e}");
        })?;
        tracing::info!("Connected to database '{database}' for reporting");
        Ok(Self { conn })
    }

    pub fn from_connection(conn: PgConnection) -> Self {
        Self { conn }
    }

    /// Vacancy count per employer. Employers without vacancies are left out.
    pub async fn companies_and_vacancy_counts(
        &mut self,
    ) -> Result<Vec<CompanyVacancyCount>, AppError> {
        let rows = sqlx::query_as::<_, CompanyVacancyCount>(
            "SELECT e.employer_name, COUNT(*) AS vacancy_count
             FROM employers e
             JOIN vacancies v ON e.employer_id = v.employer_id
             GROUP BY e.employer_id, e.employer_name",
        )
        .fetch_all(&mut self.conn)
        .await
        .inspect_err(|e| tracing::error!("Failed to count vacancies per company: {e}"))?;
        tracing::info!("Counted vacancies for {} companies", rows.len());
        Ok(rows)
    }

    /// Every vacancy with its employer's name, in no particular order.
    pub async fn all_vacancies(&mut self) -> Result<Vec<VacancyListing>, AppError> {
        let rows = sqlx::query_as::<_, VacancyListing>(LISTING_COLUMNS)
            .fetch_all(&mut self.conn)
            .await
            .inspect_err(|e| tracing::error!("Failed to list vacancies: {e}"))?;
        tracing::info!("Listed {} vacancies", rows.len());
        Ok(rows)
    }

    /// Mean salary lower bound over vacancies that have one, rounded to two
    /// decimals. 0.0 when no vacancy carries a salary.
    pub async fn average_salary(&mut self) -> Result<f64, AppError> {
        let (avg,): (Option<f64>,) = sqlx::query_as(
            "SELECT ROUND(AVG(vacancy_salary), 2)::float8
             FROM vacancies
             WHERE vacancy_salary IS NOT NULL",
        )
        .fetch_one(&mut self.conn)
        .await
        .inspect_err(|e| tracing::error!("Failed to compute average salary: {e}"))?;

        let avg = avg.unwrap_or(0.0);
        tracing::info!("Average salary is {avg:.2}");
        Ok(avg)
    }

    /// Vacancies paying strictly more than `average_salary`.
    pub async fn vacancies_above_average_salary(
        &mut self,
    ) -> Result<Vec<VacancyListing>, AppError> {
        let avg = self.average_salary().await?;
        let rows = sqlx::query_as::<_, VacancyListing>(&format!(
            "{LISTING_COLUMNS}\nWHERE v.vacancy_salary > $1"
        ))
        .bind(avg)
        .fetch_all(&mut self.conn)
        .await
        .inspect_err(|e| tracing::error!("Failed to list vacancies above average: {e}"))?;
        tracing::info!("{} vacancies pay above {avg:.2}", rows.len());
        Ok(rows)
    }

    /// Vacancies whose title contains `keyword`, ignoring ASCII case.
    pub async fn vacancies_matching_keyword(
        &mut self,
        keyword: &str,
    ) -> Result<Vec<VacancyListing>, AppError> {
        let rows = sqlx::query_as::<_, VacancyListing>(&format!(
            "{LISTING_COLUMNS}\nWHERE LOWER(v.vacancy_name) LIKE $1 OR UPPER(v.vacancy_name) LIKE $2"
        ))
        .bind(like_pattern(&keyword.to_lowercase()))
        .bind(like_pattern(&keyword.to_uppercase()))
        .fetch_all(&mut self.conn)
        .await
        .inspect_err(|e| tracing::error!("Failed to search vacancies for '{keyword}': {e}"))?;
        tracing::info!("{} vacancies match '{keyword}'", rows.len());
        Ok(rows)
    }

    pub async fn close(self) -> Result<(), AppError> {
        self.conn.close().await?;
        tracing::info!("Reporting connection closed");
        Ok(())
    }
}

/// `%keyword%` with LIKE wildcards in the keyword escaped, so the keyword
/// only ever matches literally.
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
