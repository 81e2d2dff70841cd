use async_trait::async_trait;
use sqlx::Connection;
use sqlx::postgres::PgConnection;

use crate::db::{ADMIN_DATABASE, DbSettings, quoted_identifier};
use crate::error::AppError;
use crate::models::vacancy::VacancyRecord;
use crate::store::{PersistSummary, StoreOptions, VacancyStorage};

const CREATE_EMPLOYERS: &str = "CREATE TABLE employers (
    employer_id BIGINT PRIMARY KEY,
    employer_name TEXT
)";

const INSERT_EMPLOYER: &str = "INSERT INTO employers (employer_id, employer_name) VALUES ($1, $2) ON CONFLICT (employer_id) DO NOTHING";

const INSERT_VACANCY: &str = "INSERT INTO vacancies (employer_id, vacancy_name, vacancy_salary, salary_currency, vacancy_link) VALUES ($1, $2, $3, $4, $5)";

/// PostgreSQL-backed vacancy store. Every operation opens its own
/// connection and holds it until the operation finishes.
pub struct PgVacancyStore {
    settings: DbSettings,
    options: StoreOptions,
}

impl PgVacancyStore {
    pub fn new(settings: DbSettings, options: StoreOptions) -> Self {
        Self { settings, options }
    }

    fn create_vacancies_sql(&self) -> String {
        let unique = if self.options.dedup_vacancies {
            ",\n    UNIQUE (employer_id, vacancy_link)"
        } else {
            ""
        };
        format!(
            "CREATE TABLE vacancies (
    employer_id BIGINT REFERENCES employers(employer_id),
    vacancy_name TEXT,
    vacancy_salary INTEGER,
    salary_currency TEXT,
    vacancy_link TEXT{unique}
)"
        )
    }

    fn insert_vacancy_sql(&self) -> String {
        if self.options.dedup_vacancies {
            format!("{INSERT_VACANCY} ON CONFLICT (employer_id, vacancy_link) DO NOTHING")
        } else {
            INSERT_VACANCY.to_string()
        }
    }

    async fn connect(&self, database: &str) -> Result<PgConnection, AppError> {
        self.settings.connect(database).await.inspect_err(|e| {
            tracing::error!("Failed to connect to database '{database}': {e}");
        })
    }
}

#[async_trait]
impl VacancyStorage for PgVacancyStore {
    async fn recreate_database(&self, name: &str) -> Result<(), AppError> {
        let ident = quoted_identifier(name)?;
        let mut conn = self.connect(ADMIN_DATABASE).await?;

        let drop_sql = format!("DROP DATABASE {ident}");
        let dropped = sqlx::query(&drop_sql)
            .execute(&mut conn)
            .await
            .map_err(AppError::from);
        match dropped {
            Ok(_) => tracing::info!("Dropped database '{name}'"),
            Err(e) if e.is_missing_database() => {
                tracing::warn!("Database '{name}' does not exist, nothing to drop");
            }
            Err(e) => {
                tracing::error!("Failed to drop database '{name}': {e}");
                return Err(e);
            }
        }

        let create_sql = format!("CREATE DATABASE {ident}");
        sqlx::query(&create_sql)
            .execute(&mut conn)
            .await
            .inspect_err(|e| tracing::error!("Failed to create database '{name}': {e}"))?;
        tracing::info!("Created database '{name}'");

        conn.close().await?;
        Ok(())
    }

    async fn create_schema(&self, name: &str) -> Result<(), AppError> {
        let mut conn = self.connect(name).await?;

        for sql in [CREATE_EMPLOYERS.to_string(), self.create_vacancies_sql()] {
            sqlx::query(&sql)
                .execute(&mut conn)
                .await
                .inspect_err(|e| tracing::error!("Failed to create tables in '{name}': {e}"))?;
        }
        tracing::info!(
            "Created employers and vacancies tables in '{name}' (dedup: {})",
            self.options.dedup_vacancies
        );

        conn.close().await?;
        Ok(())
    }

    async fn persist(
        &self,
        records: &[VacancyRecord],
        database_name: &str,
    ) -> Result<PersistSummary, AppError> {
        let mut conn = self.connect(database_name).await?;
        let insert_vacancy = self.insert_vacancy_sql();
        let mut summary = PersistSummary {
            found: records.len(),
            ..PersistSummary::default()
        };

        for record in records {
            // The employer row must exist before its vacancy references it.
            let employer = sqlx::query(INSERT_EMPLOYER)
                .bind(record.employer.id)
                .bind(&record.employer.name)
                .execute(&mut conn)
                .await
                .inspect_err(|e| {
                    tracing::error!("Failed to store employer {}: {e}", record.employer.id)
                })?;
            summary.employers_new += employer.rows_affected() as usize;

            let (salary, currency) = record.salary_columns();
            let vacancy = sqlx::query(&insert_vacancy)
                .bind(record.employer.id)
                .bind(&record.name)
                .bind(salary)
                .bind(currency)
                .bind(&record.alternate_url)
                .execute(&mut conn)
                .await
                .inspect_err(|e| {
                    tracing::error!("Failed to store vacancy '{}': {e}", record.alternate_url)
                })?;
            summary.vacancies_new += vacancy.rows_affected() as usize;
        }

        tracing::info!(
            "Stored batch in '{database_name}': {} found, {} new employers, {} new vacancies",
            summary.found,
            summary.employers_new,
            summary.vacancies_new
        );

        conn.close().await?;
        Ok(summary)
    }
}
