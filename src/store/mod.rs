pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;
use crate::models::vacancy::VacancyRecord;

pub use postgres::PgVacancyStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Add a unique (employer_id, vacancy_link) constraint and skip repeats.
    /// Off by default, so reloading a database appends duplicate vacancies.
    pub dedup_vacancies: bool,
}

/// Counters reported by a persist call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersistSummary {
    pub found: usize,
    pub employers_new: usize,
    pub vacancies_new: usize,
}

/// Owns the schema lifecycle and the write path of a vacancy database.
#[async_trait]
pub trait VacancyStorage: Send + Sync {
    /// Drop `name` if it exists and create it empty. Destroys all data.
    async fn recreate_database(&self, name: &str) -> Result<(), AppError>;

    /// Create the `employers` and `vacancies` tables inside `name`.
    async fn create_schema(&self, name: &str) -> Result<(), AppError>;

    /// Write `records` into `database_name` in input order. Each row commits
    /// on its own; an error leaves the rows written so far in place.
    async fn persist(
        &self,
        records: &[VacancyRecord],
        database_name: &str,
    ) -> Result<PersistSummary, AppError>;
}
