// Vacancy sources.
// A source resolves employers by name and fetches their vacancies from an
// external provider. Only the hh.ru API is implemented.

pub mod headhunter;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::vacancy::VacancyRecord;

pub use headhunter::HeadHunterClient;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub per_page: u32,
    /// Upper bound on pages requested per employer. With 1 only the first
    /// page is fetched and anything beyond it is silently dropped.
    pub max_pages: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            max_pages: 1,
        }
    }
}

impl FetchOptions {
    pub fn with_per_page(per_page: u32) -> Self {
        Self {
            per_page,
            ..Self::default()
        }
    }
}

/// Trait that all vacancy providers must implement.
#[async_trait]
pub trait VacancySourceProvider: Send + Sync {
    /// Identifier of the first employer matching `name`, or `None` when the
    /// search comes back empty.
    async fn resolve_employer_id(&self, name: &str) -> Result<Option<i64>, AppError>;

    /// Vacancies published by one employer.
    async fn fetch_vacancies(
        &self,
        employer_id: i64,
        options: FetchOptions,
    ) -> Result<Vec<VacancyRecord>, AppError>;

    /// Fetch every employer in turn and concatenate the results in the
    /// order the identifiers were given. The first failure aborts the batch.
    async fn fetch_for_employers(
        &self,
        employer_ids: &[i64],
        options: FetchOptions,
    ) -> Result<Vec<VacancyRecord>, AppError> {
        tracing::info!("Fetching vacancies for {} employers", employer_ids.len());
        let mut all = Vec::new();
        for &employer_id in employer_ids {
            tracing::info!("Fetching vacancies for employer {employer_id}");
            let vacancies = self.fetch_vacancies(employer_id, options).await?;
            all.extend(vacancies);
        }
        tracing::info!("Fetched {} vacancies in total", all.len());
        Ok(all)
    }
}
