use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::models::employer::EmployerSearchPage;
use crate::models::vacancy::{VacancyPage, VacancyRecord};
use crate::source::{FetchOptions, VacancySourceProvider};

/// The provider asks API clients to identify themselves; any fixed value works.
pub const USER_AGENT: &str = "HH-User-Agent";

/// Client for the hh.ru public API (or anything serving the same routes).
pub struct HeadHunterClient {
    client: reqwest::Client,
    base_url: String,
}

impl HeadHunterClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        tracing::info!("Initialising HeadHunter client for {base_url}");
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}{path}` with `query` and decode the JSON body.
    /// Transport failures, non-2xx statuses and undecodable bodies are
    /// logged and returned as `SourceUnavailable`.
    async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = format!("{}{path}", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| {
                tracing::error!("Request to {url} failed: {e}");
                AppError::from(e)
            })?;

        resp.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse response from {url}: {e}");
            AppError::from(e)
        })
    }

    async fn fetch_page(
        &self,
        employer_id: i64,
        per_page: u32,
        page: u32,
    ) -> Result<VacancyPage, AppError> {
        let mut query = vec![
            ("employer_id", employer_id.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if page > 0 {
            query.push(("page", page.to_string()));
        }
        self.get_json("/vacancies", &query).await
    }
}

#[async_trait]
impl VacancySourceProvider for HeadHunterClient {
    async fn resolve_employer_id(&self, name: &str) -> Result<Option<i64>, AppError> {
        let page: EmployerSearchPage = self.get_json("/employers", &[("text", name)]).await?;
        tracing::info!("Employer search for '{name}' succeeded");

        match page.items.first() {
            Some(employer) => Ok(Some(employer.id)),
            None => {
                tracing::warn!("Employer '{name}' not found");
                Ok(None)
            }
        }
    }

    async fn fetch_vacancies(
        &self,
        employer_id: i64,
        options: FetchOptions,
    ) -> Result<Vec<VacancyRecord>, AppError> {
        if employer_id <= 0 {
            tracing::error!("Employer id is not set (got {employer_id})");
            return Err(AppError::InvalidArgument(format!(
                "employer id must be positive, got {employer_id}"
            )));
        }
        if options.per_page == 0 {
            tracing::error!("Page size must be positive");
            return Err(AppError::InvalidArgument(
                "per_page must be positive".to_string(),
            ));
        }

        tracing::info!("Requesting vacancies for employer {employer_id}");
        let max_pages = options.max_pages.max(1);
        let mut vacancies = Vec::new();

        for page in 0..max_pages {
            let batch = self.fetch_page(employer_id, options.per_page, page).await?;
            let received = batch.items.len();
            vacancies.extend(batch.items);

            let short_page = received < options.per_page as usize;
            let last_reported = batch.pages.is_some_and(|pages| page + 1 >= pages);
            if short_page || last_reported {
                break;
            }
        }

        tracing::info!(
            "Received {} vacancies for employer {employer_id}",
            vacancies.len()
        );
        Ok(vacancies)
    }
}
