use crate::error::AppError;
use crate::source::{FetchOptions, VacancySourceProvider};
use crate::store::{PersistSummary, VacancyStorage};

/// Fetch every employer's vacancies, rebuild `database` from scratch and
/// store the batch.
///
/// Fetching happens first so a provider outage leaves the existing database
/// untouched. A failure while persisting leaves a partial batch behind;
/// running the load again starts over from an empty database.
pub async fn load(
    source: &dyn VacancySourceProvider,
    store: &dyn VacancyStorage,
    employer_ids: &[i64],
    options: FetchOptions,
    database: &str,
) -> Result<PersistSummary, AppError> {
    let records = source.fetch_for_employers(employer_ids, options).await?;

    store.recreate_database(database).await?;
    store.create_schema(database).await?;
    let summary = store.persist(&records, database).await?;

    tracing::info!(
        "Load into '{database}' completed: {} found, {} new employers, {} new vacancies",
        summary.found,
        summary.employers_new,
        summary.vacancies_new
    );
    Ok(summary)
}
