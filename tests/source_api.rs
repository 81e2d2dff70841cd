use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use vacancy_hh::AppError;
use vacancy_hh::source::{FetchOptions, HeadHunterClient, VacancySourceProvider};

type Seen = Arc<Mutex<Vec<(String, HashMap<String, String>, String)>>>;

#[derive(Clone)]
struct Provider {
    seen: Seen,
    /// Vacancies each employer has, served in pages.
    totals: HashMap<String, usize>,
}

fn record(seen: &Seen, path: &str, params: &HashMap<String, String>, headers: &HeaderMap) {
    let agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    seen.lock()
        .unwrap()
        .push((path.to_string(), params.clone(), agent));
}

async fn employers(
    State(provider): State<Provider>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    record(&provider.seen, "/employers", &params, &headers);
    let items = match params.get("text").map(String::as_str) {
        Some("HeadHunter") => json!([
            {"id": "1455", "name": "HeadHunter"},
            {"id": "9999", "name": "HeadHunter::Analytics"}
        ]),
        _ => json!([]),
    };
    let found = items.as_array().map_or(0, Vec::len);
    Json(json!({"items": items, "found": found}))
}

async fn vacancies(
    State(provider): State<Provider>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    record(&provider.seen, "/vacancies", &params, &headers);

    let employer_id = params.get("employer_id").cloned().unwrap_or_default();
    if employer_id == "500" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }

    let total = provider.totals.get(&employer_id).copied().unwrap_or(0);
    let per_page: usize = params
        .get("per_page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(20);
    let page: usize = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(0);

    let items: Vec<Value> = (page * per_page..total.min((page + 1) * per_page))
        .map(|n| {
            // Every other vacancy comes without a salary block.
            let salary = if n % 2 == 0 {
                json!({"from": 1000 * (n + 1), "to": null, "currency": "RUR"})
            } else {
                Value::Null
            };
            json!({
                "id": format!("{employer_id}{n}"),
                "name": format!("Vacancy {n}"),
                "alternate_url": format!("https://hh.ru/vacancy/{employer_id}{n}"),
                "salary": salary,
                "employer": {"id": employer_id, "name": format!("Employer {employer_id}")}
            })
        })
        .collect();
    let pages = total.div_ceil(per_page);

    Json(json!({"items": items, "found": total, "pages": pages, "page": page})).into_response()
}

async fn spawn_provider(totals: &[(&str, usize)]) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let provider = Provider {
        seen: seen.clone(),
        totals: totals
            .iter()
            .map(|(id, n)| (id.to_string(), *n))
            .collect(),
    };
    let app = Router::new()
        .route("/employers", get(employers))
        .route("/vacancies", get(vacancies))
        .with_state(provider);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

fn requests(seen: &Seen) -> Vec<(String, HashMap<String, String>, String)> {
    seen.lock().unwrap().clone()
}

#[tokio::test]
async fn resolve_returns_first_match() {
    let (base_url, seen) = spawn_provider(&[]).await;
    let client = HeadHunterClient::new(&base_url).unwrap();

    assert_eq!(client.resolve_employer_id("HeadHunter").await.unwrap(), Some(1455));

    let reqs = requests(&seen);
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].0, "/employers");
    assert_eq!(reqs[0].1.get("text").map(String::as_str), Some("HeadHunter"));
    assert_eq!(reqs[0].2, "HH-User-Agent");
}

#[tokio::test]
async fn resolve_unknown_employer_is_none() {
    let (base_url, _seen) = spawn_provider(&[]).await;
    let client = HeadHunterClient::new(&base_url).unwrap();

    assert_eq!(client.resolve_employer_id("Nobody & Sons").await.unwrap(), None);
}

#[tokio::test]
async fn single_page_fetch_truncates_to_page_size() {
    let (base_url, seen) = spawn_provider(&[("1455", 25)]).await;
    let client = HeadHunterClient::new(&base_url).unwrap();

    let vacancies = client
        .fetch_vacancies(1455, FetchOptions::default())
        .await
        .unwrap();

    assert_eq!(vacancies.len(), 10);
    assert_eq!(vacancies[0].name, "Vacancy 0");
    assert_eq!(vacancies[0].employer.id, 1455);
    assert_eq!(vacancies[0].salary_columns(), (Some(1000), Some("RUR".to_string())));
    assert_eq!(vacancies[1].salary_columns(), (None, None));

    let reqs = requests(&seen);
    assert_eq!(reqs.len(), 1);
    let params = &reqs[0].1;
    assert_eq!(params.get("employer_id").map(String::as_str), Some("1455"));
    assert_eq!(params.get("per_page").map(String::as_str), Some("10"));
    assert!(!params.contains_key("page"));
    assert_eq!(reqs[0].2, "HH-User-Agent");
}

#[tokio::test]
async fn multi_page_fetch_stops_on_short_page() {
    let (base_url, seen) = spawn_provider(&[("1455", 25)]).await;
    let client = HeadHunterClient::new(&base_url).unwrap();

    let options = FetchOptions {
        per_page: 10,
        max_pages: 5,
    };
    let vacancies = client.fetch_vacancies(1455, options).await.unwrap();

    assert_eq!(vacancies.len(), 25);
    assert_eq!(vacancies[24].name, "Vacancy 24");
    let pages: Vec<Option<String>> = requests(&seen)
        .iter()
        .map(|(_, params, _)| params.get("page").cloned())
        .collect();
    assert_eq!(pages, vec![None, Some("1".to_string()), Some("2".to_string())]);
}

#[tokio::test]
async fn multi_page_fetch_stops_at_reported_last_page() {
    let (base_url, seen) = spawn_provider(&[("1455", 20)]).await;
    let client = HeadHunterClient::new(&base_url).unwrap();

    let options = FetchOptions {
        per_page: 10,
        max_pages: 5,
    };
    let vacancies = client.fetch_vacancies(1455, options).await.unwrap();

    assert_eq!(vacancies.len(), 20);
    assert_eq!(requests(&seen).len(), 2);
}

#[tokio::test]
async fn server_error_is_source_unavailable() {
    let (base_url, _seen) = spawn_provider(&[]).await;
    let client = HeadHunterClient::new(&base_url).unwrap();

    let err = client
        .fetch_vacancies(500, FetchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SourceUnavailable(_)));
}

#[tokio::test]
async fn unreachable_provider_is_source_unavailable() {
    // Bind then drop a listener so the port is known to be closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HeadHunterClient::new(&format!("http://{addr}")).unwrap();
    let err = client.resolve_employer_id("HeadHunter").await.unwrap_err();
    assert!(matches!(err, AppError::SourceUnavailable(_)));
}

#[tokio::test]
async fn batch_fetch_concatenates_in_employer_order() {
    let (base_url, seen) = spawn_provider(&[("1", 2), ("2", 0), ("3", 3)]).await;
    let client = HeadHunterClient::new(&base_url).unwrap();

    let vacancies = client
        .fetch_for_employers(&[3, 2, 1], FetchOptions::with_per_page(50))
        .await
        .unwrap();

    let employers: Vec<i64> = vacancies.iter().map(|v| v.employer.id).collect();
    assert_eq!(employers, vec![3, 3, 3, 1, 1]);

    let asked: Vec<String> = requests(&seen)
        .iter()
        .map(|(_, params, _)| params["employer_id"].clone())
        .collect();
    assert_eq!(asked, vec!["3", "2", "1"]);
}

#[tokio::test]
async fn batch_fetch_propagates_provider_failure() {
    let (base_url, seen) = spawn_provider(&[("1", 2)]).await;
    let client = HeadHunterClient::new(&base_url).unwrap();

    let err = client
        .fetch_for_employers(&[1, 500, 1], FetchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SourceUnavailable(_)));
    assert_eq!(requests(&seen).len(), 2);
}
