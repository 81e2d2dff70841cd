use serde::Serialize;

/// Vacancy row joined with its employer's name.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct VacancyListing {
    pub vacancy_name: String,
    pub vacancy_salary: Option<i32>,
    pub salary_currency: Option<String>,
    pub vacancy_link: String,
    pub employer_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CompanyVacancyCount {
    pub employer_name: String,
    pub vacancy_count: i64,
}
