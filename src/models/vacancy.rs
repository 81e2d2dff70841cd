use serde::{Deserialize, Serialize};

use crate::models::employer::EmployerRef;

/// A vacancy item as returned by the provider's `/vacancies` endpoint.
/// Only the fields the store keeps are decoded; everything else is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacancyRecord {
    pub name: String,
    pub alternate_url: String,
    #[serde(default)]
    pub salary: Option<Salary>,
    pub employer: EmployerRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    #[serde(default)]
    pub from: Option<i32>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl VacancyRecord {
    /// Salary lower bound and currency as stored, both `None` when the
    /// provider sent no salary block.
    pub fn salary_columns(&self) -> (Option<i32>, Option<String>) {
        match &self.salary {
            Some(salary) => (salary.from, salary.currency.clone()),
            None => (None, None),
        }
    }
}

/// One page of the `/vacancies` response.
#[derive(Debug, Deserialize)]
pub struct VacancyPage {
    #[serde(default)]
    pub items: Vec<VacancyRecord>,
    #[serde(default)]
    pub pages: Option<u32>,
}
