use serde::{Deserialize, Deserializer, Serialize};

/// Employer as embedded in provider responses. The provider sends the
/// identifier as a JSON string; plain numbers are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployerRef {
    #[serde(deserialize_with = "numeric_id")]
    pub id: i64,
    pub name: String,
}

/// Row of the `employers` table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Employer {
    pub employer_id: i64,
    pub employer_name: String,
}

/// One page of the `/employers` search response.
#[derive(Debug, Deserialize)]
pub struct EmployerSearchPage {
    #[serde(default)]
    pub items: Vec<EmployerRef>,
}

fn numeric_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("employer id '{text}' is not numeric"))),
    }
}
