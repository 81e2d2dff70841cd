// Console rendering for the report and resolve commands.

use std::io::{self, BufRead, Write};

use crate::models::listing::{CompanyVacancyCount, VacancyListing};
use crate::models::vacancy::VacancyRecord;
use crate::query::VacancyQueryService;
use crate::source::{FetchOptions, VacancySourceProvider};

pub fn format_count(row: &CompanyVacancyCount) -> String {
    format!("{}: {}", row.employer_name, row.vacancy_count)
}

pub fn format_listing(row: &VacancyListing) -> String {
    let salary = match (row.vacancy_salary, row.salary_currency.as_deref()) {
        (Some(amount), Some(currency)) => format!("from {amount} {currency}"),
        (Some(amount), None) => format!("from {amount}"),
        (None, _) => "salary not specified".to_string(),
    };
    format!(
        "{} | {} | {} | {}",
        row.employer_name, row.vacancy_name, salary, row.vacancy_link
    )
}

/// `- <title>: <url>` line used by the resolve command.
pub fn format_record(record: &VacancyRecord) -> String {
    format!("- {}: {}", record.name, record.alternate_url)
}

fn print_listings<W: Write>(out: &mut W, rows: &[VacancyListing]) -> io::Result<()> {
    for row in rows {
        writeln!(out, "{}", format_listing(row))?;
    }
    Ok(())
}

/// Trimmed line read from `input` after printing `prompt`.
pub fn prompt_keyword<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> io::Result<String> {
    write!(out, "{prompt} ")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Print the four report sections, then the keyword search. The keyword is
/// read from stdin when `keyword` is `None`.
pub async fn print_report<W: Write>(
    service: &mut VacancyQueryService,
    keyword: Option<String>,
    out: &mut W,
) -> anyhow::Result<()> {
    writeln!(out, "Companies and vacancy counts:")?;
    for row in service.companies_and_vacancy_counts().await? {
        writeln!(out, "{}", format_count(&row))?;
    }

    writeln!(out, "\nAll vacancies:")?;
    print_listings(out, &service.all_vacancies().await?)?;

    writeln!(out, "\nAverage salary:")?;
    writeln!(out, "{:.2}", service.average_salary().await?)?;

    writeln!(out, "\nVacancies with salary above average:")?;
    print_listings(out, &service.vacancies_above_average_salary().await?)?;

    let keyword = match keyword {
        Some(k) => k.trim().to_string(),
        None => {
            writeln!(out)?;
            prompt_keyword(
                &mut io::stdin().lock(),
                out,
                "Enter a keyword to search vacancies:",
            )?
        }
    };
    writeln!(out, "\nVacancies with keyword '{keyword}':")?;
    let matches = service.vacancies_matching_keyword(&keyword).await?;
    if matches.is_empty() {
        writeln!(out, "No vacancies found with keyword '{keyword}'.")?;
    } else {
        print_listings(out, &matches)?;
    }
    Ok(())
}

/// Resolve each name, list the first page of its vacancies or say nothing
/// was found.
pub async fn print_resolved<W: Write>(
    source: &dyn VacancySourceProvider,
    names: &[String],
    out: &mut W,
) -> anyhow::Result<()> {
    for name in names {
        match source.resolve_employer_id(name).await? {
            Some(employer_id) => {
                let vacancies = source
                    .fetch_vacancies(employer_id, FetchOptions::default())
                    .await?;
                writeln!(out, "Vacancies for {name}:")?;
                for vacancy in &vacancies {
                    writeln!(out, "{}", format_record(vacancy))?;
                }
            }
            None => writeln!(out, "No vacancies found for {name}")?,
        }
    }
    Ok(())
}
