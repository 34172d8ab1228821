use actix::Addr;
use serde::{Deserialize, Serialize};

use crate::fields;
use crate::database::{self, Database};
use crate::errors::JoblyError;
use crate::sql::{self, CompanyFilter, FieldRenames, FilterStyle, PartialUpdate};

mod query;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i64>,
    pub logo_url: Option<String>,
}

impl Company {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            handle: row.get("handle")?,
            name: row.get("name")?,
            description: row.get("description")?,
            num_employees: row.get("numEmployees")?,
            logo_url: row.get("logoUrl")?,
        })
    }
}

/// A job as listed under its company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyJob {
    pub id: i64,
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<f64>,
}

impl CompanyJob {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            salary: row.get("salary")?,
            equity: row.get("equity")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i64>,
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn validate(&self) -> Result<(), JoblyError> {
        fields::require_text("handle", &self.handle)?;
        fields::require_text("name", &self.name)?;
        fields::require_non_negative("numEmployees", self.num_employees)
    }
}

/// Body of a company update. The handle cannot be changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "fields::deserialize_some")]
    pub num_employees: Option<Option<i64>>,
    #[serde(default, deserialize_with = "fields::deserialize_some")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyUpdate {
    pub fn validate(&self) -> Result<(), JoblyError> {
        if let Some(name) = &self.name {
            fields::require_text("name", name)?;
        }
        fields::require_non_negative("numEmployees", self.num_employees.flatten())
    }

    pub fn into_partial_update(self) -> PartialUpdate {
        let mut data = PartialUpdate::new();
        if let Some(name) = self.name {
            data.set("name", fields::text(&name));
        }
        if let Some(description) = self.description {
            data.set("description", fields::text(&description));
        }
        if let Some(num_employees) = self.num_employees {
            data.set("numEmployees", fields::optional_integer(num_employees));
        }
        if let Some(logo_url) = self.logo_url {
            data.set("logoUrl", fields::optional_text(logo_url));
        }
        data
    }
}

fn column_renames() -> FieldRenames {
    [("numEmployees", "num_employees"), ("logoUrl", "logo_url")]
        .into_iter()
        .collect()
}

pub async fn create(db: &Addr<Database>, company: NewCompany) -> Result<Company, JoblyError> {
    let existing = database::query(
        db,
        query::GET_COMPANY_HANDLE,
        vec![fields::text(&company.handle)],
        |row| row.get::<_, String>(0),
    )
    .await?;

    if !existing.is_empty() {
        return Err(JoblyError::invalid_request(format!(
            "Duplicate company: {}",
            company.handle
        )));
    }

    let params = vec![
        fields::text(&company.handle),
        fields::text(&company.name),
        fields::text(&company.description),
        fields::optional_integer(company.num_employees),
        fields::optional_text(company.logo_url),
    ];

    let mut created = database::query(db, query::INSERT_COMPANY, params, Company::from_row).await?;
    info!("Created company {}", company.handle);

    created
        .pop()
        .ok_or_else(|| JoblyError::invalid_request(format!("No company: {}", company.handle)))
}

pub async fn find_all(db: &Addr<Database>) -> Result<Vec<Company>, JoblyError> {
    database::query(db, query::GET_ALL_COMPANIES, vec![], Company::from_row).await
}

/// Companies matching every truthy field of `filter`, or all of them when
/// none is set.
pub async fn find_by_filter(
    db: &Addr<Database>,
    filter: &CompanyFilter,
    style: FilterStyle,
) -> Result<Vec<Company>, JoblyError> {
    if filter.is_empty() {
        return find_all(db).await;
    }

    let generated = sql::sql_for_filter_companies(filter, style)?;
    database::query(db, &generated.sql, generated.params, Company::from_row).await
}

pub async fn get(db: &Addr<Database>, handle: &str) -> Result<CompanyDetail, JoblyError> {
    let company = database::query(
        db,
        query::GET_COMPANY_BY_HANDLE,
        vec![fields::text(handle)],
        Company::from_row,
    )
    .await?
    .pop()
    .ok_or_else(|| JoblyError::not_found(format!("No company: {}", handle)))?;

    let jobs = database::query(
        db,
        query::GET_COMPANY_JOBS,
        vec![fields::text(handle)],
        CompanyJob::from_row,
    )
    .await?;

    Ok(CompanyDetail { company, jobs })
}

pub async fn update(
    db: &Addr<Database>,
    handle: &str,
    data: &PartialUpdate,
) -> Result<Company, JoblyError> {
    debug!("Updating {} field(s) of company {}", data.len(), handle);
    let clause = sql::sql_for_partial_update(data, &column_renames())?;
    let handle_idx = clause.values.len() + 1;

    let statement = format!(
        "UPDATE companies SET {} WHERE handle = ${} {}",
        clause.set_cols,
        handle_idx,
        query::UPDATE_COMPANY_RETURNING
    );

    let mut params = clause.values;
    params.push(fields::text(handle));

    database::query(db, &statement, params, Company::from_row)
        .await?
        .pop()
        .ok_or_else(|| JoblyError::not_found(format!("No company: {}", handle)))
}

/// Deletes the company together with its jobs.
pub async fn remove(db: &Addr<Database>, handle: &str) -> Result<(), JoblyError> {
    let deleted = database::execute(db, query::DELETE_COMPANY, vec![fields::text(handle)]).await?;

    if deleted == 0 {
        return Err(JoblyError::not_found(format!("No company: {}", handle)));
    }

    info!("Removed company {}", handle);
    Ok(())
}
