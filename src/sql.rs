//! SQL fragment builders shared by the company and job models.
//!
//! `sql_for_partial_update` turns an ordered set of changed fields into the
//! `SET` clause of an `UPDATE` statement. The two filter builders turn the
//! optional query-string filters into a complete `SELECT` statement.

use rusqlite::types::Value;
use serde::Deserialize;
use std::collections::HashMap;

use crate::errors::JoblyError;
use crate::fields;

/// Application field name to column name. Fields without an entry are used
/// as column names unchanged.
pub type FieldRenames = HashMap<&'static str, &'static str>;

/// Ordered set of fields to change. Insertion order decides placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialUpdate {
    fields: Vec<(String, Value)>,
}

impl PartialUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `field` to `value`, replacing the value in place when the field
    /// was already set.
    pub fn set(&mut self, field: &str, value: Value) -> &mut Self {
        match self.fields.iter_mut().find(|(name, _)| name.as_str() == field) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((field.to_owned(), value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for PartialUpdate {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut update = PartialUpdate::new();
        for (field, value) in iter {
            let field: String = field.into();
            update.set(&field, value);
        }
        update
    }
}

/// `SET` clause plus the values bound to `$1..$n`, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedClause {
    pub set_cols: String,
    pub values: Vec<Value>,
}

/// A complete statement. `params` is empty for interpolated queries.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// How filter values reach the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterStyle {
    /// Values are bound to `$n` placeholders.
    #[default]
    Parameterized,
    /// Values are written into the statement text verbatim. Open to SQL
    /// injection, only for callers relying on the legacy query text.
    Interpolated,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "fields::empty_as_none")]
    pub min_employees: Option<i64>,
    #[serde(default, deserialize_with = "fields::empty_as_none")]
    pub max_employees: Option<i64>,
}

impl CompanyFilter {
    /// True when no field would contribute a predicate.
    pub fn is_empty(&self) -> bool {
        truthy_text(&self.name).is_none()
            && truthy_number(self.min_employees).is_none()
            && truthy_number(self.max_employees).is_none()
    }

    pub fn validate(&self) -> Result<(), JoblyError> {
        match (self.min_employees, self.max_employees) {
            (Some(min), Some(max)) if min > max => Err(JoblyError::invalid_request(
                "minEmployees cannot be greater than maxEmployees",
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "fields::empty_as_none")]
    pub min_salary: Option<i64>,
    #[serde(default, deserialize_with = "fields::empty_as_none")]
    pub has_equity: Option<bool>,
}

impl JobFilter {
    /// True when no field would contribute a predicate. `hasEquity=false`
    /// counts as absent.
    pub fn is_empty(&self) -> bool {
        truthy_text(&self.title).is_none()
            && truthy_number(self.min_salary).is_none()
            && self.has_equity != Some(true)
    }
}

fn truthy_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

fn truthy_number(value: Option<i64>) -> Option<i64> {
    value.filter(|number| *number != 0)
}

/// Builds the `SET` clause for a partial update.
///
/// ```text
/// {firstName: "Aliya", age: 32} + {firstName: "first_name"}
///   => "first_name"=$1, "age"=$2  with  ["Aliya", 32]
/// ```
pub fn sql_for_partial_update(
    data: &PartialUpdate,
    renames: &FieldRenames,
) -> Result<GeneratedClause, JoblyError> {
    if data.is_empty() {
        return Err(JoblyError::invalid_request("No data"));
    }

    let set_cols = data
        .fields
        .iter()
        .enumerate()
        .map(|(idx, (field, _))| {
            let column = renames.get(field.as_str()).copied().unwrap_or(field.as_str());
            format!("\"{}\"=${}", column, idx + 1)
        })
        .collect::<Vec<String>>()
        .join(", ");

    let values = data.fields.iter().map(|(_, value)| value.clone()).collect();

    Ok(GeneratedClause { set_cols, values })
}

pub const SELECT_FILTERED_COMPANIES: &str = "SELECT handle, name, description, num_employees AS \"numEmployees\", logo_url AS \"logoUrl\" FROM companies WHERE ";

pub const SELECT_FILTERED_JOBS: &str =
    "SELECT id, title, salary, equity, company_handle AS \"companyHandle\" FROM jobs WHERE ";

pub fn sql_for_filter_companies(
    filter: &CompanyFilter,
    style: FilterStyle,
) -> Result<GeneratedQuery, JoblyError> {
    if filter.is_empty() {
        return Err(JoblyError::invalid_request("No data"));
    }

    let mut predicates = Predicates::new(style);
    if let Some(name) = truthy_text(&filter.name) {
        predicates.text("name", "=", name);
    }
    if let Some(min) = truthy_number(filter.min_employees) {
        predicates.integer("num_employees", ">=", min);
    }
    if let Some(max) = truthy_number(filter.max_employees) {
        predicates.integer("num_employees", "<=", max);
    }

    Ok(predicates.finish(SELECT_FILTERED_COMPANIES, "name"))
}

pub fn sql_for_filter_jobs(
    filter: &JobFilter,
    style: FilterStyle,
) -> Result<GeneratedQuery, JoblyError> {
    if filter.is_empty() {
        return Err(JoblyError::invalid_request("No filter"));
    }

    let mut predicates = Predicates::new(style);
    if let Some(title) = truthy_text(&filter.title) {
        predicates.text("title", "=", title);
    }
    if let Some(min) = truthy_number(filter.min_salary) {
        predicates.integer("salary", ">=", min);
    }
    if filter.has_equity == Some(true) {
        predicates.raw("equity > 0");
    }

    Ok(predicates.finish(SELECT_FILTERED_JOBS, "title"))
}

struct Predicates {
    style: FilterStyle,
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl Predicates {
    fn new(style: FilterStyle) -> Self {
        Self {
            style,
            clauses: Vec::new(),
            params: Vec::new(),
        }
    }

    fn text(&mut self, column: &str, op: &str, value: &str) {
        let clause = match self.style {
            FilterStyle::Interpolated => format!("{} {} '{}'", column, op, value),
            FilterStyle::Parameterized => self.bind(column, op, Value::Text(value.to_owned())),
        };
        self.clauses.push(clause);
    }

    fn integer(&mut self, column: &str, op: &str, value: i64) {
        let clause = match self.style {
            FilterStyle::Interpolated => format!("{} {} {}", column, op, value),
            FilterStyle::Parameterized => self.bind(column, op, Value::Integer(value)),
        };
        self.clauses.push(clause);
    }

    fn raw(&mut self, clause: &str) {
        self.clauses.push(clause.to_owned());
    }

    fn bind(&mut self, column: &str, op: &str, value: Value) -> String {
        self.params.push(value);
        format!("{} {} ${}", column, op, self.params.len())
    }

    fn finish(self, select: &str, order_by: &str) -> GeneratedQuery {
        GeneratedQuery {
            sql: format!(
                "{}{} ORDER BY {}",
                select,
                self.clauses.join(" AND "),
                order_by
            ),
            params: self.params,
        }
    }
}
