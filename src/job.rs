use actix::Addr;
use serde::{Deserialize, Serialize};

use crate::company::{self, Company};
use crate::database::{self, Database};
use crate::errors::JoblyError;
use crate::fields;
use crate::sql::{self, FieldRenames, FilterStyle, JobFilter, PartialUpdate};

mod query;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<f64>,
    pub company_handle: String,
}

impl Job {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            salary: row.get("salary")?,
            equity: row.get("equity")?,
            company_handle: row.get("companyHandle")?,
        })
    }
}

/// A job with its company nested in place of the handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    pub id: i64,
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<f64>,
    pub company: Company,
}

impl JobDetail {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            salary: row.get("salary")?,
            equity: row.get("equity")?,
            company: Company {
                handle: row.get("companyHandle")?,
                name: row.get("companyName")?,
                description: row.get("companyDescription")?,
                num_employees: row.get("companyNumEmployees")?,
                logo_url: row.get("companyLogoUrl")?,
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<f64>,
    pub company_handle: String,
}

impl NewJob {
    pub fn validate(&self) -> Result<(), JoblyError> {
        fields::require_text("title", &self.title)?;
        fields::require_text("companyHandle", &self.company_handle)?;
        fields::require_non_negative("salary", self.salary)?;
        fields::require_fraction("equity", self.equity)
    }
}

/// Body of a job update. Neither the id nor the company can be changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "fields::deserialize_some")]
    pub salary: Option<Option<i64>>,
    #[serde(default, deserialize_with = "fields::deserialize_some")]
    pub equity: Option<Option<f64>>,
}

impl JobUpdate {
    pub fn validate(&self) -> Result<(), JoblyError> {
        if let Some(title) = &self.title {
            fields::require_text("title", title)?;
        }
        fields::require_non_negative("salary", self.salary.flatten())?;
        fields::require_fraction("equity", self.equity.flatten())
    }

    pub fn into_partial_update(self) -> PartialUpdate {
        let mut data = PartialUpdate::new();
        if let Some(title) = self.title {
            data.set("title", fields::text(&title));
        }
        if let Some(salary) = self.salary {
            data.set("salary", fields::optional_integer(salary));
        }
        if let Some(equity) = self.equity {
            data.set("equity", fields::optional_real(equity));
        }
        data
    }
}

pub async fn create(db: &Addr<Database>, job: NewJob) -> Result<Job, JoblyError> {
    if let Err(err) = company::get(db, &job.company_handle).await {
        return match err {
            JoblyError::NotFound { .. } => Err(JoblyError::invalid_request(format!(
                "No company: {}",
                job.company_handle
            ))),
            err => Err(err),
        };
    }

    let params = vec![
        fields::text(&job.title),
        fields::optional_integer(job.salary),
        fields::optional_real(job.equity),
        fields::text(&job.company_handle),
    ];

    let created = database::query(db, query::INSERT_JOB, params, Job::from_row)
        .await?
        .pop()
        .ok_or_else(|| JoblyError::invalid_request(format!("No company: {}", job.company_handle)))?;

    info!("Created job {} for company {}", created.id, created.company_handle);
    Ok(created)
}

pub async fn find_all(db: &Addr<Database>) -> Result<Vec<Job>, JoblyError> {
    database::query(db, query::GET_ALL_JOBS, vec![], Job::from_row).await
}

pub async fn find_by_filter(
    db: &Addr<Database>,
    filter: &JobFilter,
    style: FilterStyle,
) -> Result<Vec<Job>, JoblyError> {
    if filter.is_empty() {
        return find_all(db).await;
    }

    let generated = sql::sql_for_filter_jobs(filter, style)?;
    database::query(db, &generated.sql, generated.params, Job::from_row).await
}

pub async fn get(db: &Addr<Database>, id: i64) -> Result<JobDetail, JoblyError> {
    database::query(
        db,
        query::GET_JOB_BY_ID,
        vec![id.into()],
        JobDetail::from_row,
    )
    .await?
    .pop()
    .ok_or_else(|| JoblyError::not_found(format!("No job: {}", id)))
}

pub async fn update(db: &Addr<Database>, id: i64, data: &PartialUpdate) -> Result<Job, JoblyError> {
    debug!("Updating {} field(s) of job {}", data.len(), id);
    let clause = sql::sql_for_partial_update(data, &FieldRenames::new())?;
    let id_idx = clause.values.len() + 1;

    let statement = format!(
        "UPDATE jobs SET {} WHERE id = ${} {}",
        clause.set_cols,
        id_idx,
        query::UPDATE_JOB_RETURNING
    );

    let mut params = clause.values;
    params.push(id.into());

    database::query(db, &statement, params, Job::from_row)
        .await?
        .pop()
        .ok_or_else(|| JoblyError::not_found(format!("No job: {}", id)))
}

pub async fn remove(db: &Addr<Database>, id: i64) -> Result<(), JoblyError> {
    let deleted = database::execute(db, query::DELETE_JOB, vec![id.into()]).await?;

    if deleted == 0 {
        return Err(JoblyError::not_found(format!("No job: {}", id)));
    }

    info!("Removed job {}", id);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::database::fixtures;

    fn job(id: i64, title: &str, salary: Option<i64>, equity: Option<f64>, company: &str) -> Job {
        Job {
            id,
            title: title.to_owned(),
            salary,
            equity,
            company_handle: company.to_owned(),
        }
    }

    fn all_jobs() -> Vec<Job> {
        vec![
            job(1, "j1", Some(1), Some(0.01), "c1"),
            job(2, "j2", Some(10000), Some(0.5), "c1"),
            job(3, "j3", Some(1000), Some(0.0), "c2"),
            job(4, "j4", None, None, "c2"),
        ]
    }

    fn filter(title: Option<&str>, min_salary: Option<i64>, has_equity: Option<bool>) -> JobFilter {
        JobFilter {
            title: title.map(str::to_owned),
            min_salary,
            has_equity,
        }
    }

    fn titles(jobs: &[Job]) -> Vec<&str> {
        jobs.iter().map(|job| job.title.as_str()).collect()
    }

    #[actix_rt::test]
    async fn create_works() {
        let db = fixtures::seeded();
        let new_job = NewJob {
            title: "job".to_owned(),
            salary: Some(100),
            equity: Some(0.99),
            company_handle: "c1".to_owned(),
        };

        let created = create(&db, new_job).await.unwrap();

        assert_eq!(created, job(created.id, "job", Some(100), Some(0.99), "c1"));
        let stored = get(&db, created.id).await.unwrap();
        assert_eq!(stored.title, "job");
        assert_eq!(stored.company.handle, "c1");
    }

    #[actix_rt::test]
    async fn create_fails_with_unknown_company() {
        let db = fixtures::seeded();
        let new_job = NewJob {
            title: "j4".to_owned(),
            salary: Some(100),
            equity: Some(0.99),
            company_handle: "bad".to_owned(),
        };

        let err = create(&db, new_job).await.unwrap_err();
        assert!(matches!(err, JoblyError::InvalidRequest { .. }));
        assert_eq!(err.to_string(), "No company: bad");
    }

    #[actix_rt::test]
    async fn find_all_orders_by_title() {
        let db = fixtures::seeded();

        assert_eq!(find_all(&db).await.unwrap(), all_jobs());
    }

    #[actix_rt::test]
    async fn find_by_filter_without_filter_returns_everything() {
        let db = fixtures::seeded();

        let jobs = find_by_filter(&db, &JobFilter::default(), FilterStyle::Parameterized)
            .await
            .unwrap();
        assert_eq!(jobs, all_jobs());

        let jobs = find_by_filter(&db, &filter(None, None, Some(false)), FilterStyle::Parameterized)
            .await
            .unwrap();
        assert_eq!(jobs, all_jobs());
    }

    #[actix_rt::test]
    async fn find_by_filter_in_both_styles() {
        let db = fixtures::seeded();
        let cases = vec![
            (filter(Some("j1"), None, None), vec!["j1"]),
            (filter(None, Some(1000), None), vec!["j2", "j3"]),
            (filter(None, None, Some(true)), vec!["j1", "j2"]),
            (filter(Some("j1"), Some(1), Some(true)), vec!["j1"]),
            (filter(Some("j3"), Some(5000), Some(true)), vec![]),
        ];

        for style in vec![FilterStyle::Parameterized, FilterStyle::Interpolated] {
            for (job_filter, expected) in &cases {
                let jobs = find_by_filter(&db, job_filter, style).await.unwrap();
                assert_eq!(&titles(&jobs), expected, "{:?} {:?}", style, job_filter);
            }
        }
    }

    #[actix_rt::test]
    async fn parameterized_filter_treats_quotes_as_data() {
        let db = fixtures::seeded();

        let jobs = find_by_filter(
            &db,
            &filter(Some("j1' OR '1'='1"), None, None),
            FilterStyle::Parameterized,
        )
        .await
        .unwrap();

        assert!(jobs.is_empty());
    }

    #[actix_rt::test]
    async fn get_nests_the_company() {
        let db = fixtures::seeded();

        let job = get(&db, 1).await.unwrap();

        assert_eq!(
            job,
            JobDetail {
                id: 1,
                title: "j1".to_owned(),
                salary: Some(1),
                equity: Some(0.01),
                company: Company {
                    handle: "c1".to_owned(),
                    name: "C1".to_owned(),
                    description: "Desc1".to_owned(),
                    num_employees: Some(1),
                    logo_url: Some("http://c1.img".to_owned()),
                },
            }
        );
    }

    #[actix_rt::test]
    async fn get_reflects_the_current_company_row() {
        let db = fixtures::seeded();
        let mut changes = PartialUpdate::new();
        changes.set("name", fields::text("Renamed"));
        company::update(&db, "c1", &changes).await.unwrap();

        let job = get(&db, 1).await.unwrap();
        assert_eq!(job.company.name, "Renamed");
    }

    #[actix_rt::test]
    async fn get_fails_for_unknown_id() {
        let db = fixtures::seeded();

        let err = get(&db, 0).await.unwrap_err();
        assert!(matches!(err, JoblyError::NotFound { .. }));
        assert_eq!(err.to_string(), "No job: 0");
    }

    #[actix_rt::test]
    async fn update_works() {
        let db = fixtures::seeded();
        let changes = JobUpdate {
            title: Some("new".to_owned()),
            salary: Some(Some(999)),
            equity: Some(Some(0.99)),
        };

        let updated = update(&db, 1, &changes.into_partial_update()).await.unwrap();

        assert_eq!(updated, job(1, "new", Some(999), Some(0.99), "c1"));
        let stored = find_all(&db).await.unwrap();
        assert_eq!(stored.iter().find(|job| job.id == 1), Some(&updated));
        assert_eq!(titles(&stored), vec!["j2", "j3", "j4", "new"]);
    }

    #[actix_rt::test]
    async fn update_sets_nulls() {
        let db = fixtures::seeded();
        let changes = JobUpdate {
            title: Some("new".to_owned()),
            salary: Some(None),
            equity: Some(None),
        };

        let updated = update(&db, 1, &changes.into_partial_update()).await.unwrap();

        assert_eq!(updated, job(1, "new", None, None, "c1"));
    }

    #[actix_rt::test]
    async fn update_fails_for_unknown_id() {
        let db = fixtures::seeded();
        let mut changes = PartialUpdate::new();
        changes.set("title", fields::text("x"));

        let err = update(&db, 0, &changes).await.unwrap_err();
        assert!(matches!(err, JoblyError::NotFound { .. }));
    }

    #[actix_rt::test]
    async fn update_fails_without_data() {
        let db = fixtures::seeded();

        let err = update(&db, 1, &PartialUpdate::new()).await.unwrap_err();
        assert!(matches!(err, JoblyError::InvalidRequest { .. }));
    }

    #[actix_rt::test]
    async fn remove_works() {
        let db = fixtures::seeded();

        remove(&db, 1).await.unwrap();

        assert!(matches!(get(&db, 1).await, Err(JoblyError::NotFound { .. })));
        assert_eq!(find_all(&db).await.unwrap().len(), 3);
    }

    #[actix_rt::test]
    async fn remove_fails_for_unknown_id() {
        let db = fixtures::seeded();

        let err = remove(&db, 0).await.unwrap_err();
        assert!(matches!(err, JoblyError::NotFound { .. }));
    }
}
