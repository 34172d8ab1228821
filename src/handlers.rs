use actix::Addr;
use actix_web::error::QueryPayloadError;
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

use crate::auth::Admin;
use crate::company::{self, CompanyUpdate, NewCompany};
use crate::database::Database;
use crate::errors::JoblyError;
use crate::job::{self, JobUpdate, NewJob};
use crate::sql::{CompanyFilter, JobFilter};
use crate::Context;

type Db = web::Data<Addr<Database>>;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            JoblyError::invalid_request(err.to_string()).into()
        }))
        .service(healthz)
        .service(info)
        .service(create_company)
        .service(list_companies)
        .service(get_company)
        .service(update_company)
        .service(delete_company)
        .service(create_job)
        .service(list_jobs)
        .service(get_job)
        .service(update_job)
        .service(delete_job);
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = err.to_string();
    if message.contains("unknown field") {
        JoblyError::invalid_request("query contains unexpected parameters").into()
    } else {
        JoblyError::invalid_request(message).into()
    }
}

#[get("/healthz")]
async fn healthz() -> impl Responder {
    HttpResponse::Ok().body("200 Ok")
}

#[get("/info")]
async fn info() -> impl Responder {
    HttpResponse::Ok().json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

#[post("/companies")]
async fn create_company(
    _admin: Admin,
    db: Db,
    body: web::Json<NewCompany>,
) -> Result<HttpResponse, JoblyError> {
    body.validate()?;
    let company = company::create(db.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({ "company": company })))
}

#[get("/companies")]
async fn list_companies(
    db: Db,
    ctx: web::Data<Context>,
    filter: web::Query<CompanyFilter>,
) -> Result<HttpResponse, JoblyError> {
    filter.validate()?;
    let companies = company::find_by_filter(db.get_ref(), &filter, ctx.filter_style).await?;

    Ok(HttpResponse::Ok().json(json!({ "companies": companies })))
}

#[get("/companies/{handle}")]
async fn get_company(db: Db, handle: web::Path<String>) -> Result<HttpResponse, JoblyError> {
    let company = company::get(db.get_ref(), &handle).await?;

    Ok(HttpResponse::Ok().json(json!({ "company": company })))
}

#[patch("/companies/{handle}")]
async fn update_company(
    _admin: Admin,
    db: Db,
    handle: web::Path<String>,
    body: web::Json<CompanyUpdate>,
) -> Result<HttpResponse, JoblyError> {
    body.validate()?;
    let data = body.into_inner().into_partial_update();
    let company = company::update(db.get_ref(), &handle, &data).await?;

    Ok(HttpResponse::Ok().json(json!({ "company": company })))
}

#[delete("/companies/{handle}")]
async fn delete_company(
    _admin: Admin,
    db: Db,
    handle: web::Path<String>,
) -> Result<HttpResponse, JoblyError> {
    company::remove(db.get_ref(), &handle).await?;

    Ok(HttpResponse::Ok().json(json!({ "deleted": handle.into_inner() })))
}

#[post("/jobs")]
async fn create_job(
    _admin: Admin,
    db: Db,
    body: web::Json<NewJob>,
) -> Result<HttpResponse, JoblyError> {
    body.validate()?;
    let job = job::create(db.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({ "job": job })))
}

#[get("/jobs")]
async fn list_jobs(
    db: Db,
    ctx: web::Data<Context>,
    filter: web::Query<JobFilter>,
) -> Result<HttpResponse, JoblyError> {
    let jobs = job::find_by_filter(db.get_ref(), &filter, ctx.filter_style).await?;

    Ok(HttpResponse::Ok().json(json!({ "jobs": jobs })))
}

#[get("/jobs/{id}")]
async fn get_job(db: Db, id: web::Path<i64>) -> Result<HttpResponse, JoblyError> {
    let job = job::get(db.get_ref(), *id).await?;

    Ok(HttpResponse::Ok().json(json!({ "job": job })))
}

#[patch("/jobs/{id}")]
async fn update_job(
    _admin: Admin,
    db: Db,
    id: web::Path<i64>,
    body: web::Json<JobUpdate>,
) -> Result<HttpResponse, JoblyError> {
    body.validate()?;
    let data = body.into_inner().into_partial_update();
    let job = job::update(db.get_ref(), *id, &data).await?;

    Ok(HttpResponse::Ok().json(json!({ "job": job })))
}

#[delete("/jobs/{id}")]
async fn delete_job(
    _admin: Admin,
    db: Db,
    id: web::Path<i64>,
) -> Result<HttpResponse, JoblyError> {
    job::remove(db.get_ref(), *id).await?;

    Ok(HttpResponse::Ok().json(json!({ "deleted": *id })))
}
