use actix::prelude::*;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::fs;
use std::path::Path;

use crate::errors::JoblyError;

mod migrate {
    use refinery::embed_migrations;
    embed_migrations!("src/database/migrations");
}

const DATABASE_FILE: &str = "jobly-database.db";

pub struct Database {
    connection: rusqlite::Connection,
}

impl Database {
    pub fn new(path: &str) -> Result<Self, JoblyError> {
        fs::create_dir_all(path).map_err(|err| JoblyError::CreateDatabaseDir { source: err })?;

        let database_path = Path::new(path).join(DATABASE_FILE);
        debug!("Opening database at {}", database_path.display());
        let connection = Connection::open(database_path)
            .map_err(|err| JoblyError::OpenDatabase { source: err })?;

        Self::prepare(connection)
    }

    pub fn in_memory() -> Result<Self, JoblyError> {
        let connection =
            Connection::open_in_memory().map_err(|err| JoblyError::OpenDatabase { source: err })?;

        Self::prepare(connection)
    }

    fn prepare(mut connection: Connection) -> Result<Self, JoblyError> {
        connection
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|err| JoblyError::OpenDatabase { source: err })?;

        debug!("Running database migrations");
        migrate::migrations::runner()
            .run(&mut connection)
            .map_err(|err| JoblyError::Migrate { source: err })?;

        Ok(Self { connection })
    }
}

impl Actor for Database {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        debug!("Connected to the database");
    }

    fn stopped(&mut self, _ctx: &mut Context<Self>) {
        debug!("Disconnected from database");
    }
}

/// Runs `query` with `params` bound to its placeholders in order and maps
/// every returned row with `map_result`.
pub struct Query<T, F>
where
    T: Send + 'static,
    F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
{
    pub query: String,
    pub params: Vec<Value>,
    pub map_result: F,
}

impl<T, F> Message for Query<T, F>
where
    T: Send + 'static,
    F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
{
    type Result = rusqlite::Result<Vec<T>>;
}

impl<T, F> Handler<Query<T, F>> for Database
where
    T: Send + 'static,
    F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
{
    type Result = rusqlite::Result<Vec<T>>;

    fn handle(&mut self, query: Query<T, F>, _ctx: &mut Context<Self>) -> Self::Result {
        let mut statement = self.connection.prepare(query.query.as_str())?;
        let result: rusqlite::Result<Vec<T>> = statement
            .query_map(params_from_iter(query.params), query.map_result)?
            .collect();

        result
    }
}

pub async fn query<T, F>(
    database: &Addr<Database>,
    query: &str,
    params: Vec<Value>,
    map_result: F,
) -> Result<Vec<T>, JoblyError>
where
    T: Send + 'static,
    F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
{
    debug!("Running query: {}", query.trim());

    database
        .send(Query {
            query: query.to_owned(),
            params,
            map_result,
        })
        .await
        .map_err(|err| JoblyError::DatabaseMailbox { source: err })?
        .map_err(JoblyError::from_database)
}

/// Runs a statement that returns no rows and resolves to the number of
/// rows it changed.
pub struct Execute {
    pub query: String,
    pub params: Vec<Value>,
}

impl Message for Execute {
    type Result = rusqlite::Result<usize>;
}

impl Handler<Execute> for Database {
    type Result = rusqlite::Result<usize>;

    fn handle(&mut self, execute: Execute, _ctx: &mut Context<Self>) -> Self::Result {
        self.connection
            .execute(execute.query.as_str(), params_from_iter(execute.params))
    }
}

pub async fn execute(
    database: &Addr<Database>,
    query: &str,
    params: Vec<Value>,
) -> Result<usize, JoblyError> {
    debug!("Running statement: {}", query.trim());

    database
        .send(Execute {
            query: query.to_owned(),
            params,
        })
        .await
        .map_err(|err| JoblyError::DatabaseMailbox { source: err })?
        .map_err(JoblyError::from_database)
}

#[cfg(test)]
pub mod fixtures {
    use super::*;

    const SEED: &str = "
        INSERT INTO companies (handle, name, num_employees, description, logo_url)
        VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
               ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
               ('c3', 'C3', 3, 'Desc3', 'http://c3.img');

        INSERT INTO jobs (title, salary, equity, company_handle)
        VALUES ('j1', 1, 0.01, 'c1'),
               ('j2', 10000, 0.5, 'c1'),
               ('j3', 1000, 0.0, 'c2'),
               ('j4', NULL, NULL, 'c2');
    ";

    /// In-memory database holding companies c1..c3 and jobs j1..j4 (ids 1..4).
    /// Must be called from inside a running actix system.
    pub fn seeded() -> Addr<Database> {
        let database = Database::in_memory().unwrap();
        database.connection.execute_batch(SEED).unwrap();
        database.start()
    }
}
