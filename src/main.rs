use actix::Actor;
use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::{fs, process};

#[macro_use]
extern crate log;

mod auth;
mod cli;
mod company;
mod database;
mod errors;
mod fields;
mod handlers;
mod job;
mod sql;

use errors::JoblyError;
use sql::FilterStyle;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATABASE_DIR: &str = "~/.jobly";

/// Contents of the `.joblyrc` file. Command line arguments win over it.
#[derive(Debug, Default, Deserialize)]
struct JoblyFile {
    port: Option<u16>,
    secret: Option<String>,
    database: Option<String>,
    interpolate_filters: Option<bool>,
}

pub struct Context {
    pub secret: String,
    pub filter_style: FilterStyle,
}

fn read_jobly_file(path: &str) -> Result<JoblyFile, JoblyError> {
    if !Path::new(path).exists() {
        debug!("No config file at {}, using defaults", path);
        return Ok(JoblyFile::default());
    }

    let content =
        fs::read_to_string(path).map_err(|err| JoblyError::ReadJoblyFile { source: err })?;

    toml::from_str(&content).map_err(|err| JoblyError::ParseJoblyFile { source: err })
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    let matches = cli::ask().get_matches();

    let log_filter = if matches.get_flag("verbose") {
        "jobly=debug,actix_web=info"
    } else {
        "jobly=info,actix_web=info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter)).init();

    let config_path = matches
        .get_one::<String>("config")
        .map(|path| shellexpand::tilde(path).into_owned())
        .unwrap_or_else(|| ".joblyrc".to_owned());

    let jobly_file = match read_jobly_file(&config_path) {
        Ok(jobly_file) => jobly_file,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    let secret = match matches
        .get_one::<String>("secret")
        .cloned()
        .or_else(|| jobly_file.secret.clone())
    {
        Some(secret) => secret,
        None => {
            eprintln!("Secret is required");
            process::exit(1);
        }
    };

    match matches.subcommand() {
        Some(("token", token_matches)) => {
            let user = auth::User {
                username: token_matches
                    .get_one::<String>("username")
                    .cloned()
                    .unwrap_or_default(),
                is_admin: token_matches.get_flag("admin"),
            };
            let duration = token_matches
                .get_one::<i64>("duration")
                .copied()
                .unwrap_or(43800);

            match auth::create_token(&secret, user, duration) {
                Ok(token) => println!("Bearer {}", token),
                Err(err) => eprintln!("{}", err),
            }
            Ok(())
        }
        Some(("serve", serve_matches)) => {
            let port = serve_matches
                .get_one::<u16>("port")
                .copied()
                .or(jobly_file.port)
                .unwrap_or(DEFAULT_PORT);

            let database_dir = serve_matches
                .get_one::<String>("database")
                .cloned()
                .or(jobly_file.database)
                .unwrap_or_else(|| DEFAULT_DATABASE_DIR.to_owned());
            let database_dir = shellexpand::tilde(&database_dir).into_owned();

            let filter_style = if serve_matches.get_flag("interpolate-filters")
                || jobly_file.interpolate_filters.unwrap_or(false)
            {
                warn!("Filter values are interpolated into SQL text, queries are open to injection");
                FilterStyle::Interpolated
            } else {
                FilterStyle::Parameterized
            };

            serve(port, &database_dir, secret, filter_style).await
        }
        _ => Ok(()),
    }
}

async fn serve(
    port: u16,
    database_dir: &str,
    secret: String,
    filter_style: FilterStyle,
) -> std::io::Result<()> {
    let database = match database::Database::new(database_dir) {
        Ok(database) => web::Data::new(database.start()),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    let context = web::Data::new(Context {
        secret,
        filter_style,
    });

    let localhost = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
    let socket = SocketAddr::new(localhost, port);

    info!("Starting Jobly at {}", &socket);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(context.clone())
            .app_data(database.clone())
            .configure(handlers::config)
    })
    .bind(socket)?
    .run()
    .await
}
