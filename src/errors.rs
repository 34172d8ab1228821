use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;

#[derive(thiserror::Error, Debug)]
pub enum JoblyError {
    #[error("{message}")]
    InvalidRequest { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Unauthorized")]
    MissingToken {},

    #[error("Unauthorized")]
    Authenticate { source: jsonwebtoken::errors::Error },

    #[error("Failed to read application context")]
    ReadContext {},

    #[error("Failed to read Jobly file, {}", source)]
    ReadJoblyFile { source: std::io::Error },

    #[error("Failed to parse Jobly file, {}", source)]
    ParseJoblyFile { source: toml::de::Error },

    #[error("Failed to create database directory, {}", source)]
    CreateDatabaseDir { source: std::io::Error },

    #[error("Failed to open the database, {}", source)]
    OpenDatabase { source: rusqlite::Error },

    #[error("Failed to run database migrations, {}", source)]
    Migrate { source: refinery::Error },

    #[error("Failed to query the database, {}", source)]
    Database { source: rusqlite::Error },

    #[error("Failed to reach the database, {}", source)]
    DatabaseMailbox { source: actix::MailboxError },

    #[error("Failed to create token, {}", source)]
    CreateToken { source: jsonwebtoken::errors::Error },
}

impl JoblyError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        JoblyError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        JoblyError::NotFound {
            message: message.into(),
        }
    }

    /// Constraint violations are caused by the request payload, everything
    /// else coming out of SQLite is a server failure.
    pub fn from_database(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, _) = &err {
            if failure.code == rusqlite::ErrorCode::ConstraintViolation {
                return JoblyError::invalid_request(err.to_string());
            }
        }

        JoblyError::Database { source: err }
    }
}

impl actix_web::error::ResponseError for JoblyError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(json!({
            "error": {
                "message": self.to_string(),
                "status": status.as_u16(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            JoblyError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            JoblyError::NotFound { .. } => StatusCode::NOT_FOUND,
            JoblyError::Unauthorized {}
            | JoblyError::MissingToken {}
            | JoblyError::Authenticate { .. } => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
