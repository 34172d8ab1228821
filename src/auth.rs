use actix_web::dev::Payload;
use actix_web::http::header::Header;
use actix_web::{web, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use futures::future;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::JoblyError;
use crate::Context;

const ISSUER: &str = "jobly:api";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub is_admin: bool,
}

impl FromRequest for User {
    type Error = JoblyError;
    type Future = future::Ready<Result<User, JoblyError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        future::ready(authenticate(req))
    }
}

/// A caller whose token carries admin rights.
#[derive(Debug)]
pub struct Admin(pub User);

impl FromRequest for Admin {
    type Error = JoblyError;
    type Future = future::Ready<Result<Admin, JoblyError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = authenticate(req).and_then(|user| {
            if user.is_admin {
                Ok(Admin(user))
            } else {
                debug!("Rejected non-admin user {}", user.username);
                Err(JoblyError::Unauthorized {})
            }
        });

        future::ready(result)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    exp: usize,  // Expiration time (as UTC timestamp)
    iat: usize,  // Issued at (as UTC timestamp)
    iss: String, // Issuer
    user: User,
}

fn authenticate(req: &HttpRequest) -> Result<User, JoblyError> {
    let context = req
        .app_data::<web::Data<Context>>()
        .ok_or(JoblyError::ReadContext {})?;

    let bearer = Authorization::<Bearer>::parse(req)
        .map_err(|_| JoblyError::MissingToken {})?
        .into_scheme();

    let mut validation = Validation::new(Algorithm::HS512);
    validation.set_issuer(&[ISSUER]);

    decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(context.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims.user)
    .map_err(|err| {
        debug!("Rejected token, {}", err);
        JoblyError::Authenticate { source: err }
    })
}

/// Signs a token for `user` valid for `duration` minutes.
pub fn create_token(secret: &str, user: User, duration: i64) -> Result<String, JoblyError> {
    let now = chrono::Utc::now();
    let claims = Claims {
        exp: (now + chrono::Duration::minutes(duration)).timestamp() as usize,
        iat: now.timestamp() as usize,
        iss: ISSUER.to_owned(),
        user,
    };

    encode(
        &JwtHeader::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| JoblyError::CreateToken { source: err })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sql::FilterStyle;
    use actix_web::test as web_test;

    fn context() -> web::Data<Context> {
        web::Data::new(Context {
            secret: "secret".to_owned(),
            filter_style: FilterStyle::Parameterized,
        })
    }

    fn user(is_admin: bool) -> User {
        User {
            username: "u1".to_owned(),
            is_admin,
        }
    }

    fn request_with(token: Option<String>) -> HttpRequest {
        let mut req = web_test::TestRequest::default().app_data(context());
        if let Some(token) = token {
            req = req.insert_header(("authorization", format!("Bearer {}", token)));
        }
        req.to_http_request()
    }

    #[test]
    fn accepts_tokens_signed_with_the_secret() {
        let token = create_token("secret", user(false), 10).unwrap();

        assert_eq!(authenticate(&request_with(Some(token))).unwrap(), user(false));
    }

    #[test]
    fn rejects_missing_and_foreign_tokens() {
        assert!(matches!(
            authenticate(&request_with(None)),
            Err(JoblyError::MissingToken {})
        ));

        let token = create_token("other", user(true), 10).unwrap();
        assert!(matches!(
            authenticate(&request_with(Some(token))),
            Err(JoblyError::Authenticate { .. })
        ));
    }

    #[test]
    fn rejects_headers_without_bearer_scheme() {
        let req = web_test::TestRequest::default()
            .app_data(context())
            .insert_header(("authorization", "Basic dTE6cGFzcw=="))
            .to_http_request();

        assert!(matches!(authenticate(&req), Err(JoblyError::MissingToken {})));
    }

    #[test]
    fn rejects_expired_tokens() {
        let token = create_token("secret", user(true), -10).unwrap();

        assert!(matches!(
            authenticate(&request_with(Some(token))),
            Err(JoblyError::Authenticate { .. })
        ));
    }

    #[actix_rt::test]
    async fn admin_requires_admin_flag() {
        let token = create_token("secret", user(false), 10).unwrap();
        let req = request_with(Some(token));
        assert!(matches!(
            Admin::extract(&req).await,
            Err(JoblyError::Unauthorized {})
        ));

        let token = create_token("secret", user(true), 10).unwrap();
        let req = request_with(Some(token));
        let Admin(admin) = Admin::extract(&req).await.unwrap();
        assert_eq!(admin, user(true));
    }
}
