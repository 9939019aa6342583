use crate::{api::models::users::CurrentUser, auth::session, errors::{Error, Result}, AppState};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract user from JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie present
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Session cookie present but invalid/malformed
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }))
        }
    };
    let cookie_name = &config.auth.native.session.cookie_name;

    let mut saw_stale_cookie = false;
    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                match session::verify_session_token(value, config) {
                    Ok(user) => return Some(Ok(user)),
                    Err(_) => {
                        // Expired or invalid token; keep scanning the header,
                        // a stale cookie is an expected condition
                        saw_stale_cookie = true;
                        continue;
                    }
                }
            }
        }
    }

    if saw_stale_cookie {
        // Clear the stale cookie so the client stops re-sending it
        return Some(Err(Error::SessionExpired {
            cookie: session::expired_session_cookie(config),
        }));
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        if state.config.auth.native.enabled {
            match try_jwt_session_auth(parts, &state.config) {
                Some(Ok(user)) => {
                    debug!("Found JWT session authenticated user: {}", user.id);
                    return Ok(user);
                }
                Some(Err(e)) => {
                    trace!("JWT session authentication failed: {:?}", e);
                    return Err(e);
                }
                None => {
                    trace!("No JWT session authentication attempted");
                }
            }
        }

        Err(Error::Unauthenticated { message: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::auth::session::create_session_token;
    use crate::config::Config;
    use uuid::Uuid;

    fn test_config() -> Config {
        Config {
            secret_key: Some("test-secret-key-for-jwt".to_string()),
            ..Default::default()
        }
    }

    fn parts_with_cookie(cookie: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(axum::http::header::COOKIE, cookie)
            .body(())
            .unwrap();
        let (parts, _body) = request.into_parts();
        parts
    }

    #[test]
    fn test_valid_session_cookie_is_extracted() {
        let config = test_config();
        let user = CurrentUser {
            id: Uuid::new_v4(),
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            role: Role::Sindico,
        };
        let token = create_session_token(&user, &config).unwrap();
        let cookie_name = &config.auth.native.session.cookie_name;

        let parts = parts_with_cookie(&format!("other=1; {cookie_name}={token}"));
        let result = try_jwt_session_auth(&parts, &config).unwrap().unwrap();
        assert_eq!(result.id, user.id);
        assert_eq!(result.role, Role::Sindico);
    }

    #[test]
    fn test_garbage_session_cookie_is_rejected_and_cleared() {
        let config = test_config();
        let cookie_name = &config.auth.native.session.cookie_name;

        let parts = parts_with_cookie(&format!("{cookie_name}=not-a-jwt"));
        let err = try_jwt_session_auth(&parts, &config).unwrap().unwrap_err();
        match err {
            Error::SessionExpired { cookie } => {
                assert!(cookie.starts_with(&format!("{cookie_name}=;")));
                assert!(cookie.contains("Max-Age=0"));
            }
            other => panic!("expected SessionExpired, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_cookie_header_yields_none() {
        let config = test_config();
        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (parts, _body) = request.into_parts();

        assert!(try_jwt_session_auth(&parts, &config).is_none());
    }
}
