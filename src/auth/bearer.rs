use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::AuthError;

/// Extract the bearer token from the Authorization header.
/// Header lookup is case-insensitive and so is the scheme name.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::Malformed)?;

    let (scheme, token) = auth_str.split_once(' ').ok_or_else(|| {
        if auth_str.eq_ignore_ascii_case("bearer") {
            AuthError::EmptyToken
        } else {
            AuthError::NotBearer
        }
    })?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::NotBearer);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_token() {
        let headers = headers_with("Bearer a.b.c");
        assert_eq!(extract_bearer_token(&headers), Ok("a.b.c"));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let headers = headers_with("bearer a.b.c");
        assert_eq!(extract_bearer_token(&headers), Ok("a.b.c"));
    }

    #[test]
    fn header_name_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer x.y.z"));
        assert_eq!(extract_bearer_token(&headers), Ok("x.y.z"));
    }

    #[test]
    fn rejects_missing_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), Err(AuthError::MissingHeader));
    }

    #[test]
    fn rejects_other_schemes() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert_eq!(extract_bearer_token(&headers), Err(AuthError::NotBearer));
        let headers = headers_with("a.b.c");
        assert_eq!(extract_bearer_token(&headers), Err(AuthError::NotBearer));
    }

    #[test]
    fn rejects_empty_token() {
        assert_eq!(extract_bearer_token(&headers_with("Bearer")), Err(AuthError::EmptyToken));
        assert_eq!(extract_bearer_token(&headers_with("Bearer   ")), Err(AuthError::EmptyToken));
    }
}
