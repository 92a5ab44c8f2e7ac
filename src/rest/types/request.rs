use serde::Serialize;

/// Body of `POST /api/login`.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}
