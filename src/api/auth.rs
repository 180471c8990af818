use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

/// Set by the upstream auth proxy: opaque staff id
pub const IDENTITY_HEADER: &str = "x-staff-identity";
/// Set by the upstream auth proxy: `true` for tournament admins
pub const ADMIN_HEADER: &str = "x-staff-admin";

#[derive(Debug, Clone, PartialEq)]
pub struct StaffIdentity {
    pub id: String,
    pub admin: bool,
}

impl StaffIdentity {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let id = headers
            .get(IDENTITY_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())?;
        let admin = headers
            .get(ADMIN_HEADER)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

        Some(Self {
            id: id.to_string(),
            admin,
        })
    }
}

/// 401 without an identity, 403 for non-admin staff
pub fn require_admin(headers: &HeaderMap) -> Result<StaffIdentity, Response> {
    match StaffIdentity::from_headers(headers) {
        None => Err((StatusCode::UNAUTHORIZED, "Missing staff identity").into_response()),
        Some(staff) if !staff.admin => {
            log::warn!("Staff {} attempted an admin action", staff.id);
            Err((StatusCode::FORBIDDEN, "Admin rights required").into_response())
        }
        Some(staff) => Ok(staff),
    }
}
