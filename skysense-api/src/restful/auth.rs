use serde::{Deserialize, Serialize};

use crate::models::UserProfile;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plain-text password, TLS carries it
    pub password: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token for subsequent requests
    pub token: String,
    /// Authenticated account
    pub user: UserProfile,
}
