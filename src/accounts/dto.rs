use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provider-agnostic profile shape produced by the extraction table from a
/// raw provider payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedProfile {
    pub name: String,
    pub profile_pic: String,
    pub email: Option<String>,
    pub admin: bool,
}

/// Query parameters accepted by the social-login endpoint.
#[derive(Debug, Deserialize)]
pub struct SocialLoginQuery {
    /// Referral code from the signup link. The upstream client sends the
    /// literal string "null" when there is none.
    pub referrer: Option<String>,
}

/// Query parameters for the profile search endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search_text: Option<String>,
    pub user_id: Option<Uuid>,
}

/// Projection of an account returned from the referrals listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub name: String,
    pub username: String,
    pub profile_pic: String,
}
