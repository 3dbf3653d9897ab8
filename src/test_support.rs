use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::accounts::repo_types::{seed_skills, seed_social, Account};

/// An account as the resolver would have created it, for seeding stores in
/// tests.
pub fn account_fixture(username: &str, email: Option<&str>) -> Account {
    Account {
        id: Uuid::new_v4(),
        name: username.to_string(),
        username: username.to_string(),
        email: email.map(str::to_string),
        profile_pic: String::new(),
        provider: "github".to_string(),
        social_id: format!("sid-{username}"),
        admin: false,
        category: "dev".to_string(),
        city: None,
        country: None,
        skills: Json(seed_skills()),
        social: Json(seed_social()),
        event_ids: Json(Vec::new()),
        referrals: Json(Vec::new()),
        created_at: OffsetDateTime::now_utc(),
    }
}
