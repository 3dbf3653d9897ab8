use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account record in the database. Serialized field names follow the
/// platform's external JSON contract (camelCase).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub username: String, // unique, immutable, credential subject
    pub email: Option<String>,
    pub profile_pic: String,
    pub provider: String,
    pub social_id: String,
    pub admin: bool,
    pub category: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub skills: Json<Vec<Skill>>,
    pub social: Json<Vec<SocialLink>>,
    pub event_ids: Json<Vec<String>>,
    pub referrals: Json<Vec<Referral>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    pub no_of_years: u32,
    pub rating: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialLink {
    pub label: String,
    pub value: String,
}

/// One entry in an account's `referrals` list: who this account referred
/// and when. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const SKILL_CATALOG: &[&str] = &[
    "JS",
    "HTML5",
    "CSS",
    "React",
    "Angular",
    "Vue",
    "Web Components",
    "Website Design",
    "Android",
    "iOS",
];

const SOCIAL_LABELS: &[&str] = &[
    "Github",
    "Twitter",
    "LinkedIn",
    "Bitbucket",
    "Medium",
    "Website",
    "Stack Overflow",
];

/// Default skill list seeded on every new account.
pub fn seed_skills() -> Vec<Skill> {
    SKILL_CATALOG
        .iter()
        .map(|name| Skill {
            name: (*name).to_string(),
            no_of_years: 0,
            rating: 0,
        })
        .collect()
}

/// Default social-link slots seeded on every new account.
pub fn seed_social() -> Vec<SocialLink> {
    SOCIAL_LABELS
        .iter()
        .map(|label| SocialLink {
            label: (*label).to_string(),
            value: String::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_defaults_match_catalog() {
        let skills = seed_skills();
        assert_eq!(skills.len(), 10);
        assert!(skills.iter().all(|s| s.no_of_years == 0 && s.rating == 0));

        let social = seed_social();
        assert_eq!(social.len(), 7);
        assert!(social.iter().all(|s| s.value.is_empty()));
        assert_eq!(social[0].label, "Github");
    }

    #[test]
    fn account_serializes_camel_case() {
        let account = Account {
            id: Uuid::new_v4(),
            name: "Ada Lovelace".into(),
            username: "adalovelace".into(),
            email: None,
            profile_pic: "https://example.com/pic.png".into(),
            provider: "twitter".into(),
            social_id: "12345".into(),
            admin: false,
            category: "dev".into(),
            city: None,
            country: None,
            skills: Json(seed_skills()),
            social: Json(seed_social()),
            event_ids: Json(vec![]),
            referrals: Json(vec![]),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("socialId").is_some());
        assert!(json.get("profilePic").is_some());
        assert!(json.get("eventIds").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("social_id").is_none());
    }
}
