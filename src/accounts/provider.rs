use serde_json::Value;

use crate::accounts::dto::NormalizedProfile;

/// Social-login providers the platform accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Facebook,
    Github,
    Twitter,
    Google,
}

impl Provider {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "facebook" => Some(Self::Facebook),
            "github" => Some(Self::Github),
            "twitter" => Some(Self::Twitter),
            "google" => Some(Self::Google),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Github => "github",
            Self::Twitter => "twitter",
            Self::Google => "google",
        }
    }
}

/// Where to find the normalized-profile fields inside a provider's raw
/// payload. Adding a provider means adding a table row, not a branch.
struct FieldSpec {
    provider: Provider,
    /// Candidate name keys, first non-null wins (github: `name`, then `login`).
    name_keys: &'static [&'static str],
    /// JSON pointer to the avatar URL.
    picture_ptr: &'static str,
    /// Twitter withholds email; everyone else supplies it.
    supplies_email: bool,
}

static FIELD_SPECS: &[FieldSpec] = &[
    FieldSpec {
        provider: Provider::Facebook,
        name_keys: &["name"],
        picture_ptr: "/picture/data/url",
        supplies_email: true,
    },
    FieldSpec {
        provider: Provider::Github,
        name_keys: &["name", "login"],
        picture_ptr: "/avatar_url",
        supplies_email: true,
    },
    FieldSpec {
        provider: Provider::Twitter,
        name_keys: &["name"],
        picture_ptr: "/profile_image_url_https",
        supplies_email: false,
    },
    FieldSpec {
        provider: Provider::Google,
        name_keys: &["name"],
        picture_ptr: "/picture",
        supplies_email: true,
    },
];

fn spec_for(provider: Provider) -> &'static FieldSpec {
    FIELD_SPECS
        .iter()
        .find(|s| s.provider == provider)
        .expect("every provider has a field spec")
}

/// Pull the provider-agnostic profile out of a raw provider payload.
pub fn extract(provider: Provider, payload: &Value) -> NormalizedProfile {
    let spec = spec_for(provider);

    let name = spec
        .name_keys
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    let profile_pic = payload
        .pointer(spec.picture_ptr)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let email = if spec.supplies_email {
        payload
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string)
    } else {
        None
    };

    let admin = payload
        .get("admin")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    NormalizedProfile {
        name,
        profile_pic,
        email,
        admin,
    }
}

/// The raw payload's `id` field, stringified. Some providers send numeric ids.
pub fn social_id(payload: &Value) -> String {
    match payload.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
