use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument, warn};

use crate::{
    accounts::{
        dto::{PublicProfile, SearchQuery, SocialLoginQuery},
        credential::CredentialIssuer,
        extractors::AuthUser,
        provider::{self, Provider},
        repo_types::Account,
        services::{account_by_username, AccountResolver, ResolveError},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/social/:provider", post(social_login))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/referrals", get(my_referrals))
        .route("/profiles", get(search_profiles))
        .route("/profiles/:username", get(profile_by_username))
}

#[instrument(skip(state, payload))]
async fn social_login(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<SocialLoginQuery>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let provider = Provider::parse(&provider).ok_or_else(|| {
        warn!(provider = %provider, "unknown social provider");
        (StatusCode::BAD_REQUEST, format!("Unknown provider {provider}"))
    })?;

    let social_id = provider::social_id(&payload);
    let profile = provider::extract(provider, &payload);

    let resolver = AccountResolver::new(
        state.store.clone(),
        state.rewards.clone(),
        CredentialIssuer::from_ref(&state),
    );
    let resolution = resolver
        .resolve(provider, profile, &social_id, query.referrer.as_deref())
        .await
        .map_err(|e| {
            error!(error = %e, provider = provider.as_str(), "social auth resolution failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "Error retrieving user with {} id {}",
                    provider.as_str(),
                    social_id
                ),
            )
        })?;

    let body = resolution.merged_body().map_err(|e| {
        error!(error = %e, "response serialization failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Some error occurred while creating the user.".to_string(),
        )
    })?;
    Ok(Json(body))
}

#[instrument(skip(state, claims))]
async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Account>, (StatusCode, String)> {
    let account = account_by_username(state.store.as_ref(), &claims.username)
        .await
        .map_err(|e| status_for(e, &claims.username))?;
    Ok(Json(account))
}

#[instrument(skip(state, claims))]
async fn my_referrals(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<PublicProfile>>, (StatusCode, String)> {
    let account = account_by_username(state.store.as_ref(), &claims.username)
        .await
        .map_err(|e| status_for(e, &claims.username))?;

    let mut profiles = Vec::with_capacity(account.referrals.0.len());
    for referral in &account.referrals.0 {
        match state.store.find_by_username(&referral.username).await {
            Ok(Some(referred)) => profiles.push(PublicProfile {
                name: referred.name,
                username: referred.username,
                profile_pic: referred.profile_pic,
            }),
            Ok(None) => warn!(username = %referral.username, "referred account missing"),
            Err(e) => {
                error!(error = %e, "referral lookup failed");
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Some error occurred while getting user referrals.".to_string(),
                ));
            }
        }
    }
    Ok(Json(profiles))
}

#[instrument(skip(state))]
async fn profile_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Account>, (StatusCode, String)> {
    let account = account_by_username(state.store.as_ref(), &username)
        .await
        .map_err(|e| status_for(e, &username))?;
    Ok(Json(account))
}

#[instrument(skip(state))]
async fn search_profiles(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Account>>, (StatusCode, String)> {
    let result = if let Some(text) = query.search_text.as_deref() {
        let pattern = format!("%{}%", text.replace('%', r"\%").replace('_', r"\_"));
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, username, email, profile_pic, provider, social_id, admin,
                   category, city, country, skills, social, event_ids, referrals, created_at
            FROM users
            WHERE name ILIKE $1 OR username ILIKE $1
            "#,
        )
        .bind(pattern)
        .fetch_all(&state.db)
        .await
    } else if let Some(user_id) = query.user_id {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, username, email, profile_pic, provider, social_id, admin,
                   category, city, country, skills, social, event_ids, referrals, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&state.db)
        .await
    } else {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, username, email, profile_pic, provider, social_id, admin,
                   category, city, country, skills, social, event_ids, referrals, created_at
            FROM users
            "#,
        )
        .fetch_all(&state.db)
        .await
    };

    match result {
        Ok(accounts) => Ok(Json(accounts)),
        Err(e) => {
            error!(error = %e, "profile search failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Some error occurred while retrieving users.".to_string(),
            ))
        }
    }
}

fn status_for(err: ResolveError, username: &str) -> (StatusCode, String) {
    match err {
        ResolveError::NotFound => (
            StatusCode::NOT_FOUND,
            format!("user not found with username {username}"),
        ),
        other => {
            error!(error = %other, "account lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error retrieving user with username {username}"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::credential::Claims;
    use crate::store::{AccountStore, MemoryAccountStore};
    use crate::test_support::account_fixture;
    use std::sync::Arc;

    #[tokio::test]
    async fn me_returns_404_for_unknown_username() {
        let state = AppState::fake();
        let claims = Claims {
            email: None,
            username: "ghost".into(),
            admin: false,
        };
        let err = get_me(State(state), AuthUser(claims)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn referrals_listing_projects_public_fields() {
        let store = Arc::new(MemoryAccountStore::new());
        let mut referrer = account_fixture("referrer", Some("ref@example.com"));
        referrer.referrals.0.push(crate::accounts::repo_types::Referral {
            username: "adalovelace".into(),
            created_at: time::OffsetDateTime::now_utc(),
        });
        store.insert(referrer).await.unwrap();
        store
            .insert(account_fixture("adalovelace", None))
            .await
            .unwrap();

        let state = AppState::fake_with_store(store);
        let claims = Claims {
            email: None,
            username: "referrer".into(),
            admin: false,
        };
        let Json(profiles) = my_referrals(State(state), AuthUser(claims)).await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].username, "adalovelace");
    }
}
