//! Bearer-token identity layer and `/auth` handlers.
//!
//! Tokens are opaque 32-byte random values handed to the client as hex;
//! only their SHA-256 digest is persisted. Registered users and guests
//! authenticate identically once a token is issued.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/guest`    | Mint a guest identity + token |
//! | `POST` | `/auth/register` | Body: `{"username","password"}`; links a guest bearer if present |
//! | `POST` | `/auth/login`    | Body: `{"username","password"}` |
//! | `GET`  | `/auth/me`       | The authenticated player |

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{StatusCode, header, request::Parts},
};
use chrono::Utc;
use quizdeck_core::{
  Error as DomainError,
  generate::QuizGenerator,
  player::{AuthToken, Player, PlayerRef},
  store::GameStore,
};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Password hashing ────────────────────────────────────────────────────────

pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| {
      ApiError::Domain(DomainError::Storage(Box::from(format!(
        "argon2 error: {e}"
      ))))
    })?;
  Ok(hash.to_string())
}

/// PHC-string verification; any parse or mismatch is `Unauthorized`.
fn verify_password(password: &str, phc: &str) -> Result<(), ApiError> {
  let parsed = PasswordHash::new(phc).map_err(|_| ApiError::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| ApiError::Unauthorized)
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

fn token_digest(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Mint a fresh token, persist its digest, and return the cleartext token
/// for the client.
async fn issue_token<S, G>(
  state: &ApiState<S, G>,
  player_id: Uuid,
) -> Result<String, ApiError>
where
  S: GameStore,
  S::Error: Into<DomainError>,
  G: QuizGenerator,
{
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  let token = hex::encode(bytes);

  let now = Utc::now();
  state
    .store
    .insert_token(AuthToken {
      token_hash: token_digest(&token),
      player_id,
      issued_at: now,
      expires_at: now + state.token_ttl,
    })
    .await
    .map_err(|e| ApiError::Domain(e.into()))?;
  Ok(token)
}

async fn resolve_bearer<S, G>(
  parts: &Parts,
  state: &ApiState<S, G>,
) -> Result<Option<Player>, ApiError>
where
  S: GameStore,
  S::Error: Into<DomainError>,
  G: QuizGenerator,
{
  let Some(token) = parts
    .headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
  else {
    return Ok(None);
  };

  state
    .store
    .find_player_by_token(token_digest(token), Utc::now())
    .await
    .map_err(|e| ApiError::Domain(e.into()))
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// The authenticated player. Rejects with 401 when the bearer token is
/// missing, malformed, expired, or unknown.
pub struct CurrentPlayer(pub Player);

impl<S, G> FromRequestParts<ApiState<S, G>> for CurrentPlayer
where
  S: GameStore + 'static,
  S::Error: Into<DomainError>,
  G: QuizGenerator + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S, G>,
  ) -> Result<Self, Self::Rejection> {
    resolve_bearer(parts, state)
      .await?
      .map(CurrentPlayer)
      .ok_or(ApiError::Unauthorized)
  }
}

/// Like [`CurrentPlayer`] but never rejects: an absent or invalid token
/// resolves to `None`. Used by registration to pick up a guest identity.
pub struct MaybePlayer(pub Option<Player>);

impl<S, G> FromRequestParts<ApiState<S, G>> for MaybePlayer
where
  S: GameStore + 'static,
  S::Error: Into<DomainError>,
  G: QuizGenerator + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S, G>,
  ) -> Result<Self, Self::Rejection> {
    Ok(MaybePlayer(resolve_bearer(parts, state).await.unwrap_or(None)))
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
  pub token:  String,
  pub player: Player,
}

/// `POST /auth/guest` — mint an ephemeral identity, no body required.
pub async fn guest<S, G>(
  State(state): State<ApiState<S, G>>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError>
where
  S: GameStore + 'static,
  S::Error: Into<DomainError>,
  G: QuizGenerator + 'static,
{
  let suffix = Uuid::new_v4().simple().to_string();
  let player = state
    .store
    .create_guest(format!("Guest-{}", &suffix[..6]))
    .await
    .map_err(|e| ApiError::Domain(e.into()))?;

  tracing::info!(player_id = %player.player_id, "guest created");
  let token = issue_token(&state, player.player_id).await?;
  Ok((StatusCode::CREATED, Json(AuthResponse { token, player })))
}

/// `POST /auth/register`
///
/// When called with a valid guest bearer, the guest row is linked to the
/// new account; the guest player itself stays a guest and keeps its
/// sessions.
pub async fn register<S, G>(
  State(state): State<ApiState<S, G>>,
  MaybePlayer(existing): MaybePlayer,
  Json(body): Json<CredentialsBody>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError>
where
  S: GameStore + 'static,
  S::Error: Into<DomainError>,
  G: QuizGenerator + 'static,
{
  let username = body.username.trim();
  if username.is_empty() {
    return Err(DomainError::Validation("username must not be empty".into()).into());
  }
  if body.password.len() < 8 {
    return Err(
      DomainError::Validation("password must be at least 8 characters".into())
        .into(),
    );
  }

  let hash = hash_password(&body.password)?;
  let (user, player) = state
    .store
    .create_user(username.to_owned(), hash)
    .await
    .map_err(|e| ApiError::Domain(e.into()))?;

  if let Some(Player { backing: PlayerRef::Guest { guest_id }, .. }) = existing {
    state
      .store
      .link_guest_to_user(guest_id, user.user_id)
      .await
      .map_err(|e| ApiError::Domain(e.into()))?;
    tracing::info!(%guest_id, user_id = %user.user_id, "guest converted to user");
  }

  tracing::info!(user_id = %user.user_id, username, "user registered");
  let token = issue_token(&state, player.player_id).await?;
  Ok((StatusCode::CREATED, Json(AuthResponse { token, player })))
}

/// `POST /auth/login` — any credential failure is a uniform 401.
pub async fn login<S, G>(
  State(state): State<ApiState<S, G>>,
  Json(body): Json<CredentialsBody>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: GameStore + 'static,
  S::Error: Into<DomainError>,
  G: QuizGenerator + 'static,
{
  let user = state
    .store
    .find_user_by_username(body.username.trim().to_owned())
    .await
    .map_err(|e| ApiError::Domain(e.into()))?
    .ok_or(ApiError::Unauthorized)?;

  verify_password(&body.password, &user.password_hash)?;

  let player = state
    .store
    .find_player_for_user(user.user_id)
    .await
    .map_err(|e| ApiError::Domain(e.into()))?
    .ok_or(ApiError::Unauthorized)?;

  let token = issue_token(&state, player.player_id).await?;
  Ok(Json(AuthResponse { token, player }))
}

/// `GET /auth/me`
pub async fn me<S, G>(
  CurrentPlayer(player): CurrentPlayer,
) -> Json<Player>
where
  S: GameStore + 'static,
  S::Error: Into<DomainError>,
  G: QuizGenerator + 'static,
{
  Json(player)
}
