//! Player — the unifying identity over registered users and guests.
//!
//! A player is the thing that owns quiz boards and game sessions. Whether
//! it is backed by a registered account or an ephemeral guest row is a
//! tagged variant, never two unrelated tables joined ad hoc; every
//! ownership check branches on the discriminant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The account kind backing a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
  User,
  Guest,
}

/// The variant-specific backing reference. Exactly one id is present,
/// always consistent with the discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlayerRef {
  User { user_id: Uuid },
  Guest { guest_id: Uuid },
}

impl PlayerRef {
  pub fn kind(&self) -> PlayerKind {
    match self {
      PlayerRef::User { .. } => PlayerKind::User,
      PlayerRef::Guest { .. } => PlayerKind::Guest,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
  pub player_id:    Uuid,
  pub display_name: String,
  pub backing:      PlayerRef,
  pub created_at:   DateTime<Utc>,
}

/// A registered account. The PHC hash string never leaves the server
/// process; this type deliberately does not derive `Serialize`.
#[derive(Debug, Clone)]
pub struct User {
  pub user_id:       Uuid,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// An ephemeral guest account. `converted_user_id` records a later
/// guest-to-user conversion as an auxiliary link; the player's variant is
/// never mutated.
#[derive(Debug, Clone)]
pub struct Guest {
  pub guest_id:          Uuid,
  pub created_at:        DateTime<Utc>,
  pub converted_user_id: Option<Uuid>,
}

/// A bearer token at rest. Only the SHA-256 hex digest of the opaque
/// token is stored; expiry is explicit and checked on every resolution.
#[derive(Debug, Clone)]
pub struct AuthToken {
  pub token_hash: String,
  pub player_id:  Uuid,
  pub issued_at:  DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}
