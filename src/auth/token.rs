//! Bearer access tokens issued by the OIDC token endpoint.

pub mod secret;

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Token type the platform issues.
pub const BEARER: &str = "Bearer";

/// Immutable access token plus the instant it stops being usable.
///
/// Tokens are replaced wholesale on refresh; nothing mutates an issued value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Access token secret; callers must avoid logging it.
	pub value: TokenSecret,
	/// Token type reported by the endpoint, normally `Bearer`.
	pub kind: String,
	/// Instant at which the token must no longer be presented.
	#[serde(with = "time::serde::timestamp")]
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Creates a bearer token that expires at `expires_at`.
	pub fn bearer(value: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { value: TokenSecret::new(value), kind: BEARER.into(), expires_at }
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Remaining lifetime at `instant`, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}

	/// Value for the `Authorization` header.
	pub fn authorization_header(&self) -> String {
		format!("{BEARER} {}", self.value.expose())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("value", &"<redacted>")
			.field("kind", &self.kind)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
