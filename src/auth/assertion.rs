//! Signed JWT assertions exchanged for access tokens (RFC 7523 `jwt-bearer` grant).

// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Lifetime stamped into every assertion.
pub const ASSERTION_TTL: Duration = Duration::hours(1);

/// Claims carried by an assertion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
	/// Issuer: the service account email.
	pub iss: String,
	/// Audience: the token endpoint URL.
	pub aud: String,
	/// Issued-at, seconds since the Unix epoch.
	pub iat: i64,
	/// Expiry, seconds since the Unix epoch.
	pub exp: i64,
}

/// Signs HS256 assertions for one service-account key.
#[derive(Clone)]
pub struct AssertionSigner {
	key_id: String,
	issuer: String,
	audience: String,
	key: EncodingKey,
}
impl AssertionSigner {
	/// Creates a signer for the given key id/secret, issuer email, and token endpoint.
	pub fn new(
		key_id: impl Into<String>,
		secret: &TokenSecret,
		issuer: impl Into<String>,
		token_endpoint: &Url,
	) -> Self {
		Self {
			key_id: key_id.into(),
			issuer: issuer.into(),
			audience: token_endpoint.to_string(),
			key: EncodingKey::from_secret(secret.expose().as_bytes()),
		}
	}

	/// Builds the claims for an assertion issued at `now`.
	pub fn claims_at(&self, now: OffsetDateTime) -> AssertionClaims {
		AssertionClaims {
			iss: self.issuer.clone(),
			aud: self.audience.clone(),
			iat: now.unix_timestamp(),
			exp: (now + ASSERTION_TTL).unix_timestamp(),
		}
	}

	/// Signs an assertion issued at `now`.
	///
	/// The header only carries `alg` and `kid`; the platform identifies the key by `kid`.
	pub fn sign_at(&self, now: OffsetDateTime) -> Result<String> {
		let mut header = Header::new(Algorithm::HS256);

		header.typ = None;
		header.kid = Some(self.key_id.clone());

		jsonwebtoken::encode(&header, &self.claims_at(now), &self.key)
			.map_err(|source| ConfigError::Signing { source }.into())
	}
}
impl Debug for AssertionSigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AssertionSigner")
			.field("key_id", &self.key_id)
			.field("issuer", &self.issuer)
			.field("audience", &self.audience)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use jsonwebtoken::{DecodingKey, Validation};
	// self
	use super::*;

	fn signer() -> AssertionSigner {
		AssertionSigner::new(
			"key-123",
			&TokenSecret::new("shared-secret"),
			"robot@example.com",
			&Url::parse("https://identity.example.com/oauth2/token")
				.expect("Token endpoint fixture should parse."),
		)
	}

	#[test]
	fn assertion_carries_issuer_audience_and_one_hour_expiry() {
		let now = OffsetDateTime::now_utc();
		let jwt = signer().sign_at(now).expect("Assertion should sign.");
		let mut validation = Validation::new(Algorithm::HS256);

		validation.set_audience(&["https://identity.example.com/oauth2/token"]);
		validation.set_issuer(&["robot@example.com"]);

		let decoded = jsonwebtoken::decode::<AssertionClaims>(
			&jwt,
			&DecodingKey::from_secret(b"shared-secret"),
			&validation,
		)
		.expect("Assertion should verify with the shared secret.");

		assert_eq!(decoded.claims.iat, now.unix_timestamp());
		assert_eq!(decoded.claims.exp - decoded.claims.iat, 3_600);
		assert_eq!(decoded.header.kid.as_deref(), Some("key-123"));
		assert_eq!(decoded.header.alg, Algorithm::HS256);
	}

	#[test]
	fn assertion_rejects_the_wrong_secret() {
		let jwt = signer().sign_at(OffsetDateTime::now_utc()).expect("Assertion should sign.");
		let mut validation = Validation::new(Algorithm::HS256);

		validation.set_audience(&["https://identity.example.com/oauth2/token"]);

		assert!(
			jsonwebtoken::decode::<AssertionClaims>(
				&jwt,
				&DecodingKey::from_secret(b"other-secret"),
				&validation,
			)
			.is_err()
		);
	}

	#[test]
	fn debug_output_hides_the_key() {
		let rendered = format!("{:?}", signer());

		assert!(!rendered.contains("shared-secret"));
		assert!(rendered.contains("key-123"));
	}
}
