//! JWT claims structure.
//!
//! Contains the claims extracted from verified access tokens. Registered
//! claims get typed fields; everything else the issuer put in the token is
//! kept in `extra`. The `sub` field is redacted in Debug output.
//!
//! A registered claim of the wrong JSON type reads as absent instead of
//! failing the whole payload, so only the checks that consult a claim can
//! reject a token because of it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;
use std::fmt;

/// The `aud` claim, which issuers emit either as a string or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

impl Audience {
    /// Whether `audience` is (one of) the token's intended recipients.
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == audience,
            Audience::Many(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Claims of a verified access token.
///
/// Every field is optional at the type level so that a token missing a claim
/// deserializes and is then rejected by claim validation with a precise
/// error, rather than failing as an unparseable payload.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user or client id) - redacted in Debug output.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issuer URL.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Intended audience(s).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,

    /// Expiration time as a NumericDate (epoch seconds, may be fractional).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub exp: Option<Number>,

    /// Issued-at time as a NumericDate. Not validated.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub iat: Option<Number>,

    /// Space-separated scopes granted to this token.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Any other claims, by name.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Deserialize a claim, treating a value of the wrong type as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &self.sub.as_ref().map(|_| "[REDACTED]"))
            .field("iss", &self.iss)
            .field("aud", &self.aud)
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .field("scope", &self.scope)
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Claims {
    /// Check if the token has a specific scope.
    ///
    /// See [`crate::auth::scope::has_scope`].
    pub fn has_scope(&self, scope: &str) -> bool {
        crate::auth::scope::has_scope(self, scope)
    }

    /// Get all scopes as a vector.
    pub fn scopes(&self) -> Vec<&str> {
        self.scope
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_debug_redacts_sub() {
        let claims = Claims {
            sub: Some("auth0|secret-user-id".to_string()),
            scope: Some("create:actor".to_string()),
            ..Claims::default()
        };

        let debug_str = format!("{:?}", claims);

        assert!(!debug_str.contains("secret-user-id"));
        assert!(debug_str.contains("[REDACTED]"));
        assert!(debug_str.contains("create:actor"));
    }

    #[test]
    fn test_claims_debug_omits_extra_values() {
        let claims: Claims = serde_json::from_str(
            r#"{"sub":"u","email":"alice@example.com","permissions":["create:actor"]}"#,
        )
        .unwrap();

        let debug_str = format!("{:?}", claims);
        assert!(debug_str.contains("email"));
        assert!(!debug_str.contains("alice@example.com"));
    }

    #[test]
    fn test_deserialize_full_token_payload() {
        let json = r#"{
            "iss": "https://casting.example.com/",
            "sub": "auth0|123",
            "aud": ["casting-api", "https://casting.example.com/userinfo"],
            "iat": 1700000000,
            "exp": 1700086400,
            "azp": "client-abc",
            "scope": "openid create:actor",
            "permissions": ["create:actor"]
        }"#;

        let claims: Claims = serde_json::from_str(json).unwrap();

        assert_eq!(claims.iss.as_deref(), Some("https://casting.example.com/"));
        assert_eq!(claims.exp, Some(Number::from(1700086400)));
        assert!(claims.aud.as_ref().unwrap().contains("casting-api"));
        assert_eq!(claims.scopes(), vec!["openid", "create:actor"]);
        assert_eq!(claims.extra["azp"], "client-abc");
        assert_eq!(claims.extra["permissions"][0], "create:actor");
    }

    #[test]
    fn test_deserialize_minimal_payload() {
        let claims: Claims = serde_json::from_str("{}").unwrap();

        assert!(claims.sub.is_none());
        assert!(claims.exp.is_none());
        assert!(claims.aud.is_none());
        assert!(claims.scopes().is_empty());
        assert!(claims.extra.is_empty());
    }

    #[test]
    fn test_audience_single() {
        let aud: Audience = serde_json::from_str(r#""casting-api""#).unwrap();
        assert!(aud.contains("casting-api"));
        assert!(!aud.contains("casting"));
    }

    #[test]
    fn test_audience_many() {
        let aud: Audience = serde_json::from_str(r#"["a", "casting-api"]"#).unwrap();
        assert!(aud.contains("casting-api"));
        assert!(aud.contains("a"));
        assert!(!aud.contains("b"));
    }

    #[test]
    fn test_audience_empty_array() {
        let aud: Audience = serde_json::from_str("[]").unwrap();
        assert!(!aud.contains("casting-api"));
    }

    #[test]
    fn test_serialization_round_trips_extra_claims() {
        let claims: Claims =
            serde_json::from_str(r#"{"sub":"u","exp":10,"azp":"client"}"#).unwrap();

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["azp"], "client");
        assert_eq!(json["exp"], 10);
        assert!(json.get("scope").is_none());
    }

    #[test]
    fn test_fractional_numeric_dates_are_accepted() {
        let claims: Claims =
            serde_json::from_str(r#"{"iat":1700000000.5,"exp":1700003600.25}"#).unwrap();

        assert_eq!(claims.iat.unwrap().as_f64(), Some(1700000000.5));
        assert_eq!(claims.exp.unwrap().as_f64(), Some(1700003600.25));
    }

    #[test]
    fn test_wrongly_typed_claims_read_as_absent() {
        let claims: Claims = serde_json::from_str(
            r#"{"sub":12345,"iat":"yesterday","exp":"soon","aud":["casting-api",7],"scope":["create:actor"],"azp":"client"}"#,
        )
        .unwrap();

        assert!(claims.sub.is_none());
        assert!(claims.iat.is_none());
        assert!(claims.exp.is_none());
        assert!(claims.aud.is_none());
        assert!(claims.scopes().is_empty());
        assert_eq!(claims.extra["azp"], "client");
    }
}
