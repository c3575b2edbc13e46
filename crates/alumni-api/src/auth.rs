use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use clap::ValueEnum;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::error::ApiError;

const API_KEY_HEADER: &str = "x-api-key";
const API_KEY_SUBJECT: &str = "api_key";
const ADMIN_ROLE: &str = "institute_admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum AuthMode {
    ApiKey,
    Jwt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum JwtAlgorithm {
    Hs256,
    Hs384,
    Hs512,
    Rs256,
    Es256,
}

/// Which kind of key material an algorithm verifies against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtKeyKind {
    Secret,
    RsaPublicKey,
    EcPublicKey,
}

impl JwtAlgorithm {
    pub fn key_kind(self) -> JwtKeyKind {
        match self {
            JwtAlgorithm::Hs256 | JwtAlgorithm::Hs384 | JwtAlgorithm::Hs512 => JwtKeyKind::Secret,
            JwtAlgorithm::Rs256 => JwtKeyKind::RsaPublicKey,
            JwtAlgorithm::Es256 => JwtKeyKind::EcPublicKey,
        }
    }

    fn algorithm(self) -> Algorithm {
        match self {
            JwtAlgorithm::Hs256 => Algorithm::HS256,
            JwtAlgorithm::Hs384 => Algorithm::HS384,
            JwtAlgorithm::Hs512 => Algorithm::HS512,
            JwtAlgorithm::Rs256 => Algorithm::RS256,
            JwtAlgorithm::Es256 => Algorithm::ES256,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub api_key: Option<String>,
    pub jwt_secret: Option<String>,
    pub jwt_public_key: Option<String>,
    pub jwt_algorithm: JwtAlgorithm,
}

impl AuthConfig {
    pub fn api_key(key: &str) -> Self {
        Self {
            mode: AuthMode::ApiKey,
            api_key: Some(key.to_string()),
            jwt_secret: None,
            jwt_public_key: None,
            jwt_algorithm: JwtAlgorithm::Hs256,
        }
    }

    /// Checks that the key material the selected mode needs is present.
    pub fn validate(&self) -> Result<(), ApiError> {
        match self.mode {
            AuthMode::ApiKey if self.api_key.is_none() => Err(ApiError::Config(
                "ALUMNI_API_KEY is required when AUTH_MODE=api_key".into(),
            )),
            AuthMode::ApiKey => Ok(()),
            AuthMode::Jwt => match self.jwt_algorithm.key_kind() {
                JwtKeyKind::Secret if self.jwt_secret.is_none() => Err(ApiError::Config(
                    "JWT_SECRET is required for symmetric JWT algorithms".into(),
                )),
                JwtKeyKind::Secret => Ok(()),
                _ if self.jwt_public_key.is_none() => Err(ApiError::Config(
                    "JWT_PUBLIC_KEY is required for asymmetric JWT algorithms".into(),
                )),
                _ => Ok(()),
            },
        }
    }

    fn decoding_key(&self) -> Result<DecodingKey, ApiError> {
        let missing = |name: &str| ApiError::Unauthorized(format!("{name} is not configured"));

        match self.jwt_algorithm.key_kind() {
            JwtKeyKind::Secret => {
                let secret = self.jwt_secret.as_deref().ok_or_else(|| missing("JWT_SECRET"))?;
                Ok(DecodingKey::from_secret(secret.as_bytes()))
            }
            JwtKeyKind::RsaPublicKey => {
                let pem = self
                    .jwt_public_key
                    .as_deref()
                    .ok_or_else(|| missing("JWT_PUBLIC_KEY"))?;
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|err| ApiError::Unauthorized(format!("bad RSA public key: {err}")))
            }
            JwtKeyKind::EcPublicKey => {
                let pem = self
                    .jwt_public_key
                    .as_deref()
                    .ok_or_else(|| missing("JWT_PUBLIC_KEY"))?;
                DecodingKey::from_ec_pem(pem.as_bytes())
                    .map_err(|err| ApiError::Unauthorized(format!("bad EC public key: {err}")))
            }
        }
    }
}

/// The authenticated caller. With API-key auth the subject is the fixed
/// string `api_key`; with JWT auth it is the token's `sub` claim and the
/// optional `role` claim.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: String,
    pub role: Option<String>,
    service: bool,
}

impl AuthUser {
    fn service() -> Self {
        Self {
            subject: API_KEY_SUBJECT.to_string(),
            role: None,
            service: true,
        }
    }

    /// Holders of the shared API key act for the whole portal.
    pub fn is_service(&self) -> bool {
        self.service
    }

    pub fn is_admin(&self) -> bool {
        self.is_service()
            || self
                .role
                .as_deref()
                .is_some_and(|role| role.trim().eq_ignore_ascii_case(ADMIN_ROLE))
    }

    /// Alumni may read their own data; services and admins may read anyone's.
    pub fn ensure_can_view(&self, alumni_id: i64) -> Result<(), ApiError> {
        if self.is_admin() || self.alumni_id().is_ok_and(|own| own == alumni_id) {
            return Ok(());
        }

        Err(ApiError::Forbidden(format!(
            "subject {} may not read alumnus {alumni_id}",
            self.subject
        )))
    }

    pub fn ensure_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            return Ok(());
        }

        Err(ApiError::Forbidden(format!(
            "subject {} is not an institute admin",
            self.subject
        )))
    }

    /// The alumni id the caller acts as.
    pub fn alumni_id(&self) -> Result<i64, ApiError> {
        self.subject
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                ApiError::BadRequest("authenticated subject is not an alumni id".into())
            })
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    role: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AuthConfig::from_ref(state);

        match config.mode {
            AuthMode::ApiKey => authorize_api_key(parts, &config),
            AuthMode::Jwt => authorize_jwt(parts, &config),
        }
    }
}

fn authorize_api_key(parts: &Parts, config: &AuthConfig) -> Result<AuthUser, ApiError> {
    let expected = config
        .api_key
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("ALUMNI_API_KEY is not configured".into()))?;

    let provided = parts
        .headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing X-API-Key header".into()))?;

    if provided != expected {
        return Err(ApiError::Unauthorized("invalid API key".into()));
    }

    Ok(AuthUser::service())
}

fn authorize_jwt(parts: &Parts, config: &AuthConfig) -> Result<AuthUser, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("expected Bearer token".into()))?;

    let key = config.decoding_key()?;
    let validation = Validation::new(config.jwt_algorithm.algorithm());

    let data = decode::<Claims>(token, &key, &validation)
        .map_err(|err| ApiError::Unauthorized(format!("invalid token: {err}")))?;

    Ok(AuthUser {
        subject: data.claims.sub,
        role: data.claims.role,
        service: false,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        role: Option<&'a str>,
    }

    fn alumnus(subject: &str, role: Option<&str>) -> AuthUser {
        AuthUser {
            subject: subject.to_string(),
            role: role.map(str::to_string),
            service: false,
        }
    }

    fn parts_with(header: Option<(&str, &str)>) -> Parts {
        let mut builder = Request::builder().uri("/api/alumni");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn jwt_config(secret: &str, algorithm: JwtAlgorithm) -> AuthConfig {
        AuthConfig {
            mode: AuthMode::Jwt,
            api_key: None,
            jwt_secret: Some(secret.to_string()),
            jwt_public_key: None,
            jwt_algorithm: algorithm,
        }
    }

    fn token(sub: &str, secret: &str, algorithm: Algorithm) -> String {
        token_with_role(sub, None, secret, algorithm)
    }

    fn token_with_role(
        sub: &str,
        role: Option<&str>,
        secret: &str,
        algorithm: Algorithm,
    ) -> String {
        let claims = TestClaims {
            sub,
            exp: chrono::Utc::now().timestamp() + 3600,
            role,
        };
        encode(
            &Header::new(algorithm),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn api_key_must_match() {
        let config = AuthConfig::api_key("secret");

        let ok = authorize_api_key(&parts_with(Some(("x-api-key", "secret"))), &config).unwrap();
        assert_eq!(ok.subject, "api_key");
        assert!(ok.is_service());

        assert!(matches!(
            authorize_api_key(&parts_with(Some(("x-api-key", "wrong"))), &config),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            authorize_api_key(&parts_with(None), &config),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn jwt_subject_comes_from_sub_claim() {
        let config = jwt_config("shh", JwtAlgorithm::Hs512);
        let bearer = format!("Bearer {}", token("42", "shh", Algorithm::HS512));

        let user = authorize_jwt(&parts_with(Some(("authorization", &bearer))), &config).unwrap();

        assert_eq!(user.subject, "42");
        assert_eq!(user.alumni_id().unwrap(), 42);
        assert!(!user.is_admin());
    }

    #[test]
    fn jwt_role_claim_grants_admin() {
        let config = jwt_config("shh", JwtAlgorithm::Hs256);
        let bearer = format!(
            "Bearer {}",
            token_with_role("9", Some("Institute_Admin"), "shh", Algorithm::HS256)
        );

        let user = authorize_jwt(&parts_with(Some(("authorization", &bearer))), &config).unwrap();

        assert_eq!(user.role.as_deref(), Some("Institute_Admin"));
        assert!(user.is_admin());
        assert!(!user.is_service());
        assert!(user.ensure_admin().is_ok());
    }

    #[test]
    fn alumni_may_only_view_themselves() {
        let own = alumnus("5", Some("alumni"));

        assert!(own.ensure_can_view(5).is_ok());
        assert!(matches!(own.ensure_can_view(6), Err(ApiError::Forbidden(_))));
        assert!(matches!(own.ensure_admin(), Err(ApiError::Forbidden(_))));

        assert!(AuthUser::service().ensure_can_view(6).is_ok());
        assert!(alumnus("1", Some("institute_admin")).ensure_can_view(6).is_ok());
    }

    #[test]
    fn a_jwt_subject_named_api_key_is_not_a_service() {
        let spoofed = alumnus("api_key", None);

        assert!(!spoofed.is_service());
        assert!(matches!(spoofed.ensure_can_view(1), Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn jwt_with_wrong_secret_or_algorithm_is_rejected() {
        let config = jwt_config("shh", JwtAlgorithm::Hs512);

        let wrong_secret = format!("Bearer {}", token("42", "other", Algorithm::HS512));
        assert!(matches!(
            authorize_jwt(&parts_with(Some(("authorization", &wrong_secret))), &config),
            Err(ApiError::Unauthorized(_))
        ));

        let wrong_alg = format!("Bearer {}", token("42", "shh", Algorithm::HS256));
        assert!(matches!(
            authorize_jwt(&parts_with(Some(("authorization", &wrong_alg))), &config),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn jwt_requires_bearer_scheme() {
        let config = jwt_config("shh", JwtAlgorithm::Hs256);
        let raw = token("42", "shh", Algorithm::HS256);

        assert!(matches!(
            authorize_jwt(&parts_with(Some(("authorization", &raw))), &config),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn non_numeric_subject_is_a_bad_request() {
        for subject in ["api_key", "", "-3", "0", "12a"] {
            let user = alumnus(subject, None);
            assert!(
                matches!(user.alumni_id(), Err(ApiError::BadRequest(_))),
                "subject {subject:?}"
            );
        }
    }

    #[test]
    fn validation_reports_missing_key_material() {
        let mut config = AuthConfig::api_key("k");
        assert!(config.validate().is_ok());

        config.api_key = None;
        assert!(matches!(config.validate(), Err(ApiError::Config(_))));

        let mut jwt = jwt_config("s", JwtAlgorithm::Rs256);
        assert!(matches!(jwt.validate(), Err(ApiError::Config(_))));
        jwt.jwt_public_key = Some("-----BEGIN PUBLIC KEY-----".into());
        assert!(jwt.validate().is_ok());
    }
}
