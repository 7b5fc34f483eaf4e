//! Session tokens and the identity-provider login handshake.
//!
//! Tokens are compact JWTs (`header.claims.signature`) signed with HMAC-SHA256. Two kinds are handled here:
//! * identity tokens, issued by the external identity provider after a successful login and signed with the shared
//!   IdP secret;
//! * session tokens, issued by this server in exchange for a valid identity token and signed with the session secret.
use std::future::{ready, Ready};

use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    dev::Payload,
    FromRequest,
    HttpMessage,
    HttpRequest,
};
use agency_common::Secret;
use base64::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use log::*;
use rand::{thread_rng, RngCore};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "agency_session";
pub const STATE_COOKIE: &str = "agency_login_state";
pub const LOGIN_PATH: &str = "/auth/login";
pub const CALLBACK_PATH: &str = "/auth/callback";
pub const ADMIN_ROLE: &str = "admin";

const TOKEN_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;
const STATE_TTL_MINUTES: i64 = 10;

//--------------------------------------------------   Claims   --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims<T> {
    /// Expiry, in seconds since the Unix epoch.
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(flatten)]
    pub custom: T,
}

/// The claims carried by an admin session token. Handlers receive these through the session guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    /// Unique per login. Reveal state and pending deletions are keyed on it, and logout revokes it.
    pub sid: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl SessionClaims {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ADMIN_ROLE)
    }
}

/// A verified session token, as placed in the request extensions by the session guard.
pub type Session = Claims<SessionClaims>;

impl FromRequest for Session {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let session = req.extensions().get::<Session>().cloned();
        ready(session.ok_or(ServerError::AuthenticationError(AuthError::NoSession)))
    }
}

impl FromRequest for SessionClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Session>().map(|s| s.custom.clone());
        ready(claims.ok_or(ServerError::AuthenticationError(AuthError::NoSession)))
    }
}

/// What the identity provider tells us about the person who just logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

//--------------------------------------------------  TokenCodec  ------------------------------------------------------
#[derive(Clone, Debug)]
pub struct TokenCodec {
    key: Secret<String>,
}

impl TokenCodec {
    pub fn new(key: Secret<String>) -> Self {
        Self { key }
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(self.key.reveal().as_bytes()).map_err(|e| AuthError::CouldNotIssueToken(e.to_string()))
    }

    /// Signs `custom` into a token that expires `ttl` from now.
    pub fn sign<T: Serialize>(&self, custom: T, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims { exp: (now + ttl).timestamp(), iat: now.timestamp(), custom };
        self.sign_claims(&claims)
    }

    pub fn sign_claims<T: Serialize>(&self, claims: &Claims<T>) -> Result<String, AuthError> {
        let payload = serde_json::to_vec(claims).map_err(|e| AuthError::CouldNotIssueToken(e.to_string()))?;
        let message = format!(
            "{}.{}",
            base64::encode_config(TOKEN_HEADER, URL_SAFE_NO_PAD),
            base64::encode_config(payload, URL_SAFE_NO_PAD)
        );
        let mut mac = self.mac()?;
        mac.update(message.as_bytes());
        let signature = base64::encode_config(mac.finalize().into_bytes(), URL_SAFE_NO_PAD);
        Ok(format!("{message}.{signature}"))
    }

    /// Checks the signature and expiry of `token` and returns its claims.
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<Claims<T>, AuthError> {
        let malformed = || AuthError::InvalidToken("Token is not in the correct format".into());
        let (message, signature) = token.trim().rsplit_once('.').ok_or_else(malformed)?;
        let (header, payload) = message.split_once('.').ok_or_else(malformed)?;
        if payload.contains('.') {
            return Err(malformed());
        }
        let header: serde_json::Value = serde_json::from_slice(&decode_part(header)?)
            .map_err(|e| AuthError::InvalidToken(format!("Bad header. {e}")))?;
        if header.get("alg").and_then(|a| a.as_str()) != Some("HS256") {
            return Err(AuthError::InvalidToken("Unsupported signing algorithm".into()));
        }
        let mut mac = self.mac()?;
        mac.update(message.as_bytes());
        mac.verify_slice(&decode_part(signature)?)
            .map_err(|_| AuthError::InvalidToken("Signature is invalid".into()))?;
        let claims: Claims<T> = serde_json::from_slice(&decode_part(payload)?)
            .map_err(|e| AuthError::InvalidToken(format!("Bad claims. {e}")))?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}

fn decode_part(part: &str) -> Result<Vec<u8>, AuthError> {
    base64::decode_config(part, URL_SAFE_NO_PAD).map_err(|e| AuthError::InvalidToken(format!("Bad encoding. {e}")))
}

//--------------------------------------------------  AuthGateway  -----------------------------------------------------
/// Everything the login, callback and logout routes and the session guard need, minus the mutable session state.
#[derive(Clone, Debug)]
pub struct AuthGateway {
    sessions: TokenCodec,
    identity: Option<TokenCodec>,
    config: AuthConfig,
}

impl AuthGateway {
    pub fn new(config: &AuthConfig) -> Self {
        let sessions = TokenCodec::new(config.session_secret.clone());
        let identity = config.idp_secret.clone().map(TokenCodec::new);
        Self { sessions, identity, config: config.clone() }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// The identity provider URL an admin is redirected to, carrying the callback address and the `state` nonce.
    pub fn login_redirect(&self, state: &str) -> Result<String, AuthError> {
        if self.identity.is_none() || self.config.idp_login_url.is_empty() {
            return Err(AuthError::IdentityProviderNotConfigured);
        }
        let callback = format!("{}{CALLBACK_PATH}", self.config.public_url);
        let separator = if self.config.idp_login_url.contains('?') { '&' } else { '?' };
        Ok(format!(
            "{}{separator}redirect_uri={}&state={}",
            self.config.idp_login_url,
            urlencoding::encode(&callback),
            urlencoding::encode(state)
        ))
    }

    /// Verifies an identity token and checks the holder against the admin allowlist.
    pub fn verify_identity(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        let codec = self.identity.as_ref().ok_or(AuthError::IdentityProviderNotConfigured)?;
        let identity = codec.verify::<IdentityClaims>(token)?.custom;
        if !self.config.is_admin_email(&identity.email) {
            warn!("🔐️ {} logged in, but is not on the admin list", identity.email);
            return Err(AuthError::NotAnAdmin(identity.email));
        }
        Ok(identity)
    }

    /// Opens a new admin session for `identity` and returns the signed session token.
    pub fn issue_session(&self, identity: IdentityClaims) -> Result<(String, SessionClaims), AuthError> {
        let claims = SessionClaims {
            sub: identity.sub,
            email: identity.email,
            sid: random_nonce(),
            roles: vec![ADMIN_ROLE.to_string()],
        };
        let token = self.sessions.sign(&claims, self.config.session_ttl)?;
        Ok((token, claims))
    }

    pub fn verify_session(&self, token: &str) -> Result<Claims<SessionClaims>, AuthError> {
        self.sessions.verify(token)
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .secure(self.config.secure_cookies)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(self.config.session_ttl.num_seconds()))
            .finish()
    }

    pub fn state_cookie(&self, state: String) -> Cookie<'static> {
        Cookie::build(STATE_COOKIE, state)
            .path("/auth")
            .http_only(true)
            .secure(self.config.secure_cookies)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::minutes(STATE_TTL_MINUTES))
            .finish()
    }
}

/// A random, URL-safe nonce used for login `state` values and session ids.
pub fn random_nonce() -> String {
    let mut bytes = [0u8; 16];
    thread_rng().fill_bytes(&mut bytes);
    base64::encode_config(bytes, URL_SAFE_NO_PAD)
}

/// Reads the session token from the session cookie, or failing that, from an `Authorization: Bearer` header.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()).filter(|t| !t.is_empty()).or_else(|| {
        req.headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}
