use std::{env, io::Write};

use agency_common::{parse_boolean_flag, Secret};
use agency_engine::{db_url, DEFAULT_DATABASE_URL};
use chrono::Duration;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde_json::json;
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_AGENCY_HOST: &str = "127.0.0.1";
const DEFAULT_AGENCY_PORT: u16 = 8370;
const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:8370";
const DEFAULT_ADMIN_LANDING: &str = "/admin";
const DEFAULT_SESSION_HOURS: i64 = 12;
const MIN_SECRET_LENGTH: usize = 32;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_AGENCY_HOST.to_string(),
            port: DEFAULT_AGENCY_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("AGENCY_HOST").ok().unwrap_or_else(|| DEFAULT_AGENCY_HOST.into());
        let port = env::var("AGENCY_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for AGENCY_PORT. {e} Using the default, {DEFAULT_AGENCY_PORT}, \
                         instead."
                    );
                    DEFAULT_AGENCY_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_AGENCY_PORT);
        let database_url = db_url();
        let auth = AuthConfig::from_env_or_default();
        Self { host, port, database_url, auth }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Signs and verifies the admin session tokens issued by this server.
    pub session_secret: Secret<String>,
    /// The shared secret used to verify identity tokens handed back by the identity provider. Logins are refused
    /// while this is unset.
    pub idp_secret: Option<Secret<String>>,
    /// Where admins are sent to log in.
    pub idp_login_url: String,
    /// The externally visible base URL of this server. The identity provider redirects back to
    /// `{public_url}/auth/callback`.
    pub public_url: String,
    /// Where admins land after a successful login.
    pub admin_landing: String,
    /// If non-empty, only these (lower-cased) email addresses may open an admin session.
    pub admin_emails: Vec<String>,
    pub session_ttl: Duration,
    pub secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: random_session_secret(),
            idp_secret: None,
            idp_login_url: String::default(),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            admin_landing: DEFAULT_ADMIN_LANDING.to_string(),
            admin_emails: Vec::new(),
            session_ttl: Duration::hours(DEFAULT_SESSION_HOURS),
            secure_cookies: true,
        }
    }
}

impl AuthConfig {
    pub fn from_env_or_default() -> Self {
        let session_secret = Self::session_secret_from_env().unwrap_or_else(|e| {
            warn!("🪛️ Could not load the session secret. {e}. Reverting to a random secret.");
            random_session_secret()
        });
        let idp_secret = env::var("AGENCY_IDP_SECRET").ok().filter(|s| !s.trim().is_empty()).map(Secret::new);
        if idp_secret.is_none() {
            error!("🪛️ AGENCY_IDP_SECRET is not set. Admin logins will be refused until it is.");
        }
        let idp_login_url = env::var("AGENCY_IDP_LOGIN_URL").ok().unwrap_or_else(|| {
            error!("🪛️ AGENCY_IDP_LOGIN_URL is not set. Please set it to the login page of your identity provider.");
            String::default()
        });
        let public_url = env::var("AGENCY_PUBLIC_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| {
                info!("🪛️ AGENCY_PUBLIC_URL is not set. Using {DEFAULT_PUBLIC_URL}");
                DEFAULT_PUBLIC_URL.to_string()
            });
        let admin_landing = env::var("AGENCY_ADMIN_LANDING").unwrap_or_else(|_| DEFAULT_ADMIN_LANDING.to_string());
        let admin_emails = env::var("AGENCY_ADMIN_EMAILS").map(|s| parse_email_list(&s)).unwrap_or_default();
        if admin_emails.is_empty() {
            warn!(
                "🪛️ AGENCY_ADMIN_EMAILS is not set. Anyone who can log in with the identity provider will have admin \
                 access."
            );
        } else {
            info!("🪛️ {} admin email(s) configured", admin_emails.len());
        }
        let session_ttl = env::var("AGENCY_SESSION_HOURS")
            .map_err(|_| {
                info!("🪛️ AGENCY_SESSION_HOURS is not set. Using the default value of {DEFAULT_SESSION_HOURS} hrs.")
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for AGENCY_SESSION_HOURS. {e}"))
                    .and_then(|h| if h > 0 { Ok(Duration::hours(h)) } else { Err(()) })
            })
            .ok()
            .unwrap_or(Duration::hours(DEFAULT_SESSION_HOURS));
        let secure_cookies = parse_boolean_flag(env::var("AGENCY_SECURE_COOKIES").ok(), true);
        if !secure_cookies {
            warn!("🚨️ Session cookies will be sent over plain HTTP. Only do this in development.");
        }
        Self {
            session_secret,
            idp_secret,
            idp_login_url,
            public_url,
            admin_landing,
            admin_emails,
            session_ttl,
            secure_cookies,
        }
    }

    fn session_secret_from_env() -> Result<Secret<String>, ServerError> {
        let secret = env::var("AGENCY_SESSION_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [AGENCY_SESSION_SECRET]")))?;
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(ServerError::ConfigurationError(format!(
                "AGENCY_SESSION_SECRET must be at least {MIN_SECRET_LENGTH} characters long"
            )));
        }
        Ok(Secret::new(secret))
    }

    /// True if `email` may open an admin session.
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.is_empty() || self.admin_emails.contains(&email.trim().to_lowercase())
    }
}

fn parse_email_list(s: &str) -> Vec<String> {
    s.split(',').map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty()).collect()
}

fn random_session_secret() -> Secret<String> {
    let secret = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect::<String>();
    warn!(
        "🚨️🚨️🚨️ The session secret has not been set. I'm using a random value for this session. All admin sessions \
         will be lost when the server restarts. 🚨️🚨️🚨️"
    );
    let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
    match &mut tmpfile {
        Some((f, p)) => {
            let key_data = json!({ "session_secret": secret }).to_string();
            match writeln!(f, "{key_data}") {
                Ok(()) => warn!(
                    "🚨️🚨️🚨️ The session secret for this run was written to {}. If this is a production instance, \
                     you are doing it wrong! Set the AGENCY_SESSION_SECRET environment variable instead. 🚨️🚨️🚨️",
                    p.to_str().unwrap_or("???")
                ),
                Err(e) => warn!("🪛️ Could not write the session secret to the temporary file. {e}"),
            }
        },
        None => warn!("🪛️ Could not create a temporary file to store the session secret."),
    }
    Secret::new(secret)
}
