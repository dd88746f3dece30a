//! Runtime environment schema.
//!
//! # Responsibilities
//! - Define the required/optional environment variables and their shapes
//! - Construct-and-validate in one step, returning normalized values
//! - Collect every problem instead of stopping at the first
//!
//! # Design Decisions
//! - The process must not start with an invalid environment (fail fast)
//! - Validation never panics; callers decide what fatal means
//! - Normalization happens here (comma-split origins, parsed durations,
//!   defaults filled), so the rest of the system sees typed values only

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const ENV: &str = "NIBBLIX_ENV";
pub const SUPABASE_URL: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
pub const AUTH_COOKIE_NAME: &str = "AUTH_COOKIE_NAME";
pub const AUTH_COOKIE_LIFETIME_SECS: &str = "AUTH_COOKIE_LIFETIME_SECS";
pub const CORS_ORIGINS: &str = "CORS_ORIGINS";
pub const REDIS_URL: &str = "REDIS_URL";
pub const SENTRY_DSN: &str = "SENTRY_DSN";

const DEFAULT_AUTH_COOKIE_NAME: &str = "nix-auth";
const DEFAULT_AUTH_COOKIE_LIFETIME_SECS: u64 = 60 * 60 * 24 * 7;

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Environment::Local),
            "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

/// A single problem found while validating the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{var} is not a valid URL (got '{value}')")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var} must be one of local, development, staging, production (got '{value}')")]
    InvalidEnvironment { var: &'static str, value: String },

    #[error("{var} must be a whole number of seconds (got '{value}')")]
    InvalidSeconds { var: &'static str, value: String },
}

/// Validated, normalized runtime environment.
#[derive(Debug, Clone)]
pub struct RuntimeEnv {
    pub environment: Environment,
    pub supabase_url: Url,
    pub supabase_anon_key: String,
    pub auth_cookie_name: String,
    pub auth_cookie_lifetime: Duration,
    pub cors_origins: Vec<String>,
    pub redis_url: Url,
    pub sentry_dsn: Option<String>,
}

impl RuntimeEnv {
    /// Validate the current process environment.
    pub fn from_process_env() -> Result<Self, Vec<EnvError>> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::validate(&vars)
    }

    /// Validate an environment map, collecting all errors.
    pub fn validate(vars: &HashMap<String, String>) -> Result<Self, Vec<EnvError>> {
        let mut errors = Vec::new();

        let environment = match require(vars, ENV, &mut errors) {
            Some(value) => match value.parse::<Environment>() {
                Ok(env) => Some(env),
                Err(()) => {
                    errors.push(EnvError::InvalidEnvironment {
                        var: ENV,
                        value: value.to_string(),
                    });
                    None
                }
            },
            None => None,
        };

        let supabase_url = require_url(vars, SUPABASE_URL, &mut errors);
        let supabase_anon_key = require(vars, SUPABASE_ANON_KEY, &mut errors).map(str::to_string);
        let redis_url = require_url(vars, REDIS_URL, &mut errors);

        let cors_origins = require(vars, CORS_ORIGINS, &mut errors).map(split_origins);

        let auth_cookie_name = match vars.get(AUTH_COOKIE_NAME).map(String::as_str) {
            Some("") => {
                errors.push(EnvError::Empty(AUTH_COOKIE_NAME));
                None
            }
            Some(name) => Some(name.to_string()),
            None => Some(DEFAULT_AUTH_COOKIE_NAME.to_string()),
        };

        let auth_cookie_lifetime = match vars.get(AUTH_COOKIE_LIFETIME_SECS) {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    errors.push(EnvError::InvalidSeconds {
                        var: AUTH_COOKIE_LIFETIME_SECS,
                        value: value.clone(),
                    });
                    None
                }
            },
            None => Some(Duration::from_secs(DEFAULT_AUTH_COOKIE_LIFETIME_SECS)),
        };

        let sentry_dsn = vars.get(SENTRY_DSN).filter(|v| !v.is_empty()).cloned();

        if !errors.is_empty() {
            return Err(errors);
        }

        // All None cases pushed an error above, so these cannot fail here.
        match (
            environment,
            supabase_url,
            supabase_anon_key,
            auth_cookie_name,
            auth_cookie_lifetime,
            cors_origins,
            redis_url,
        ) {
            (
                Some(environment),
                Some(supabase_url),
                Some(supabase_anon_key),
                Some(auth_cookie_name),
                Some(auth_cookie_lifetime),
                Some(cors_origins),
                Some(redis_url),
            ) => Ok(Self {
                environment,
                supabase_url,
                supabase_anon_key,
                auth_cookie_name,
                auth_cookie_lifetime,
                cors_origins,
                redis_url,
                sentry_dsn,
            }),
            _ => unreachable!("every None field recorded an error above"),
        }
    }
}

/// Look up a required variable; records Missing/Empty and returns None on failure.
fn require<'a>(
    vars: &'a HashMap<String, String>,
    var: &'static str,
    errors: &mut Vec<EnvError>,
) -> Option<&'a str> {
    match vars.get(var).map(String::as_str) {
        Some("") => {
            errors.push(EnvError::Empty(var));
            None
        }
        Some(value) => Some(value),
        None => {
            errors.push(EnvError::Missing(var));
            None
        }
    }
}

/// Look up a required URL variable.
fn require_url(
    vars: &HashMap<String, String>,
    var: &'static str,
    errors: &mut Vec<EnvError>,
) -> Option<Url> {
    let value = require(vars, var, errors)?;
    match Url::parse(value) {
        Ok(url) => Some(url),
        Err(_) => {
            errors.push(EnvError::InvalidUrl {
                var,
                value: value.to_string(),
            });
            None
        }
    }
}

/// Split a comma-separated origin list, dropping surrounding whitespace and
/// empty entries.
fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
