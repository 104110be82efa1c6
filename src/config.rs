/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, 受け付ける method, コラボレータの timeout, クライアント登録)
 * - 設定値のバリデーション (不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::validation::ClientStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // GET is always accepted; POST only when this is set.
    pub allow_form_post: bool,
    // Bound for each validator / localization / audit sink call.
    pub collaborator_timeout: Duration,

    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,

    pub clients: ClientStore,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_or("PORT", std::env::var("PORT").ok(), 3000)?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let allow_form_post = match std::env::var("AUTHORIZE_ALLOW_FORM_POST") {
            Ok(v) => parse_bool(&v).ok_or(ConfigError::Invalid("AUTHORIZE_ALLOW_FORM_POST"))?,
            Err(_) => true,
        };

        let collaborator_timeout = Duration::from_millis(parse_or(
            "COLLABORATOR_TIMEOUT_MS",
            std::env::var("COLLABORATOR_TIMEOUT_MS").ok(),
            5_000,
        )?);

        let request_timeout = Duration::from_secs(parse_or(
            "REQUEST_TIMEOUT_SECONDS",
            std::env::var("REQUEST_TIMEOUT_SECONDS").ok(),
            30,
        )?);

        let request_body_limit_bytes = parse_or(
            "REQUEST_BODY_LIMIT_BYTES",
            std::env::var("REQUEST_BODY_LIMIT_BYTES").ok(),
            1024 * 1024,
        )?;

        let clients = load_clients(std::env::var("CLIENTS_JSON").ok(), app_env)?;

        Ok(Self {
            addr,
            app_env,
            allow_form_post,
            collaborator_timeout,
            request_timeout,
            request_body_limit_bytes,
            clients,
        })
    }
}

// Unset falls back to the default; a value that does not parse is an error.
fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

// Production has to name its clients; development starts with an empty registry.
fn load_clients(raw: Option<String>, app_env: AppEnv) -> Result<ClientStore, ConfigError> {
    let json = match raw {
        Some(json) => json,
        None if app_env.is_production() => return Err(ConfigError::Missing("CLIENTS_JSON")),
        None => "[]".to_string(),
    };
    ClientStore::from_json(&json).map_err(|_| ConfigError::Invalid("CLIENTS_JSON"))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
