pub mod log;

use crate::date::{DateFormatter, DEFAULT_DISPLAY_PATTERN};
use crate::item::ItemError;
use ::config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::env;

/// 환경 변수로 설정을 덮어쓸 때 사용하는 접두사 (예: `BOOKLOOK_STORE__BASE_URL`)
pub const ENV_PREFIX: &str = "BOOKLOOK";

/// 원격 저장소 설정
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    base_url: String,
    auth_token: Option<String>,
    timeout_seconds: Option<u64>,
}

impl StoreConfig {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }
}

/// 화면 표시 설정
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    date_pattern: Option<String>,
}

impl DisplayConfig {
    pub fn date_pattern(&self) -> &str {
        self.date_pattern.as_deref().unwrap_or(DEFAULT_DISPLAY_PATTERN)
    }

    pub fn date_formatter(&self) -> Result<DateFormatter, ItemError> {
        DateFormatter::new(self.date_pattern())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    store: StoreConfig,
    display: Option<DisplayConfig>,
    logger: Option<log::Config>,
}

impl AppConfig {
    pub fn store(&self) -> &StoreConfig {
        &self.store
    }

    pub fn logger(&self) -> Option<&log::Config> {
        self.logger.as_ref()
    }

    pub fn date_formatter(&self) -> Result<DateFormatter, ItemError> {
        match &self.display {
            Some(display) => display.date_formatter(),
            None => Ok(DateFormatter::default()),
        }
    }
}

/// 실행 환경에 따라 .env 파일을 로드한다.
pub fn load_dotenv() {
    let env_filename = env::var("RUN_MODE")
        .map(|env| format!(".env.{}", env))
        .unwrap_or_else(|_| ".env".into());

    dotenvy::from_filename(env_filename).ok();
}

/// `config/{RUN_MODE}.json`을 읽고 `BOOKLOOK_` 환경 변수로 덮어쓴다.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    let config = Config::builder()
        .add_source(File::with_name(&format!("config/{}.json", env)))
        .add_source(Environment::with_prefix(ENV_PREFIX).prefix_separator("_").separator("__"))
        .build()?;

    config.try_deserialize()
}

/// JSON 문자열에서 설정을 읽는다.
pub fn parse_config(json: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(json, FileFormat::Json))
        .build()?;

    config.try_deserialize()
}
