use serde::Deserialize;
use thiserror::Error;
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogConfigError {
    #[error("로그 레벨(level)은 TRACE, DEBUG, INFO, WARN, ERROR만 가능 합니다: {0}")]
    UnknownLevel(String),

    #[error("로깅 파일 로테이션(rotation)은 DAILY, HOURLY, MINUTELY, NEVER만 가능 합니다: {0}")]
    UnknownRotation(String),

    #[error("log file appender: {0}")]
    Appender(String),

    #[error("global subscriber: {0}")]
    Subscriber(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    dir: String,
    name: String,

    /// 최대 로그 파일 개수로 로그 파일이 설정한 개수보다 커질 경우 기존의 로그파일들은 삭제 된다.
    /// 설정 되지 않을 시 로그 파일은 삭제 되지 않는다.
    keep: Option<usize>,

    /// 파일과 stdout에 출력할 로그의 레벨로 지정된 로그 레벨 이상만 로깅된다.
    /// 설정하지 않을시 기본값은 INFO로 설정 된다.
    level: Option<String>,

    /// 로깅 파일이 분리 되는 기간. 설정 되지 않을시 기본값은 DAILY로 설정된다.
    rotation: Option<String>,
}

impl Config {
    pub fn level(&self) -> Result<tracing::Level, LogConfigError> {
        self.level.as_deref()
            .map(parse_level)
            .unwrap_or(Ok(tracing::Level::INFO))
    }

    pub fn rotation(&self) -> Result<rolling::Rotation, LogConfigError> {
        self.rotation.as_deref()
            .map(parse_rotation)
            .unwrap_or(Ok(rolling::Rotation::DAILY))
    }
}

/// JSON 형식으로 stdout과 로그 파일에 함께 기록하는 전역 subscriber를 설정한다.
///
/// 반환된 guard가 살아있는 동안만 파일에 기록되므로 프로그램 종료 시점까지 유지해야 한다.
pub fn set_global_logging_config(c: &Config) -> Result<WorkerGuard, LogConfigError> {
    let mut file_appender = rolling::RollingFileAppender::builder()
        .filename_prefix(c.name.clone())
        .filename_suffix("log")
        .rotation(c.rotation()?);

    if let Some(keep) = c.keep {
        file_appender = file_appender.max_log_files(keep);
    }

    let file_appender = file_appender.build(c.dir.clone())
        .map_err(|e| LogConfigError::Appender(e.to_string()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let writer = std::io::stdout.and(non_blocking);

    tracing_subscriber::fmt()
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_current_span(true)
        .with_span_list(true)
        .with_timer(LocalTime::new(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]")))
        .with_writer(writer)
        .with_max_level(c.level()?)
        .try_init()
        .map_err(|e| LogConfigError::Subscriber(e.to_string()))?;

    Ok(guard)
}

/// 설정 파일이 없을 때 사용하는 stderr 출력 subscriber
pub fn set_fallback_logging_config() {
    _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

fn parse_rotation(s: &str) -> Result<rolling::Rotation, LogConfigError> {
    match s.to_uppercase().as_str() {
        "DAILY" => Ok(rolling::Rotation::DAILY),
        "HOURLY" => Ok(rolling::Rotation::HOURLY),
        "MINUTELY" => Ok(rolling::Rotation::MINUTELY),
        "NEVER" => Ok(rolling::Rotation::NEVER),
        _ => Err(LogConfigError::UnknownRotation(s.to_owned())),
    }
}

fn parse_level(l: &str) -> Result<tracing::Level, LogConfigError> {
    match l.to_uppercase().as_str() {
        "TRACE" => Ok(tracing::Level::TRACE),
        "DEBUG" => Ok(tracing::Level::DEBUG),
        "INFO" => Ok(tracing::Level::INFO),
        "WARN" => Ok(tracing::Level::WARN),
        "ERROR" => Ok(tracing::Level::ERROR),
        _ => Err(LogConfigError::UnknownLevel(l.to_owned())),
    }
}
