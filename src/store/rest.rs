use crate::config::StoreConfig;
use crate::store::{RemoteStore, StoreError, StorePath};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// 요청의 기본 타임아웃 시간(초)
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// 실시간 데이터베이스 REST API 저장소
///
/// 경로 `a/b/c`는 `{base_url}/a/b/c.json`으로 요청하며, 인증 토큰이 있으면 `auth` 쿼리로 전달한다.
pub struct RestStore {
    base_url: Url,
    auth_token: Option<String>,
    client: Client,
}

impl RestStore {
    pub fn new(base_url: &str, auth_token: Option<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::RequestFailed(format!("클라이언트 생성 실패: {}", e)))?;

        Self::with_client(base_url, auth_token, client)
    }

    pub fn with_client(base_url: &str, auth_token: Option<String>, client: Client) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|_| StoreError::InvalidBaseUrl)?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidBaseUrl);
        }

        Ok(Self { base_url, auth_token, client })
    }

    pub fn from_config(c: &StoreConfig) -> Result<Self, StoreError> {
        let timeout = Duration::from_secs(c.timeout_seconds().unwrap_or(DEFAULT_TIMEOUT_SECONDS));
        Self::new(c.base_url(), c.auth_token().map(|t| t.to_owned()), timeout)
    }

    /// 경로에 해당하는 REST 엔드포인트 URL을 만든다.
    pub fn endpoint(&self, path: &StorePath) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut()
                .map_err(|_| StoreError::InvalidBaseUrl)?;
            segments.pop_if_empty();

            match path.segments().split_last() {
                Some((last, parents)) => {
                    segments.extend(parents);
                    segments.push(&format!("{}.json", last));
                }
                None => {
                    segments.push(".json");
                }
            }
        }

        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }

    fn send(&self, request: RequestBuilder, path: &StorePath) -> Result<String, StoreError> {
        let response = request.send()
            .map_err(|e| {
                error!(path = %path, "{:?}", e);
                StoreError::RequestFailed(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(StoreError::RequestFailed(format!("HTTP 오류: {}", response.status())));
        }

        response.text()
            .map_err(|e| StoreError::ResponseParseFailed(e.to_string()))
    }
}

impl RemoteStore for RestStore {
    fn read_once(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        let url = self.endpoint(path)?;
        debug!(path = %path, "read once");

        let text = self.send(self.client.get(url), path)?;
        let value = serde_json::from_str::<Value>(&text)
            .map_err(|e| StoreError::ResponseParseFailed(e.to_string()))?;

        Ok(match value {
            Value::Null => None,
            v => Some(v),
        })
    }

    fn set_value(&self, path: &StorePath, value: &Value) -> Result<(), StoreError> {
        let url = self.endpoint(path)?;
        debug!(path = %path, "set value");

        self.send(self.client.put(url).json(value), path)
            .map(|_| ())
    }

    fn remove_value(&self, path: &StorePath) -> Result<(), StoreError> {
        let url = self.endpoint(path)?;
        debug!(path = %path, "remove value");

        self.send(self.client.delete(url), path)
            .map(|_| ())
    }
}
