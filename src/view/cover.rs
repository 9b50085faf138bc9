use reqwest::blocking::Client;
use reqwest::Url;
use std::time::Duration;
use tracing::warn;

/// 표지 이미지 로딩 상태
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CoverPhase {
    /// 로딩 중이거나 아직 요청하지 않음
    #[default]
    Empty,

    Success(Vec<u8>),

    Failure,
}

/// 표지 이미지 로더
pub trait ImageLoader {
    fn load(&self, url: &Url) -> CoverPhase;
}

impl<T> ImageLoader for T where T: Fn(&Url) -> CoverPhase {
    fn load(&self, url: &Url) -> CoverPhase {
        self(url)
    }
}

/// HTTP로 이미지를 내려받는 로더. 캐싱은 하지 않는다.
pub struct HttpImageLoader {
    client: Client,
}

impl HttpImageLoader {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl ImageLoader for HttpImageLoader {
    fn load(&self, url: &Url) -> CoverPhase {
        let response = self.client.get(url.clone())
            .send()
            .and_then(|r| r.error_for_status());

        match response.and_then(|r| r.bytes()) {
            Ok(bytes) if !bytes.is_empty() => CoverPhase::Success(bytes.to_vec()),
            Ok(_) => {
                warn!(url = %url, "empty cover image");
                CoverPhase::Failure
            }
            Err(e) => {
                warn!(url = %url, "{:?}", e);
                CoverPhase::Failure
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_stub::OneShotServer;

    fn load(server: &OneShotServer) -> CoverPhase {
        let url = Url::parse(&format!("{}/covers/42.jpg", server.base_url())).unwrap();
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        HttpImageLoader::with_client(client).load(&url)
    }

    #[test]
    fn downloaded_bytes_are_success() {
        let server = OneShotServer::respond("200 OK", &[0xFF, 0xD8, 0xFF]);

        assert_eq!(CoverPhase::Success(vec![0xFF, 0xD8, 0xFF]), load(&server));
        assert!(server.request().starts_with("GET /covers/42.jpg HTTP/1.1"));
    }

    #[test]
    fn missing_image_is_failure() {
        let server = OneShotServer::respond("404 Not Found", b"");

        assert_eq!(CoverPhase::Failure, load(&server));
        server.request();
    }

    #[test]
    fn empty_body_is_failure() {
        let server = OneShotServer::respond("200 OK", b"");

        assert_eq!(CoverPhase::Failure, load(&server));
        server.request();
    }
}
