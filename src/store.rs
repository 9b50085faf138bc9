pub mod memory;
pub mod rest;

use crate::item::{BookId, Category};
use serde_json::Value;
use std::fmt;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// 사용자 데이터가 저장되는 최상위 노드
pub const USERS_ROOT: &str = "users";

/// 키로 사용할 수 없는 문자
const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '$', '#', '[', ']', '/'];

/// 원격 저장소에서 발생하는 에러
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    #[error("invalid base url")]
    InvalidBaseUrl,

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("response parse failed: {0}")]
    ResponseParseFailed(String),

    #[error("value serialization failed: {0}")]
    SerializeFailed(String),
}

/// 계층형 키-값 저장소의 경로
///
/// # Example
/// ```
/// use book_look_rust::item::{BookId, Category};
/// use book_look_rust::store::StorePath;
///
/// let path = StorePath::status_entry("uid-1", Category::Wishlist, &BookId::Number(42)).unwrap();
/// assert_eq!("users/uid-1/wishlist/42", path.to_string());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// 하위 경로를 만든다. 빈 키나 사용할 수 없는 문자가 포함된 키는 거부한다.
    pub fn child(&self, key: &str) -> Result<Self, StoreError> {
        if key.is_empty() || key.contains(&FORBIDDEN_KEY_CHARS[..]) {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }

        let mut segments = self.segments.clone();
        segments.push(key.to_owned());
        Ok(Self { segments })
    }

    /// `users/{user_id}/{category}/{book_id}`
    pub fn status_entry(user_id: &str, category: Category, book_id: &BookId) -> Result<Self, StoreError> {
        Self::root()
            .child(USERS_ROOT)?
            .child(user_id)?
            .child(category.to_code_str())?
            .child(&book_id.to_string())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Display for StorePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// 원격 키-값 저장소
///
/// 구현체는 여러 스레드에서 동시에 호출될 수 있다.
pub trait RemoteStore: Send + Sync {

    /// 경로의 현재 값을 한번 읽는다. 값이 없으면 [`None`]을 반환한다.
    fn read_once(&self, path: &StorePath) -> Result<Option<Value>, StoreError>;

    /// 경로에 값을 저장한다. 기존 값은 덮어쓴다.
    fn set_value(&self, path: &StorePath, value: &Value) -> Result<(), StoreError>;

    /// 경로의 값을 삭제한다. 값이 없어도 성공으로 처리한다.
    fn remove_value(&self, path: &StorePath) -> Result<(), StoreError>;
}

impl<S: RemoteStore + ?Sized> RemoteStore for Box<S> {
    fn read_once(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        (**self).read_once(path)
    }

    fn set_value(&self, path: &StorePath, value: &Value) -> Result<(), StoreError> {
        (**self).set_value(path, value)
    }

    fn remove_value(&self, path: &StorePath) -> Result<(), StoreError> {
        (**self).remove_value(path)
    }
}
