mod snapshot;

pub use snapshot::BookSnapshot;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Item 모듈에서 사용할 에러 열거
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    /// 필수 데이터가 입력 되지 않음
    #[error("required argument missing: {0}")]
    RequireArgumentMissing(String),

    /// 알 수 없는 열거형 코드
    #[error("unknown code: {0}")]
    UnknownCode(String),

    /// 형식이 맞지 않는 값
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// 사용자가 도서를 분류하는 상태 카테고리
///
/// 세 카테고리는 서로 독립적이며 한 도서가 여러 카테고리에 동시에 속할 수 있다.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Category {
    Wishlist,
    CurrentRead,
    HaveRead,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Wishlist, Category::CurrentRead, Category::HaveRead];

    /// 원격 저장소 경로에 사용되는 코드
    pub fn to_code_str(&self) -> &'static str {
        match self {
            Category::Wishlist => "wishlist",
            Category::CurrentRead => "currentread",
            Category::HaveRead => "haveread",
        }
    }
}

impl TryFrom<&str> for Category {
    type Error = ItemError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "wishlist" => Ok(Category::Wishlist),
            "currentread" => Ok(Category::CurrentRead),
            "haveread" => Ok(Category::HaveRead),
            _ => Err(ItemError::UnknownCode(value.to_owned())),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Category::Wishlist => write!(f, "WISHLIST"),
            Category::CurrentRead => write!(f, "CURRENT_READ"),
            Category::HaveRead => write!(f, "HAVE_READ"),
        }
    }
}

/// 도서 식별자
///
/// 업스트림 데이터에 따라 숫자 혹은 문자열로 들어오며, 저장소 키로 사용할 때는 문자열로 변환한다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookId {
    Number(u64),
    Text(String),
}

impl Display for BookId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BookId::Number(n) => write!(f, "{}", n),
            BookId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for BookId {
    fn from(value: u64) -> Self {
        BookId::Number(value)
    }
}

impl From<&str> for BookId {
    fn from(value: &str) -> Self {
        BookId::Text(value.to_owned())
    }
}

impl From<String> for BookId {
    fn from(value: String) -> Self {
        BookId::Text(value)
    }
}

/// 장르
///
/// 업스트림 데이터에는 장르 이름만 있으며 앞뒤 공백은 제거한다.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Genre {
    name: String,
}

impl Genre {
    pub fn new(name: &str) -> Self {
        Self { name: name.trim().to_owned() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// 도서
///
/// 한번 생성된 도서는 변경할 수 없다.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    genres: Option<Vec<String>>,
    average_rating: Option<f64>,
    cover_image_url: Option<Url>,
    release_date: Option<String>,
    description: Option<String>,
}

impl Book {
    pub fn builder() -> BookBuilder {
        BookBuilder::new()
    }

    pub fn id(&self) -> &BookId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn genres(&self) -> Option<&[String]> {
        self.genres.as_deref()
    }

    /// 장르 목록을 [`Genre`]로 변환한다. 비어있는 이름은 제외한다.
    pub fn genre_items(&self) -> Vec<Genre> {
        self.genres.iter()
            .flatten()
            .map(|name| Genre::new(name))
            .filter(|genre| !genre.name().is_empty())
            .collect()
    }

    pub fn average_rating(&self) -> Option<f64> {
        self.average_rating
    }

    pub fn cover_image_url(&self) -> Option<&Url> {
        self.cover_image_url.as_ref()
    }

    /// 업스트림에서 받은 가공되지 않은 출판일 문자열
    pub fn release_date(&self) -> Option<&str> {
        self.release_date.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Book 빌더
///
/// # Example
/// ```
/// use book_look_rust::item::{Book, BookId};
///
/// let book = Book::builder()
///     .id(42u64)
///     .title("Dune".to_owned())
///     .author("Frank Herbert".to_owned())
///     .build()
///     .unwrap();
///
/// assert_eq!(&BookId::Number(42), book.id());
/// assert!(book.genres().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookBuilder {
    id: Option<BookId>,
    title: Option<String>,
    author: Option<String>,
    genres: Option<Vec<String>>,
    average_rating: Option<f64>,
    cover_image_url: Option<Url>,
    release_date: Option<String>,
    description: Option<String>,
}

impl BookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id<I: Into<BookId>>(mut self, id: I) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }

    pub fn author(mut self, author: String) -> Self {
        self.author = Some(author);
        self
    }

    pub fn genres(mut self, genres: Vec<String>) -> Self {
        self.genres = Some(genres);
        self
    }

    pub fn average_rating(mut self, rating: f64) -> Self {
        self.average_rating = Some(rating);
        self
    }

    pub fn cover_image_url(mut self, url: Url) -> Self {
        self.cover_image_url = Some(url);
        self
    }

    pub fn release_date(mut self, release_date: String) -> Self {
        self.release_date = Some(release_date);
        self
    }

    pub fn description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn build(self) -> Result<Book, ItemError> {
        let id = self.id.ok_or(ItemError::RequireArgumentMissing("id".to_owned()))?;
        let title = self.title.ok_or(ItemError::RequireArgumentMissing("title".to_owned()))?;
        let author = self.author.ok_or(ItemError::RequireArgumentMissing("author".to_owned()))?;

        Ok(Book {
            id,
            title,
            author,
            genres: self.genres,
            average_rating: self.average_rating,
            cover_image_url: self.cover_image_url,
            release_date: self.release_date,
            description: self.description,
        })
    }
}

/// 목록/검색 API에서 내려오는 도서 JSON
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genres: Option<Vec<String>>,
    pub average_rating: Option<f64>,
    #[serde(rename = "coverImageURL")]
    pub cover_image_url: Option<String>,
    pub release_date: Option<String>,
    pub description: Option<String>,
}

impl BookPayload {
    pub fn to_book_builder(&self) -> Result<BookBuilder, ItemError> {
        let mut builder = BookBuilder::new()
            .id(self.id.clone())
            .title(self.title.clone())
            .author(self.author.clone());

        if let Some(genres) = &self.genres {
            builder = builder.genres(genres.clone());
        }
        if let Some(rating) = self.average_rating {
            builder = builder.average_rating(rating);
        }
        if let Some(url) = &self.cover_image_url {
            let url = Url::parse(url)
                .map_err(|e| ItemError::InvalidArgument(format!("coverImageURL {}: {}", url, e)))?;
            builder = builder.cover_image_url(url);
        }
        if let Some(release_date) = &self.release_date {
            builder = builder.release_date(release_date.clone());
        }
        if let Some(description) = &self.description {
            builder = builder.description(description.clone());
        }

        Ok(builder)
    }
}

impl TryFrom<BookPayload> for Book {
    type Error = ItemError;

    fn try_from(value: BookPayload) -> Result<Self, Self::Error> {
        value.to_book_builder()?.build()
    }
}

/// JSON 문자열에서 도서를 읽어온다.
pub fn book_from_json(json: &str) -> Result<Book, ItemError> {
    let payload = serde_json::from_str::<BookPayload>(json)
        .map_err(|e| ItemError::InvalidArgument(e.to_string()))?;
    Book::try_from(payload)
}
