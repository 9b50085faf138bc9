use crate::date::DateFormatter;
use crate::item::{Book, BookId};
use crate::store::StoreError;
use serde::{Deserialize, Serialize};

/// 상태 엔트리에 저장되는 도서 스냅샷
///
/// 토글을 켠 시점의 도서 정보를 그대로 복사해 저장한다. `releaseDate`는 원본 문자열이 아닌
/// 화면 표시용으로 변환된 문자열이다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSnapshot {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub average_rating: Option<f64>,
    #[serde(rename = "coverImageURL")]
    pub cover_image_url: Option<String>,
    pub genres: Option<Vec<String>>,
    pub description: Option<String>,
    pub release_date: String,
}

impl BookSnapshot {
    pub fn of(book: &Book, formatter: &DateFormatter) -> Self {
        Self {
            id: book.id().clone(),
            title: book.title().to_owned(),
            author: book.author().to_owned(),
            average_rating: book.average_rating(),
            cover_image_url: book.cover_image_url().map(|url| url.to_string()),
            genres: book.genres().map(|g| g.to_vec()),
            description: book.description().map(|d| d.to_owned()),
            release_date: formatter.format(book.release_date()),
        }
    }

    pub fn to_value(&self) -> Result<serde_json::Value, StoreError> {
        serde_json::to_value(self)
            .map_err(|e| StoreError::SerializeFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_uses_store_keys_and_formatted_release_date() {
        let book = Book::builder()
            .id(42u64)
            .title("Dune".to_owned())
            .author("Frank Herbert".to_owned())
            .release_date("1965-08-01T00:00:00+0000".to_owned())
            .build()
            .unwrap();

        let value = BookSnapshot::of(&book, &DateFormatter::default()).to_value().unwrap();

        assert_eq!(json!({
            "id": 42,
            "title": "Dune",
            "author": "Frank Herbert",
            "averageRating": null,
            "coverImageURL": null,
            "genres": null,
            "description": null,
            "releaseDate": "Aug 1, 1965"
        }), value);
    }

    #[test]
    fn snapshot_without_release_date_stores_unknown() {
        let book = Book::builder()
            .id("b-1")
            .title("t".to_owned())
            .author("a".to_owned())
            .build()
            .unwrap();

        let snapshot = BookSnapshot::of(&book, &DateFormatter::default());
        assert_eq!("Unknown", snapshot.release_date);
    }
}
