use crate::item::{Book, ItemError};
use std::fs;
use std::path::Path;

pub mod config;
pub mod date;
pub mod item;
pub mod session;
pub mod status;
pub mod store;
pub mod view;

#[cfg(test)]
mod http_stub;

/// JSON 파일에서 도서 하나를 읽어온다.
pub fn read_book_file<P: AsRef<Path>>(path: P) -> Result<Book, ItemError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .map_err(|e| ItemError::InvalidArgument(format!("{}: {}", path.display(), e)))?;

    item::book_from_json(&json)
}
