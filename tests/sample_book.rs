use book_look_rust::item::{BookId, ItemError};
use book_look_rust::read_book_file;
use book_look_rust::view::BookDetail;
use std::path::PathBuf;

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples").join(name)
}

#[test]
fn sample_book_renders() {
    let book = read_book_file(sample("dune.json")).unwrap();
    assert_eq!(&BookId::Number(42), book.id());

    let detail = BookDetail::new(book);
    let text = detail.to_string();

    assert!(text.contains("Author: Frank Herbert"));
    assert!(text.contains("Release Date: Aug 1, 1965"));
    assert!(text.contains("Description: A desert planet, a spice, and a prophecy."));
}

#[test]
fn missing_file_is_an_item_error() {
    assert!(matches!(read_book_file(sample("missing.json")), Err(ItemError::InvalidArgument(_))));
}
