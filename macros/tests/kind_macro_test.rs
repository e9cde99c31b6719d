//! Tests for #[derive(Kind)] macro

use rxstore_core::Kind;
use rxstore_macros::Kind;

#[derive(Kind, Clone, Debug, PartialEq)]
enum ShelfCommand {
    AddBook(String),
    RemoveBook {
        isbn: String,
    },
    Dust,
}

#[derive(Kind, Clone, Debug, PartialEq)]
enum ShelfEvent {
    BookAdded(String),
    #[kind("book-gone")]
    BookRemoved {
        isbn: String,
    },
    #[kind("was-dusted")]
    Dusted,
}

#[derive(Kind)]
enum Wrapped<T> {
    Value(T),
    Nothing,
}

#[test]
fn test_default_tags_are_kebab_case() {
    assert_eq!(ShelfCommand::AddBook("x".to_string()).kind(), "add-book");
    assert_eq!(
        ShelfCommand::RemoveBook {
            isbn: "x".to_string()
        }
        .kind(),
        "remove-book"
    );
    assert_eq!(ShelfCommand::Dust.kind(), "dust");
}

#[test]
fn test_overridden_tags() {
    assert_eq!(ShelfEvent::BookAdded("x".to_string()).kind(), "book-added");
    assert_eq!(
        ShelfEvent::BookRemoved {
            isbn: "x".to_string()
        }
        .kind(),
        "book-gone"
    );
    assert_eq!(ShelfEvent::Dusted.kind(), "was-dusted");
}

#[test]
fn test_generic_enums() {
    assert_eq!(Wrapped::Value(3_u8).kind(), "value");
    assert_eq!(Wrapped::<u8>::Nothing.kind(), "nothing");
}
