use std::sync::Arc;
use std::time::UNIX_EPOCH;

use bookshelf_client::app_config::ClientConfig;
use bookshelf_client::client::{BookApi, BookServiceClient};
use bookshelf_client::notifications::{NotificationKind, RecordingNotifier};
use bookshelf_client::store::BookStore;
use bookshelf_client::sync::BookSync;
use bookshelf_client::validation::BookForm;

fn unique_title(prefix: &str) -> String {
    format!(
        "{} {}",
        prefix,
        std::time::SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    )
}

fn books_api_url() -> String {
    ClientConfig::load()
        .expect("Failed to load config")
        .api_base_url
}

#[tokio::test]
/// Simple test for the books api client
/// Creates a book
/// Gets the book
/// Updates the book
/// Lists books and checks if the book is there
/// Deletes the book and checks that it is gone
async fn books_api_client_e2e_test() {
    let client = BookServiceClient::new(&books_api_url()).expect("Failed to create client");

    let title = unique_title("Client test");
    let form = BookForm {
        title: title.clone(),
        author: "Author1".to_string(),
        year: 1999,
        description: "Description1".to_string(),
        ..BookForm::default()
    };
    let request = form.validate().expect("Form should be valid");

    let created = client
        .create_book(&request)
        .await
        .expect("Failed to create book");
    assert_eq!(created.title, title);
    assert_eq!(created.description.as_deref(), Some("Description1"));

    let fetched = client
        .get_book(&created.id)
        .await
        .expect("Failed to get book");
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.title, title);

    let updated_title = unique_title("Updated client test");
    let update = BookForm {
        title: updated_title.clone(),
        ..BookForm::from(&fetched)
    }
    .validate_update(created.id.clone())
    .expect("Form should be valid");
    let updated = client
        .update_book(&update)
        .await
        .expect("Failed to update book");
    assert_eq!(updated.title, updated_title);

    let books = client.list_books().await.expect("Failed to list books");
    assert!(books
        .iter()
        .any(|book| book.id == created.id && book.title == updated_title));

    client
        .delete_book(&created.id)
        .await
        .expect("Failed to delete book");
    let err = client.get_book(&created.id).await.unwrap_err();
    assert_eq!(err.status(), 404);
}

#[tokio::test]
/// Simple test for the synchronization of the local store
/// Fetches all books
/// Creates a book and sees it locally
/// Selects it by fetching
/// Deletes it and checks it is gone locally
/// Checks that the server rejection of an invalid book is recorded
async fn book_sync_e2e_test() {
    let notifier = Arc::new(RecordingNotifier::default());
    let sync = BookSync::new(
        Arc::new(BookStore::new()),
        Arc::new(BookServiceClient::new(&books_api_url()).expect("Failed to create client")),
        notifier.clone(),
    );

    sync.fetch_books().await;
    assert_eq!(sync.error(), None);
    let books_before = sync.books();

    let created = sync
        .create_book(
            BookForm {
                title: unique_title("Sync test"),
                author: "Author2".to_string(),
                year: 2001,
                ..BookForm::default()
            }
            .validate()
            .expect("Form should be valid"),
        )
        .await
        .expect("Failed to create book");
    assert_eq!(sync.books().len(), books_before.len() + 1);
    assert_eq!(sync.books().last(), Some(&created));

    let fetched = sync
        .fetch_book(&created.id)
        .await
        .expect("Failed to fetch book");
    assert_eq!(sync.selected_book(), Some(fetched));

    sync.delete_book(&created.id)
        .await
        .expect("Failed to delete book");
    assert!(!sync.books().iter().any(|book| book.id == created.id));

    let invalid = BookForm {
        title: String::new(),
        author: "Author3".to_string(),
        year: 2001,
        ..BookForm::default()
    }
    .validate_for_year(2001)
    .unwrap_err();
    assert_eq!(invalid.message_for("title"), Some("Title is required"));

    // skips local validation on purpose, the server has to reject it
    let result = sync
        .create_book(bookshelf_client::api::CreateBookRequest {
            title: String::new(),
            author: "Author3".to_string(),
            year: 2001,
            description: None,
            isbn: None,
            genre: None,
        })
        .await;
    assert!(result.is_err());
    assert!(sync.error().is_some());
    assert!(!sync.loading());
    assert_eq!(
        notifier.last().map(|notification| notification.kind),
        Some(NotificationKind::Error)
    );
}
