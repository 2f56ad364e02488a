use std::sync::Arc;

use crate::api::{Book, CreateBookRequest, UpdateBookRequest};
use crate::client::{ApiError, BookApi};
use crate::notifications::{Notification, Notifier};
use crate::store::{BookAction, BookStore};

const FETCH_BOOKS_FAILED: &str = "Failed to fetch books";
const FETCH_BOOK_FAILED: &str = "Failed to fetch book";
const CREATE_BOOK_FAILED: &str = "Failed to create book";
const UPDATE_BOOK_FAILED: &str = "Failed to update book";
const DELETE_BOOK_FAILED: &str = "Failed to delete book";

pub const BOOK_CREATED: &str = "Book created successfully";
pub const BOOK_UPDATED: &str = "Book updated successfully";
pub const BOOK_DELETED: &str = "Book deleted successfully";

/// Sets loading when created and clears it when dropped,
/// so loading ends on every exit path of an operation.
struct LoadingGuard<'a> {
    store: &'a BookStore,
}

impl<'a> LoadingGuard<'a> {
    fn start(store: &'a BookStore) -> Self {
        store.dispatch(BookAction::SetLoading(true));
        Self { store }
    }

    /// Leaves loading as it is, for operations whose final action already ended it
    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.dispatch(BookAction::SetLoading(false));
    }
}

/// Keeps the book store in sync with the books api.
///
/// Every operation makes exactly one call to the api, records the outcome in the store
/// and notifies the user. Loading is a single flag shared by all operations, so when
/// operations overlap it reflects whichever one changed it last.
pub struct BookSync {
    store: Arc<BookStore>,
    api: Arc<dyn BookApi>,
    notifier: Arc<dyn Notifier>,
}

impl BookSync {
    pub fn new(store: Arc<BookStore>, api: Arc<dyn BookApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            api,
            notifier,
        }
    }

    pub fn store(&self) -> &Arc<BookStore> {
        &self.store
    }

    pub fn books(&self) -> Vec<Book> {
        self.store.books()
    }

    pub fn loading(&self) -> bool {
        self.store.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.store.error()
    }

    pub fn selected_book(&self) -> Option<Book> {
        self.store.selected_book()
    }

    pub fn set_selected_book(&self, book: Option<Book>) {
        self.store.dispatch(BookAction::SetSelectedBook(book));
    }

    /// Replaces the local books with the server ones.
    /// Failures are only recorded in the store, the caller has to check `error()`.
    /// Dropping the future before the response arrives ends loading without touching books.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_books(&self) {
        self.store.dispatch(BookAction::SetError(None));
        let loading = LoadingGuard::start(&self.store);
        match self.api.list_books().await {
            Ok(books) => self.store.dispatch(BookAction::SetBooks(books)),
            Err(err) => self.report_failure(&err, FETCH_BOOKS_FAILED),
        }
        // SetBooks and SetError end loading
        loading.disarm();
    }

    /// Fetches a book and makes it the selected one
    #[tracing::instrument(skip(self))]
    pub async fn fetch_book(&self, book_id: &str) -> Result<Book, ApiError> {
        let _loading = LoadingGuard::start(&self.store);
        match self.api.get_book(book_id).await {
            Ok(book) => {
                self.store
                    .dispatch(BookAction::SetSelectedBook(Some(book.clone())));
                Ok(book)
            }
            Err(err) => {
                self.report_failure(&err, FETCH_BOOK_FAILED);
                Err(err)
            }
        }
    }

    #[tracing::instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_book(&self, request: CreateBookRequest) -> Result<Book, ApiError> {
        let _loading = LoadingGuard::start(&self.store);
        match self.api.create_book(&request).await {
            Ok(book) => {
                self.store.dispatch(BookAction::AddBook(book.clone()));
                self.notifier.notify(Notification::success(BOOK_CREATED));
                Ok(book)
            }
            Err(err) => {
                self.report_failure(&err, CREATE_BOOK_FAILED);
                Err(err)
            }
        }
    }

    /// Local books are only changed if the updated book is among them
    #[tracing::instrument(skip(self, request), fields(book_id = %request.id))]
    pub async fn update_book(&self, request: UpdateBookRequest) -> Result<Book, ApiError> {
        let _loading = LoadingGuard::start(&self.store);
        match self.api.update_book(&request).await {
            Ok(book) => {
                self.store.dispatch(BookAction::UpdateBook(book.clone()));
                self.notifier.notify(Notification::success(BOOK_UPDATED));
                Ok(book)
            }
            Err(err) => {
                self.report_failure(&err, UPDATE_BOOK_FAILED);
                Err(err)
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_book(&self, book_id: &str) -> Result<(), ApiError> {
        let _loading = LoadingGuard::start(&self.store);
        match self.api.delete_book(book_id).await {
            Ok(()) => {
                self.store
                    .dispatch(BookAction::DeleteBook(book_id.to_string()));
                self.notifier.notify(Notification::success(BOOK_DELETED));
                Ok(())
            }
            Err(err) => {
                self.report_failure(&err, DELETE_BOOK_FAILED);
                Err(err)
            }
        }
    }

    fn report_failure(&self, err: &ApiError, fallback_message: &str) {
        let message = if err.message().is_empty() {
            fallback_message
        } else {
            err.message()
        };
        tracing::warn!(status = err.status(), "{}", message);
        self.store
            .dispatch(BookAction::SetError(Some(message.to_string())));
        self.notifier.notify(Notification::error(message));
    }
}
