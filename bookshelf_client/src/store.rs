use parking_lot::RwLock;

use crate::api::{Book, BookId};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
/// Local mirror of the books known to the server plus the status of the last operation
pub struct BookState {
    /// Books in the order the server returned them
    pub books: Vec<Book>,
    pub loading: bool,
    pub error: Option<String>,
    /// Not required to be a member of `books`
    pub selected_book: Option<Book>,
}

impl BookState {
    /// Applies the actions in order, starting from the empty state
    pub fn replay(actions: impl IntoIterator<Item = BookAction>) -> Self {
        actions.into_iter().fold(BookState::default(), reduce)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookAction {
    SetLoading(bool),
    /// Always ends loading
    SetError(Option<String>),
    /// Replaces all books, clears error and ends loading
    SetBooks(Vec<Book>),
    /// Appended without checking for an existing id
    AddBook(Book),
    /// Replaces the book with the same id, does nothing if there is none
    UpdateBook(Book),
    DeleteBook(BookId),
    SetSelectedBook(Option<Book>),
}

impl BookAction {
    pub fn name(&self) -> &'static str {
        match self {
            BookAction::SetLoading(_) => "set_loading",
            BookAction::SetError(_) => "set_error",
            BookAction::SetBooks(_) => "set_books",
            BookAction::AddBook(_) => "add_book",
            BookAction::UpdateBook(_) => "update_book",
            BookAction::DeleteBook(_) => "delete_book",
            BookAction::SetSelectedBook(_) => "set_selected_book",
        }
    }
}

/// Computes the state that follows `state` after `action`
pub fn reduce(mut state: BookState, action: BookAction) -> BookState {
    match action {
        BookAction::SetLoading(loading) => {
            state.loading = loading;
        }
        BookAction::SetError(error) => {
            state.error = error;
            state.loading = false;
        }
        BookAction::SetBooks(books) => {
            state.books = books;
            state.error = None;
            state.loading = false;
        }
        BookAction::AddBook(book) => {
            state.books.push(book);
        }
        BookAction::UpdateBook(book) => {
            if let Some(existing) = state.books.iter_mut().find(|existing| existing.id == book.id) {
                *existing = book;
            }
        }
        BookAction::DeleteBook(book_id) => {
            state.books.retain(|book| book.id != book_id);
        }
        BookAction::SetSelectedBook(book) => {
            state.selected_book = book;
        }
    }
    state
}

/// Session wide holder of the book state.
/// The state can only be changed by dispatching actions.
#[derive(Debug, Default)]
pub struct BookStore {
    state: RwLock<BookState>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, action: BookAction) {
        tracing::debug!(action = action.name(), "Dispatching book action");
        let mut state = self.state.write();
        let previous = std::mem::take(&mut *state);
        *state = reduce(previous, action);
        tracing::trace!(
            books = state.books.len(),
            loading = state.loading,
            error = ?state.error,
            "Book state updated"
        );
    }

    /// Copy of the current state
    pub fn state(&self) -> BookState {
        self.state.read().clone()
    }

    pub fn books(&self) -> Vec<Book> {
        self.state.read().books.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn selected_book(&self) -> Option<Book> {
        self.state.read().selected_book.clone()
    }
}
