use chrono::Datelike;
use itertools::Itertools;

use crate::api::{Book, BookId, CreateBookRequest, UpdateBookRequest};

const MIN_YEAR: i32 = 1000;
const MAX_TITLE_LEN: usize = 255;
const MAX_AUTHOR_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_ISBN_LEN: usize = 20;
const MAX_GENRE_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_field_errors(.0))]
/// All rule violations found in a form, in field order
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    /// First message reported for the given field
    pub fn message_for(&self, field: &str) -> Option<&'static str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .join("; ")
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Editable attributes of a book as entered by the user.
/// Optional attributes are kept as strings, an empty string means "not set".
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub description: String,
    pub isbn: String,
    pub genre: String,
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            year: current_year(),
            description: String::new(),
            isbn: String::new(),
            genre: String::new(),
        }
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year,
            description: book.description.clone().unwrap_or_default(),
            isbn: book.isbn.clone().unwrap_or_default(),
            genre: book.genre.clone().unwrap_or_default(),
        }
    }
}

impl BookForm {
    pub fn validate(&self) -> Result<CreateBookRequest, ValidationErrors> {
        self.validate_for_year(current_year())
    }

    /// Validates the form and builds an update request for the book with given id
    pub fn validate_update(
        &self,
        id: impl Into<BookId>,
    ) -> Result<UpdateBookRequest, ValidationErrors> {
        Ok(self.validate()?.with_id(id))
    }

    /// Checks every rule and collects all violations.
    /// `current_year` is the upper bound for the publication year.
    pub fn validate_for_year(
        &self,
        current_year: i32,
    ) -> Result<CreateBookRequest, ValidationErrors> {
        let mut errors = Vec::new();

        if self.title.is_empty() {
            errors.push(field_error("title", "Title is required"));
        } else if too_long(&self.title, MAX_TITLE_LEN) {
            errors.push(field_error("title", "Title is too long"));
        }

        if self.author.is_empty() {
            errors.push(field_error("author", "Author is required"));
        } else if too_long(&self.author, MAX_AUTHOR_LEN) {
            errors.push(field_error("author", "Author name is too long"));
        }

        if self.year < MIN_YEAR {
            errors.push(field_error("year", "Invalid year"));
        } else if self.year > current_year {
            errors.push(field_error("year", "Year cannot be in the future"));
        }

        if too_long(&self.description, MAX_DESCRIPTION_LEN) {
            errors.push(field_error("description", "Description is too long"));
        }
        if too_long(&self.isbn, MAX_ISBN_LEN) {
            errors.push(field_error("isbn", "ISBN is too long"));
        }
        if too_long(&self.genre, MAX_GENRE_LEN) {
            errors.push(field_error("genre", "Genre is too long"));
        }

        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }

        Ok(CreateBookRequest {
            title: self.title.clone(),
            author: self.author.clone(),
            year: self.year,
            description: non_empty(&self.description),
            isbn: non_empty(&self.isbn),
            genre: non_empty(&self.genre),
        })
    }
}

fn field_error(field: &'static str, message: &'static str) -> FieldError {
    FieldError { field, message }
}

fn too_long(value: &str, max_len: usize) -> bool {
    value.chars().count() > max_len
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
