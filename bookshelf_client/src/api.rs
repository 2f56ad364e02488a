use serde::{Deserialize, Serialize};

pub type BookId = String;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
/// Book as returned by the books api
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Set by the server, only meant to be displayed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Set by the server, only meant to be displayed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
/// Body of POST /books
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

impl CreateBookRequest {
    pub fn with_id(self, id: impl Into<BookId>) -> UpdateBookRequest {
        UpdateBookRequest {
            id: id.into(),
            details: self,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
/// Body of PUT /books/{id}. Carries the same fields as a create request plus the id of the book to overwrite
pub struct UpdateBookRequest {
    pub id: BookId,
    #[serde(flatten)]
    pub details: CreateBookRequest,
}

#[derive(Debug, Default, Clone, Deserialize)]
/// Error body returned by the books api, only the message is of interest
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}
