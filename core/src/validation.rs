//! Client-side form checks, run before any request is issued.
//!
//! Checks are sequential: the first failing rule wins, in the order the form
//! presents its fields (title, author, description, genre).

use thiserror::Error;

use crate::types::{Book, BookInput, LoginRequest, RegisterRequest};

const MIN_TITLE_CHARS: usize = 3;
const MIN_AUTHOR_CHARS: usize = 3;
const MIN_DESCRIPTION_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Title is required")]
    TitleRequired,
    #[error("Title must be at least 3 characters")]
    TitleTooShort,
    #[error("Author is required")]
    AuthorRequired,
    #[error("Author must be at least 3 characters")]
    AuthorTooShort,
    #[error("Description is required")]
    DescriptionRequired,
    #[error("Description must be at least 10 characters")]
    DescriptionTooShort,
    #[error("Genre is required")]
    GenreRequired,
}

/// Raw, untrimmed form state of the book editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: String,
}

impl BookDraft {
    /// Pre-fill the editor from an existing book.
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            description: book.description.clone(),
            genre: book.genre.clone(),
        }
    }

    /// Check the draft and produce the trimmed payload.
    pub fn validate(&self) -> Result<BookInput, ValidationError> {
        let title = self.title.trim();
        let author = self.author.trim();
        let description = self.description.trim();
        let genre = self.genre.trim();

        check_length(
            title,
            MIN_TITLE_CHARS,
            ValidationError::TitleRequired,
            ValidationError::TitleTooShort,
        )?;
        check_length(
            author,
            MIN_AUTHOR_CHARS,
            ValidationError::AuthorRequired,
            ValidationError::AuthorTooShort,
        )?;
        check_length(
            description,
            MIN_DESCRIPTION_CHARS,
            ValidationError::DescriptionRequired,
            ValidationError::DescriptionTooShort,
        )?;
        if genre.is_empty() {
            return Err(ValidationError::GenreRequired);
        }

        Ok(BookInput {
            title: title.to_string(),
            author: author.to_string(),
            description: description.to_string(),
            genre: genre.to_string(),
        })
    }
}

fn check_length(
    value: &str,
    min: usize,
    empty: ValidationError,
    short: ValidationError,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(empty);
    }
    if value.chars().count() < min {
        return Err(short);
    }
    Ok(())
}

/// Reject a login form with a blank username or an empty password.
pub fn validate_login(username: &str, password: &str) -> Result<LoginRequest, ValidationError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    Ok(LoginRequest::new(username, password))
}

/// Reject a registration form missing username, email or password.
pub fn validate_registration(
    username: &str,
    password: &str,
    email: &str,
    name: Option<&str>,
) -> Result<RegisterRequest, ValidationError> {
    if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    Ok(RegisterRequest::new(username, password, email, name))
}
