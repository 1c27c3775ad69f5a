use std::fmt;

use serde::{Deserialize, Serialize};

/// Surrogate primary key, assigned by the store on insert and immutable
/// afterwards. Never reused after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(i32);

impl BookId {
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for BookId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A persisted book record. The store is the sole source of truth; no copy
/// of a `Book` is cached across repository calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
}

/// Input for creating a book. All fields required; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
}

/// Partial update with merge-by-presence semantics: only fields that are
/// present and non-empty replace the stored value. An explicitly supplied
/// empty string (or a publication year of 0) counts as absent, so a caller
/// that omits or blanks a field can never erase it by accident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
}

impl BookPatch {
    /// True when no field would change anything.
    pub fn is_empty(&self) -> bool {
        present(&self.title).is_none()
            && present(&self.author).is_none()
            && present(&self.isbn).is_none()
            && self.publication_year.filter(|year| *year != 0).is_none()
    }

    /// Applies the patch on top of the stored record, keeping the stored
    /// value wherever the patch field is absent or empty.
    pub fn merged_with(&self, current: &Book) -> Book {
        Book {
            id: current.id,
            title: present(&self.title).unwrap_or(&current.title).clone(),
            author: present(&self.author).unwrap_or(&current.author).clone(),
            isbn: present(&self.isbn).unwrap_or(&current.isbn).clone(),
            publication_year: self
                .publication_year
                .filter(|year| *year != 0)
                .unwrap_or(current.publication_year),
        }
    }
}

fn present(value: &Option<String>) -> Option<&String> {
    value.as_ref().filter(|text| !text.trim().is_empty())
}
