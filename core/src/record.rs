//! Input records and the document table entries they become.

use crate::error::{RecordError, SearchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type DocId = u32;

/// Granularity of a documentation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Page,
    Section,
    Type,
    Function,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Page,
        Category::Section,
        Category::Type,
        Category::Function,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Page => "page",
            Category::Section => "section",
            Category::Type => "type",
            Category::Function => "function",
            Category::Other => "other",
        }
    }

    /// Lenient parse used at ingestion: unknown labels become `Other`.
    pub fn from_label(label: &str) -> Category {
        label.parse().unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse used for query filters.
impl FromStr for Category {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == label)
            .ok_or_else(|| SearchError::InvalidOptions(format!("unknown category `{}`", s.trim())))
    }
}

/// A record as handed over by the documentation generator. Every field is
/// optional on the wire; [`RawRecord::into_record`] enforces what is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: Option<DocId>,
    pub location: Option<String>,
    pub page: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub text: Option<String>,
}

impl RawRecord {
    pub fn new(location: &str, title: &str, text: &str) -> Self {
        Self {
            location: Some(location.to_string()),
            title: Some(title.to_string()),
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: DocId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_page(mut self, page: &str) -> Self {
        self.page = Some(page.to_string());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Ensure required fields are present. `location` and `title` are
    /// required; the rest fall back to empty values.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.location.is_none() {
            return Err(RecordError::MissingField("location"));
        }
        if self.title.is_none() {
            return Err(RecordError::MissingField("title"));
        }
        Ok(())
    }

    pub fn into_record(self, id: DocId) -> Result<DocumentRecord, RecordError> {
        self.validate()?;
        Ok(DocumentRecord {
            id,
            location: self.location.unwrap_or_default(),
            page: self.page.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            category: self.category.as_deref().map_or(Category::Other, Category::from_label),
            text: self.text.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocId,
    pub location: String,
    pub page: String,
    pub title: String,
    pub category: Category,
    pub text: String,
}
