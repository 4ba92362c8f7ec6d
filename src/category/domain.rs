//! Core category domain types.

use std::fmt::Display;

use serde::Serialize;
use time::OffsetDateTime;
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, UserID, transaction_type::TransactionType};

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single user-perceived character, usually an emoji, shown next to a category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct CategoryIcon(String);

impl CategoryIcon {
    /// Create a category icon from `icon` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidCategoryIcon] unless `icon` is exactly one grapheme cluster.
    pub fn new(icon: &str) -> Result<Self, Error> {
        let icon = icon.trim();

        if icon.graphemes(true).count() == 1 {
            Ok(Self(icon.to_owned()))
        } else {
            Err(Error::InvalidCategoryIcon(icon.to_owned()))
        }
    }

    /// Create a category icon without validation.
    pub fn new_unchecked(icon: &str) -> Self {
        Self(icon.to_owned())
    }
}

impl AsRef<str> for CategoryIcon {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category.
pub type CategoryId = i64;

/// A user's named grouping for income or expense transactions, e.g. "🍕 Food".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    /// The database ID.
    #[serde(skip)]
    pub id: CategoryId,
    /// The user that owns the category.
    #[serde(skip)]
    pub user_id: UserID,
    /// The name, unique per user and type.
    pub name: CategoryName,
    /// The emoji shown next to the name.
    pub icon: CategoryIcon,
    /// Whether the category is for income or expenses.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// When the category was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The validated fields needed to create a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The user that will own the category.
    pub user_id: UserID,
    /// The name, which must not be taken by another category of the same type.
    pub name: CategoryName,
    /// The emoji shown next to the name.
    pub icon: CategoryIcon,
    /// Whether the category is for income or expenses.
    pub transaction_type: TransactionType,
}
