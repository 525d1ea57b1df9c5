//! Values entered into a form.

use std::collections::HashSet;

/// The current value of one field, as held by the form runtime.
///
/// Free-entry and single-choice fields hold text (`""` when nothing was
/// entered or selected); checkbox groups hold the set of checked option
/// values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Checked(Vec<String>),
}

impl FieldValue {
    /// A text value.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// A checked set; duplicates are dropped, first occurrence wins.
    #[must_use]
    pub fn checked<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let values = values
            .into_iter()
            .map(Into::into)
            .filter(|v: &String| seen.insert(v.clone()))
            .collect();
        Self::Checked(values)
    }

    /// Whether nothing was entered or checked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Checked(v) => v.is_empty(),
        }
    }

    /// The entered text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Checked(_) => None,
        }
    }

    /// Number of selected values: the checked count, or 0/1 for text.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        match self {
            Self::Text(s) => usize::from(!s.is_empty()),
            Self::Checked(v) => v.len(),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
