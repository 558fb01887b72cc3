use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// Separator used when an [`EmailSet`] is written into a single table cell
pub const EMAIL_SEPARATOR: &str = ", ";

/// Ordered, case-insensitively distinct email addresses.
///
/// **INVARIANT:** no two entries are equal after lowercasing. Entries keep the
/// casing they had when first inserted, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailSet {
    entries: Vec<String>,
    folded: HashSet<String>,
}

impl EmailSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an address unless an equal one (ignoring case) is already present.
    ///
    /// Returns `true` when the address was added.
    pub fn insert(&mut self, email: &str) -> bool {
        if self.folded.insert(email.to_lowercase()) {
            self.entries.push(email.to_string());
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.entries.iter()
    }

    /// Comma-joined form used in result tables (`"a@x.io, b@y.io"`)
    #[must_use]
    pub fn joined(&self) -> String {
        self.entries.join(EMAIL_SEPARATOR)
    }
}

impl<'a> IntoIterator for &'a EmailSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for EmailSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for email in iter {
            set.insert(email.as_ref());
        }
        set
    }
}

impl Serialize for EmailSet {
    fn serialize<Z: Serializer>(&self, serializer: Z) -> Result<Z::Ok, Z::Error> {
        serializer.serialize_str(&self.joined())
    }
}
