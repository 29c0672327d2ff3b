use std::fmt;

/// A profile identifier pulled out of a URL, scoped to one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedIdentifier {
    NumericId(String),
    Username(String),
}

impl ExtractedIdentifier {
    /// Returns `None` for an empty value, since an empty identifier means
    /// extraction failed.
    pub fn classify(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else if value.bytes().all(|b| b.is_ascii_digit()) {
            Some(ExtractedIdentifier::NumericId(value))
        } else {
            Some(ExtractedIdentifier::Username(value))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExtractedIdentifier::NumericId(value) | ExtractedIdentifier::Username(value) => value,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ExtractedIdentifier::NumericId(_))
    }
}

impl fmt::Display for ExtractedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
