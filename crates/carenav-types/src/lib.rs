//! Validated primitives shared across the CareNav crates.
//!
//! Each type here guarantees its invariant once constructed, so the policy code in
//! `carenav-core` never has to re-check for blank identifiers or mixed-case module names.

use std::fmt;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input contained a line break
    #[error("Text cannot contain line breaks")]
    Multiline,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Errors
    ///
    /// Returns `Err(TextError::Empty)` if the input is empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Identifier of a tenant organization (hospital, clinic or pharmacy).
///
/// Organization ids are opaque to CareNav. The only guarantee is that they are non-blank and
/// single-line, which is what "present and non-empty" means throughout tenant resolution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrganizationId(NonEmptyText);

impl OrganizationId {
    /// Parses an organization id.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for blank input and [`TextError::Multiline`] if the id
    /// contains a line break.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let text = NonEmptyText::new(input)?;
        if text.as_str().contains(['\n', '\r']) {
            return Err(TextError::Multiline);
        }
        Ok(Self(text))
    }

    /// Lenient constructor for values coming from session storage or login payloads, where a
    /// missing or blank id simply means "no organization".
    pub fn from_optional(input: Option<&str>) -> Option<Self> {
        input.and_then(|raw| Self::new(raw).ok())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl serde::Serialize for OrganizationId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for OrganizationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OrganizationId::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Name of an optional feature module a tenant can enable (for example `lab` or `pharmacy`).
///
/// Module names are trimmed and lower-cased on construction so that catalog entries and the
/// enabled-module lists returned by the backend compare equal regardless of casing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleName(String);

impl ModuleName {
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let text = NonEmptyText::new(input)?;
        Ok(Self(text.as_str().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for ModuleName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for ModuleName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ModuleName::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        assert_eq!(NonEmptyText::new("  Ward A ").unwrap().as_str(), "Ward A");
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
    }

    #[test]
    fn organization_id_rejects_line_breaks() {
        assert!(matches!(
            OrganizationId::new("org-7\norg-9"),
            Err(TextError::Multiline)
        ));
    }

    #[test]
    fn organization_id_from_optional_treats_blank_as_absent() {
        assert_eq!(OrganizationId::from_optional(None), None);
        assert_eq!(OrganizationId::from_optional(Some("")), None);
        assert_eq!(OrganizationId::from_optional(Some("  ")), None);
        assert_eq!(
            OrganizationId::from_optional(Some("org-7")).map(|id| id.to_string()),
            Some("org-7".to_string())
        );
    }

    #[test]
    fn module_name_is_case_insensitive() {
        assert_eq!(
            ModuleName::new(" Pharmacy").unwrap(),
            ModuleName::new("pharmacy").unwrap()
        );
    }

    #[test]
    fn module_name_deserialise_rejects_blank() {
        let err = serde_json::from_str::<ModuleName>("\" \"").expect_err("blank module");
        assert!(err.to_string().contains("empty"));
    }
}
