use crate::error::Error;

/// Accumulates per-field validation failures as `field: message` strings.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.0.push(format!("{field}: {message}"));
    }

    /// Return the value if present and non-blank, else record `message`
    /// against `field`.
    pub fn require(&mut self, field: &str, value: Option<String>, message: &str) -> Option<String> {
        match value {
            Some(value) if !value.trim().is_empty() => Some(value),
            _ => {
                self.push(field, message);
                None
            }
        }
    }

    /// Return the value if present, else record `message` against `field`.
    pub fn require_some<T>(&mut self, field: &str, value: Option<T>, message: &str) -> Option<T> {
        if value.is_none() {
            self.push(field, message);
        }
        value
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_error(self) -> Error {
        Error::Validation(self.0)
    }
}

/// A CPF is exactly eleven ASCII digits.
pub fn is_valid_cpf(cpf: &str) -> bool {
    cpf.len() == 11 && cpf.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpf_format() {
        assert!(is_valid_cpf("12345678901"));
        assert!(!is_valid_cpf("1234567890"));
        assert!(!is_valid_cpf("123456789012"));
        assert!(!is_valid_cpf("1234567890a"));
        assert!(!is_valid_cpf("123.456.789-01"));
        assert!(!is_valid_cpf(""));
    }

    #[test]
    fn collects_all_failures() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            None,
            errors.require("title", Some("   ".to_string()), "Title is required.")
        );
        assert_eq!(
            None,
            errors.require("description", None, "Description is required.")
        );
        assert_eq!(
            Some("x".to_string()),
            errors.require("code", Some("x".to_string()), "unused")
        );
        match errors.into_error() {
            Error::Validation(messages) => assert_eq!(
                vec![
                    "title: Title is required.".to_string(),
                    "description: Description is required.".to_string(),
                ],
                messages
            ),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn starts_empty() {
        assert!(FieldErrors::new().is_empty());
    }
}
