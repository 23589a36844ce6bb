use std::sync::LazyLock;

use regex::Regex;

use crate::models::NewWebApplication;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://.+").unwrap());

pub const NAME_REQUIRED: &str = "Name is required";
pub const URL_REQUIRED: &str = "URL is required";
pub const URL_SCHEME: &str = "URL must start with http:// or https://";

/// Per-field validation messages for the add-application form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<String>,
    pub url: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none()
    }

    /// All messages, name first.
    pub fn messages(&self) -> Vec<&str> {
        self.name.iter().chain(self.url.iter()).map(String::as_str).collect()
    }
}

/// Input state of the add-application form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationForm {
    pub name: String,
    pub url: String,
    pub description: String,
}

impl ApplicationForm {
    pub fn new(name: impl Into<String>, url: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into(), description: description.into() }
    }

    /// Check the fields locally. Never touches the network.
    pub fn validate(&self) -> Result<NewWebApplication, FormErrors> {
        let name = self.name.trim();
        let url = self.url.trim();
        let mut errors = FormErrors::default();

        if name.is_empty() {
            errors.name = Some(NAME_REQUIRED.to_string());
        }
        if url.is_empty() {
            errors.url = Some(URL_REQUIRED.to_string());
        } else if !URL_PATTERN.is_match(url) {
            errors.url = Some(URL_SCHEME.to_string());
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let description = self.description.trim();
        Ok(NewWebApplication {
            name: name.to_string(),
            url: url.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_form() {
        let form = ApplicationForm::new(" Shop ", "https://shop.example.com", "");
        let app = form.validate().unwrap();
        assert_eq!(app.name, "Shop");
        assert_eq!(app.url, "https://shop.example.com");
        assert!(app.description.is_none());
    }

    #[test]
    fn test_empty_name() {
        let errors = ApplicationForm::new("  ", "http://a.b", "").validate().unwrap_err();
        assert_eq!(errors.name.as_deref(), Some(NAME_REQUIRED));
        assert!(errors.url.is_none());
    }

    #[test]
    fn test_url_required_and_scheme() {
        let errors = ApplicationForm::new("x", "", "").validate().unwrap_err();
        assert_eq!(errors.url.as_deref(), Some(URL_REQUIRED));

        for bad in ["ftp://host", "shop.example.com", "http://", "https//x"] {
            let errors = ApplicationForm::new("x", bad, "").validate().unwrap_err();
            assert_eq!(errors.url.as_deref(), Some(URL_SCHEME), "{bad}");
        }
    }

    #[test]
    fn test_both_errors_reported() {
        let errors = ApplicationForm::default().validate().unwrap_err();
        assert_eq!(errors.messages(), vec![NAME_REQUIRED, URL_REQUIRED]);
    }

    #[test]
    fn test_description_kept() {
        let app = ApplicationForm::new("x", "http://x", " staging ").validate().unwrap();
        assert_eq!(app.description.as_deref(), Some("staging"));
    }

    #[test]
    fn test_reset() {
        let mut form = ApplicationForm::new("x", "http://x", "d");
        form.reset();
        assert_eq!(form, ApplicationForm::default());
    }
}
