// An extension trait to provide the `graphemes` method on `String` and `&str`
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug)]
pub struct PersonName(String);

impl PersonName {
    pub fn parse(s: String) -> std::result::Result<PersonName, String> {
        let is_empty_or_whitespace = s.trim().is_empty();
        let is_too_long = s.graphemes(true).count() > 256;
        let forbidden_characters = ['/', '(', ')', '"', '<', '>', '\\', '{', '}'];
        let contains_forbidden_characters = s.chars().any(|c| forbidden_characters.contains(&c));

        if is_empty_or_whitespace || is_too_long || contains_forbidden_characters {
            Err(format!("{} is not a valid name.", s))
        } else {
            Ok(Self(s))
        }
    }
}
impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

use regex::Regex;

#[derive(Debug)]
pub struct UserEmail(String);

impl UserEmail {
    pub fn parse(s: String) -> std::result::Result<UserEmail, String> {
        let email_regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
        if email_regex.is_match(&s) {
            Ok(Self(s))
        } else {
            Err(format!("{} is not a valid email address.", s))
        }
    }
}

impl AsRef<str> for UserEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Names of categories, restaurants and products: required, non-empty.
#[derive(Debug)]
pub struct EntityName(String);

impl EntityName {
    pub fn parse(s: String) -> std::result::Result<EntityName, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("name must not be empty".to_string());
        }
        if trimmed.graphemes(true).count() > 256 {
            return Err("name is too long".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
