//! Local form validation.
//!
//! Mirrors the rules the sign-up, sign-in and create-class forms enforce
//! before anything is sent to the backend.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum length for usernames and passwords.
pub const MIN_CREDENTIAL_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Form field name.
    pub field: String,
    /// Message shown next to the field.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All field errors collected from one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Message for a given field, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(fields: Vec<FieldError>) -> Self {
        Self { fields }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Gender choices accepted by the sign-up form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// Registration form.
#[derive(Debug, Clone)]
pub struct SignUpForm {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<Gender>,
    pub birth: Option<NaiveDate>,
}

/// Registration payload for POST /auth/signup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    /// Formatted as `yyyy-MM-dd`.
    pub birth: String,
}

impl SignUpForm {
    /// Check every field, collecting all failures.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.last_name.trim().is_empty() {
            errors.push("lastname", "last name must not be empty");
        }
        if self.first_name.trim().is_empty() {
            errors.push("firstname", "first name must not be empty");
        }
        check_credential(&mut errors, "username", &self.username);
        if !EMAIL_RE.is_match(&self.email) {
            errors.push("email", "invalid email address");
        }
        check_credential(&mut errors, "password", &self.password);
        if self.gender.is_none() {
            errors.push("gender", "choose a gender");
        }
        if self.birth.is_none() {
            errors.push("birth", "choose a birth date");
        }
        errors.into_result()
    }

    /// Validate and convert into the wire payload.
    pub fn into_request(self) -> Result<SignUpRequest, ValidationErrors> {
        self.validate()?;
        match (self.gender, self.birth) {
            (Some(gender), Some(birth)) => Ok(SignUpRequest {
                username: self.username,
                password: self.password,
                email: self.email,
                first_name: self.first_name,
                last_name: self.last_name,
                gender,
                birth: birth.format("%Y-%m-%d").to_string(),
            }),
            // validate() already rejects missing gender/birth
            _ => Err(ValidationErrors::default()),
        }
    }
}

/// Sign-in form.
#[derive(Debug, Clone)]
pub struct SignInForm {
    pub username: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_credential(&mut errors, "username", &self.username);
        check_credential(&mut errors, "password", &self.password);
        errors.into_result()
    }
}

/// Create-class form.
#[derive(Debug, Clone)]
pub struct CreateClassForm {
    pub name: String,
    pub description: String,
    pub max_members: u32,
}

impl Default for CreateClassForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            max_members: 10,
        }
    }
}

impl CreateClassForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.name.trim().is_empty() {
            errors.push("name", "class name must not be empty");
        }
        if self.max_members < 1 {
            errors.push("maxMem", "at least 1 member is required");
        }
        errors.into_result()
    }
}

fn check_credential(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.chars().count() < MIN_CREDENTIAL_LEN {
        errors.push(
            field,
            format!("{field} must be at least {MIN_CREDENTIAL_LEN} characters"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_signup() -> SignUpForm {
        SignUpForm {
            username: "student01".into(),
            password: "secret123".into(),
            email: "student@example.com".into(),
            first_name: "An".into(),
            last_name: "Nguyen".into(),
            gender: Some(Gender::Female),
            birth: NaiveDate::from_ymd_opt(2007, 3, 9),
        }
    }

    #[test]
    fn signup_valid_form_converts() {
        let request = valid_signup().into_request().unwrap();
        assert_eq!(request.birth, "2007-03-09");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["firstName"], "An");
        assert_eq!(json["gender"], "female");
    }

    #[test]
    fn signup_collects_every_failure() {
        let form = SignUpForm {
            username: "abc".into(),
            password: "123".into(),
            email: "not-an-email".into(),
            first_name: " ".into(),
            last_name: String::new(),
            gender: None,
            birth: None,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.fields.len(), 7);
        assert!(errors.get("email").is_some());
        assert!(errors.get("username").unwrap().contains("6"));
    }

    #[test]
    fn signin_requires_minimum_lengths() {
        let form = SignInForm {
            username: "teacher".into(),
            password: "short".into(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.get("username").is_none());
        assert!(errors.get("password").is_some());
    }

    #[test]
    fn create_class_rules() {
        let mut form = CreateClassForm {
            name: "Physics 11A".into(),
            ..Default::default()
        };
        assert!(form.validate().is_ok());
        form.max_members = 0;
        form.name.clear();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.fields.len(), 2);
    }

    #[test]
    fn gender_parse() {
        assert_eq!("Male".parse::<Gender>().unwrap(), Gender::Male);
        assert!("unknown".parse::<Gender>().is_err());
    }
}
