//! Binding and structural validation of raw user payloads.
//!
//! A [`Form`] holds the bound data together with every error found while
//! binding it. Callers can attach further errors (e.g. uniqueness checks
//! that need the database) before deciding whether the submission is valid.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use super::dto::CreateUserDto;
use crate::response::FieldError;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const EMAIL_MAX: usize = 180;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 4096;

const NOT_BLANK: &str = "This value should not be blank.";
const NOT_A_STRING: &str = "This value is not valid.";

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^@\s\x00-\x1f\x7f]+@[^@\s\x00-\x1f\x7f]+\.[^@\s\x00-\x1f\x7f]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug)]
pub struct Form<T> {
    data: T,
    errors: Vec<FieldError>,
}

impl<T> Form<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors
            .iter()
            .any(|e| e.field.as_deref() == Some(field))
    }

    /// Attach an error. The same message on the same field is kept once.
    pub fn add_error(&mut self, field: Option<&str>, message: impl Into<String>) {
        let err = FieldError::new(field, message);
        if !self.errors.contains(&err) {
            self.errors.push(err);
        }
    }
}

/// Form for `POST /users`: `username`, `email`, `password`.
pub struct CreateUserForm;

impl CreateUserForm {
    pub fn submit(payload: &Value) -> Form<CreateUserDto> {
        let mut form = Form::new(CreateUserDto::default());
        let Some(fields) = payload.as_object() else {
            form.add_error(None, "Invalid payload");
            return form;
        };

        if let Some(username) = bind(&mut form, fields, "username") {
            form.data.username = username.trim().to_owned();
        }
        if let Some(email) = bind(&mut form, fields, "email") {
            form.data.email = email.trim().to_lowercase();
        }
        if let Some(password) = bind(&mut form, fields, "password") {
            form.data.password = password;
        }

        Self::validate(&mut form);
        form
    }

    fn validate(form: &mut Form<CreateUserDto>) {
        if !form.has_error("username") {
            let username = form.data.username.clone();
            check_length(form, "username", &username, USERNAME_MIN, USERNAME_MAX);
            if !username.is_empty() && !USERNAME_RE.is_match(&username) {
                form.add_error(
                    Some("username"),
                    "Username may only contain letters, digits, '.', '_' and '-'.",
                );
            }
        }

        if !form.has_error("email") {
            let email = form.data.email.clone();
            check_length(form, "email", &email, 1, EMAIL_MAX);
            if !email.is_empty() && !is_valid_email(&email) {
                form.add_error(Some("email"), "This value is not a valid email address.");
            }
        }

        if !form.has_error("password") {
            let password = form.data.password.clone();
            check_length(form, "password", &password, PASSWORD_MIN, PASSWORD_MAX);
        }
    }
}

/// Missing and `null` bind as blank; any other non-string is an error.
fn bind(form: &mut Form<CreateUserDto>, fields: &Map<String, Value>, name: &str) -> Option<String> {
    match fields.get(name) {
        None | Some(Value::Null) => Some(String::new()),
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            form.add_error(Some(name), NOT_A_STRING);
            None
        }
    }
}

fn check_length<T>(form: &mut Form<T>, field: &str, value: &str, min: usize, max: usize) {
    if value.trim().is_empty() {
        form.add_error(Some(field), NOT_BLANK);
        return;
    }
    let len = value.chars().count();
    if len < min {
        form.add_error(
            Some(field),
            format!("This value is too short. It should have {min} characters or more."),
        );
    } else if len > max {
        form.add_error(
            Some(field),
            format!("This value is too long. It should have {max} characters or less."),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages_for<'a>(form: &'a Form<CreateUserDto>, field: &str) -> Vec<&'a str> {
        form.errors()
            .iter()
            .filter(|e| e.field.as_deref() == Some(field))
            .map(|e| e.message.as_str())
            .collect()
    }

    #[test]
    fn binds_and_normalizes_valid_payload() {
        let form = CreateUserForm::submit(&json!({
            "username": "  dealer_01 ",
            "email": " Dealer@Example.COM ",
            "password": " spaced password ",
            "ignored": true,
        }));

        assert!(form.is_valid(), "{:?}", form.errors());
        let dto = form.into_data();
        assert_eq!(dto.username, "dealer_01");
        assert_eq!(dto.email, "dealer@example.com");
        assert_eq!(dto.password, " spaced password ");
    }

    #[test]
    fn missing_fields_are_blank_errors() {
        let form = CreateUserForm::submit(&json!({}));

        assert!(!form.is_valid());
        for field in ["username", "email", "password"] {
            assert_eq!(messages_for(&form, field), vec![NOT_BLANK], "field {field}");
        }
    }

    #[test]
    fn null_and_whitespace_count_as_blank() {
        let form = CreateUserForm::submit(&json!({
            "username": null,
            "email": "   ",
            "password": "        ",
        }));

        assert_eq!(messages_for(&form, "username"), vec![NOT_BLANK]);
        assert_eq!(messages_for(&form, "email"), vec![NOT_BLANK]);
        assert_eq!(messages_for(&form, "password"), vec![NOT_BLANK]);
    }

    #[test]
    fn malformed_email_is_rejected() {
        let form = CreateUserForm::submit(&json!({
            "username": "dealer",
            "email": "not-an-email",
            "password": "long enough",
        }));

        assert_eq!(
            messages_for(&form, "email"),
            vec!["This value is not a valid email address."]
        );
        assert_eq!(form.errors().len(), 1);
    }

    #[test]
    fn length_limits_apply() {
        let form = CreateUserForm::submit(&json!({
            "username": "ab",
            "email": format!("{}@example.com", "a".repeat(EMAIL_MAX)),
            "password": "short",
        }));

        assert_eq!(
            messages_for(&form, "username"),
            vec!["This value is too short. It should have 3 characters or more."]
        );
        assert_eq!(
            messages_for(&form, "email"),
            vec!["This value is too long. It should have 180 characters or less."]
        );
        assert_eq!(
            messages_for(&form, "password"),
            vec!["This value is too short. It should have 8 characters or more."]
        );
    }

    #[test]
    fn username_charset_is_restricted() {
        let form = CreateUserForm::submit(&json!({
            "username": "bad name!",
            "email": "dealer@example.com",
            "password": "long enough",
        }));

        assert_eq!(messages_for(&form, "username").len(), 1);
        assert!(messages_for(&form, "username")[0].starts_with("Username may only contain"));
    }

    #[test]
    fn non_string_values_are_invalid() {
        let form = CreateUserForm::submit(&json!({
            "username": 42,
            "email": ["a@b.c"],
            "password": "long enough",
        }));

        assert_eq!(messages_for(&form, "username"), vec![NOT_A_STRING]);
        assert_eq!(messages_for(&form, "email"), vec![NOT_A_STRING]);
        assert!(messages_for(&form, "password").is_empty());
    }

    #[test]
    fn non_object_payload_is_a_form_error() {
        let form = CreateUserForm::submit(&json!(["dealer"]));

        assert_eq!(form.errors().len(), 1);
        assert_eq!(form.errors()[0].field, None);
        assert_eq!(form.errors()[0].message, "Invalid payload");
    }

    #[test]
    fn control_characters_in_email_are_rejected() {
        for email in ["a\u{0}b@example.com", "dealer@exa\u{7}mple.com", "dealer@example.c\u{7f}om"] {
            let form = CreateUserForm::submit(&json!({
                "username": "dealer",
                "email": email,
                "password": "long enough",
            }));
            assert_eq!(
                messages_for(&form, "email"),
                vec!["This value is not a valid email address."],
                "email {email:?}"
            );
        }
    }

    #[test]
    fn add_error_drops_duplicates() {
        let mut form = CreateUserForm::submit(&json!({}));
        let before = form.errors().len();
        form.add_error(Some("username"), NOT_BLANK);
        form.add_error(Some("username"), "Username already exists");
        form.add_error(Some("username"), "Username already exists");
        assert_eq!(form.errors().len(), before + 1);
    }
}
