//! Student account and profile input types.
//!
//! [`StudentForm`] is the raw registration input; [`NewStudent`] is the
//! validated account + profile pair that the persistence layer creates as a
//! single unit.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail};

use crate::error::CoreError;
use crate::types::Date;

/// Accepted textual date format for birth and admission dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Biographical fields stored on a student profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub first_name: String,
    pub other_name: String,
    pub last_name: String,
    pub gender: String,
    pub student_class: String,
    pub date_of_birth: Date,
    pub date_admitted: Date,
    pub address: String,
}

/// An account and its profile, ready to be persisted together.
///
/// The password is plaintext here; hashing happens in the layer that owns
/// the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub email: String,
    pub password: String,
    pub profile: ProfileFields,
    /// Relative media path of an uploaded photo, if any.
    pub mugshot: Option<String>,
}

/// Raw registration input as submitted by the registration form.
#[derive(Debug, Clone, Default, Validate)]
pub struct StudentForm {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(length(min = 1, message = "first_name is required"))]
    pub first_name: String,
    pub other_name: String,
    #[validate(length(min = 1, message = "last_name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "gender is required"))]
    pub gender: String,
    #[validate(length(min = 1, message = "student_class is required"))]
    pub student_class: String,
    pub date_of_birth: String,
    pub date_admitted: String,
    pub address: String,
}

impl StudentForm {
    /// Set a form field by its submitted name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let value = value.trim().to_string();
        match name {
            "email" => self.email = normalize_email(&value),
            "password" => self.password = value,
            "first_name" => self.first_name = value,
            "other_name" => self.other_name = value,
            "last_name" => self.last_name = value,
            "gender" => self.gender = value,
            "student_class" => self.student_class = value,
            "date_of_birth" => self.date_of_birth = value,
            "date_admitted" => self.date_admitted = value,
            "address" => self.address = value,
            _ => {}
        }
    }

    /// Validate the form and convert it into a [`NewStudent`].
    pub fn into_new_student(self, mugshot: Option<String>) -> Result<NewStudent, CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let date_of_birth = parse_date("date_of_birth", &self.date_of_birth)?;
        let date_admitted = parse_date("date_admitted", &self.date_admitted)?;

        Ok(NewStudent {
            email: self.email,
            password: self.password,
            profile: ProfileFields {
                first_name: self.first_name,
                other_name: self.other_name,
                last_name: self.last_name,
                gender: self.gender,
                student_class: self.student_class,
                date_of_birth,
                date_admitted,
                address: self.address,
            },
            mugshot,
        })
    }
}

/// Parse a `YYYY-MM-DD` date, naming the field in the error.
pub fn parse_date(field: &str, value: &str) -> Result<Date, CoreError> {
    Date::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        CoreError::Validation(format!(
            "{field} must be a date in YYYY-MM-DD format, got '{value}'"
        ))
    })
}

/// Trim an email address and lowercase its domain part.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Check that an email address is syntactically acceptable.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn valid_form() -> StudentForm {
        StudentForm {
            email: "ada@example.com".into(),
            password: "analytical".into(),
            first_name: "Ada".into(),
            other_name: String::new(),
            last_name: "Lovelace".into(),
            gender: "F".into(),
            student_class: "JSS1".into(),
            date_of_birth: "2012-12-10".into(),
            date_admitted: "2023-09-04".into(),
            address: "12 St James's Square".into(),
        }
    }

    #[test]
    fn valid_form_converts() {
        let student = valid_form().into_new_student(None).unwrap();
        assert_eq!(student.email, "ada@example.com");
        assert_eq!(
            student.profile.date_of_birth,
            Date::from_ymd_opt(2012, 12, 10).unwrap()
        );
        assert_eq!(
            student.profile.date_admitted,
            Date::from_ymd_opt(2023, 9, 4).unwrap()
        );
        assert!(student.mugshot.is_none());
    }

    #[test]
    fn short_password_rejected() {
        let form = StudentForm {
            password: "short".into(),
            ..valid_form()
        };
        let err = form.into_new_student(None).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("at least 8 characters"));
    }

    #[test]
    fn bad_email_rejected() {
        let form = StudentForm {
            email: "not-an-email".into(),
            ..valid_form()
        };
        assert_matches!(form.into_new_student(None), Err(CoreError::Validation(_)));
    }

    #[test]
    fn bad_date_names_the_field() {
        let form = StudentForm {
            date_admitted: "04/09/2023".into(),
            ..valid_form()
        };
        let err = form.into_new_student(None).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("date_admitted"));
    }

    #[test]
    fn set_trims_and_ignores_unknown_fields() {
        let mut form = StudentForm::default();
        form.set("email", "  bob@example.com ".into());
        form.set("mugshot", "ignored".into());
        assert_eq!(form.email, "bob@example.com");
    }

    #[test]
    fn normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email(" Ada@Example.COM "), "Ada@example.com");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn parse_date_accepts_surrounding_whitespace() {
        assert_eq!(
            parse_date("date_of_birth", " 2010-01-31 ").unwrap(),
            Date::from_ymd_opt(2010, 1, 31).unwrap()
        );
    }
}
