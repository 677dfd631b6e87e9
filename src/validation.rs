// Input validation for account writes (registration and profile update)

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

pub const USERNAME_REQUIRED: &str = "Username is required";
pub const USERNAME_ALPHANUMERIC: &str = "Username contains non alphanumeric characters - not allowed.";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const EMAIL_INVALID: &str = "Email does not appear to be valid";
pub const BIRTHDAY_INVALID: &str = "Birthday must be a date (YYYY-MM-DD)";

/// One failed rule, reported to the client as part of a 422 body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub location: &'static str,
    pub param: String,
    pub msg: String,
}

impl FieldError {
    pub fn body(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            location: "body",
            param: param.into(),
            msg: msg.into(),
        }
    }
}

/// Body of `POST /users` and `PUT /users/:Username`. Missing, null and
/// non-string fields deserialize as empty so they surface as field errors,
/// not as a parse failure.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct UserInput {
    #[serde(rename = "Username", default, deserialize_with = "lenient_string")]
    #[validate(length(min = 5, message = "Username is required"))]
    pub username: String,

    #[serde(rename = "Password", default, deserialize_with = "lenient_string")]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[serde(rename = "Email", default, deserialize_with = "lenient_string")]
    #[validate(email(message = "Email does not appear to be valid"))]
    pub email: String,

    #[serde(rename = "Birthday", default, deserialize_with = "lenient_optional")]
    pub birthday: Option<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

// A non-string birthday is kept in its JSON form so it fails as an invalid date
fn lenient_optional<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Input that passed every rule; the password is still plaintext here
#[derive(Debug, Clone)]
pub struct ValidUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
}

const FIELD_ORDER: [&str; 4] = ["Username", "Password", "Email", "Birthday"];

/// Run every rule and collect all failures, ordered by field
pub fn validate_user_input(input: UserInput) -> Result<ValidUser, Vec<FieldError>> {
    let mut errors = Vec::new();

    if let Err(failed) = input.validate() {
        for (field, field_errors) in failed.field_errors() {
            let param = wire_name(&field.to_string());
            for err in field_errors.iter() {
                let msg = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", param));
                errors.push(FieldError::body(param.clone(), msg));
            }
        }
    }

    if !input.username.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push(FieldError::body("Username", USERNAME_ALPHANUMERIC));
    }

    let birthday = match parse_birthday(input.birthday.as_deref()) {
        Ok(date) => date,
        Err(()) => {
            errors.push(FieldError::body("Birthday", BIRTHDAY_INVALID));
            None
        }
    };

    if !errors.is_empty() {
        errors.sort_by_key(|e| FIELD_ORDER.iter().position(|f| *f == e.param));
        return Err(errors);
    }

    Ok(ValidUser {
        username: input.username,
        password: input.password,
        email: input.email,
        birthday,
    })
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp; blank means absent
fn parse_birthday(raw: Option<&str>) -> Result<Option<NaiveDate>, ()> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| ())
}

fn wire_name(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(username: &str, password: &str, email: &str) -> UserInput {
        UserInput {
            username: username.into(),
            password: password.into(),
            email: email.into(),
            birthday: None,
        }
    }

    fn params(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.param.as_str()).collect()
    }

    #[test]
    fn accepts_valid_input() {
        let mut valid = input("alice1", "p@ssW0rd", "a@x.com");
        valid.birthday = Some("1990-05-17".into());
        let user = validate_user_input(valid).unwrap();
        assert_eq!(user.username, "alice1");
        assert_eq!(user.birthday, NaiveDate::from_ymd_opt(1990, 5, 17));
    }

    #[test]
    fn short_username_is_rejected() {
        let errors = validate_user_input(input("al", "pw", "a@x.com")).unwrap_err();
        assert_eq!(errors, vec![FieldError::body("Username", USERNAME_REQUIRED)]);
    }

    #[test]
    fn non_alphanumeric_username_is_rejected() {
        let errors = validate_user_input(input("alice_1", "pw", "a@x.com")).unwrap_err();
        assert_eq!(errors, vec![FieldError::body("Username", USERNAME_ALPHANUMERIC)]);
    }

    #[test]
    fn empty_body_reports_every_required_field() {
        let errors = validate_user_input(UserInput::default()).unwrap_err();
        assert_eq!(params(&errors), vec!["Username", "Password", "Email"]);
    }

    #[test]
    fn bad_email_is_rejected() {
        for email in ["", "alice", "alice@", "@x.com", "a b@x.com"] {
            let errors = validate_user_input(input("alice1", "pw", email)).unwrap_err();
            assert_eq!(params(&errors), vec!["Email"], "email {:?}", email);
        }
    }

    #[test]
    fn birthday_formats() {
        assert_eq!(parse_birthday(None), Ok(None));
        assert_eq!(parse_birthday(Some("  ")), Ok(None));
        assert_eq!(
            parse_birthday(Some("1990-05-17T00:00:00Z")),
            Ok(NaiveDate::from_ymd_opt(1990, 5, 17))
        );
        assert!(parse_birthday(Some("17/05/1990")).is_err());

        let mut bad = input("alice1", "pw", "a@x.com");
        bad.birthday = Some("yesterday".into());
        let errors = validate_user_input(bad).unwrap_err();
        assert_eq!(errors, vec![FieldError::body("Birthday", BIRTHDAY_INVALID)]);
    }

    #[test]
    fn rule_messages_match_constants() {
        let errors = validate_user_input(UserInput::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::body("Username", USERNAME_REQUIRED),
                FieldError::body("Password", PASSWORD_REQUIRED),
                FieldError::body("Email", EMAIL_INVALID),
            ]
        );
    }

    #[test]
    fn null_and_mistyped_fields_deserialize_to_empty() {
        let parsed: UserInput = serde_json::from_str(
            r#"{"Username":12345,"Password":null,"Email":["a@x.com"],"Birthday":19900517}"#,
        )
        .unwrap();
        assert_eq!(parsed.username, "");
        assert_eq!(parsed.password, "");
        assert_eq!(parsed.email, "");
        assert_eq!(parsed.birthday.as_deref(), Some("19900517"));

        let parsed: UserInput = serde_json::from_str(r#"{"Birthday":null}"#).unwrap();
        assert!(parsed.birthday.is_none());
    }

    #[test]
    fn missing_fields_deserialize_to_empty() {
        let parsed: UserInput = serde_json::from_str(r#"{"Username":"alice1"}"#).unwrap();
        assert_eq!(parsed.password, "");
        assert!(parsed.birthday.is_none());
    }
}
