//! Account and contact forms, validated before anything is sent upstream.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
  if value.trim().is_empty() { Err(ValidationError::MissingField(field)) } else { Ok(()) }
}

/// Sign-up form. `terms_accepted` is checked locally and not forwarded.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RegisterForm {
  #[serde(default)] pub username: String,
  #[serde(default)] pub email: String,
  #[serde(default)] pub name: String,
  #[serde(default)] pub password: String,
  #[serde(default, rename = "termsAccepted", skip_serializing)]
  pub terms_accepted: bool,
}

impl RegisterForm {
  /// Terms acceptance is reported ahead of missing fields.
  pub fn validate(&self) -> Result<(), ValidationError> {
    if !self.terms_accepted {
      return Err(ValidationError::TermsNotAccepted);
    }
    require(&self.username, "username")?;
    require(&self.email, "email")?;
    require(&self.name, "name")?;
    require(&self.password, "password")
  }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoginForm {
  #[serde(default)] pub email: String,
  #[serde(default)] pub password: String,
}

impl LoginForm {
  pub fn validate(&self) -> Result<(), ValidationError> {
    require(&self.email, "email")?;
    require(&self.password, "password")
  }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ContactForm {
  #[serde(default)] pub name: String,
  #[serde(default)] pub email: String,
  #[serde(default)] pub message: String,
}

impl ContactForm {
  pub fn validate(&self) -> Result<(), ValidationError> {
    require(&self.name, "name")?;
    require(&self.email, "email")?;
    require(&self.message, "message")
  }
}
