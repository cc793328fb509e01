use derive_more::{Deref, Display};

use crate::{DeleteError, ReadError, ValidationError};

#[allow(async_fn_in_trait)]
pub trait AuthService {
    async fn login(&self, credentials: Credentials) -> Result<User, ReadError>;
    async fn register(&self, registration: Registration) -> Result<User, ReadError>;
    async fn login_with_google(&self, google_token: &str) -> Result<User, ReadError>;
    async fn logout(&self) -> Result<(), DeleteError>;
    async fn get_user(&self) -> Result<User, ReadError>;

    async fn is_authenticated(&self) -> bool {
        self.get_user().await.is_ok()
    }

    fn validate_email(&self, email: &str) -> Result<String, ValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::Empty("Email"));
        }
        let Some((local, domain)) = email.split_once('@') else {
            return Err(ValidationError::InvalidEmail);
        };
        if local.is_empty()
            || domain.contains('@')
            || email.chars().any(char::is_whitespace)
            || !domain
                .split_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            || domain.ends_with('.')
        {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(email.to_string())
    }

    fn validate_password(&self, password: &str) -> Result<String, ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::Empty("Password"));
        }
        if password.chars().count() < 6 {
            return Err(ValidationError::TooShort {
                field: "Password",
                min: 6,
            });
        }
        Ok(password.to_string())
    }

    fn validate_new_password(
        &self,
        password: &str,
        confirmation: &str,
    ) -> Result<String, ValidationError> {
        let password = self.validate_password(password)?;
        if !(password.chars().any(|c| c.is_ascii_lowercase())
            && password.chars().any(|c| c.is_ascii_uppercase())
            && password.chars().any(|c| c.is_ascii_digit()))
        {
            return Err(ValidationError::WeakPassword);
        }
        if confirmation.is_empty() {
            return Err(ValidationError::Empty("Password confirmation"));
        }
        if password != confirmation {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(password)
    }

    fn validate_user_name(&self, name: &str) -> Result<String, ValidationError> {
        let name = name.trim();
        let len = name.chars().count();
        if len == 0 {
            return Err(ValidationError::Empty("Name"));
        }
        if len < 2 {
            return Err(ValidationError::TooShort {
                field: "Name",
                min: 2,
            });
        }
        if len > 50 {
            return Err(ValidationError::TooLong {
                field: "Name",
                len,
                max: 50,
            });
        }
        Ok(name.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait AuthRepository {
    async fn login(&self, credentials: Credentials) -> Result<User, ReadError>;
    async fn register(&self, registration: Registration) -> Result<User, ReadError>;
    async fn login_with_google(&self, google_token: &str) -> Result<User, ReadError>;
    async fn logout(&self) -> Result<(), DeleteError>;
    async fn read_user(&self) -> Result<User, ReadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserID,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

impl User {
    /// Name shown in the profile header, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(self.email.as_str())
    }
}

#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserID(String);

impl From<String> for UserID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}
