use crate::api::{CredentialProvider, Credentials};
use crate::error::{MigrationError, Result};

/// Password value that asks for the password on the terminal instead.
pub const PROMPT_MARKER: &str = "-";

/// Credentials taken from the command line, prompting when the password is
/// given as [`PROMPT_MARKER`].
pub struct PromptingProvider {
    subscription: &'static str,
    username: String,
    password: String,
}

impl PromptingProvider {
    pub fn new(subscription: &'static str, username: &str, password: &str) -> Self {
        Self {
            subscription,
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

impl CredentialProvider for PromptingProvider {
    fn credentials(&mut self) -> Result<Credentials> {
        if self.password != PROMPT_MARKER {
            return Ok(Credentials::new(&self.username, self.password.as_str()));
        }

        let prompt = format!(
            "Enter password for {} subscription user {} : ",
            self.subscription, self.username
        );
        let password = rpassword::prompt_password(prompt).map_err(|err| {
            MigrationError::argument(format!(
                "could not read {} password: {}",
                self.subscription, err
            ))
        })?;
        if password.is_empty() {
            return Err(MigrationError::argument(format!(
                "{} password is required",
                self.subscription
            )));
        }
        Ok(Credentials::new(&self.username, password))
    }
}
