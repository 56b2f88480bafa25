use secrecy::SecretString;

/// Process-wide credentials, resolved once at startup.
#[derive(Clone, Default)]
pub struct GlobalArgs {
    pub db_username: Option<String>,
    pub db_password: Option<SecretString>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_db_credentials(&mut self, username: Option<String>, password: Option<SecretString>) {
        self.db_username = username;
        self.db_password = password;
    }

    pub fn set_smtp_credentials(
        &mut self,
        username: Option<String>,
        password: Option<SecretString>,
    ) {
        self.smtp_username = username;
        self.smtp_password = password;
    }

    /// SMTP login pair, present only when both halves are configured.
    #[must_use]
    pub fn smtp_credentials(&self) -> Option<(&str, &SecretString)> {
        match (&self.smtp_username, &self.smtp_password) {
            (Some(username), Some(password)) => Some((username.as_str(), password)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |secret: &Option<SecretString>| secret.as_ref().map(|_| "***");
        f.debug_struct("GlobalArgs")
            .field("db_username", &self.db_username)
            .field("db_password", &redact(&self.db_password))
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &redact(&self.smtp_password))
            .finish()
    }
}
