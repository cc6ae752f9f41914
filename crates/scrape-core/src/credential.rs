use std::fmt;

use scrape_model::CloudEnvironment;

use crate::error::ScrapeError;

/// Token credential scoped to one tenant of one cloud.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub tenant_id: String,
    /// Authority the token is requested from.
    pub authority: String,
    /// Audience the token is issued for.
    pub audience: String,
    secret: Option<String>,
}

impl Credential {
    pub fn new(tenant_id: impl Into<String>, authority: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            authority: authority.into(),
            audience: audience.into(),
            secret: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    #[inline]
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("tenant_id", &self.tenant_id)
            .field("authority", &self.authority)
            .field("audience", &self.audience)
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Issues credentials for a cloud environment and tenant.
pub trait CredentialProvider: Send + Sync {
    fn credential(&self, environment: &CloudEnvironment, tenant_id: &str) -> Result<Credential, ScrapeError>;
}

/// Builds credentials against the environment endpoints, optionally carrying a
/// client secret taken from the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentCredentialProvider {
    secret_var: Option<String>,
}

impl EnvironmentCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the client secret from `var`; a missing variable is an error.
    pub fn with_secret_var(mut self, var: impl Into<String>) -> Self {
        self.secret_var = Some(var.into());
        self
    }
}

impl CredentialProvider for EnvironmentCredentialProvider {
    fn credential(&self, environment: &CloudEnvironment, tenant_id: &str) -> Result<Credential, ScrapeError> {
        if tenant_id.trim().is_empty() {
            return Err(ScrapeError::Credential("tenant id is empty".into()));
        }

        let credential = Credential::new(
            tenant_id,
            format!("{}{}", environment.authentication_endpoint, tenant_id),
            environment.management_endpoint.clone(),
        );
        match &self.secret_var {
            None => Ok(credential),
            Some(var) => std::env::var(var)
                .map(|secret| credential.with_secret(secret))
                .map_err(|e| ScrapeError::Credential(format!("{var}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrape_model::AzureCloud;

    #[test]
    fn credential_targets_environment_endpoints() {
        let env = AzureCloud::Global.environment(None).unwrap();
        let cred = EnvironmentCredentialProvider::new()
            .credential(&env, "tenant-1")
            .unwrap();

        assert_eq!(cred.authority, "https://login.microsoftonline.com/tenant-1");
        assert_eq!(cred.audience, "https://management.core.windows.net/");
        assert!(cred.secret().is_none());
    }

    #[test]
    fn blank_tenant_is_rejected() {
        let env = AzureCloud::China.environment(None).unwrap();
        let res = EnvironmentCredentialProvider::new().credential(&env, " ");
        assert!(matches!(res, Err(ScrapeError::Credential(_))));
    }

    #[test]
    fn missing_secret_variable_is_an_error() {
        let env = AzureCloud::Global.environment(None).unwrap();
        let provider = EnvironmentCredentialProvider::new()
            .with_secret_var("SCRAPE_CORE_TEST_SECRET_THAT_IS_NEVER_SET");
        assert!(matches!(
            provider.credential(&env, "tenant"),
            Err(ScrapeError::Credential(_))
        ));
    }

    #[test]
    fn debug_hides_secret() {
        let cred = Credential::new("t", "a", "b").with_secret("hunter2");
        assert!(!format!("{cred:?}").contains("hunter2"));
    }
}
