//! Credential resolution for the keyed geocoding provider
//!
//! The API key may come from the command line, the environment (including a
//! `.env` file loaded at startup) or the config file, in that order of
//! precedence. Blank values count as absent.

use std::env;
use std::fmt;
use std::path::Path;

use crate::app::models::ProviderKind;
use crate::constants::env as env_constants;

/// Where the active credential came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    CommandLine,
    Environment,
    ConfigFile,
    /// No credential configured
    Missing,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandLine => write!(f, "command line"),
            Self::Environment => write!(f, "environment ({})", env_constants::API_KEY),
            Self::ConfigFile => write!(f, "config file"),
            Self::Missing => write!(f, "not configured"),
        }
    }
}

/// The credential selected for a run, if any
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    key: Option<String>,
    source: CredentialSource,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key", &self.masked())
            .field("source", &self.source)
            .finish()
    }
}

impl Credential {
    /// Pick the first non-blank value by precedence
    pub fn resolve(
        command_line: Option<&str>,
        environment: Option<&str>,
        config_file: Option<&str>,
    ) -> Self {
        let candidates = [
            (command_line, CredentialSource::CommandLine),
            (environment, CredentialSource::Environment),
            (config_file, CredentialSource::ConfigFile),
        ];

        candidates
            .into_iter()
            .find_map(|(value, source)| {
                value
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| Self {
                        key: Some(v.to_string()),
                        source,
                    })
            })
            .unwrap_or(Self {
                key: None,
                source: CredentialSource::Missing,
            })
    }

    /// Resolve using the process environment for the middle tier
    pub fn from_environment(command_line: Option<&str>, config_file: Option<&str>) -> Self {
        let environment = env::var(env_constants::API_KEY).ok();
        Self::resolve(command_line, environment.as_deref(), config_file)
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Provider a run with this credential would use
    pub fn provider(&self) -> ProviderKind {
        if self.key.is_some() {
            ProviderKind::Keyed
        } else {
            ProviderKind::Unkeyed
        }
    }

    /// Credential with all but its edges hidden
    pub fn masked(&self) -> Option<String> {
        self.key.as_deref().map(mask_secret)
    }
}

/// Hide a secret for display, keeping a short prefix and suffix when long enough
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len().max(4));
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 2..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

/// Authentication status information
#[derive(Debug, Clone)]
pub struct AuthStatus {
    pub credential: Credential,
    /// Whether a .env file exists in the current directory
    pub dotenv_file_exists: bool,
}

impl AuthStatus {
    /// Descriptive status message for display
    pub fn status_message(&self) -> String {
        match self.credential.provider() {
            ProviderKind::Keyed => format!(
                "API key found; runs will use the {} provider",
                ProviderKind::Keyed
            ),
            ProviderKind::Unkeyed => format!(
                "No API key; runs will use the {} provider at about one request per second",
                ProviderKind::Unkeyed
            ),
        }
    }
}

/// Current authentication status
pub fn get_auth_status(command_line: Option<&str>, config_file: Option<&str>) -> AuthStatus {
    AuthStatus {
        credential: Credential::from_environment(command_line, config_file),
        dotenv_file_exists: Path::new(".env").exists(),
    }
}

/// Print authentication status
pub fn show_auth_status(status: &AuthStatus) {
    println!("Geocoding Credential Status");
    println!("===========================");
    println!();

    match status.credential.masked() {
        Some(masked) => println!("API key: {} (from {})", masked, status.credential.source()),
        None => println!("API key: Not set"),
    }
    println!(
        ".env file: {}",
        if status.dotenv_file_exists {
            "Exists"
        } else {
            "Not found"
        }
    );
    println!();
    println!("Status: {}", status.status_message());

    if status.credential.key().is_none() {
        println!();
        println!(
            "To use the keyed provider, set {} or pass --api-key",
            env_constants::API_KEY
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let credential = Credential::resolve(Some("cli"), Some("env"), Some("file"));
        assert_eq!(credential.key(), Some("cli"));
        assert_eq!(credential.source(), CredentialSource::CommandLine);

        let credential = Credential::resolve(None, Some("env"), Some("file"));
        assert_eq!(credential.source(), CredentialSource::Environment);

        let credential = Credential::resolve(None, None, Some(" file "));
        assert_eq!(credential.key(), Some("file"));
        assert_eq!(credential.source(), CredentialSource::ConfigFile);
    }

    #[test]
    fn test_blank_values_are_absent() {
        let credential = Credential::resolve(Some("  "), Some(""), None);
        assert_eq!(credential.key(), None);
        assert_eq!(credential.source(), CredentialSource::Missing);
        assert_eq!(credential.provider(), ProviderKind::Unkeyed);

        let credential = Credential::resolve(Some(""), None, Some("file-key"));
        assert_eq!(credential.provider(), ProviderKind::Keyed);
    }

    #[test]
    fn test_masking() {
        assert_eq!(mask_secret("abcdef0123456789"), "abcd...89");
        assert_eq!(mask_secret("short"), "*****");
        assert_eq!(mask_secret("ab"), "****");

        let credential = Credential::resolve(Some("abcdef0123456789"), None, None);
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("0123456789"));
    }

    #[test]
    fn test_auth_status_messages() {
        let keyed = AuthStatus {
            credential: Credential::resolve(Some("key-1234567890"), None, None),
            dotenv_file_exists: false,
        };
        assert!(keyed.status_message().contains("keyed"));

        let unkeyed = AuthStatus {
            credential: Credential::resolve(None, None, None),
            dotenv_file_exists: false,
        };
        assert!(unkeyed.status_message().contains("unkeyed"));
    }
}
