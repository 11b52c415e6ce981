//! Database URL resolution.
//!
//! Config YAML stores only env var NAMES (e.g. `"ORC_PROD_DATABASE_URL"`).
//! The URL is resolved once per run and handed to the connector; error
//! messages name the variable, never its value, and `Debug` redacts the URL.

use anyhow::{bail, Result};

#[derive(Clone)]
pub struct ResolvedDatabaseUrl {
    /// Env var the URL was read from.
    pub env_var: String,
    pub url: String,
}

impl std::fmt::Debug for ResolvedDatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedDatabaseUrl")
            .field("env_var", &self.env_var)
            .field("url", &"<REDACTED>")
            .finish()
    }
}

/// Resolve the URL held in the env var named `env_var`.
pub fn resolve_database_url(env_var: &str) -> Result<ResolvedDatabaseUrl> {
    resolve_database_url_with(env_var, |name| std::env::var(name).ok())
}

/// Like [`resolve_database_url`] with an injectable lookup.
pub fn resolve_database_url_with<F>(env_var: &str, lookup: F) -> Result<ResolvedDatabaseUrl>
where
    F: Fn(&str) -> Option<String>,
{
    let name = env_var.trim();
    if name.is_empty() {
        bail!("SECRETS_MISSING: database url env var name is blank");
    }
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(ResolvedDatabaseUrl {
            env_var: name.to_string(),
            url: v.trim().to_string(),
        }),
        _ => bail!("SECRETS_MISSING: required env var '{name}' (database url) is not set or empty"),
    }
}
