//! Secret reference resolver.
//!
//! Credential values in `config.toml` may point outside the file:
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and keeps the first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is used as plain text

use std::process::Command;

use tracing::debug;

/// Resolves a value that may contain a secret reference prefix.
///
/// # Errors
///
/// Returns a message if the referenced secret cannot be read.
pub fn resolve(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix("pass::") {
        debug!(path, "Resolving secret from password store");
        resolve_pass(path)
    } else if let Some(var) = value.strip_prefix("env::") {
        debug!(var, "Resolving secret from environment");
        resolve_env(var)
    } else {
        Ok(value.to_string())
    }
}

/// Resolves an optional value, keeping `None` as is.
///
/// # Errors
///
/// Returns a message naming `field` if resolution fails.
pub fn resolve_opt(value: Option<&str>, field: &str) -> Result<Option<String>, String> {
    value
        .map(|v| resolve(v).map_err(|e| format!("failed to resolve {}: {}", field, e)))
        .transpose()
}

fn resolve_pass(path: &str) -> Result<String, String> {
    let output = Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "`pass show {}` failed ({}): {}",
            path,
            output.status,
            stderr.trim()
        ));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| format!("`pass show {}` produced no output", path))
}

fn resolve_env(var: &str) -> Result<String, String> {
    std::env::var(var).map_err(|_| format!("environment variable `{}` is not set", var))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passthrough() {
        assert_eq!(resolve("hunter2").unwrap(), "hunter2");
        assert_eq!(resolve("").unwrap(), "");
    }

    #[test]
    fn env_prefix_resolves() {
        unsafe {
            std::env::set_var("_MIRRORCAL_TEST_SECRET", "app-password");
        }
        assert_eq!(resolve("env::_MIRRORCAL_TEST_SECRET").unwrap(), "app-password");
        unsafe {
            std::env::remove_var("_MIRRORCAL_TEST_SECRET");
        }
    }

    #[test]
    fn env_prefix_missing_var_errors() {
        let err = resolve("env::_MIRRORCAL_NONEXISTENT_VAR_12345").unwrap_err();
        assert!(err.contains("not set"));
    }

    #[test]
    fn optional_values() {
        assert_eq!(resolve_opt(None, "password").unwrap(), None);
        assert_eq!(
            resolve_opt(Some("plain"), "password").unwrap(),
            Some("plain".to_string())
        );
        let err = resolve_opt(Some("env::_MIRRORCAL_NONEXISTENT_VAR_67890"), "password")
            .unwrap_err();
        assert!(err.starts_with("failed to resolve password"));
    }

    #[test]
    fn pass_prefix_unknown_entry_errors() {
        let result = resolve("pass::nonexistent/entry/that/should/not/exist/12345");
        assert!(result.is_err());
    }
}
