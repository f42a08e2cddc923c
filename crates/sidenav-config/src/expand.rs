//! `${VAR}` / `${VAR:-default}` expansion for string settings.

use crate::ConfigError;

/// Name of a variable that was referenced but not set.
struct UnsetVar(String);

/// Expand braced environment references in `value`.
///
/// Bare `$VAR` is left alone so URLs containing `$` survive untouched.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| match std::env::var(name) {
        Ok(found) => Ok(Some(found)),
        Err(_) => Err(UnsetVar(name.to_owned())),
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_literal_unchanged() {
        let result = expand_env("https://cloud.questdb.com/", "cloud.url").unwrap();

        assert_eq!(result, "https://cloud.questdb.com/");
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("SIDENAV_TEST_CLOUD_HOST", "cloud.example.com");
        }

        let result = expand_env("https://${SIDENAV_TEST_CLOUD_HOST}/", "cloud.url").unwrap();

        assert_eq!(result, "https://cloud.example.com/");
        unsafe {
            std::env::remove_var("SIDENAV_TEST_CLOUD_HOST");
        }
    }

    #[test]
    fn test_expand_default_used_when_unset() {
        let result =
            expand_env("${SIDENAV_TEST_UNSET_URL:-https://fallback/}", "cloud.url").unwrap();

        assert_eq!(result, "https://fallback/");
    }

    #[test]
    fn test_expand_missing_var_names_field_and_var() {
        let err = expand_env("${SIDENAV_TEST_MISSING}", "cloud.url").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("SIDENAV_TEST_MISSING"));
        assert!(message.contains("cloud.url"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("https://example.com/$path", "cloud.url").unwrap();

        assert_eq!(result, "https://example.com/$path");
    }
}
