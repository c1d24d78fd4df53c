//! Placeholder substitution for stored string templates.
//!
//! A placeholder is `{name}` where `name` matches `[A-Za-z0-9_]+`. Names are
//! matched against the supplied variables case-insensitively, and the whole
//! template is rendered in one scan: text produced by a replacement is never
//! scanned again.

use crate::contexts::CacheError;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid")
});

/// Checks that `name` can be used as a placeholder variable
pub fn validate_name(name: &str) -> Result<(), CacheError> {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');

    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidSubstitutionPattern(name.to_string()))
    }
}

/// Replaces every `{name}` token in `template` with the matching value.
///
/// When several variables match the same token, the first one in `vars`
/// wins. Tokens without a matching variable, and braces that do not form a
/// token, are copied through unchanged.
///
/// # Errors
/// * `CacheError::InvalidSubstitutionPattern` - If any variable name is
///   empty or contains characters outside `[A-Za-z0-9_]`
pub fn substitute(template: &str, vars: &[(&str, &str)]) -> Result<String, CacheError> {
    for (name, _) in vars {
        validate_name(name)?;
    }

    if vars.is_empty() {
        return Ok(template.to_string());
    }

    let rendered = TOKEN.replace_all(template, |caps: &Captures| {
        let token = &caps[1];
        match vars
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
        {
            Some((_, value)) => (*value).to_string(),
            None => caps[0].to_string(),
        }
    });

    Ok(rendered.into_owned())
}

/// Lists the distinct placeholder names in `template`, in order of first
/// appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in TOKEN.captures_iter(template) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
