//! Dynamic command-line argument resolution against the store.

use crate::store::Store;

/// Marker prefix forcing a token through as a literal argument.
const STRIP_PREFIX: &str = "strip_";

/// Expand dynamic-argument tokens into concrete argument strings.
///
/// A token that looks like a flag (leading `-`) or carries the `strip_`
/// marker is passed through literally, with the marker removed; this lets a
/// case append literal arguments after dynamically resolved values. Every
/// other token is a store key whose value is substituted in place. A missing
/// key aborts the whole resolution with an error naming it. Output order
/// matches token order exactly.
pub fn resolve_dynamic_args(tokens: &[String], store: &Store) -> Result<Vec<String>, String> {
    let mut resolved = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.starts_with('-') {
            resolved.push(token.clone());
            continue;
        }
        if let Some(literal) = token.strip_prefix(STRIP_PREFIX) {
            resolved.push(literal.to_string());
            continue;
        }
        match store.get(token) {
            Some(value) => resolved.push(value),
            None => return Err(format!("failed to obtain value of key {token}")),
        }
    }
    Ok(resolved)
}
