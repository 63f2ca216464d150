//! Environment variable interpolation for literal case arguments.

/// Interpolate `${VAR}` references in a string from the process environment.
///
/// Only the brace form is recognized; a bare `$VAR` passes through
/// unchanged. Returns an error message when a referenced variable is not set
/// or a reference is left unclosed.
pub fn interpolate_env(s: &str) -> Result<String, String> {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let reference = &rest[start + 2..];
        let end = reference
            .find('}')
            .ok_or_else(|| format!("unclosed variable reference: ${{{reference}"))?;
        let name = &reference[..end];
        let value = std::env::var(name)
            .map_err(|_| format!("environment variable '{name}' is not set"))?;
        result.push_str(&value);
        rest = &reference[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}
