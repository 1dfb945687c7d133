use tracing::debug;

/// Resolve the service password. A value starting with '$' names an
/// environment variable; an unset variable leaves the literal in place.
pub fn resolve_credential(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        match std::env::var(var_name) {
            Ok(resolved) => {
                debug!(var = %var_name, "Resolved service credential from environment");
                resolved
            }
            Err(_) => {
                debug!(var = %var_name, "Credential variable not set, using literal");
                value.to_string()
            }
        }
    } else {
        value.to_string()
    }
}

/// Replace every occurrence of a secret with [REDACTED]. Secrets shorter
/// than four characters are left alone; they would mangle ordinary text.
pub fn redact_credentials(text: &str, secrets: &[&str]) -> String {
    let mut result = text.to_string();
    for secret in secrets {
        if !secret.is_empty() && secret.len() >= 4 {
            result = result.replace(secret, "[REDACTED]");
        }
    }
    result
}
