//! Shared CLI utilities.

/// Parse a `KEY=VALUE` override. The key is trimmed and must not be empty;
/// the value is kept verbatim and may itself contain `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) =
        raw.split_once('=').ok_or_else(|| format!("Expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Missing key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
