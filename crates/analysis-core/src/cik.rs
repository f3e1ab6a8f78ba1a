use crate::AnalysisError;

/// Normalize a company identifier to the 10-digit zero-padded form.
///
/// Accepts an optional `CIK` prefix, so `320193`, `0000320193` and
/// `CIK320193` all name the same company.
pub fn pad_cik(cik: &str) -> Result<String, AnalysisError> {
    let trimmed = cik.trim();
    let digits = trimmed
        .strip_prefix("CIK")
        .or_else(|| trimmed.strip_prefix("cik"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AnalysisError::InvalidInput(format!("Invalid CIK: {:?}", cik)));
    }
    Ok(format!("{:0>10}", digits))
}
