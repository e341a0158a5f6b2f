//! Output filename derivation
//!
//! Computes a filesystem-safe filename from a record's display name, unit
//! label, and optional MIME hint. Deterministic and pure; colliding names
//! are not deduplicated here — last write wins at the output layer.

use crate::types::AssetRecord;

/// Derive the output filename for a record
///
/// The base is `{display_name}_{unit_label}` with path separators replaced
/// by `_` and every character outside alphanumerics, `.`, `_`, `-`, and
/// space removed. The extension comes from a substring match on the MIME
/// hint, defaulting to `.png` when the hint is absent or unrecognized.
///
/// # Examples
///
/// ```
/// use ipfs_batch_dl::filename::derive_filename;
/// use ipfs_batch_dl::types::AssetRecord;
///
/// let record = AssetRecord {
///     display_name: "Cyber Skull".to_string(),
///     unit_label: "SKULL001".to_string(),
///     mime_hint: Some("image/jpeg".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(derive_filename(&record), "Cyber Skull_SKULL001.jpg");
/// ```
#[must_use]
pub fn derive_filename(record: &AssetRecord) -> String {
    let base = format!(
        "{}_{}",
        record.display_name.trim(),
        record.unit_label.trim()
    );

    let safe: String = base
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' '))
        .collect();

    format!("{}{}", safe, extension_for(record.mime_hint.as_deref()))
}

/// Pick a file extension from a free-text MIME hint
///
/// First substring match wins; anything unrecognized falls back to `.png`.
fn extension_for(mime_hint: Option<&str>) -> &'static str {
    let Some(hint) = mime_hint else {
        return ".png";
    };
    let hint = hint.trim();
    if hint.contains("jpeg") || hint.contains("jpg") {
        ".jpg"
    } else if hint.contains("png") {
        ".png"
    } else if hint.contains("gif") {
        ".gif"
    } else {
        ".png"
    }
}
