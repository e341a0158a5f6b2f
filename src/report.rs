//! Session summary rendering
//!
//! Pure formatting of a finished run: counts, output locations, and whether
//! the run ended early. Displaying the summary is the caller's business.

use crate::types::BatchSession;
use std::fmt::Write;

/// Render a human-readable summary for a finished session
///
/// Always reports success and failure counts, even for partially failed
/// runs. Lists archive parts in sequence order, or the output directory in
/// directory mode.
#[must_use]
pub fn summarize(session: &BatchSession) -> String {
    let mut out = String::new();

    // A formatter writing to a String cannot fail; errors are ignored
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "  Total records: {}", session.total_records);
    let _ = writeln!(
        out,
        "  Successfully downloaded: {}",
        session.success_count
    );
    let _ = writeln!(out, "  Failed: {}", session.fail_count);

    if session.aborted {
        let _ = writeln!(
            out,
            "  Run stopped early after {} of {} records",
            session.processed_count, session.total_records
        );
    }

    if !session.archives.is_empty() {
        let _ = writeln!(out, "  Archive parts:");
        for part in &session.archives {
            let _ = writeln!(
                out,
                "    {} ({} members, {:.1} MB)",
                part.path.display(),
                part.member_count,
                part.size_bytes as f64 / (1024.0 * 1024.0)
            );
        }
    } else if let Some(dir) = &session.output_dir {
        let _ = writeln!(out, "  Files saved to: {}", dir.display());
    }

    out
}
