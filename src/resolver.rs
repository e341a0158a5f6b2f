//! Content-addressed URI resolution
//!
//! Translates an `ipfs://<cid>[#fragment]` reference into a fetchable
//! HTTP(S) URL against a configurable gateway base. Pure string work, no I/O.

/// Scheme prefix recognized by the resolver
const IPFS_SCHEME: &str = "ipfs://";

/// Resolve a content-addressed URI against a gateway base
///
/// Returns `None` for any URI not using the `ipfs://` scheme — the caller
/// treats that as a skip (logged as a warning), not an error. The CID keeps
/// any path segments after it; a `#`-delimited fragment (e.g. the `#i`
/// suffix some minting tools append) is discarded.
///
/// The gateway base is normalized to end with exactly one `/` before the
/// CID is appended, so both `https://ipfs.io/ipfs` and
/// `https://ipfs.io/ipfs/` produce the same result.
///
/// # Examples
///
/// ```
/// use ipfs_batch_dl::resolver::resolve;
///
/// let url = resolve("ipfs://QmAbc123#i", "https://ipfs.io/ipfs/");
/// assert_eq!(url.as_deref(), Some("https://ipfs.io/ipfs/QmAbc123"));
///
/// assert_eq!(resolve("https://example.com/x.png", "https://ipfs.io/ipfs/"), None);
/// ```
#[must_use]
pub fn resolve(uri: &str, gateway_base: &str) -> Option<String> {
    let path = uri.strip_prefix(IPFS_SCHEME)?;

    // Fragment identifiers address a sub-resource within the content; the
    // gateway only understands the CID path itself.
    let path = match path.split_once('#') {
        Some((cid, _fragment)) => cid,
        None => path,
    };

    let base = gateway_base.trim_end_matches('/');
    Some(format!("{}/{}", base, path))
}
