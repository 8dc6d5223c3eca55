pub const DEFAULT_GATEWAY: &str = "https://ipfs.io/ipfs/";

const IPFS_SCHEME: &str = "ipfs://";

/// Rewrite an `ipfs://` URI to an HTTP gateway URL.
///
/// Other URIs (plain http, data URIs, placeholders) are returned unchanged.
pub fn gateway_url(uri: &str, gateway: &str) -> String {
    match uri.strip_prefix(IPFS_SCHEME) {
        Some(path) => format!(
            "{}/{}",
            gateway.trim_end_matches('/'),
            path.trim_start_matches('/')
        ),
        None => uri.to_string(),
    }
}
