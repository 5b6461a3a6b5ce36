//! Cache key computation.

use sha2::{Digest, Sha256};

use crate::provider::GenerationRequest;

/// Compute the cache fingerprint for one generation request.
///
/// SHA-256 over the diff text and every sampling parameter, joined with a
/// fixed `|` separator in a fixed field order. Any change to the diff text
/// or to a single parameter yields a different digest.
pub fn fingerprint(diff_text: &str, request: &GenerationRequest) -> String {
    let content = format!(
        "{}|{}|{}|{}|{}",
        diff_text,
        request.provider.id(),
        request.model,
        request.temperature,
        request.max_tokens
    );

    let digest = Sha256::digest(content.as_bytes());
    hex::encode(digest)
}
