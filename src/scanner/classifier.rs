//! Content sniffing for binaries the extension denylist missed

/// Bytes inspected when sniffing a file's type
const SNIFF_LEN: usize = 8192;

/// Classify content by its magic bytes; any `application/*` type is binary
pub fn is_probably_text(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    match infer::get(head) {
        Some(kind) => !kind.mime_type().starts_with("application/"),
        None => true,
    }
}
