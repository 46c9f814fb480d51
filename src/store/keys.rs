//! Key helpers shared by the stores and the preview pipeline.

/// Percent-encode a key for interpolation into a URL path segment.
///
/// Every reserved character is encoded, including `/`, so a key such as
/// `docs/a b.txt` always travels as a single segment.
pub fn encode_key(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

/// Last `/`-separated segment of a key (the display/file name).
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Lower-cased extension of the key's file name, if it has one.
pub fn extension(key: &str) -> Option<String> {
    let name = file_name(key);
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext.to_lowercase()),
        _ => None,
    }
}

/// Content type inferred from a key's extension.
pub fn content_type_for(key: &str) -> &'static str {
    match extension(key).as_deref() {
        Some("txt") => "text/plain",
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("csv") => "text/csv",
        Some("md") => "text/markdown",
        Some("sh") => "text/x-shellscript",
        Some("py") => "text/x-python",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("doc" | "docx") => "application/msword",
        Some("xls" | "xlsx") => "application/vnd.ms-excel",
        Some("ppt" | "pptx") => "application/vnd.ms-powerpoint",
        Some("zip") => "application/zip",
        Some("rar") => "application/x-rar-compressed",
        _ => "application/octet-stream",
    }
}
