//! MIME type derivation from file names.

/// The MIME type for a file name, judged by its extension (case-insensitive).
///
/// Returns an empty string when the extension is missing or unknown. A name
/// that is only an extension, like `.json`, still resolves.
pub fn mime_type_for(name: &str) -> &'static str {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return "";
    };
    match ext.to_ascii_lowercase().as_str() {
        "txt" | "text" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "xml" => "text/xml",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "toml" => "application/toml",
        "yaml" | "yml" => "application/yaml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "wasm" => "application/wasm",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(mime_type_for("text.json"), "application/json");
        assert_eq!(mime_type_for("file.txt"), "text/plain");
        assert_eq!(mime_type_for("photo.JPEG"), "image/jpeg");
        assert_eq!(mime_type_for("archive.tar.gz"), "application/gzip");
    }

    #[test]
    fn extension_only() {
        assert_eq!(mime_type_for(".json"), "application/json");
    }

    #[test]
    fn unknown_or_missing_extension() {
        assert_eq!(mime_type_for("Makefile"), "");
        assert_eq!(mime_type_for("data.xyz"), "");
    }
}
