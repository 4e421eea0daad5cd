//! Media type detection from file extensions.

use std::fmt;

use serde::Serialize;

/// A media type split into main and sub type (`image` / `png`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MediaType {
    pub main: &'static str,
    pub sub: &'static str,
}

impl MediaType {
    pub const OCTET_STREAM: Self = Self::new("application", "octet-stream");

    pub const fn new(main: &'static str, sub: &'static str) -> Self {
        Self { main, sub }
    }

    /// Guess media type from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Self {
        let (main, sub) = match ext.to_lowercase().as_str() {
            // Web / Text
            "html" | "htm" => ("text", "html"),
            "css" => ("text", "css"),
            "js" | "mjs" | "cjs" => ("text", "javascript"),
            "json" => ("application", "json"),
            "xml" => ("application", "xml"),
            "yaml" | "yml" => ("text", "yaml"),
            "toml" => ("text", "toml"),
            "csv" => ("text", "csv"),
            "txt" => ("text", "plain"),
            "md" | "markdown" => ("text", "markdown"),

            // Images
            "svg" => ("image", "svg+xml"),
            "png" => ("image", "png"),
            "jpg" | "jpeg" => ("image", "jpeg"),
            "gif" => ("image", "gif"),
            "webp" => ("image", "webp"),
            "avif" => ("image", "avif"),
            "ico" => ("image", "x-icon"),
            "bmp" => ("image", "bmp"),
            "tif" | "tiff" => ("image", "tiff"),

            // Audio / Video
            "mp3" => ("audio", "mpeg"),
            "wav" => ("audio", "wav"),
            "ogg" | "oga" => ("audio", "ogg"),
            "mp4" | "m4v" => ("video", "mp4"),
            "webm" => ("video", "webm"),

            // Fonts
            "woff" => ("font", "woff"),
            "woff2" => ("font", "woff2"),
            "ttf" => ("font", "ttf"),
            "otf" => ("font", "otf"),

            // Documents / Binary
            "pdf" => ("application", "pdf"),
            "wasm" => ("application", "wasm"),
            "zip" => ("application", "zip"),

            _ => return Self::OCTET_STREAM,
        };
        Self { main, sub }
    }

    /// Guess media type from a slash path.
    pub fn from_path(path: &str) -> Self {
        Self::from_extension(crate::core::key::ext(path).trim_start_matches('.'))
    }

    /// Resource type: the main type for images, the sub type otherwise.
    pub fn resource_type(&self) -> &'static str {
        if self.main == "image" {
            self.main
        } else {
            self.sub
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main, self.sub)
    }
}
