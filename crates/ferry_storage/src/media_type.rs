//! Image format detection for inline payloads.

/// Image formats the portal stores.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
)]
pub enum ImageFormat {
    /// PNG
    #[display("image/png")]
    Png,
    /// JPEG
    #[display("image/jpeg")]
    Jpeg,
    /// GIF
    #[display("image/gif")]
    Gif,
    /// WebP
    #[display("image/webp")]
    Webp,
    /// AVIF
    #[display("image/avif")]
    Avif,
    /// SVG
    #[display("image/svg+xml")]
    Svg,
}

impl ImageFormat {
    /// MIME type of the format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Avif => "image/avif",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    /// Guess the format from the file extension of a URL or path.
    pub fn from_url(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::Webp),
            "avif" => Some(ImageFormat::Avif),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }

    /// MIME type for a payload: the response header wins, then the URL
    /// extension, then `application/octet-stream`.
    pub fn resolve_mime(content_type: Option<&str>, url: &str) -> String {
        let header = content_type
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream");

        match header {
            Some(ct) => ct.to_string(),
            None => Self::from_url(url)
                .map(|f| f.mime_type().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_wins_over_extension() {
        let mime = ImageFormat::resolve_mime(Some("image/webp; charset=binary"), "a.png");
        assert_eq!(mime, "image/webp");
    }

    #[test]
    fn octet_stream_header_falls_back_to_extension() {
        let mime = ImageFormat::resolve_mime(Some("application/octet-stream"), "x/y.JPG?w=2");
        assert_eq!(mime, "image/jpeg");
    }

    #[test]
    fn unknown_everything_is_octet_stream() {
        assert_eq!(ImageFormat::resolve_mime(None, "blob"), "application/octet-stream");
    }
}
