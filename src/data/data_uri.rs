use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// A `data:<mime>;base64,<payload>` URI as sent by a browser file upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DataUri<'a> {
    pub mime: Option<&'a str>,
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    pub fn parse(contents: &'a str) -> Result<Self> {
        let (header, payload) = contents
            .split_once(',')
            .context("Data URI has no ',' separator")?;
        let header = header
            .strip_prefix("data:")
            .context("Upload is not a data URI")?;

        let mut parts = header.split(';');
        let mime = parts.next().filter(|m| !m.is_empty());
        if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
            anyhow::bail!("Only base64 data URIs are supported");
        }

        Ok(Self { mime, payload })
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.payload.trim())
            .context("Upload payload is not valid base64")
    }

    /// Rough decoded size, for rejecting oversized uploads before decoding.
    pub fn decoded_len_estimate(&self) -> usize {
        self.payload.len() / 4 * 3
    }
}

/// Encode bytes as a data URI with the given mime type.
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_browser_upload() {
        let uri = DataUri::parse("data:audio/wav;base64,UklGRg==").unwrap();
        assert_eq!(uri.mime, Some("audio/wav"));
        assert_eq!(uri.decode().unwrap(), b"RIFF");
    }

    #[test]
    fn missing_mime_is_allowed() {
        let uri = DataUri::parse("data:;base64,AAEC").unwrap();
        assert_eq!(uri.mime, None);
        assert_eq!(uri.decode().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn rejects_non_data_uri_and_plain_encoding() {
        assert!(DataUri::parse("no comma here").is_err());
        assert!(DataUri::parse("http://x,y").is_err());
        assert!(DataUri::parse("data:text/plain,hello").is_err());
    }

    #[test]
    fn rejects_bad_base64() {
        let uri = DataUri::parse("data:audio/wav;base64,@@@@").unwrap();
        assert!(uri.decode().is_err());
    }

    #[test]
    fn encode_then_parse() {
        let s = encode("audio/wav", b"abc");
        assert_eq!(s, "data:audio/wav;base64,YWJj");
        assert_eq!(DataUri::parse(&s).unwrap().decode().unwrap(), b"abc");
    }
}
