use crate::classify::DataUrl;
use crate::types::{Diagnostic, Lines};
use crate::utils::split_lines;
use crate::{Error, Result, SourceCache};
use base64::{Engine, engine::general_purpose::STANDARD};
use percent_encoding::percent_decode_str;
use tracing::debug;

impl SourceCache {
    /// Decode a data URI in place; never touches the network or filesystem.
    ///
    /// The raw entry holds the payload as it appeared in the URI.
    pub(crate) fn load_data_uri(
        &mut self,
        key: &str,
        data: &DataUrl,
    ) -> std::result::Result<Lines, Diagnostic> {
        let text = decode_payload(data).map_err(|e| Diagnostic::new(key, e.to_string()))?;
        debug!(
            media_type = %data.media_type,
            base64 = data.base64,
            "Decoded {} bytes of data URI content",
            text.len()
        );
        self.replace_raw(key, data.encoded_content.clone());
        Ok(self.store_split_lines(key, split_lines(&text)))
    }
}

/// Percent-decode the payload, then base64-decode it when flagged.
pub(crate) fn decode_payload(data: &DataUrl) -> Result<String> {
    let unescaped = percent_decode_str(&data.encoded_content);
    if !data.base64 {
        return Ok(unescaped.decode_utf8_lossy().into_owned());
    }

    let compact: Vec<u8> = unescaped
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| Error::Decode(format!("invalid base64 data URI payload: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn data(uri: &str) -> DataUrl {
        DataUrl::parse(uri).unwrap()
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            decode_payload(&data("data:text/plain,hello%20world")).unwrap(),
            "hello world"
        );
        assert_eq!(
            decode_payload(&data("data:,a%0Ab%E4%B8%96")).unwrap(),
            "a\nb世"
        );
    }

    #[test]
    fn test_base64_decoding() {
        assert_eq!(
            decode_payload(&data("data:text/javascript;base64,YWxlcnQoMSk7CmZvbygpOw==")).unwrap(),
            "alert(1);\nfoo();"
        );
        // Escaped padding is unescaped first
        assert_eq!(
            decode_payload(&data("data:;base64,YQ%3D%3D")).unwrap(),
            "a"
        );
    }

    #[test]
    fn test_bad_base64_is_decode_error() {
        let err = decode_payload(&data("data:;base64,@@@")).unwrap_err();
        assert_eq!(err.category(), "decode");
    }
}
