//! Opaque image payloads exchanged with the remote service.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Image bytes plus their MIME type.
///
/// Serialized as `{ "mime_type": ..., "data": <base64> }`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImageData {
    pub mime_type: String,
    #[serde(rename = "data", with = "base64_bytes")]
    #[schemars(with = "String")]
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// JPEG payload, the default format for uploads.
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new("image/jpeg", bytes)
    }

    /// Decode a base64 payload, accepting an optional `data:<mime>;base64,` prefix.
    pub fn from_base64(mime_type: impl Into<String>, encoded: &str) -> Result<Self, base64::DecodeError> {
        let mut mime_type = mime_type.into();
        let mut payload = encoded.trim();

        if let Some(rest) = payload.strip_prefix("data:") {
            if let Some((header, data)) = rest.split_once(',') {
                if let Some(mime) = header.strip_suffix(";base64") {
                    if !mime.is_empty() {
                        mime_type = mime.to_string();
                    }
                }
                payload = data;
            }
        }

        Ok(Self {
            mime_type,
            bytes: STANDARD.decode(payload)?,
        })
    }

    /// Guess the MIME type from a file extension.
    pub fn mime_for_extension(extension: &str) -> &'static str {
        match extension.to_lowercase().as_str() {
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            _ => "image/jpeg",
        }
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "jpg",
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base64_strips_data_url() {
        let image = ImageData::from_base64("image/jpeg", "data:image/png;base64,AQID").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, vec![1, 2, 3]);
        assert_eq!(image.extension(), "png");
    }

    #[test]
    fn test_debug_hides_payload() {
        let image = ImageData::jpeg(vec![0; 2048]);
        let debug = format!("{:?}", image);
        assert!(debug.contains("len: 2048"));
        assert!(!debug.contains("0, 0"));
    }

    #[test]
    fn test_serde_uses_base64() {
        let image = ImageData::jpeg(vec![1, 2, 3]);
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["data"], "AQID");
        let back: ImageData = serde_json::from_value(json).unwrap();
        assert_eq!(back, image);
    }
}
