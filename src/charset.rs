//! Codepage conversion.
//!
//! JTV archives come from Windows tooling: member filenames are usually
//! CP866 and program titles CP1251. The schedule core keeps titles as raw
//! bytes; conversion happens at the edges through [`CharsetConverter`].

use encoding_rs::Encoding;

use crate::error::{JtvError, Result};

/// Decodes codepage-encoded bytes into text.
pub trait CharsetConverter: Send + Sync {
    /// Decode `bytes` from `codepage` into UTF-8.
    fn decode(&self, codepage: &str, bytes: &[u8]) -> Result<String>;
}

/// [`CharsetConverter`] backed by the WHATWG encodings in `encoding_rs`.
///
/// Accepts any label `encoding_rs` knows (`cp866`, `cp1251`,
/// `windows-1251`, `koi8-r`, `utf-8`, ...), case-insensitively.
#[derive(Debug, Default, Clone, Copy)]
pub struct EncodingConverter;

impl EncodingConverter {
    fn encoding(codepage: &str) -> Result<&'static Encoding> {
        Encoding::for_label(codepage.trim().as_bytes()).ok_or_else(|| JtvError::Conversion {
            codepage: codepage.to_string(),
            reason: "unknown codepage".into(),
        })
    }
}

impl CharsetConverter for EncodingConverter {
    fn decode(&self, codepage: &str, bytes: &[u8]) -> Result<String> {
        let encoding = Self::encoding(codepage)?;
        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        if had_errors {
            return Err(JtvError::Conversion {
                codepage: codepage.to_string(),
                reason: format!("malformed {} sequence", encoding.name()),
            });
        }
        Ok(text.into_owned())
    }
}

/// Decode for display, substituting U+FFFD instead of failing.
pub fn decode_lossy(converter: &dyn CharsetConverter, codepage: &str, bytes: &[u8]) -> String {
    converter
        .decode(codepage, bytes)
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
}
