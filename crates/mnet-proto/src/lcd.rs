//! Remote display buffer model (C8, §3, §4.8).

use crate::errors::{ProtocolError, Result};

/// Raw size of the remote display buffer.
pub const LCD_BUFFER_LEN: usize = 138;
/// Width of each rendered text row.
pub const LCD_ROW_LEN: usize = 18;

/// The 138-byte remote display buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDisplay([u8; LCD_BUFFER_LEN]);

impl RemoteDisplay {
    /// Wrap a raw 138-byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedReply`] if `raw.len() !=
    /// `[`LCD_BUFFER_LEN`].
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let buf: [u8; LCD_BUFFER_LEN] = raw.try_into().map_err(|_| ProtocolError::MalformedReply {
            reason: format!("remote display buffer: expected {LCD_BUFFER_LEN} bytes, got {}", raw.len()),
        })?;
        Ok(Self(buf))
    }

    /// The raw buffer bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; LCD_BUFFER_LEN] {
        &self.0
    }

    /// Render as successive 18-character lines, trailing padding stripped
    /// from each line (§4.8).
    #[must_use]
    pub fn text_lines(&self) -> Vec<String> {
        self.0
            .chunks(LCD_ROW_LEN)
            .map(|row| {
                let end = row.iter().rposition(|&b| b != 0 && b != b' ').map_or(0, |i| i + 1);
                String::from_utf8_lossy(&row[..end]).into_owned()
            })
            .collect()
    }
}
