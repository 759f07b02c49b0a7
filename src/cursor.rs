//! # Pagination cursors
//!
//! A cursor pairs the opaque id of the row it points at with that row's
//! absolute position in the fully ordered result sequence. The encoded
//! form reuses the identifier scheme: `base64url_no_pad("cursor:<id>:<pos>")`.
//! Positions are zero-based; a page resumed from a cursor starts at
//! `position + 1`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::error::{Error, Result};
use crate::ident::{decode_payload, expect_len, parse_int};
use crate::model::OpaqueId;

const CURSOR_TAG: &str = "cursor";

/// A decoded pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Opaque id of the row this cursor points at.
    pub record_id: OpaqueId,
    /// Zero-based absolute position of that row in the ordered sequence.
    pub position: u64,
}

impl Cursor {
    pub fn new(record_id: OpaqueId, position: u64) -> Self {
        Self {
            record_id,
            position,
        }
    }

    /// Encodes the cursor into its opaque text form.
    pub fn encode(&self) -> String {
        let payload = format!("{CURSOR_TAG}:{}:{}", self.record_id, self.position);
        URL_SAFE_NO_PAD.encode(payload)
    }

    /// Decodes opaque cursor text, rejecting anything that is not a
    /// well-formed cursor (including valid entity ids passed by mistake).
    pub fn decode(text: &str) -> Result<Self> {
        let payload = decode_payload(text)?;
        let parts: Vec<&str> = payload.split(':').collect();
        expect_len(&parts, 3, "cursor")?;
        if parts[0] != CURSOR_TAG {
            return Err(Error::invalid_identifier(format!(
                "expected cursor, found tag {:?}",
                parts[0]
            )));
        }
        if parts[1].is_empty() {
            return Err(Error::invalid_identifier("cursor record id is empty"));
        }
        let position = parse_int(parts[2], "cursor position")?;
        Ok(Cursor::new(OpaqueId::new(parts[1]), position))
    }
}
