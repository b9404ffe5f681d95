//! Inbound frame validation.

use shiphub_core::error::{AppError, ErrorKind};
use shiphub_core::result::AppResult;

use super::types::InboundFrame;

/// Maximum accepted frame size in bytes.
pub const MAX_FRAME_SIZE: usize = 65_536;

/// Maximum event name length.
const MAX_EVENT_NAME_LEN: usize = 256;

/// Parses and validates a raw text frame.
pub fn parse_inbound(raw: &str) -> AppResult<InboundFrame> {
    if raw.len() > MAX_FRAME_SIZE {
        return Err(AppError::validation(format!(
            "Frame exceeds maximum size of {MAX_FRAME_SIZE} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty frame"));
    }

    let frame: InboundFrame = serde_json::from_str(raw)
        .map_err(|e| AppError::with_source(ErrorKind::Validation, "Malformed frame", e))?;
    validate_event_name(&frame.event)?;
    Ok(frame)
}

/// Validates an event name.
pub fn validate_event_name(event: &str) -> AppResult<()> {
    if event.trim().is_empty() {
        return Err(AppError::validation("Empty event name"));
    }

    if event.len() > MAX_EVENT_NAME_LEN {
        return Err(AppError::validation("Event name too long"));
    }

    Ok(())
}
