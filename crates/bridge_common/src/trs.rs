//! The EAV timing reference preamble carried in horizontal blanking.

/// The eight-byte end-of-active-video preamble: `FF FF 00 00 00 00 B6 B6`.
///
/// The last two bytes are matched on their high nibble only.
pub const EAV_PREAMBLE: [u8; 8] = [0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xB6, 0xB6];

/// High-nibble pattern accepted for the trailing status bytes.
pub const STATUS_NIBBLE: u8 = 0xB0;

/// Returns whether `byte` is acceptable as one of the trailing status bytes.
pub fn is_status_byte(byte: u8) -> bool {
    byte & 0xF0 == STATUS_NIBBLE
}
