//! Wire-frame codec.
//!
//! Pure encode/decode between raw payload bytes and the framed wire
//! format: one header byte (FIN + opcode), a 7/16/64-bit length, an
//! optional 4-byte mask key, then the payload. No I/O happens here.
//!
//! Two deliberate deviations from the fully conformant protocol are
//! preserved for compatibility with the paired server:
//!
//! - [`encode`] never sets the client-to-server mask bit. A strictly
//!   conformant peer may reject such frames; the paired server accepts
//!   them.
//! - 64-bit lengths use only the low 4 bytes of the 8-byte field, both
//!   on encode and decode, capping payloads at 4 GiB.

/// FIN bit plus text opcode: the only header byte ever emitted.
const TEXT_FRAME_HEADER: u8 = 0x81;

/// Single-byte lengths stop below this marker value.
const LEN_16_MARKER: u8 = 126;

/// Marker for the 8-byte length field.
const LEN_64_MARKER: u8 = 127;

/// Encodes a payload into a single unmasked text frame.
///
/// Length encoding: below 126 a single length byte; below 65 536 the
/// marker byte 126 plus a 2-byte big-endian length; otherwise the marker
/// byte 127 plus an 8-byte field whose high 4 bytes are zero.
#[must_use]
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let len = payload.len();
    let mut frame = Vec::with_capacity(len + 10);
    frame.push(TEXT_FRAME_HEADER);

    if len < usize::from(LEN_16_MARKER) {
        frame.push(len as u8);
    } else if len < 65_536 {
        frame.push(LEN_16_MARKER);
        frame.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        frame.push(LEN_64_MARKER);
        frame.extend_from_slice(&[0, 0, 0, 0]);
        frame.extend_from_slice(&(len as u32).to_be_bytes());
    }

    frame.extend_from_slice(payload);
    frame
}

/// Decodes a single frame, returning its payload bytes.
///
/// Returns `None` when the buffer does not hold a complete frame
/// (header, extended length, mask key, or payload truncated) — that is
/// an "insufficient bytes" signal, not an error. Masked payloads are
/// unmasked with `mask[i mod 4]`. The FIN/opcode bits of the first byte
/// are not inspected.
#[must_use]
pub fn decode(data: &[u8]) -> Option<Vec<u8>> {
    let second = *data.get(1)?;
    let masked = second & 0x80 != 0;
    let base_len = usize::from(second & 0x7F);

    let mut offset = 2usize;
    let len = match base_len {
        126 => {
            let bytes: [u8; 2] = data.get(offset..offset + 2)?.try_into().ok()?;
            offset += 2;
            usize::from(u16::from_be_bytes(bytes))
        }
        127 => {
            // Only the low 4 bytes of the 8-byte field carry the length.
            let bytes: [u8; 4] = data.get(offset + 4..offset + 8)?.try_into().ok()?;
            offset += 8;
            u32::from_be_bytes(bytes) as usize
        }
        n => n,
    };

    let mask: Option<[u8; 4]> = if masked {
        let key: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
        offset += 4;
        Some(key)
    } else {
        None
    };

    let payload = data.get(offset..offset.checked_add(len)?)?;

    Some(match mask {
        Some(key) => payload
            .iter()
            .zip(key.iter().cycle())
            .map(|(byte, k)| byte ^ k)
            .collect(),
        None => payload.to_vec(),
    })
}
