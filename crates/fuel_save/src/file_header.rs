// ---------------------------------------------------------------------------
// file_header – fuel save container header with magic, version and checksum
// ---------------------------------------------------------------------------
//
// Header format (16 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "FUEL" (0x4655454C)
//   [4..8]   Header format version (u32)
//   [8..12]  Payload size (u32)
//   [12..16] xxHash32 checksum of the payload (everything after the header)
//
// On save: encode FuelSaveData -> prepend header
// On load: check magic -> check size -> validate checksum -> strip header

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;

/// Magic bytes identifying a fuel save container.
pub const MAGIC: [u8; 4] = *b"FUEL";

/// Size of the header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Current header layout version.
pub const HEADER_FORMAT_VERSION: u32 = 1;

/// Seed for xxHash32 checksum.
const XXHASH_SEED: u32 = 0;

/// Parsed header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub payload_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    pub fn new(payload: &[u8]) -> Self {
        Self {
            format_version: HEADER_FORMAT_VERSION,
            payload_size: payload.len() as u32,
            checksum: xxh32(payload, XXHASH_SEED),
        }
    }
}

/// Returns bytes: [header (16 bytes)] ++ [payload].
pub fn wrap_with_header(payload: &[u8]) -> Vec<u8> {
    let header = FileHeader::new(payload);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&header.format_version.to_le_bytes());
    out.extend_from_slice(&header.payload_size.to_le_bytes());
    out.extend_from_slice(&header.checksum.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Validate the header and return it with the payload it covers.
///
/// # Errors
///
/// Returns [`SaveError::Header`] if the magic is missing, the buffer is
/// truncated, the header version is from a newer build, or the checksum
/// does not match.
pub fn unwrap_header(bytes: &[u8]) -> Result<(FileHeader, &[u8]), SaveError> {
    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::Header(format!(
            "container is too short ({} bytes, need at least {HEADER_SIZE})",
            bytes.len()
        )));
    }
    if bytes[..4] != MAGIC {
        return Err(SaveError::Header("missing FUEL magic bytes".to_string()));
    }

    let header = FileHeader {
        format_version: read_u32(bytes, 4),
        payload_size: read_u32(bytes, 8),
        checksum: read_u32(bytes, 12),
    };

    if header.format_version > HEADER_FORMAT_VERSION {
        return Err(SaveError::Header(format!(
            "header format version {} is newer than supported version {HEADER_FORMAT_VERSION}",
            header.format_version
        )));
    }

    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != header.payload_size as usize {
        return Err(SaveError::Header(format!(
            "payload is {} bytes, header declares {}",
            payload.len(),
            header.payload_size
        )));
    }

    let computed = xxh32(payload, XXHASH_SEED);
    if computed != header.checksum {
        return Err(SaveError::Header(format!(
            "checksum mismatch (expected {:#010X}, got {computed:#010X})",
            header.checksum
        )));
    }

    Ok((header, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_and_unwrap() {
        let data = b"fuel payload";
        let wrapped = wrap_with_header(data);
        assert_eq!(&wrapped[..4], b"FUEL");
        assert_eq!(wrapped.len(), HEADER_SIZE + data.len());

        let (header, payload) = unwrap_header(&wrapped).expect("unwrap should succeed");
        assert_eq!(header.format_version, HEADER_FORMAT_VERSION);
        assert_eq!(header.payload_size, data.len() as u32);
        assert_eq!(payload, data);
    }

    #[test]
    fn test_empty_payload_is_valid() {
        let wrapped = wrap_with_header(&[]);
        let (_, payload) = unwrap_header(&wrapped).expect("empty payload is fine");
        assert!(payload.is_empty());
    }

    #[test]
    fn test_corrupted_payload_fails_checksum() {
        let mut wrapped = wrap_with_header(b"some fuel state");
        let last = wrapped.len() - 1;
        wrapped[last] ^= 0xFF;
        let err = unwrap_header(&wrapped).unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"), "got: {err}");
    }

    #[test]
    fn test_missing_magic_rejected() {
        let mut wrapped = wrap_with_header(b"abc");
        wrapped[0] = b'X';
        assert!(matches!(unwrap_header(&wrapped), Err(SaveError::Header(_))));
    }

    #[test]
    fn test_truncated_rejected() {
        assert!(matches!(unwrap_header(b"FUEL"), Err(SaveError::Header(_))));
        let wrapped = wrap_with_header(b"abcdef");
        let err = unwrap_header(&wrapped[..wrapped.len() - 2]).unwrap_err();
        assert!(err.to_string().contains("declares"), "got: {err}");
    }

    #[test]
    fn test_newer_header_version_rejected() {
        let mut wrapped = wrap_with_header(b"abc");
        wrapped[4..8].copy_from_slice(&(HEADER_FORMAT_VERSION + 1).to_le_bytes());
        let err = unwrap_header(&wrapped).unwrap_err();
        assert!(err.to_string().contains("newer"), "got: {err}");
    }
}
