// ---------------------------------------------------------------------------
// SaveError: errors for world-level fuel save/load
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that abort a whole fuel save or load.
///
/// Per-owner inconsistencies are not errors at this level: they are reported
/// as `FuelLoadFailedEvent`s and the owner is despawned.
#[derive(Debug)]
pub enum SaveError {
    /// The world could not be turned into a save container.
    Encode(String),
    /// Bitcode decoding failed (corrupt or invalid payload).
    Decode(String),
    /// The container header is missing, truncated or fails its checksum.
    Header(String),
    /// Payload version is newer than this build supports.
    VersionMismatch { expected_max: u32, found: u32 },
    /// No bytes were pending when a load was requested.
    NoData,
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::Header(msg) => write!(f, "Invalid fuel save header: {msg}"),
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: fuel save is v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::NoData => write!(f, "No fuel save data available to load"),
        }
    }
}

impl std::error::Error for SaveError {}

impl From<bitcode::Error> for SaveError {
    fn from(e: bitcode::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}
