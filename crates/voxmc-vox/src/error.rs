use thiserror::Error;

/// Decode failures for the `.vox` container. All of these are terminal for
/// the file being decoded; unknown chunk tags are skipped, not errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoxError {
    #[error("magic number mismatch: expected \"VOX \", found {found:?}")]
    InvalidMagic { found: [u8; 4] },

    #[error("unsupported format version {found} (expected 150)")]
    UnsupportedVersion { found: i32 },

    #[error("MAIN chunk missing or malformed")]
    MissingRootChunk,

    #[error("corrupt voxel data: {reason}")]
    CorruptVoxelData { reason: String },

    #[error("truncated stream: needed {needed} bytes at offset {offset}, only {len} in buffer")]
    TruncatedStream {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("refusing to allocate {sx}x{sy}x{sz} voxel volume")]
    OutOfMemory { sx: i32, sy: i32, sz: i32 },
}
