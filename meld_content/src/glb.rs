use std::{
    fs,
    path::{Path, PathBuf},
};

use meld_shared::log::info;

use crate::{Error, Result};

pub const GLB_MAGIC: &[u8; 4] = b"glTF";

/// Size of the binary glTF header: magic, version and total length.
pub const GLB_HEADER_SIZE: usize = 12;

/// Minimum size a useful aggregate file is expected to have.
pub const DEFAULT_MIN_SIZE: u64 = 1000;

/// Facts read from a GLB header that passed [`verify_glb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbSummary {
    pub size: u64,
    pub declared_length: u32,
    pub version: u32,
}

/// Checks that the file at `path` looks like a complete binary glTF.
///
/// The file has to be at least `min_size` bytes long, start with `glTF` and
/// declare its own size in the header.
pub fn verify_glb(path: impl AsRef<Path>, min_size: u64) -> Result<GlbSummary> {
    let path = path.as_ref();
    let fail = |reason: String| Error::Verification {
        path: PathBuf::from(path),
        reason,
    };

    let bytes = fs::read(path)?;
    let size = bytes.len() as u64;
    if size < min_size {
        return Err(fail(format!("file is {size} bytes but at least {min_size} are expected")));
    }
    if bytes.len() < GLB_HEADER_SIZE {
        return Err(fail(format!("file is {size} bytes and too small for a header")));
    }
    if &bytes[0..4] != GLB_MAGIC {
        return Err(fail(format!("magic is {:?} instead of \"glTF\"", String::from_utf8_lossy(&bytes[0..4]))));
    }

    let version = read_u32(&bytes[4..8]);
    let declared_length = read_u32(&bytes[8..12]);
    if declared_length as u64 != size {
        return Err(fail(format!("header declares {declared_length} bytes but the file has {size}")));
    }

    info!("'{}' is a valid GLB (version {version}, {size} bytes)", path.display());
    Ok(GlbSummary {
        size,
        declared_length,
        version,
    })
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buffer = [0; 4];
    buffer.copy_from_slice(bytes);
    u32::from_le_bytes(buffer)
}
