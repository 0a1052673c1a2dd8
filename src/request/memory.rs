//! Supported per-instance memory sizes.

use crate::error::RequestError;

/// Memory sizes, in MB, accepted by the containers service.
pub const SUPPORTED_MEMORY_SIZES: [u32; 9] = [64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384];

const DEFAULT_MEMORY_MB: u32 = 256;

/// A validated per-instance memory size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySize(u32);

impl MemorySize {
    /// The size in megabytes.
    #[must_use]
    pub const fn megabytes(self) -> u32 {
        self.0
    }
}

impl Default for MemorySize {
    fn default() -> Self {
        Self(DEFAULT_MEMORY_MB)
    }
}

impl TryFrom<u32> for MemorySize {
    type Error = RequestError;

    fn try_from(megabytes: u32) -> Result<Self, Self::Error> {
        if SUPPORTED_MEMORY_SIZES.contains(&megabytes) {
            return Ok(Self(megabytes));
        }
        Err(RequestError::InvalidArgument {
            field: String::from("Memory"),
            reason: format!(
                "{megabytes} is not one of the supported sizes {SUPPORTED_MEMORY_SIZES:?}"
            ),
        })
    }
}
