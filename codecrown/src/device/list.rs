//! Listing card devices eligible for use as a Code Crown.

use crate::device::Disk;
use crate::error::CrownError;

/// Enumerates and opens card devices using the platform backend.
pub struct DiskLister {
    operations: Box<dyn PlatformOperations>,
}

impl DiskLister {
    /// Creates a lister backed by the current platform.
    ///
    /// Fails with [`CrownError::UnsupportedPlatform`] where no backend
    /// exists.
    pub fn new() -> Result<Self, CrownError> {
        #[cfg(target_os = "linux")]
        {
            Ok(Self::with_operations(Box::new(
                crate::device::linux::LinuxOperations,
            )))
        }
        #[cfg(not(target_os = "linux"))]
        {
            Err(CrownError::UnsupportedPlatform)
        }
    }

    /// Creates a lister with a custom backend implementation.
    pub fn with_operations(operations: Box<dyn PlatformOperations>) -> Self {
        Self { operations }
    }

    /// The device paths that can hold a Code Crown.
    pub fn volumes(&self) -> Result<Vec<String>, CrownError> {
        self.operations.volumes()
    }

    /// Opens the device at `path`.
    pub fn open(&self, path: &str) -> Result<Box<dyn Disk>, CrownError> {
        self.operations.open(path)
    }
}

/// Per-platform volume enumeration and device construction.
pub trait PlatformOperations {
    /// The paths of devices that can be authenticated.
    fn volumes(&self) -> Result<Vec<String>, CrownError>;

    /// Constructs a disk for the given path.
    fn open(&self, path: &str) -> Result<Box<dyn Disk>, CrownError>;
}
