//! Sector-addressable card devices.
//!
//! The [`Disk`] trait is the only surface the core touches; platform
//! backends live behind it and are selected by [`list::DiskLister`] at the
//! boundary, never inside the core.

pub mod fake;
pub mod list;

#[cfg(target_os = "linux")]
pub mod linux;

use crate::error::CrownError;

/// Fixed sector size of every supported medium, in bytes.
pub const BYTES_PER_SECTOR: usize = 512;

/// Hex renderings of the card's identity registers, as reported by the host.
#[derive(Debug, Clone)]
pub struct IdentityRegisterStrings {
    /// Card identification register, 16 bytes.
    pub cid: String,
    /// Card specific data register, 16 bytes.
    pub csd: String,
    /// SD status register, 64 bytes.
    pub ssr: String,
}

/// A sector-addressable card device.
///
/// All I/O is synchronous and blocking. The handle is exclusively owned;
/// the backend releases the underlying device when dropped.
pub trait Disk {
    /// The name of the disk, typically its device path.
    fn display_name(&self) -> &str;

    /// Gains an exclusive lock on the disk. Best effort.
    fn lock(&mut self) -> bool;

    /// Releases the exclusive lock. Best effort.
    fn unlock(&mut self) -> bool;

    /// Positions the device at the start of the given sector.
    fn seek_sector(&mut self, sector: u64) -> Result<(), CrownError>;

    /// The total number of sectors on the disk.
    fn total_sectors(&mut self) -> Result<u64, CrownError>;

    /// Reads up to `count` sectors from the current position.
    ///
    /// The result may be shorter than `count * 512` bytes; callers must
    /// check the length.
    fn read_sectors(&mut self, count: usize) -> Result<Vec<u8>, CrownError>;

    /// Writes `count` sectors from `buf`, starting at `offset` within it.
    ///
    /// Returns the number of bytes actually written, which may be less
    /// than `count * 512`.
    fn write_sectors(&mut self, count: usize, buf: &[u8], offset: usize)
        -> Result<usize, CrownError>;

    /// Whether the disk's state permits authentication, e.g. the medium is
    /// not encrypted.
    fn is_ready_for_authentication(&self) -> bool;

    /// Reads the card's CID, CSD, and SSR from host metadata.
    ///
    /// Fails with [`CrownError::RegistersNotReadable`] where the platform
    /// has no way to report them, such as behind a USB card reader.
    fn read_identity_registers(&mut self) -> Result<IdentityRegisterStrings, CrownError>;
}
