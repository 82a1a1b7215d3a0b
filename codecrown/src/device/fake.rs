//! An in-memory disk for tests and dry runs.

use crate::device::{Disk, IdentityRegisterStrings, BYTES_PER_SECTOR};
use crate::error::CrownError;

/// A [`Disk`] backed by a byte vector.
pub struct FakeDisk {
    data: Vec<u8>,
    position: usize,
    registers: Option<IdentityRegisterStrings>,
    read_limit: Option<usize>,
    locked: bool,
}

impl FakeDisk {
    /// Creates a zero-filled disk with the given number of sectors.
    pub fn new(total_sectors: u64) -> Self {
        Self {
            data: vec![0; total_sectors as usize * BYTES_PER_SECTOR],
            position: 0,
            registers: None,
            read_limit: None,
            locked: false,
        }
    }

    /// Sets the register values the disk reports.
    pub fn with_registers(mut self, cid: &str, csd: &str, ssr: &str) -> Self {
        self.registers = Some(IdentityRegisterStrings {
            cid: cid.to_string(),
            csd: csd.to_string(),
            ssr: ssr.to_string(),
        });
        self
    }

    /// Overwrites one sector of the backing store.
    pub fn set_sector(&mut self, lba: u64, bytes: &[u8]) {
        let start = lba as usize * BYTES_PER_SECTOR;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
    }

    /// A view of one sector of the backing store.
    pub fn sector(&self, lba: u64) -> &[u8] {
        let start = lba as usize * BYTES_PER_SECTOR;
        &self.data[start..start + BYTES_PER_SECTOR]
    }

    /// Caps every subsequent read at `limit` bytes, to exercise short-read
    /// handling.
    pub fn truncate_reads_to(&mut self, limit: usize) {
        self.read_limit = Some(limit);
    }
}

impl Disk for FakeDisk {
    fn display_name(&self) -> &str {
        "fake disk"
    }

    fn lock(&mut self) -> bool {
        self.locked = true;
        true
    }

    fn unlock(&mut self) -> bool {
        let was_locked = self.locked;
        self.locked = false;
        was_locked
    }

    fn seek_sector(&mut self, sector: u64) -> Result<(), CrownError> {
        self.position = sector as usize * BYTES_PER_SECTOR;
        Ok(())
    }

    fn total_sectors(&mut self) -> Result<u64, CrownError> {
        Ok((self.data.len() / BYTES_PER_SECTOR) as u64)
    }

    fn read_sectors(&mut self, count: usize) -> Result<Vec<u8>, CrownError> {
        let mut len = count * BYTES_PER_SECTOR;
        if let Some(limit) = self.read_limit {
            len = len.min(limit);
        }
        // Reads past the end of the medium come back short.
        let end = (self.position + len).min(self.data.len());
        let start = self.position.min(self.data.len());
        let buf = self.data[start..end].to_vec();
        self.position = end;
        Ok(buf)
    }

    fn write_sectors(
        &mut self,
        count: usize,
        buf: &[u8],
        offset: usize,
    ) -> Result<usize, CrownError> {
        let needed = count * BYTES_PER_SECTOR;
        let Some(chunk) = offset
            .checked_add(needed)
            .and_then(|end| buf.get(offset..end))
        else {
            return Err(CrownError::BufferTooSmall {
                available: buf.len(),
                needed,
                offset,
            });
        };

        let end = (self.position + chunk.len()).min(self.data.len());
        let written = end - self.position;
        self.data[self.position..end].copy_from_slice(&chunk[..written]);
        self.position = end;
        Ok(written)
    }

    fn is_ready_for_authentication(&self) -> bool {
        true
    }

    fn read_identity_registers(&mut self) -> Result<IdentityRegisterStrings, CrownError> {
        self.registers
            .clone()
            .ok_or(CrownError::RegistersNotReadable)
    }
}
