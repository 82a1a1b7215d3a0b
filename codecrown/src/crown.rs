//! Code Crown orchestration.

use crate::device::{Disk, BYTES_PER_SECTOR};
use crate::error::CrownError;
use crate::partition::locate_crown_region;
use crate::sector::{self, SECTOR_LEN};

/// Exact length of the quest data blob.
pub const PAYLOAD_LEN: usize = 0x10_0000;
const PAYLOAD_SECTORS: usize = PAYLOAD_LEN / BYTES_PER_SECTOR;

struct IdentityRegisters {
    cid: Vec<u8>,
    csd: Vec<u8>,
    ssr: Vec<u8>,
}

impl IdentityRegisters {
    fn from_hex(cid: &str, csd: &str, ssr: &str) -> Result<Self, CrownError> {
        Ok(Self {
            cid: sector::decode_register_hex("CID", cid)?,
            csd: sector::decode_register_hex("CSD", csd)?,
            ssr: sector::decode_register_hex("SSR", ssr)?,
        })
    }
}

/// Checks whether `data` is a well-formed quest blob: exactly 1 MiB and a
/// `DXL` header with a version byte between 1 and 4.
pub fn is_valid_payload(data: &[u8]) -> bool {
    data.len() == PAYLOAD_LEN && data.starts_with(b"DXL") && (1..=4).contains(&data[3])
}

/// Provides the create, verify, upload, and dump operations on a card.
///
/// Exclusively owns its [`Disk`] handle; the registers captured at
/// construction are immutable for the object's lifetime, and the crown
/// region is recomputed from the partition table on every call. Dropping
/// the `CrownManip` releases the device.
pub struct CrownManip {
    disk: Box<dyn Disk>,
    registers: Option<IdentityRegisters>,
}

impl CrownManip {
    /// Creates a manipulator with explicitly supplied register values.
    ///
    /// All three registers are required together.
    pub fn with_registers(
        disk: Box<dyn Disk>,
        cid: &str,
        csd: &str,
        ssr: &str,
    ) -> Result<Self, CrownError> {
        Ok(Self {
            disk,
            registers: Some(IdentityRegisters::from_hex(cid, csd, ssr)?),
        })
    }

    /// Creates a manipulator, reading registers from the device itself when
    /// `read_registers` is set.
    ///
    /// Without registers, only the quest data operations are available.
    pub fn from_disk(mut disk: Box<dyn Disk>, read_registers: bool) -> Result<Self, CrownError> {
        let registers = if read_registers {
            let regs = disk.read_identity_registers()?;
            Some(IdentityRegisters::from_hex(&regs.cid, &regs.csd, &regs.ssr)?)
        } else {
            None
        };
        Ok(Self { disk, registers })
    }

    fn require_registers(&self) -> Result<&IdentityRegisters, CrownError> {
        self.registers
            .as_ref()
            .ok_or(CrownError::RegistersUnavailable)
    }

    /// Writes a fresh security sector at the crown region.
    pub fn create_security_sector(&mut self) -> Result<(), CrownError> {
        self.require_registers()?;
        let lba = locate_crown_region(self.disk.as_mut())?;

        let regs = self.require_registers()?;
        let blob = sector::generate(&regs.cid, &regs.csd, &regs.ssr)?;

        tracing::info!("Writing security sector at LBA {lba}");
        self.disk.seek_sector(lba)?;
        let written = self.disk.write_sectors(1, &blob, 0)?;
        if written != SECTOR_LEN {
            return Err(CrownError::ShortWrite {
                written,
                expected: SECTOR_LEN,
            });
        }
        Ok(())
    }

    /// Reads the security sector back and checks it against the registers.
    pub fn verify_security_sector(&mut self) -> Result<bool, CrownError> {
        self.require_registers()?;
        let lba = locate_crown_region(self.disk.as_mut())?;

        self.disk.seek_sector(lba)?;
        let blob = self.disk.read_sectors(1)?;

        let regs = self.require_registers()?;
        sector::validate(&blob, &regs.cid, &regs.csd, &regs.ssr)
    }

    /// Writes 1 MiB of quest data immediately after the security sector.
    ///
    /// Does not require registers.
    pub fn upload_payload(&mut self, data: &[u8]) -> Result<(), CrownError> {
        if data.len() != PAYLOAD_LEN {
            return Err(CrownError::WrongLength {
                name: "Quest data",
                expected: PAYLOAD_LEN,
                actual: data.len(),
            });
        }

        let lba = locate_crown_region(self.disk.as_mut())?;
        tracing::info!("Writing quest data at LBA {}", lba + 1);
        self.disk.seek_sector(lba + 1)?;
        let written = self.disk.write_sectors(PAYLOAD_SECTORS, data, 0)?;
        if written != PAYLOAD_LEN {
            return Err(CrownError::ShortWrite {
                written,
                expected: PAYLOAD_LEN,
            });
        }
        Ok(())
    }

    /// Reads the quest data region.
    ///
    /// Returns whatever the device produced, which may be shorter than
    /// 1 MiB; callers must check with [`is_valid_payload`].
    pub fn dump_payload(&mut self) -> Result<Vec<u8>, CrownError> {
        let lba = locate_crown_region(self.disk.as_mut())?;
        self.disk.seek_sector(lba + 1)?;
        self.disk.read_sectors(PAYLOAD_SECTORS)
    }
}
