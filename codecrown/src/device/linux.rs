//! Linux block device backend.
//!
//! Card devices are whole block devices (`/dev/sdX`, `/dev/mmcblkN`)
//! accessed read-write. Identity registers come from the sysfs attributes
//! the mmc driver exposes; USB card readers have none, which surfaces as a
//! capability failure rather than an I/O error.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use crate::device::list::PlatformOperations;
use crate::device::{Disk, IdentityRegisterStrings, BYTES_PER_SECTOR};
use crate::error::CrownError;

// ioctl _IOR(0x12, 114, u64): device size in bytes.
const BLKGETSIZE64: libc::c_ulong = 0x8008_1272;

/// A block device opened for raw sector I/O.
pub struct LinuxDisk {
    file: File,
    path: String,
}

impl LinuxDisk {
    /// Opens the block device at `path` read-write.
    pub fn open(path: &str) -> Result<Self, CrownError> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_string(),
        })
    }

    fn sysfs_device_dir(&self) -> PathBuf {
        let name = self.path.trim_start_matches("/dev/");
        Path::new("/sys/block").join(name).join("device")
    }
}

impl Disk for LinuxDisk {
    fn display_name(&self) -> &str {
        &self.path
    }

    fn lock(&mut self) -> bool {
        let res = unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if res != 0 {
            tracing::debug!(
                "flock on {} failed: {}",
                self.path,
                std::io::Error::last_os_error()
            );
        }
        res == 0
    }

    fn unlock(&mut self) -> bool {
        let res = unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_UN) };
        res == 0
    }

    fn seek_sector(&mut self, sector: u64) -> Result<(), CrownError> {
        self.file
            .seek(SeekFrom::Start(sector * BYTES_PER_SECTOR as u64))?;
        Ok(())
    }

    fn total_sectors(&mut self) -> Result<u64, CrownError> {
        let mut size: u64 = 0;
        let res = unsafe { libc::ioctl(self.file.as_raw_fd(), BLKGETSIZE64, &mut size) };
        if res != 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        Ok(size / BYTES_PER_SECTOR as u64)
    }

    fn read_sectors(&mut self, count: usize) -> Result<Vec<u8>, CrownError> {
        let mut buf = vec![0u8; count * BYTES_PER_SECTOR];
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        buf.truncate(filled);
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

        let mut written = 0;
        while written < chunk.len() {
            match self.file.write(&chunk[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.file.flush()?;
        Ok(written)
    }

    fn is_ready_for_authentication(&self) -> bool {
        // No special conditions on Linux.
        true
    }

    fn read_identity_registers(&mut self) -> Result<IdentityRegisterStrings, CrownError> {
        let dir = self.sysfs_device_dir();
        if !dir.is_dir() {
            return Err(CrownError::RegistersNotReadable);
        }

        let read_attr = |attr: &str| -> Result<String, CrownError> {
            match fs::read_to_string(dir.join(attr)) {
                Ok(s) => Ok(s.trim_end().to_string()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    Err(CrownError::RegistersNotReadable)
                }
                Err(e) => Err(e.into()),
            }
        };

        Ok(IdentityRegisterStrings {
            cid: read_attr("cid")?,
            csd: read_attr("csd")?,
            ssr: read_attr("ssr")?,
        })
    }
}

/// Platform operations for Linux, scanning sysfs for card devices.
pub struct LinuxOperations;

impl PlatformOperations for LinuxOperations {
    fn volumes(&self) -> Result<Vec<String>, CrownError> {
        let sys = Path::new("/sys/block");
        if !sys.is_dir() {
            // No sysfs, no way to tell card readers from fixed disks.
            return Err(CrownError::UnsupportedPlatform);
        }

        let mut volumes = Vec::new();
        for entry in fs::read_dir(sys)? {
            let entry = entry?;
            let Ok(uevent) = fs::read_to_string(entry.path().join("device/uevent")) else {
                continue;
            };

            let eligible = uevent.lines().any(|line| match line {
                // USB SCSI device, e.g. an external card reader.
                "DRIVER=sd" => entry
                    .path()
                    .canonicalize()
                    .map(|real| real.to_string_lossy().contains("/usb"))
                    .unwrap_or(false),
                // MMC device, e.g. a built-in SD card slot.
                "DRIVER=mmcblk" => true,
                _ => false,
            });

            if eligible {
                volumes.push(
                    Path::new("/dev")
                        .join(entry.file_name())
                        .to_string_lossy()
                        .into_owned(),
                );
            } else {
                tracing::trace!("Skipping {:?}: not a card device", entry.file_name());
            }
        }
        Ok(volumes)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Disk>, CrownError> {
        Ok(Box::new(LinuxDisk::open(path)?))
    }
}
