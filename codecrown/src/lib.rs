//! # Code Crown toolkit
//!
//! Authenticates and provisions SD cards as Code Crowns, the cartridge-like
//! accessory read by the Digimon Xros Loader toy. A provisioned card carries
//! a 512-byte obfuscated security sector tied to the card's identity
//! registers, followed immediately by 1 MiB of quest data.
//!
//! # Examples
//!
//! ## Verifying a card
//! ```no_run
//! # use codecrown::CrownError;
//! use codecrown::{device::list::DiskLister, CrownManip};
//!
//! let lister = DiskLister::new()?;
//!
//! // Open the first eligible card device and read its registers from sysfs.
//! let volumes = lister.volumes()?;
//! let disk = lister.open(&volumes[0])?;
//! let mut manip = CrownManip::from_disk(disk, true)?;
//!
//! if manip.verify_security_sector()? {
//!     println!("card is a valid Code Crown");
//! }
//! # Ok::<(), CrownError>(())
//! ```
//!
//! ## Installing quest data
//! ```no_run
//! # use codecrown::CrownError;
//! # use codecrown::{device::list::DiskLister, CrownManip};
//! # let lister = DiskLister::new()?;
//! # let disk = lister.open("/dev/mmcblk0")?;
//! let data = std::fs::read("quest.bin")?;
//! assert!(codecrown::crown::is_valid_payload(&data));
//!
//! let mut manip = CrownManip::from_disk(disk, false)?;
//! manip.upload_payload(&data)?;
//! # Ok::<(), CrownError>(())
//! ```

pub mod crc;
pub mod crown;
pub mod device;
mod error;
pub mod extract;
pub mod partition;
pub mod sector;

pub use crate::crown::CrownManip;
pub use crate::error::CrownError;
