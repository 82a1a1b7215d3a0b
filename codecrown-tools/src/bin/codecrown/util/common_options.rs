use anyhow::Context;
use codecrown::device::list::DiskLister;
use codecrown::CrownManip;

/// Card register values supplied on the command line.
#[derive(Debug, Clone)]
pub struct CardRegisters {
    pub cid: String,
    pub csd: String,
    pub ssr: String,
}

/// Opens the device at `path` and wraps it in a [`CrownManip`].
///
/// The path must be one of the enumerated card volumes and the device must
/// be in a state that permits authentication. Explicit register values take
/// precedence over reading them from the device; `need_registers` only
/// matters when none were supplied.
pub fn open_manip(
    path: &str,
    registers: Option<&CardRegisters>,
    need_registers: bool,
) -> anyhow::Result<CrownManip> {
    let lister = DiskLister::new()?;
    let volumes = lister.volumes()?;
    if !volumes.iter().any(|v| v == path) {
        anyhow::bail!("Could not find {path} in available card devices. Try `codecrown list`.");
    }

    let mut disk = lister.open(path)?;
    if !disk.is_ready_for_authentication() {
        anyhow::bail!("Disk cannot be used as a Code Crown.");
    }
    if !disk.lock() {
        tracing::warn!("Could not get exclusive access to {path}; proceeding anyway");
    }

    let manip = match registers {
        Some(regs) => CrownManip::with_registers(disk, &regs.cid, &regs.csd, &regs.ssr),
        None => CrownManip::from_disk(disk, need_registers),
    };
    manip.with_context(|| format!("Cannot use {path} as a Code Crown"))
}
