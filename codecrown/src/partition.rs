//! Locating a safe sector range for Code Crown data.
//!
//! The crown region is never persisted anywhere; it is recomputed from the
//! device's partition table on every operation. The security sector goes in
//! the first free sector after the first partition, with the 1 MiB of quest
//! data in the 0x800 sectors that follow.

use scroll::{Pread, LE};

use crate::device::{Disk, BYTES_PER_SECTOR};
use crate::error::CrownError;

/// Byte offset of the partition records within the table sector.
const TABLE_OFFSET: usize = 0x1BE;
/// Size of one partition record.
const RECORD_LEN: usize = 16;
/// Number of records in a legacy partition table.
const RECORD_COUNT: usize = 4;

const GPT_SIGNATURE: &[u8; 8] = b"EFI PART";

/// One sector for the security sector plus 0x800 sectors of quest data.
/// Strictly the downloader only writes 0xE0200 bytes of quest data, but the
/// full 1 MiB is reserved.
const REQUIRED_SECTORS: u64 = 0x801;

/// A record from the legacy partition table.
#[derive(Debug, Clone, Copy)]
struct PartitionRecord {
    /// Partition type byte; zero marks the slot as unused.
    kind: u8,
    start_lba: u32,
    sector_count: u32,
}

impl PartitionRecord {
    fn parse(table: &[u8], index: usize) -> Result<Self, CrownError> {
        let base = TABLE_OFFSET + index * RECORD_LEN;
        let kind = table
            .pread::<u8>(base + 4)
            .map_err(CrownError::MalformedPartitionTable)?;
        let start_lba = table
            .pread_with::<u32>(base + 8, LE)
            .map_err(CrownError::MalformedPartitionTable)?;
        let sector_count = table
            .pread_with::<u32>(base + 12, LE)
            .map_err(CrownError::MalformedPartitionTable)?;
        Ok(Self {
            kind,
            start_lba,
            sector_count,
        })
    }

    fn is_free(&self) -> bool {
        self.kind == 0
    }
}

// Collects (start, end) sector extents of the occupied records. The stock
// tool reads the length field of record 0 for every record it collects;
// kept as-is so existing cards resolve to the same sector. Only record 0's
// own extent and the starts of later records are ever consulted, so the
// quirk stays latent.
fn collect_extents(table: &[u8]) -> Result<Vec<(u64, u64)>, CrownError> {
    let first = PartitionRecord::parse(table, 0)?;
    if first.is_free() {
        return Err(CrownError::FirstPartitionFree);
    }

    let mut extents = Vec::new();
    for index in 0..RECORD_COUNT {
        let record = PartitionRecord::parse(table, index)?;
        if record.is_free() {
            continue;
        }
        let start = u64::from(record.start_lba);
        extents.push((start, start + u64::from(first.sector_count)));
    }
    Ok(extents)
}

fn read_one_sector(disk: &mut dyn Disk, lba: u64) -> Result<Vec<u8>, CrownError> {
    disk.seek_sector(lba)?;
    let buf = disk.read_sectors(1)?;
    if buf.len() < BYTES_PER_SECTOR {
        return Err(CrownError::ShortRead {
            got: buf.len(),
            expected: BYTES_PER_SECTOR,
        });
    }
    Ok(buf)
}

/// Finds the sector at which the security sector may be written.
///
/// Fails when the device is GPT partitioned, when the first partition slot
/// is free, or when the gap after the first partition (to the end of the
/// device, or to the start of the next partition) is smaller than 0x801
/// sectors.
pub fn locate_crown_region(disk: &mut dyn Disk) -> Result<u64, CrownError> {
    // GPT check first; the legacy table bytes of a protective MBR must not
    // be interpreted. The 55AA marker is deliberately not required, since
    // non-bootable cards may omit it.
    let header = read_one_sector(disk, 1)?;
    if header[..GPT_SIGNATURE.len()] == *GPT_SIGNATURE {
        return Err(CrownError::GptNotSupported);
    }

    let table = read_one_sector(disk, 0)?;
    let extents = collect_extents(&table)?;

    let first_end = extents[0].1;
    let gap = if extents.len() == 1 {
        disk.total_sectors()?.saturating_sub(first_end)
    } else {
        extents[1].0.saturating_sub(first_end)
    };
    if gap < REQUIRED_SECTORS {
        return Err(CrownError::InsufficientSpace);
    }

    tracing::debug!(
        "Crown region starts at LBA {first_end} ({gap} sectors free)"
    );
    Ok(first_end)
}

#[cfg(test)]
mod tests {
    use super::locate_crown_region;
    use crate::device::fake::FakeDisk;
    use crate::error::CrownError;

    // Builds a disk whose partition table holds the given
    // (kind, start, sector count) records.
    fn disk_with_table(total_sectors: u64, records: &[(u8, u32, u32)]) -> FakeDisk {
        let mut disk = FakeDisk::new(total_sectors);
        let mut table = vec![0u8; 512];
        for (index, &(kind, start, count)) in records.iter().enumerate() {
            let base = 0x1BE + index * 16;
            table[base + 4] = kind;
            table[base + 8..base + 12].copy_from_slice(&start.to_le_bytes());
            table[base + 12..base + 16].copy_from_slice(&count.to_le_bytes());
        }
        table[510] = 0x55;
        table[511] = 0xAA;
        disk.set_sector(0, &table);
        disk
    }

    #[test]
    fn gpt_disk_is_rejected() {
        let mut disk = FakeDisk::new(0x10000);
        let mut header = vec![0u8; 512];
        header[..8].copy_from_slice(b"EFI PART");
        disk.set_sector(1, &header);
        // Sector 0 is all zero, which would also fail, but the GPT check
        // must win because it runs before the table is interpreted.
        assert!(matches!(
            locate_crown_region(&mut disk),
            Err(CrownError::GptNotSupported)
        ));
    }

    #[test]
    fn free_first_slot_is_rejected() {
        let mut disk = disk_with_table(0x10000, &[(0, 2048, 4096)]);
        assert!(matches!(
            locate_crown_region(&mut disk),
            Err(CrownError::FirstPartitionFree)
        ));
    }

    #[test]
    fn single_partition_with_room_at_end() {
        // Partition ends at sector 1000; exactly 0x801 sectors remain.
        let mut disk = disk_with_table(1000 + 0x801, &[(0x0C, 500, 500)]);
        assert_eq!(locate_crown_region(&mut disk).unwrap(), 1000);
    }

    #[test]
    fn single_partition_one_sector_short() {
        // Gap of exactly 0x800 sectors, one short of the requirement.
        let mut disk = disk_with_table(1000 + 0x800, &[(0x0C, 500, 500)]);
        assert!(matches!(
            locate_crown_region(&mut disk),
            Err(CrownError::InsufficientSpace)
        ));
    }

    #[test]
    fn partition_reaching_end_of_disk() {
        let mut disk = disk_with_table(4096, &[(0x0C, 2048, 2048)]);
        assert!(matches!(
            locate_crown_region(&mut disk),
            Err(CrownError::InsufficientSpace)
        ));
    }

    #[test]
    fn gap_between_two_partitions() {
        let mut disk = disk_with_table(
            0x10000,
            &[(0x0C, 2048, 2048), (0x0C, 4096 + 0x801, 2048)],
        );
        assert_eq!(locate_crown_region(&mut disk).unwrap(), 4096);
    }

    #[test]
    fn two_partitions_without_room() {
        let mut disk = disk_with_table(
            0x10000,
            &[(0x0C, 2048, 2048), (0x0C, 4096 + 0x800, 2048)],
        );
        assert!(matches!(
            locate_crown_region(&mut disk),
            Err(CrownError::InsufficientSpace)
        ));
    }

    #[test]
    fn extents_use_length_of_first_record() {
        // Behavioral parity with the stock tool: every collected extent
        // ends start + record 0's sector count, whatever the record's own
        // length field says.
        let mut table = vec![0u8; 512];
        for (index, &(kind, start, count)) in
            [(0x0Cu8, 2048u32, 2048u32), (0x0C, 8192, 0x10)].iter().enumerate()
        {
            let base = 0x1BE + index * 16;
            table[base + 4] = kind;
            table[base + 8..base + 12].copy_from_slice(&start.to_le_bytes());
            table[base + 12..base + 16].copy_from_slice(&count.to_le_bytes());
        }
        let extents = super::collect_extents(&table).unwrap();
        assert_eq!(extents, vec![(2048, 4096), (8192, 8192 + 2048)]);
    }

    #[test]
    fn free_middle_slot_is_skipped() {
        // Record 1 free, record 2 populated: the collected list compacts,
        // so the gap check runs against record 2.
        let mut disk = disk_with_table(
            0x10000,
            &[(0x0C, 2048, 2048), (0, 0, 0), (0x0C, 4096 + 0x800, 2048)],
        );
        assert!(matches!(
            locate_crown_region(&mut disk),
            Err(CrownError::InsufficientSpace)
        ));
    }

    #[test]
    fn short_table_read_is_an_io_error() {
        let mut disk = disk_with_table(0x10000, &[(0x0C, 500, 500)]);
        disk.truncate_reads_to(100);
        assert!(matches!(
            locate_crown_region(&mut disk),
            Err(CrownError::ShortRead { .. })
        ));
    }
}
