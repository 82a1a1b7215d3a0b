//! Extracting quest data embedded in downloader executables.
//!
//! The quest file ships inside the DCC Special Quest Downloader as a plain
//! byte region at a fixed offset. Recognized downloader builds are keyed by
//! the SHA-256 of the whole file; an unknown digest is a negative result,
//! not an error.

use std::io::{Read, Seek, SeekFrom};

use sha2::{Digest, Sha256};

use crate::crown::PAYLOAD_LEN;
use crate::error::CrownError;

/// Known downloader digests (lowercase hex SHA-256 of the whole file) and
/// the byte offset of the embedded quest file.
const QUEST_OFFSETS: &[(&str, u64)] = &[
    // DCC Special Quest 02
    (
        "26fe8ed953f2f1e47c9bd366d6a52079c39a2d96973454368813d08cbaa354a7",
        0x3B648,
    ),
];

/// Extracts the quest file from a recognized downloader.
///
/// Hashes the entire stream, then reads exactly 1 MiB from the offset the
/// digest maps to. Returns `Ok(None)` when the downloader build is not
/// recognized.
pub fn extract<R: Read + Seek>(reader: R) -> Result<Option<Vec<u8>>, CrownError> {
    extract_with_table(reader, QUEST_OFFSETS)
}

fn extract_with_table<R: Read + Seek>(
    mut reader: R,
    table: &[(&str, u64)],
) -> Result<Option<Vec<u8>>, CrownError> {
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher)?;
    let digest = hex::encode(hasher.finalize());

    let Some(&(_, offset)) = table.iter().find(|&&(known, _)| known == digest) else {
        tracing::debug!("No quest data offset known for digest {digest}");
        return Ok(None);
    };

    tracing::debug!("Recognized downloader, quest data at offset {offset:#x}");
    reader.seek(SeekFrom::Start(offset))?;
    let mut data = vec![0u8; PAYLOAD_LEN];
    reader.read_exact(&mut data)?;
    Ok(Some(data))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use sha2::{Digest, Sha256};

    use super::{extract, extract_with_table};
    use crate::crown::PAYLOAD_LEN;

    #[test]
    fn unknown_digest_is_not_found() {
        let result = extract(Cursor::new(b"not a downloader".to_vec())).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn known_digest_extracts_from_offset() {
        const OFFSET: usize = 64;
        let mut file = vec![0u8; OFFSET + PAYLOAD_LEN + 100];
        for (i, b) in file.iter_mut().enumerate() {
            *b = i as u8;
        }

        let digest = hex::encode(Sha256::digest(&file));
        let table = [(digest.as_str(), OFFSET as u64)];
        let expected = file[OFFSET..OFFSET + PAYLOAD_LEN].to_vec();

        let data = extract_with_table(Cursor::new(file), &table)
            .unwrap()
            .expect("digest should be recognized");
        assert_eq!(data.len(), PAYLOAD_LEN);
        assert_eq!(data, expected);
    }

    #[test]
    fn truncated_recognized_file_is_an_error() {
        // Digest matches, but the file is too short for a full read at the
        // mapped offset.
        let file = vec![0xABu8; 1000];
        let digest = hex::encode(Sha256::digest(&file));
        let table = [(digest.as_str(), 500u64)];
        assert!(extract_with_table(Cursor::new(file), &table).is_err());
    }
}
