//! Security sector codec.
//!
//! The security sector is a 512-byte blob of random filler with a 19-byte
//! signature hidden at an offset derived from the card's CID. The signature
//! is a fixed magic string XORed with a reordered copy of the CID, followed
//! by three checksum bytes mixing in the CSD and a sum over part of the SSR.
//! The transform is a publicly derivable obfuscation, not cryptography.

use rand::RngCore;

use crate::crc::crc7;
use crate::error::CrownError;

/// Sector size of the medium, in bytes.
pub const SECTOR_LEN: usize = 512;
/// Length of the CID and CSD registers, in bytes.
pub const REGISTER_LEN: usize = 16;
/// Length of the SD status register, in bytes.
pub const SSR_LEN: usize = 64;

const MAGIC: &[u8; 16] = b"BGSASTNHOD01A02I";

/// Decodes a register value given as a hex string.
///
/// `register` names the register in the error when the string has odd
/// length or non-hex characters.
pub fn decode_register_hex(register: &'static str, s: &str) -> Result<Vec<u8>, CrownError> {
    hex::decode(s).map_err(|source| CrownError::InvalidRegisterHex { register, source })
}

// Reorders a CID or CSD into the order the algorithm consumes, recomputing
// the CRC-7 because some readers do not report the real trailing byte. The
// register's own checksum byte is dropped; the recomputed one goes first,
// with the end bit forced to mark it as locally derived. The remaining
// bytes follow reversed.
fn reorder(reg: &[u8; REGISTER_LEN]) -> [u8; REGISTER_LEN] {
    let mut out = [0u8; REGISTER_LEN];
    out[0] = crc7(0, &reg[..REGISTER_LEN - 1]) | 1;
    for i in 1..REGISTER_LEN {
        out[i] = reg[REGISTER_LEN - 1 - i];
    }
    out
}

fn check_length(
    name: &'static str,
    buf: &[u8],
    expected: usize,
) -> Result<(), CrownError> {
    if buf.len() != expected {
        return Err(CrownError::WrongLength {
            name,
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

fn converted_registers(
    cid: &[u8],
    csd: &[u8],
    ssr: &[u8],
) -> Result<([u8; REGISTER_LEN], [u8; REGISTER_LEN]), CrownError> {
    check_length("CID", cid, REGISTER_LEN)?;
    check_length("CSD", csd, REGISTER_LEN)?;
    check_length("SSR", ssr, SSR_LEN)?;

    // Lengths were just checked, so these conversions cannot fail.
    let mut cid_buf = [0u8; REGISTER_LEN];
    cid_buf.copy_from_slice(cid);
    let mut csd_buf = [0u8; REGISTER_LEN];
    csd_buf.copy_from_slice(csd);

    Ok((reorder(&cid_buf), reorder(&csd_buf)))
}

fn ssr_sum(ssr: &[u8]) -> u16 {
    ssr[2..14]
        .iter()
        .fold(0u16, |sum, &b| sum.wrapping_add(u16::from(b)))
}

/// Generates a security sector for the given card registers.
///
/// `cid` and `csd` must be 16 bytes, `ssr` 64 bytes, all in most
/// significant byte order. Everything outside the embedded signature is
/// random filler, so two calls with the same registers produce different
/// sectors that both validate.
pub fn generate(cid: &[u8], csd: &[u8], ssr: &[u8]) -> Result<[u8; SECTOR_LEN], CrownError> {
    let (cid, csd) = converted_registers(cid, csd, ssr)?;

    let mut blob = [0u8; SECTOR_LEN];
    rand::thread_rng().fill_bytes(&mut blob);

    // The offset is a byte value, so at most 255; the signature needs
    // 0x13 bytes past it and always fits in the sector.
    let offset = usize::from(cid[0]);
    for (i, &m) in MAGIC.iter().enumerate() {
        blob[offset + i] = m ^ cid[i];
    }

    let sum = ssr_sum(ssr);
    blob[offset + 0x10] = (sum as u8) ^ cid[0];
    blob[offset + 0x11] = ((sum >> 8) as u8) ^ csd[0];
    blob[offset + 0x12] = cid[0] ^ csd[0];

    Ok(blob)
}

/// Checks whether `blob` is a security sector generated for the given
/// registers.
///
/// A wrong length on any input is an error rather than a `false` result;
/// only signature mismatches report `false`.
pub fn validate(blob: &[u8], cid: &[u8], csd: &[u8], ssr: &[u8]) -> Result<bool, CrownError> {
    check_length("Security sector", blob, SECTOR_LEN)?;
    let (cid, csd) = converted_registers(cid, csd, ssr)?;

    let offset = usize::from(cid[0]);
    for (i, &m) in MAGIC.iter().enumerate() {
        if blob[offset + i] != m ^ cid[i] {
            return Ok(false);
        }
    }

    if blob[offset + 0x12] != cid[0] ^ csd[0] {
        return Ok(false);
    }

    let sum = ssr_sum(ssr);
    Ok(blob[offset + 0x10] == (sum as u8) ^ cid[0]
        && blob[offset + 0x11] == ((sum >> 8) as u8) ^ csd[0])
}
