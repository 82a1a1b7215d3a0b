use thiserror::Error;

/// The overarching error type for this crate.
#[derive(Error, Debug)]
pub enum CrownError {
    /// A register value was not valid hex.
    #[error("{register} register is not a valid hex string")]
    InvalidRegisterHex {
        /// Name of the offending register.
        register: &'static str,
        /// The underlying decode error.
        #[source]
        source: hex::FromHexError,
    },
    /// A buffer did not have the length the operation requires.
    #[error("{name} must be {expected} bytes in length, got {actual}")]
    WrongLength {
        /// What the buffer holds.
        name: &'static str,
        /// Required length in bytes.
        expected: usize,
        /// Length that was actually supplied.
        actual: usize,
    },
    /// The operation needs card registers, but none were supplied or read.
    #[error("This operation requires card registers to be available")]
    RegistersUnavailable,
    /// The card uses a GPT partition scheme, which Code Crowns never do.
    #[error("Cannot process GPT disks")]
    GptNotSupported,
    /// The first slot of the partition table is marked unused.
    #[error("First partition cannot be free")]
    FirstPartitionFree,
    /// No gap of 0x801 sectors after the first partition.
    #[error("Not enough space after the first partition for Code Crown data")]
    InsufficientSpace,
    /// The partition table sector could not be decoded.
    #[error("Malformed partition table")]
    MalformedPartitionTable(#[source] scroll::Error),
    /// A write buffer was too small for the requested sector count.
    #[error("Buffer of {available} bytes cannot supply {needed} bytes at offset {offset}")]
    BufferTooSmall {
        /// Bytes available in the buffer.
        available: usize,
        /// Bytes the sector write needs.
        needed: usize,
        /// Offset the caller asked to start from.
        offset: usize,
    },
    /// The device accepted fewer bytes than were handed to it.
    #[error("Short write to device: wrote {written} of {expected} bytes")]
    ShortWrite {
        /// Bytes the device reported as written.
        written: usize,
        /// Bytes that were supposed to be written.
        expected: usize,
    },
    /// The device returned fewer bytes than the operation requires.
    #[error("Short read from device: got {got} of {expected} bytes")]
    ShortRead {
        /// Bytes actually read.
        got: usize,
        /// Bytes required.
        expected: usize,
    },
    /// An operating system level I/O failure.
    #[error("Device I/O failed")]
    Io(#[from] std::io::Error),
    /// The platform has no way to report the card's identity registers.
    #[error("Cannot obtain CID, CSD, and SSR automatically on this platform")]
    RegistersNotReadable,
    /// No device backend exists for the current platform.
    #[error("Current platform is not supported")]
    UnsupportedPlatform,
}
