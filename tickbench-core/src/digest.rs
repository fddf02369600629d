//! Correctness Digest
//!
//! CRC-16/CCITT, polynomial 0x1021, fed most significant bit first.
//! Benchmarks accumulate this digest over their output and the verification
//! protocol compares it against a known answer for the dataset. The caller
//! chooses the initial value; both 0 and 0xFFFF conventions are in use.

/// Fold one byte into the digest.
pub fn update(crc: u16, byte: u8) -> u16 {
    let mut crc = crc ^ (u16::from(byte) << 8);
    for _ in 0..8 {
        crc = if crc & 0x8000 != 0 {
            (crc << 1) ^ 0x1021
        } else {
            crc << 1
        };
    }
    crc
}

/// Fold a byte slice into the digest.
pub fn buffer(crc: u16, bytes: &[u8]) -> u16 {
    bytes.iter().fold(crc, |crc, &byte| update(crc, byte))
}

/// Fold a 16-bit value into the digest, low byte first.
pub fn word(crc: u16, value: u16) -> u16 {
    let crc = update(crc, value as u8);
    update(crc, (value >> 8) as u8)
}
