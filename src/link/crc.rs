//! # CRC-8/SMBUS Implementation
//!
//! Checksum protecting dongle link frames.
//!
//! **Polynomial**: 0x07 (x^8 + x^2 + x + 1)
//! **Initial Value**: 0x00
//! **Check** (`"123456789"`): 0xF4

/// CRC-8/SMBUS polynomial
const CRC8_POLY: u8 = 0x07;

/// Lookup table, one entry per possible byte
const CRC8_TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;

        while bit < 8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ CRC8_POLY } else { crc << 1 };
            bit += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the link checksum over `data` (LEN + TYPE + BODY)
///
/// # Examples
///
/// ```
/// use biospider_panel::link::crc::crc8;
///
/// assert_eq!(crc8(b"123456789"), 0xF4);
/// ```
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |crc, &byte| CRC8_TABLE[(crc ^ byte) as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bit-by-bit reference used to cross-check the table
    fn crc8_bitwise(data: &[u8]) -> u8 {
        let mut crc = 0u8;
        for &byte in data {
            crc ^= byte;
            for _ in 0..8 {
                crc = if crc & 0x80 != 0 { (crc << 1) ^ CRC8_POLY } else { crc << 1 };
            }
        }
        crc
    }

    #[test]
    fn test_crc8_check_value() {
        assert_eq!(crc8(b"123456789"), 0xF4);
    }

    #[test]
    fn test_crc8_empty() {
        assert_eq!(crc8(&[]), 0x00);
    }

    #[test]
    fn test_table_matches_bitwise() {
        let samples: [&[u8]; 5] = [
            &[0x01, 0x02, 0x03],
            &[0xFF, 0xFE, 0xFD],
            &[0x0B, 0x00, 0x02, b'P', b'I', b'N', b'G'],
            &[0x00; 24],
            &[0xFF; 10],
        ];
        for data in samples {
            assert_eq!(crc8(data), crc8_bitwise(data), "mismatch for {:02X?}", data);
        }
    }

    #[test]
    fn test_crc8_detects_single_bit_flip() {
        let data = [0x0A, 0x00, 0x01, 0xC9];
        let mut flipped = data;
        flipped[3] ^= 0x01;
        assert_ne!(crc8(&data), crc8(&flipped));
    }
}
