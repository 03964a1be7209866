use crate::configuration::types::Encoding;

/// Lowercase hexadecimal, two digits per byte.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Renders every byte as the character with the same code point.
pub fn bytes_to_ascii(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

pub fn encode(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Hex => bytes_to_hex(bytes),
        Encoding::Ascii => bytes_to_ascii(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_and_zero_padded() {
        assert_eq!(bytes_to_hex(&[0x00, 0x01, 0xFF]), "0001ff");
        assert_eq!(encode(&[0xDE, 0xAD, 0x0B], Encoding::Hex), "dead0b");
    }

    #[test]
    fn ascii_is_raw_characters() {
        assert_eq!(bytes_to_ascii(b"GET / HTTP/1.1\r\n"), "GET / HTTP/1.1\r\n");
        assert_eq!(encode(&[0x00, 0x01, 0xFF], Encoding::Ascii), "\u{0}\u{1}\u{ff}");
        assert_eq!(bytes_to_ascii(&[0x00, 0x01, 0xFF]).chars().count(), 3);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(encode(&[], Encoding::Hex), "");
        assert_eq!(encode(&[], Encoding::Ascii), "");
    }
}
