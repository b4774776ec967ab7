//! Fixed-width scalar encodings.
//!
//! | type         | width   | layout                                          |
//! |--------------|---------|-------------------------------------------------|
//! | `int`        | 4       | big-endian two's complement                     |
//! | `float`      | 4       | big-endian IEEE-754 single precision            |
//! | `char(n)`    | `n`     | UTF-8 bytes cut at `n`, zero padded             |
//! | `varchar(n)` | `1 + n` | length byte, then `n` content bytes zero padded |
//!
//! Truncation is by byte and may split a multi-byte code point. On decode a
//! dangling partial code point at the end of the content is dropped; any other
//! invalid UTF-8 is a format error.

use bytes::BufMut;
use stratum_common::{Result, StratumError};

/// Encoded width of an int.
pub const INT_WIDTH: usize = 4;

/// Encoded width of a float.
pub const FLOAT_WIDTH: usize = 4;

/// Largest content length a varchar length byte can express.
pub const VARCHAR_MAX_CONTENT: usize = u8::MAX as usize;

/// Writes a 4-byte big-endian int.
pub fn put_int<B: BufMut>(buf: &mut B, value: i32) {
    buf.put_i32(value);
}

/// Writes a 4-byte big-endian float.
pub fn put_float<B: BufMut>(buf: &mut B, value: f32) {
    buf.put_f32(value);
}

/// Writes exactly `width` bytes: the string's UTF-8 cut at `width`, then zeros.
pub fn put_char<B: BufMut>(buf: &mut B, value: &str, width: usize) {
    let bytes = value.as_bytes();
    let len = bytes.len().min(width);
    buf.put_slice(&bytes[..len]);
    buf.put_bytes(0, width - len);
}

/// Writes exactly `1 + width` bytes: a length byte, the content, then zeros.
///
/// Content is cut first to `width`, then to 255 bytes.
pub fn put_varchar<B: BufMut>(buf: &mut B, value: &str, width: usize) {
    let bytes = value.as_bytes();
    let len = bytes.len().min(width).min(VARCHAR_MAX_CONTENT);
    buf.put_u8(len as u8);
    buf.put_slice(&bytes[..len]);
    buf.put_bytes(0, width - len);
}

/// Encodes an int.
pub fn pack_int(value: i32) -> [u8; INT_WIDTH] {
    value.to_be_bytes()
}

/// Encodes a float.
pub fn pack_float(value: f32) -> [u8; FLOAT_WIDTH] {
    value.to_be_bytes()
}

/// Encodes a `char(width)` value.
pub fn pack_char(value: &str, width: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(width);
    put_char(&mut buf, value, width);
    buf
}

/// Encodes a `varchar(width)` value.
pub fn pack_varchar(value: &str, width: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + width);
    put_varchar(&mut buf, value, width);
    buf
}

fn exact_width<const N: usize>(data: &[u8], type_name: &str) -> Result<[u8; N]> {
    data.try_into().map_err(|_| {
        StratumError::Format(format!(
            "expected {} bytes for {}, got {}",
            N,
            type_name,
            data.len()
        ))
    })
}

/// Decodes an int; the input must be exactly 4 bytes.
pub fn unpack_int(data: &[u8]) -> Result<i32> {
    Ok(i32::from_be_bytes(exact_width(data, "int")?))
}

/// Decodes a float; the input must be exactly 4 bytes.
pub fn unpack_float(data: &[u8]) -> Result<f32> {
    Ok(f32::from_be_bytes(exact_width(data, "float")?))
}

/// Decodes a `char(n)` value: trailing zero bytes are stripped.
pub fn unpack_char(data: &[u8]) -> Result<String> {
    let end = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    decode_utf8(&data[..end])
}

/// Decodes a `varchar(n)` value.
///
/// An empty input yields an empty string; a content run cut short by the end
/// of the input yields whatever bytes are present.
pub fn unpack_varchar(data: &[u8]) -> Result<String> {
    let Some((&len, content)) = data.split_first() else {
        return Ok(String::new());
    };
    let len = (len as usize).min(content.len());
    decode_utf8(&content[..len])
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_owned()),
        // incomplete sequence at the very end: left by byte truncation
        Err(e) if e.error_len().is_none() => {
            Ok(String::from_utf8_lossy(&bytes[..e.valid_up_to()]).into_owned())
        }
        Err(e) => Err(StratumError::Format(format!("invalid UTF-8: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_encoding() {
        assert_eq!(pack_int(1), [0, 0, 0, 1]);
        assert_eq!(pack_int(-2), [0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(unpack_int(&pack_int(i32::MIN)).unwrap(), i32::MIN);
        assert_eq!(unpack_int(&pack_int(-42)).unwrap(), -42);
    }

    #[test]
    fn test_int_wrong_width() {
        assert!(matches!(unpack_int(&[0, 1]), Err(StratumError::Format(_))));
        assert!(matches!(unpack_int(&[0; 5]), Err(StratumError::Format(_))));
        assert!(matches!(unpack_int(&[]), Err(StratumError::Format(_))));
    }

    #[test]
    fn test_float_encoding() {
        assert_eq!(pack_float(1.0), [0x3F, 0x80, 0x00, 0x00]);
        assert_eq!(unpack_float(&pack_float(0.0)).unwrap(), 0.0);
        assert_eq!(unpack_float(&pack_float(4500.0)).unwrap(), 4500.0);
        assert_eq!(unpack_float(&pack_float(-3800.5)).unwrap(), -3800.5);
        assert!(matches!(unpack_float(&[1, 2, 3]), Err(StratumError::Format(_))));
    }

    #[test]
    fn test_char_padding_and_truncation() {
        assert_eq!(pack_char("Bob", 5), b"Bob\0\0".to_vec());
        assert_eq!(pack_char("", 3), vec![0, 0, 0]);
        assert_eq!(pack_char("abcdef", 4), b"abcd".to_vec());
        assert_eq!(pack_char("abcd", 4), b"abcd".to_vec());

        assert_eq!(unpack_char(b"Bob\0\0").unwrap(), "Bob");
        assert_eq!(unpack_char(&[0, 0, 0]).unwrap(), "");
        assert_eq!(unpack_char(b"abcd").unwrap(), "abcd");
    }

    #[test]
    fn test_char_truncation_is_exact_at_width() {
        let value = "x".repeat(20);
        let packed = pack_char(&value, 20);
        assert_eq!(unpack_char(&packed).unwrap(), value);

        let longer = "y".repeat(21);
        let packed = pack_char(&longer, 20);
        assert_eq!(packed.len(), 20);
        assert_eq!(unpack_char(&packed).unwrap(), "y".repeat(20));
    }

    #[test]
    fn test_char_split_code_point() {
        // "é" is two bytes; cutting at 2 leaves "a" plus half of "é"
        let packed = pack_char("aé", 2);
        assert_eq!(packed, vec![b'a', 0xC3]);
        assert_eq!(unpack_char(&packed).unwrap(), "a");
    }

    #[test]
    fn test_varchar_split_code_point() {
        // "ü€" is 2 + 3 bytes; a width of 4 keeps "ü" and two bytes of "€"
        let packed = pack_varchar("ü€", 4);
        assert_eq!(packed[0], 4);
        assert_eq!(unpack_varchar(&packed).unwrap(), "ü");
    }

    #[test]
    fn test_char_invalid_utf8() {
        assert!(matches!(
            unpack_char(&[0xFF, b'a']),
            Err(StratumError::Format(_))
        ));
    }

    #[test]
    fn test_varchar_layout() {
        let packed = pack_varchar("Oran", 8);
        assert_eq!(packed.len(), 9);
        assert_eq!(packed[0], 4);
        assert_eq!(&packed[1..5], b"Oran");
        assert_eq!(&packed[5..], &[0, 0, 0, 0]);
        assert_eq!(unpack_varchar(&packed).unwrap(), "Oran");
    }

    #[test]
    fn test_varchar_empty_and_full() {
        let packed = pack_varchar("", 3);
        assert_eq!(packed, vec![0, 0, 0, 0]);
        assert_eq!(unpack_varchar(&packed).unwrap(), "");

        let packed = pack_varchar("abc", 3);
        assert_eq!(packed, vec![3, b'a', b'b', b'c']);
        assert_eq!(unpack_varchar(&packed).unwrap(), "abc");

        let packed = pack_varchar("abcd", 3);
        assert_eq!(packed, vec![3, b'a', b'b', b'c']);
    }

    #[test]
    fn test_varchar_double_truncation() {
        let value = "z".repeat(400);
        let packed = pack_varchar(&value, 300);
        assert_eq!(packed.len(), 301);
        assert_eq!(packed[0], 255);
        assert!(packed[256..].iter().all(|&b| b == 0));
        assert_eq!(unpack_varchar(&packed).unwrap(), "z".repeat(255));
    }

    #[test]
    fn test_varchar_truncated_input() {
        assert_eq!(unpack_varchar(&[]).unwrap(), "");
        // length byte says 5 but only 2 content bytes survive
        assert_eq!(unpack_varchar(&[5, b'h', b'i']).unwrap(), "hi");
    }

    #[test]
    fn test_put_into_shared_buffer() {
        let mut buf = Vec::new();
        put_int(&mut buf, 7);
        put_float(&mut buf, 2.5);
        put_char(&mut buf, "ab", 3);
        put_varchar(&mut buf, "c", 2);
        assert_eq!(buf.len(), 4 + 4 + 3 + 3);
        assert_eq!(&buf[0..4], &pack_int(7));
        assert_eq!(&buf[4..8], &pack_float(2.5));
        assert_eq!(&buf[8..11], b"ab\0");
        assert_eq!(&buf[11..14], &[1, b'c', 0]);
    }
}
