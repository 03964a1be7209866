use super::types::{Payload, RawChunk};

/// Trims the read buffer down to the bytes populated by the last read.
///
/// Returns `None` when the chunk carries no data (negative count). Otherwise
/// the first `count` bytes are copied into a fresh [`Payload`]; the buffer
/// itself is reused by the next read and is never aliased. A count larger
/// than the buffer is clamped to its length.
pub fn reduce(chunk: RawChunk<'_>) -> Option<Payload> {
    let count = usize::try_from(chunk.count).ok()?;
    let len = count.min(chunk.buffer.len());
    Some(Payload::new(chunk.buffer[..len].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_capture::types::NO_DATA;

    #[test]
    fn payload_is_exact_prefix_for_every_count() {
        for size in 1..=32usize {
            let buffer: Vec<u8> = (0..size).map(|i| (i * 7 + 3) as u8).collect();
            for count in 0..=size {
                let payload = reduce(RawChunk::new(&buffer, count as isize)).unwrap();
                assert_eq!(payload.len(), count, "size {} count {}", size, count);
                assert_eq!(payload.as_bytes(), &buffer[..count]);
            }
        }
    }

    #[test]
    fn bytes_past_count_do_not_matter() {
        let mut a = [0xAAu8; 16];
        let mut b = [0x55u8; 16];
        a[..4].copy_from_slice(b"ping");
        b[..4].copy_from_slice(b"ping");

        assert_eq!(reduce(RawChunk::new(&a, 4)), reduce(RawChunk::new(&b, 4)));
    }

    #[test]
    fn negative_count_is_no_data() {
        let buffer = [1u8; 8];
        assert!(reduce(RawChunk::new(&buffer, NO_DATA)).is_none());
        assert!(reduce(RawChunk::new(&buffer, -42)).is_none());
    }

    #[test]
    fn zero_count_is_an_empty_payload() {
        let buffer = [9u8; 8];
        let payload = reduce(RawChunk::new(&buffer, 0)).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn payload_does_not_alias_the_buffer() {
        let mut buffer = *b"first read";
        let payload = reduce(RawChunk::new(&buffer, 5)).unwrap();

        buffer.copy_from_slice(b"second one");

        assert_eq!(payload.as_bytes(), b"first");
    }

    #[test]
    fn oversized_count_is_clamped() {
        let buffer = [7u8; 4];
        assert_eq!(reduce(RawChunk::new(&buffer, 10)).unwrap().len(), 4);
    }
}
