//! Buffers are self-delimiting: the header at their start tells how many bytes follow. Reading a
//! frame therefore takes two steps, the fixed size header first and then exactly the announced
//! payload.

use paket::{Buffer, Header, HEADER_SIZE};
use std::io::{self, Read, Write};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Result, TransportError};

pub fn write_buffer<W: Write + ?Sized>(writer: &mut W, buffer: &Buffer) -> Result<()> {
    writer.write_all(buffer.as_bytes())?;
    writer.flush()?;
    debug!(tag = %buffer.tag(), size = buffer.size(), "sent frame");
    Ok(())
}

pub fn read_buffer<R: Read + ?Sized>(reader: &mut R, config: &Config) -> Result<Buffer> {
    let mut head = [0u8; HEADER_SIZE];
    match fill(reader, &mut head)? {
        0 => return Err(TransportError::Closed),
        HEADER_SIZE => {},
        _ => return Err(TransportError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "stream ended inside frame header"))),
    }
    let (header, _) = Header::decode(&head[..])?;
    if header.len as u64 > config.max_payload {
        warn!(tag = %header.tag, len = header.len, max = config.max_payload, "rejected oversized frame");
        return Err(TransportError::TooLarge { len: header.len, max: config.max_payload });
    }
    let buffer = Buffer::read_payload(&header, reader)?;
    debug!(tag = %buffer.tag(), size = buffer.size(), "received frame");
    Ok(buffer)
}

/// Reads until `buf` is full or the stream ends, returning how many bytes arrived.
fn fill<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut pos = 0;
    while pos < buf.len() {
        match reader.read(&mut buf[pos..]) {
            Ok(0) => break,
            Ok(n) => pos += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => return Err(e),
        }
    }
    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::{read_buffer, write_buffer};
    use crate::config::Config;
    use crate::error::TransportError;
    use paket::{encode, DecodeError, Record, WireTag, HEADER_SIZE};
    use std::io::{self, Cursor};

    #[test]
    fn frames_follow_each_other() {
        let mut record = Record::new();
        record.add("name", "Ana").unwrap();
        record.add("age", &30).unwrap();
        let first = record.to_buffer().unwrap();
        let second = encode(&vec![1, 2, 3]).unwrap();

        let mut wire = Vec::new();
        write_buffer(&mut wire, &first).unwrap();
        write_buffer(&mut wire, &second).unwrap();
        assert_eq!(first.size() + second.size(), wire.len());

        let mut reader = Cursor::new(wire);
        let config = Config::default();
        assert_eq!(first, read_buffer(&mut reader, &config).unwrap());
        assert_eq!(second, read_buffer(&mut reader, &config).unwrap());
        assert!(matches!(read_buffer(&mut reader, &config), Err(TransportError::Closed)));
    }

    #[test]
    fn truncated() {
        let bytes = encode("Ana").unwrap().into_bytes();
        let mut header_only = Cursor::new(bytes[..HEADER_SIZE - 1].to_vec());
        match read_buffer(&mut header_only, &Config::default()) {
            Err(TransportError::Io(e)) => assert_eq!(io::ErrorKind::UnexpectedEof, e.kind()),
            o => panic!("unexpected {:?}", o),
        }
        let mut short_payload = Cursor::new(bytes[..bytes.len() - 1].to_vec());
        match read_buffer(&mut short_payload, &Config::default()) {
            Err(TransportError::Io(e)) => assert_eq!(io::ErrorKind::UnexpectedEof, e.kind()),
            o => panic!("unexpected {:?}", o),
        }
    }

    #[test]
    fn oversized() {
        let bytes = encode(&vec![0u8; 100]).unwrap().into_bytes();
        let config = Config::default().with_max_payload(10);
        match read_buffer(&mut Cursor::new(bytes), &config) {
            Err(TransportError::TooLarge { max, .. }) => assert_eq!(10, max),
            o => panic!("unexpected {:?}", o),
        }
    }

    #[test]
    fn unknown_tag() {
        let mut bytes = encode(&1).unwrap().into_bytes();
        bytes[..4].copy_from_slice(&99u32.to_ne_bytes());
        assert!(matches!(
            read_buffer(&mut Cursor::new(bytes), &Config::default()),
            Err(TransportError::Decode(DecodeError::UnknownTag(99)))
        ));
    }

    #[test]
    fn empty_payload() {
        let pair = paket::Buffer::pack::<paket::Buffer>(&[], WireTag::Pair).unwrap();
        let mut wire = Vec::new();
        write_buffer(&mut wire, &pair).unwrap();
        assert_eq!(HEADER_SIZE, wire.len());
        assert_eq!(pair, read_buffer(&mut Cursor::new(wire), &Config::default()).unwrap());
    }
}
