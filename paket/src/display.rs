//! Human readable rendering of buffers. Every buffer is self-describing, so nothing but the
//! buffer itself is needed: scalars print as their tag and value, text as quoted strings,
//! sequences and pairs as bracketed lists and records as name-value blocks. Parts which fail to
//! decode are shown in angle brackets together with the error instead of aborting the output.

use crate::buffer::Buffer;
use crate::codec::{Decode, WideString};
use crate::error::DecodeError;
use crate::header::WireTag;
use crate::record::Record;
use std::fmt::{self, Display, Formatter};

/// Nesting level below which composites are no longer opened up.
const MAX_DISPLAY_DEPTH: usize = 64;

impl Display for Buffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Nested { buffer: self, depth: 0 }.fmt(f)
    }
}

/// A buffer together with the number of composites enclosing it.
struct Nested<'a> {
    buffer: &'a Buffer,
    depth: usize,
}

impl Nested<'_> {
    fn children<'a>(&self, children: &'a [Buffer]) -> impl Iterator<Item = String> + 'a {
        let depth = self.depth + 1;
        children.iter().map(move |buffer| Nested { buffer, depth }.to_string())
    }
}

impl Display for Nested<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let buffer = self.buffer;
        if buffer.is_empty() {
            return f.write_str("<empty>");
        }
        if buffer.tag().is_composite() && self.depth >= MAX_DISPLAY_DEPTH {
            return write!(f, "<{}: too deeply nested>", buffer.tag());
        }
        match buffer.tag() {
            WireTag::Bool       => scalar::<bool>(buffer, f),
            WireTag::Int        => scalar::<i32>(buffer, f),
            WireTag::Size       => scalar::<u64>(buffer, f),
            WireTag::Float      => scalar::<f32>(buffer, f),
            WireTag::Double     => scalar::<f64>(buffer, f),
            WireTag::Char       => match u8::decode(buffer) {
                Ok(c) => write!(f, "Char({:?})", c as char),
                Err(e) => invalid(buffer, e, f),
            },
            WireTag::WideChar   => match char::decode(buffer) {
                Ok(c) => write!(f, "WideChar({:?})", c),
                Err(e) => invalid(buffer, e, f),
            },
            WireTag::String     => match String::decode(buffer) {
                Ok(s) => write!(f, "{:?}", s),
                Err(e) => invalid(buffer, e, f),
            },
            WireTag::WideString => match WideString::decode(buffer) {
                Ok(s) => write!(f, "L{:?}", s.as_str()),
                Err(e) => invalid(buffer, e, f),
            },
            WireTag::Sequence   => match buffer.split() {
                Ok(children) => block(f, "[", "]", self.children(elements(&children))),
                Err(e) => invalid(buffer, e, f),
            },
            WireTag::Pair       => match buffer.split() {
                Ok(children) => block(f, "(", ")", self.children(&children)),
                Err(e) => invalid(buffer, e, f),
            },
            WireTag::Opaque     => match Record::from_buffer(buffer) {
                Ok(record) => {
                    let depth = self.depth + 1;
                    block(f, "{", "}", record.iter().map(|(k, buffer)| format!("{}: {}", key(k), Nested { buffer, depth })))
                },
                Err(_) => match buffer.split() {
                    Ok(children) => block(f, "Opaque[", "]", self.children(&children)),
                    Err(e) => invalid(buffer, e, f),
                },
            },
            WireTag::Map        => write!(f, "Map(<{} bytes>)", buffer.data().len()),
        }
    }
}

fn scalar<T: Decode + Display>(buffer: &Buffer, f: &mut Formatter<'_>) -> fmt::Result {
    match T::decode(buffer) {
        Ok(v) => write!(f, "{}({})", buffer.tag(), v),
        Err(e) => invalid(buffer, e, f),
    }
}

fn invalid(buffer: &Buffer, e: DecodeError, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "<{}: {}>", buffer.tag(), e)
}

/// Drops the leading size child of a well formed sequence.
fn elements(children: &[Buffer]) -> &[Buffer] {
    match children.split_first() {
        Some((count, rest)) if usize::decode(count).map_or(false, |c| c == rest.len()) => rest,
        _ => children,
    }
}

fn key(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        name.to_owned()
    } else {
        format!("{:?}", name)
    }
}

fn block<I: Iterator<Item = String>>(f: &mut Formatter<'_>, open: &str, close: &str, items: I) -> fmt::Result {
    let lines = items
        .flat_map(|item| format!("{},", item).lines().map(|line| format!("  {}", line)).collect::<Vec<String>>())
        .collect::<Vec<String>>();
    if lines.is_empty() {
        write!(f, "{}{}", open, close)
    } else {
        write!(f, "{}\n{}\n{}", open, lines.join("\n"), close)
    }
}

#[cfg(test)]
mod tests {
    use crate::buffer::Buffer;
    use crate::codec::{encode, WideString};
    use crate::header::{Header, WireTag, HEADER_SIZE};
    use crate::record::Record;
    use super::MAX_DISPLAY_DEPTH;

    #[test]
    fn scalars() {
        assert_eq!("Int(30)", encode(&30).unwrap().to_string());
        assert_eq!("Bool(true)", encode(&true).unwrap().to_string());
        assert_eq!("Size(3)", encode(&3usize).unwrap().to_string());
        assert_eq!("Char('a')", encode(&b'a').unwrap().to_string());
        assert_eq!("\"Ana\"", encode("Ana").unwrap().to_string());
        assert_eq!("L\"Ana\"", encode(&WideString::from("Ana")).unwrap().to_string());
        assert_eq!("<empty>", Buffer::default().to_string());
    }

    #[test]
    fn sequence() {
        assert_eq!("[\n  Int(1),\n  Int(2),\n]", encode(&vec![1, 2]).unwrap().to_string());
        assert_eq!("[]", encode(&Vec::<i32>::new()).unwrap().to_string());
    }

    #[test]
    fn record() {
        let mut record = Record::new();
        record.add("name", "Ana").unwrap();
        record.add("pair of words", &(1, 'x')).unwrap();
        assert_eq!(
            "{\n  name: \"Ana\",\n  \"pair of words\": (\n    Int(1),\n    WideChar('x'),\n  ),\n}",
            record.to_buffer().unwrap().to_string()
        );
    }

    #[test]
    fn deep_nesting() {
        let depth = 40_000;
        let mut bytes = Vec::with_capacity(depth * HEADER_SIZE);
        for level in 0..depth {
            Header::new(WireTag::Pair, (depth - 1 - level) * HEADER_SIZE).encode(&mut bytes).unwrap();
        }
        let rendered = Buffer::from_owned(bytes).unwrap().to_string();
        assert!(rendered.contains("<Pair: too deeply nested>"));
        assert_eq!(MAX_DISPLAY_DEPTH, rendered.matches('(').count());
    }

    #[test]
    fn invalid_parts() {
        let bad = Buffer::with_payload(WireTag::Int, &[1]).unwrap();
        let seq = Buffer::pack(&[encode(&1usize).unwrap(), bad], WireTag::Sequence).unwrap();
        assert_eq!("[\n  <Int: Int payload of 1 bytes, expected 4>,\n]", seq.to_string());
    }

}
