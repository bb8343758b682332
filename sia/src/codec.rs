// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Schema-driven reading of a single tag and its payload.
//!
//! A [`Unit`] is one tag byte plus everything the tag's [`PayloadKind`] says follows it. Reading
//! a unit has no side effects besides advancing the reader, so a streaming decoder can retry the
//! same bytes once more input arrives.

use crate::decoder::DecodeError;
use crate::format::Reader;
use crate::tag::{PayloadKind, Tag};

/// Maximum number of address-width operands carried by any tag.
pub const MAX_OPERANDS: usize = 3;

/// Address-width operands of a unit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Operands {
    vals: [u64; MAX_OPERANDS],
    len: u8,
}

impl Operands {
    /// Returns the operands in wire order.
    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.vals[..usize::from(self.len)]
    }

    /// Returns operand `ix`, or `0` if absent.
    #[must_use]
    pub fn get(&self, ix: usize) -> u64 {
        self.as_slice().get(ix).copied().unwrap_or(0)
    }
}

/// Decoded payload of a unit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Payload<'a> {
    /// No payload.
    None,
    /// A fixed or counted unsigned integer.
    UInt(u64),
    /// A float.
    F64(f64),
    /// A UTF-8 string.
    Str(&'a str),
    /// Raw bytes.
    Bytes(&'a [u8]),
    /// An operand width.
    Width(u8),
    /// Address-width operands.
    Operands(Operands),
}

/// A tag with its payload.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Unit<'a> {
    /// The tag.
    pub tag: Tag,
    /// The payload.
    pub payload: Payload<'a>,
    /// Byte offset of the tag.
    pub offset: usize,
}

impl Unit<'_> {
    /// Returns the integer payload, or `0`.
    #[must_use]
    pub fn uint(&self) -> u64 {
        match self.payload {
            Payload::UInt(v) => v,
            _ => 0,
        }
    }

    /// Returns the operands (empty when the tag has none).
    #[must_use]
    pub fn operands(&self) -> Operands {
        match self.payload {
            Payload::Operands(ops) => ops,
            _ => Operands::default(),
        }
    }
}

fn is_str(tag: Tag) -> bool {
    matches!(tag, Tag::Str8 | Tag::Str16 | Tag::Str32 | Tag::Str64)
}

/// Reads one unit. `address_width` is the operand width currently in force.
pub fn read_unit<'a>(r: &mut Reader<'a>, address_width: u8) -> Result<Unit<'a>, DecodeError> {
    let offset = r.offset();
    let b = r.read_u8()?;
    let tag = Tag::from_u8(b).ok_or(DecodeError::UnsupportedType { tag: b })?;
    let payload = match tag.payload() {
        PayloadKind::None => Payload::None,
        PayloadKind::UInt(w) => Payload::UInt(r.read_uint_le(w)?),
        PayloadKind::UIntN => {
            let width = r.read_u8()?;
            if width > 8 {
                return Err(DecodeError::IntTooWide { bytes: width });
            }
            Payload::UInt(r.read_uint_le(width)?)
        }
        PayloadKind::F64 => Payload::F64(r.read_f64_le()?),
        PayloadKind::Len(w) => {
            let len = r.read_uint_le(w)?;
            if is_str(tag) {
                Payload::Str(r.read_str(len)?)
            } else {
                Payload::Bytes(r.read_bytes(len)?)
            }
        }
        PayloadKind::Width => {
            let width = r.read_u8()?;
            if !(1..=8).contains(&width) {
                return Err(DecodeError::BadAddressWidth { width });
            }
            Payload::Width(width)
        }
        PayloadKind::Operands => {
            let mut ops = Operands::default();
            for slot in ops.vals.iter_mut().take(tag.operand_roles().len()) {
                *slot = r.read_uint_le(address_width)?;
                ops.len += 1;
            }
            Payload::Operands(ops)
        }
    };
    Ok(Unit {
        tag,
        payload,
        offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FormatError;

    #[test]
    fn reads_operands_at_width() {
        let bytes = [Tag::Mul.byte(), 1, 0, 2, 0, 3, 0];
        let mut r = Reader::new(&bytes);
        let unit = read_unit(&mut r, 2).unwrap();
        assert_eq!(unit.tag, Tag::Mul);
        assert_eq!(unit.operands().as_slice(), &[1, 2, 3]);
        assert!(r.is_empty());
    }

    #[test]
    fn reads_strings_and_counted_ints() {
        let bytes = [Tag::Str8.byte(), 2, b'h', b'i', Tag::UIntN.byte(), 7, 1, 0, 0, 0, 0, 0, 1];
        let mut r = Reader::new(&bytes);
        assert_eq!(read_unit(&mut r, 1).unwrap().payload, Payload::Str("hi"));
        assert_eq!(read_unit(&mut r, 1).unwrap().uint(), (1 << 48) | 1);
    }

    #[test]
    fn truncated_units_report_eof() {
        let bytes = [Tag::UInt16.byte(), 1];
        let err = read_unit(&mut Reader::new(&bytes), 1).unwrap_err();
        assert_eq!(err, DecodeError::Format(FormatError::UnexpectedEof));
    }

    #[test]
    fn rejects_unknown_tags_and_widths() {
        assert_eq!(
            read_unit(&mut Reader::new(&[0x30]), 1),
            Err(DecodeError::UnsupportedType { tag: 0x30 })
        );
        assert_eq!(
            read_unit(&mut Reader::new(&[Tag::Address.byte(), 9]), 1),
            Err(DecodeError::BadAddressWidth { width: 9 })
        );
        assert_eq!(
            read_unit(&mut Reader::new(&[Tag::IntN.byte(), 9]), 1),
            Err(DecodeError::IntTooWide { bytes: 9 })
        );
    }
}
