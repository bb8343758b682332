// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sia tag table.
//!
//! The table itself is generated from `tags.json` by `sia_codegen`; this module adds the width
//! selection helpers the encoder uses to pick the narrowest tag for a payload.

include!("tags_gen.rs");

impl Tag {
    /// Returns the tag's byte value.
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Returns the tag for a non-negative integer whose magnitude needs `width` bytes.
    ///
    /// Widths 7 and 8 use [`Tag::UIntN`].
    #[must_use]
    pub const fn uint_for_width(width: u8) -> Self {
        match width {
            0 | 1 => Self::UInt8,
            2 => Self::UInt16,
            3 => Self::UInt24,
            4 => Self::UInt32,
            5 => Self::UInt40,
            6 => Self::UInt48,
            _ => Self::UIntN,
        }
    }

    /// Returns the tag for a negative integer whose magnitude needs `width` bytes.
    #[must_use]
    pub const fn int_for_width(width: u8) -> Self {
        match width {
            0 | 1 => Self::Int8,
            2 => Self::Int16,
            3 => Self::Int24,
            4 => Self::Int32,
            5 => Self::Int40,
            6 => Self::Int48,
            _ => Self::IntN,
        }
    }

    /// Returns the backreference tag for a block index that needs `width` bytes.
    #[must_use]
    pub const fn ref_for_width(width: u8) -> Self {
        match width {
            0 | 1 => Self::Ref8,
            2 => Self::Ref16,
            3 => Self::Ref24,
            4 => Self::Ref32,
            5 => Self::Ref40,
            6 => Self::Ref48,
            _ => Self::RefN,
        }
    }

    /// Returns the string tag for a UTF-8 length of `len` bytes.
    #[must_use]
    pub const fn str_for_len(len: u64) -> Self {
        if len <= 0xFF {
            Self::Str8
        } else if len <= 0xFFFF {
            Self::Str16
        } else if len <= 0xFFFF_FFFF {
            Self::Str32
        } else {
            Self::Str64
        }
    }

    /// Returns the byte-string tag for `len` bytes, or `None` past `u32::MAX`.
    #[must_use]
    pub const fn bin_for_len(len: u64) -> Option<Self> {
        if len <= 0xFF {
            Some(Self::Bin8)
        } else if len <= 0xFFFF {
            Some(Self::Bin16)
        } else if len <= 0xFFFF_FFFF {
            Some(Self::Bin32)
        } else {
            None
        }
    }

    /// Returns the sized array-start tag for `len` elements, or `None` past `u32::MAX`.
    #[must_use]
    pub const fn array_for_len(len: u64) -> Option<Self> {
        if len <= 0xFF {
            Some(Self::Array8)
        } else if len <= 0xFFFF {
            Some(Self::Array16)
        } else if len <= 0xFFFF_FFFF {
            Some(Self::Array32)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_round_trips_for_all_tags() {
        for tag in ALL_TAGS {
            assert_eq!(Tag::from_u8(tag.byte()), Some(tag), "{}", tag.mnemonic());
        }
        let assigned = (0..=u8::MAX).filter(|b| Tag::from_u8(*b).is_some()).count();
        assert_eq!(assigned, TAG_COUNT);
    }

    #[test]
    fn operand_payloads_have_roles() {
        for tag in ALL_TAGS {
            let has_roles = !tag.operand_roles().is_empty();
            assert_eq!(
                has_roles,
                tag.payload() == PayloadKind::Operands,
                "{}",
                tag.mnemonic()
            );
        }
    }

    #[test]
    fn length_boundaries() {
        assert_eq!(Tag::str_for_len(0xFF), Tag::Str8);
        assert_eq!(Tag::str_for_len(0x100), Tag::Str16);
        assert_eq!(Tag::str_for_len(0x1_0000), Tag::Str32);
        assert_eq!(Tag::str_for_len(0x1_0000_0000), Tag::Str64);
        assert_eq!(Tag::array_for_len(0x1_0000), Some(Tag::Array32));
        assert_eq!(Tag::array_for_len(0x1_0000_0000), None);
        assert_eq!(Tag::bin_for_len(0x1_0000_0000), None);
    }

    #[test]
    fn integer_widths() {
        assert_eq!(Tag::uint_for_width(3), Tag::UInt24);
        assert_eq!(Tag::int_for_width(6), Tag::Int48);
        assert_eq!(Tag::uint_for_width(7), Tag::UIntN);
        assert_eq!(Tag::ref_for_width(8), Tag::RefN);
    }

    #[test]
    fn block_producers() {
        assert!(Tag::Str8.produces_block());
        assert!(Tag::ArrayEnd.produces_block());
        assert!(Tag::ProgramEnd.produces_block());
        assert!(!Tag::Ref8.produces_block());
        assert!(!Tag::ArrayStart.produces_block());
        assert!(!Tag::Address.produces_block());
    }
}
