// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// @generated by sia_codegen. Do not edit by hand.

/// Tag families sharing the one-byte tag space.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TagFamily {
    /// Primitives, containers and constructor calls.
    Data,
    /// Program structure and instructions.
    Program,
    /// Address width and end-of-stream.
    Control,
}

/// Payload layout following a tag byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    /// No payload.
    None,
    /// Little-endian unsigned integer of a fixed byte width.
    UInt(u8),
    /// A `u8` byte count, then a little-endian unsigned integer of that width.
    UIntN,
    /// 8-byte little-endian IEEE754 double.
    F64,
    /// Little-endian length of a fixed byte width, then that many bytes.
    Len(u8),
    /// A single `u8` operand width.
    Width,
    /// Operands at the current address width, see [`Tag::operand_roles`].
    Operands,
}

/// Roles of address-width operands.
#[allow(missing_docs, reason = "generated")]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperandRole {
    Dst,
    Src,
    Lhs,
    Rhs,
    Test,
    Block,
    Target,
    Code,
    Args,
}

/// One-byte Sia tags.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// The `null` value.
    Null = 0x00,
    /// The `undefined` value.
    Undefined = 0x01,
    /// Non-negative integer, 1-byte little-endian magnitude.
    UInt8 = 0x02,
    /// Non-negative integer, 2-byte little-endian magnitude.
    UInt16 = 0x03,
    /// Non-negative integer, 3-byte little-endian magnitude.
    UInt24 = 0x04,
    /// Non-negative integer, 4-byte little-endian magnitude.
    UInt32 = 0x05,
    /// Non-negative integer, 5-byte little-endian magnitude.
    UInt40 = 0x06,
    /// Non-negative integer, 6-byte little-endian magnitude.
    UInt48 = 0x07,
    /// Non-negative integer, byte-count-prefixed little-endian magnitude.
    UIntN = 0x08,
    /// Negative integer, 1-byte little-endian magnitude.
    Int8 = 0x09,
    /// Negative integer, 2-byte little-endian magnitude.
    Int16 = 0x0A,
    /// Negative integer, 3-byte little-endian magnitude.
    Int24 = 0x0B,
    /// Negative integer, 4-byte little-endian magnitude.
    Int32 = 0x0C,
    /// Negative integer, 5-byte little-endian magnitude.
    Int40 = 0x0D,
    /// Negative integer, 6-byte little-endian magnitude.
    Int48 = 0x0E,
    /// Negative integer, byte-count-prefixed little-endian magnitude.
    IntN = 0x0F,
    /// IEEE754 double, 8 bytes little-endian.
    Float64 = 0x10,
    /// UTF-8 string with a 1-byte length prefix.
    Str8 = 0x11,
    /// UTF-8 string with a 2-byte length prefix.
    Str16 = 0x12,
    /// UTF-8 string with a 4-byte length prefix.
    Str32 = 0x13,
    /// UTF-8 string with a 8-byte length prefix.
    Str64 = 0x14,
    /// Byte string with a 1-byte length prefix.
    Bin8 = 0x15,
    /// Byte string with a 2-byte length prefix.
    Bin16 = 0x16,
    /// Byte string with a 4-byte length prefix.
    Bin32 = 0x17,
    /// Backreference to a block, 1-byte little-endian index.
    Ref8 = 0x18,
    /// Backreference to a block, 2-byte little-endian index.
    Ref16 = 0x19,
    /// Backreference to a block, 3-byte little-endian index.
    Ref24 = 0x1A,
    /// Backreference to a block, 4-byte little-endian index.
    Ref32 = 0x1B,
    /// Backreference to a block, 5-byte little-endian index.
    Ref40 = 0x1C,
    /// Backreference to a block, 6-byte little-endian index.
    Ref48 = 0x1D,
    /// Backreference to a block, byte-count-prefixed little-endian index.
    RefN = 0x1E,
    /// The `true` value.
    True = 0x1F,
    /// The `false` value.
    False = 0x20,
    /// Opens an array of undeclared length.
    ArrayStart = 0x21,
    /// Opens an array with a 1-byte declared length.
    Array8 = 0x22,
    /// Opens an array with a 2-byte declared length.
    Array16 = 0x23,
    /// Opens an array with a 4-byte declared length.
    Array32 = 0x24,
    /// Pushes a block into the innermost array; a push instruction inside a program.
    ArrayPush = 0x25,
    /// Closes the innermost array.
    ArrayEnd = 0x26,
    /// Opens an object.
    ObjectStart = 0x27,
    /// Pushes a block into the innermost object as the next key or value.
    ObjectPush = 0x28,
    /// Closes the innermost object.
    ObjectEnd = 0x29,
    /// Builds a registered custom value from a code block and an argument array block.
    Constructor = 0x2A,
    /// Opens a program.
    ProgramStart = 0x40,
    /// Closes the outermost program and runs it.
    ProgramEnd = 0x41,
    /// Opens a conditional: condition instructions, `test`, body instructions.
    If = 0x42,
    /// Closes a conditional.
    EndIf = 0x43,
    /// Opens a loop: condition instructions, `test`, body instructions.
    While = 0x44,
    /// Closes a loop.
    EndWhile = 0x45,
    /// Ends the condition of the innermost `if`/`while` and names its boolean register.
    Test = 0x46,
    /// Loads a block value into a register.
    Slot = 0x47,
    /// Copies a register.
    Mov = 0x48,
    /// Writes `lhs > rhs` to `dst`.
    IsBigger = 0x49,
    /// Adds `src` to `dst` in place.
    AddTo = 0x4A,
    /// Writes `lhs * rhs` to `dst`.
    Mul = 0x4B,
    /// Writes `sin(src)` to `dst`.
    Sin = 0x4C,
    /// Continues at a top-level instruction index.
    Jump = 0x4D,
    /// Stops the running program.
    Exit = 0x4E,
    /// Declares the byte width of subsequent operands.
    Address = 0xFE,
    /// End-of-stream sentinel.
    End = 0xFF,
}

/// Number of assigned tags.
pub const TAG_COUNT: usize = 60;

/// All assigned tags in byte order.
pub const ALL_TAGS: [Tag; TAG_COUNT] = [
    Tag::Null,
    Tag::Undefined,
    Tag::UInt8,
    Tag::UInt16,
    Tag::UInt24,
    Tag::UInt32,
    Tag::UInt40,
    Tag::UInt48,
    Tag::UIntN,
    Tag::Int8,
    Tag::Int16,
    Tag::Int24,
    Tag::Int32,
    Tag::Int40,
    Tag::Int48,
    Tag::IntN,
    Tag::Float64,
    Tag::Str8,
    Tag::Str16,
    Tag::Str32,
    Tag::Str64,
    Tag::Bin8,
    Tag::Bin16,
    Tag::Bin32,
    Tag::Ref8,
    Tag::Ref16,
    Tag::Ref24,
    Tag::Ref32,
    Tag::Ref40,
    Tag::Ref48,
    Tag::RefN,
    Tag::True,
    Tag::False,
    Tag::ArrayStart,
    Tag::Array8,
    Tag::Array16,
    Tag::Array32,
    Tag::ArrayPush,
    Tag::ArrayEnd,
    Tag::ObjectStart,
    Tag::ObjectPush,
    Tag::ObjectEnd,
    Tag::Constructor,
    Tag::ProgramStart,
    Tag::ProgramEnd,
    Tag::If,
    Tag::EndIf,
    Tag::While,
    Tag::EndWhile,
    Tag::Test,
    Tag::Slot,
    Tag::Mov,
    Tag::IsBigger,
    Tag::AddTo,
    Tag::Mul,
    Tag::Sin,
    Tag::Jump,
    Tag::Exit,
    Tag::Address,
    Tag::End,
];

impl Tag {
    /// Parses a tag from its byte value.
    #[must_use]
    pub const fn from_u8(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(Self::Null),
            0x01 => Some(Self::Undefined),
            0x02 => Some(Self::UInt8),
            0x03 => Some(Self::UInt16),
            0x04 => Some(Self::UInt24),
            0x05 => Some(Self::UInt32),
            0x06 => Some(Self::UInt40),
            0x07 => Some(Self::UInt48),
            0x08 => Some(Self::UIntN),
            0x09 => Some(Self::Int8),
            0x0A => Some(Self::Int16),
            0x0B => Some(Self::Int24),
            0x0C => Some(Self::Int32),
            0x0D => Some(Self::Int40),
            0x0E => Some(Self::Int48),
            0x0F => Some(Self::IntN),
            0x10 => Some(Self::Float64),
            0x11 => Some(Self::Str8),
            0x12 => Some(Self::Str16),
            0x13 => Some(Self::Str32),
            0x14 => Some(Self::Str64),
            0x15 => Some(Self::Bin8),
            0x16 => Some(Self::Bin16),
            0x17 => Some(Self::Bin32),
            0x18 => Some(Self::Ref8),
            0x19 => Some(Self::Ref16),
            0x1A => Some(Self::Ref24),
            0x1B => Some(Self::Ref32),
            0x1C => Some(Self::Ref40),
            0x1D => Some(Self::Ref48),
            0x1E => Some(Self::RefN),
            0x1F => Some(Self::True),
            0x20 => Some(Self::False),
            0x21 => Some(Self::ArrayStart),
            0x22 => Some(Self::Array8),
            0x23 => Some(Self::Array16),
            0x24 => Some(Self::Array32),
            0x25 => Some(Self::ArrayPush),
            0x26 => Some(Self::ArrayEnd),
            0x27 => Some(Self::ObjectStart),
            0x28 => Some(Self::ObjectPush),
            0x29 => Some(Self::ObjectEnd),
            0x2A => Some(Self::Constructor),
            0x40 => Some(Self::ProgramStart),
            0x41 => Some(Self::ProgramEnd),
            0x42 => Some(Self::If),
            0x43 => Some(Self::EndIf),
            0x44 => Some(Self::While),
            0x45 => Some(Self::EndWhile),
            0x46 => Some(Self::Test),
            0x47 => Some(Self::Slot),
            0x48 => Some(Self::Mov),
            0x49 => Some(Self::IsBigger),
            0x4A => Some(Self::AddTo),
            0x4B => Some(Self::Mul),
            0x4C => Some(Self::Sin),
            0x4D => Some(Self::Jump),
            0x4E => Some(Self::Exit),
            0xFE => Some(Self::Address),
            0xFF => Some(Self::End),
            _ => None,
        }
    }

    /// Returns the tag mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt24 => "uint24",
            Self::UInt32 => "uint32",
            Self::UInt40 => "uint40",
            Self::UInt48 => "uint48",
            Self::UIntN => "uintn",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int24 => "int24",
            Self::Int32 => "int32",
            Self::Int40 => "int40",
            Self::Int48 => "int48",
            Self::IntN => "intn",
            Self::Float64 => "float64",
            Self::Str8 => "str8",
            Self::Str16 => "str16",
            Self::Str32 => "str32",
            Self::Str64 => "str64",
            Self::Bin8 => "bin8",
            Self::Bin16 => "bin16",
            Self::Bin32 => "bin32",
            Self::Ref8 => "ref8",
            Self::Ref16 => "ref16",
            Self::Ref24 => "ref24",
            Self::Ref32 => "ref32",
            Self::Ref40 => "ref40",
            Self::Ref48 => "ref48",
            Self::RefN => "refn",
            Self::True => "true",
            Self::False => "false",
            Self::ArrayStart => "array_start",
            Self::Array8 => "array8",
            Self::Array16 => "array16",
            Self::Array32 => "array32",
            Self::ArrayPush => "array_push",
            Self::ArrayEnd => "array_end",
            Self::ObjectStart => "object_start",
            Self::ObjectPush => "object_push",
            Self::ObjectEnd => "object_end",
            Self::Constructor => "constructor",
            Self::ProgramStart => "program_start",
            Self::ProgramEnd => "program_end",
            Self::If => "if",
            Self::EndIf => "end_if",
            Self::While => "while",
            Self::EndWhile => "end_while",
            Self::Test => "test",
            Self::Slot => "slot",
            Self::Mov => "mov",
            Self::IsBigger => "is_bigger",
            Self::AddTo => "add_to",
            Self::Mul => "mul",
            Self::Sin => "sin",
            Self::Jump => "jump",
            Self::Exit => "exit",
            Self::Address => "address",
            Self::End => "end",
        }
    }

    /// Returns the family this tag belongs to.
    #[must_use]
    pub const fn family(self) -> TagFamily {
        match self {
            Self::Null => TagFamily::Data,
            Self::Undefined => TagFamily::Data,
            Self::UInt8 => TagFamily::Data,
            Self::UInt16 => TagFamily::Data,
            Self::UInt24 => TagFamily::Data,
            Self::UInt32 => TagFamily::Data,
            Self::UInt40 => TagFamily::Data,
            Self::UInt48 => TagFamily::Data,
            Self::UIntN => TagFamily::Data,
            Self::Int8 => TagFamily::Data,
            Self::Int16 => TagFamily::Data,
            Self::Int24 => TagFamily::Data,
            Self::Int32 => TagFamily::Data,
            Self::Int40 => TagFamily::Data,
            Self::Int48 => TagFamily::Data,
            Self::IntN => TagFamily::Data,
            Self::Float64 => TagFamily::Data,
            Self::Str8 => TagFamily::Data,
            Self::Str16 => TagFamily::Data,
            Self::Str32 => TagFamily::Data,
            Self::Str64 => TagFamily::Data,
            Self::Bin8 => TagFamily::Data,
            Self::Bin16 => TagFamily::Data,
            Self::Bin32 => TagFamily::Data,
            Self::Ref8 => TagFamily::Data,
            Self::Ref16 => TagFamily::Data,
            Self::Ref24 => TagFamily::Data,
            Self::Ref32 => TagFamily::Data,
            Self::Ref40 => TagFamily::Data,
            Self::Ref48 => TagFamily::Data,
            Self::RefN => TagFamily::Data,
            Self::True => TagFamily::Data,
            Self::False => TagFamily::Data,
            Self::ArrayStart => TagFamily::Data,
            Self::Array8 => TagFamily::Data,
            Self::Array16 => TagFamily::Data,
            Self::Array32 => TagFamily::Data,
            Self::ArrayPush => TagFamily::Data,
            Self::ArrayEnd => TagFamily::Data,
            Self::ObjectStart => TagFamily::Data,
            Self::ObjectPush => TagFamily::Data,
            Self::ObjectEnd => TagFamily::Data,
            Self::Constructor => TagFamily::Data,
            Self::ProgramStart => TagFamily::Program,
            Self::ProgramEnd => TagFamily::Program,
            Self::If => TagFamily::Program,
            Self::EndIf => TagFamily::Program,
            Self::While => TagFamily::Program,
            Self::EndWhile => TagFamily::Program,
            Self::Test => TagFamily::Program,
            Self::Slot => TagFamily::Program,
            Self::Mov => TagFamily::Program,
            Self::IsBigger => TagFamily::Program,
            Self::AddTo => TagFamily::Program,
            Self::Mul => TagFamily::Program,
            Self::Sin => TagFamily::Program,
            Self::Jump => TagFamily::Program,
            Self::Exit => TagFamily::Program,
            Self::Address => TagFamily::Control,
            Self::End => TagFamily::Control,
        }
    }

    /// Returns the payload layout that follows the tag byte.
    #[must_use]
    pub const fn payload(self) -> PayloadKind {
        match self {
            Self::Null => PayloadKind::None,
            Self::Undefined => PayloadKind::None,
            Self::UInt8 => PayloadKind::UInt(1),
            Self::UInt16 => PayloadKind::UInt(2),
            Self::UInt24 => PayloadKind::UInt(3),
            Self::UInt32 => PayloadKind::UInt(4),
            Self::UInt40 => PayloadKind::UInt(5),
            Self::UInt48 => PayloadKind::UInt(6),
            Self::UIntN => PayloadKind::UIntN,
            Self::Int8 => PayloadKind::UInt(1),
            Self::Int16 => PayloadKind::UInt(2),
            Self::Int24 => PayloadKind::UInt(3),
            Self::Int32 => PayloadKind::UInt(4),
            Self::Int40 => PayloadKind::UInt(5),
            Self::Int48 => PayloadKind::UInt(6),
            Self::IntN => PayloadKind::UIntN,
            Self::Float64 => PayloadKind::F64,
            Self::Str8 => PayloadKind::Len(1),
            Self::Str16 => PayloadKind::Len(2),
            Self::Str32 => PayloadKind::Len(4),
            Self::Str64 => PayloadKind::Len(8),
            Self::Bin8 => PayloadKind::Len(1),
            Self::Bin16 => PayloadKind::Len(2),
            Self::Bin32 => PayloadKind::Len(4),
            Self::Ref8 => PayloadKind::UInt(1),
            Self::Ref16 => PayloadKind::UInt(2),
            Self::Ref24 => PayloadKind::UInt(3),
            Self::Ref32 => PayloadKind::UInt(4),
            Self::Ref40 => PayloadKind::UInt(5),
            Self::Ref48 => PayloadKind::UInt(6),
            Self::RefN => PayloadKind::UIntN,
            Self::True => PayloadKind::None,
            Self::False => PayloadKind::None,
            Self::ArrayStart => PayloadKind::None,
            Self::Array8 => PayloadKind::UInt(1),
            Self::Array16 => PayloadKind::UInt(2),
            Self::Array32 => PayloadKind::UInt(4),
            Self::ArrayPush => PayloadKind::Operands,
            Self::ArrayEnd => PayloadKind::None,
            Self::ObjectStart => PayloadKind::None,
            Self::ObjectPush => PayloadKind::Operands,
            Self::ObjectEnd => PayloadKind::None,
            Self::Constructor => PayloadKind::Operands,
            Self::ProgramStart => PayloadKind::None,
            Self::ProgramEnd => PayloadKind::None,
            Self::If => PayloadKind::None,
            Self::EndIf => PayloadKind::None,
            Self::While => PayloadKind::None,
            Self::EndWhile => PayloadKind::None,
            Self::Test => PayloadKind::Operands,
            Self::Slot => PayloadKind::Operands,
            Self::Mov => PayloadKind::Operands,
            Self::IsBigger => PayloadKind::Operands,
            Self::AddTo => PayloadKind::Operands,
            Self::Mul => PayloadKind::Operands,
            Self::Sin => PayloadKind::Operands,
            Self::Jump => PayloadKind::Operands,
            Self::Exit => PayloadKind::None,
            Self::Address => PayloadKind::Width,
            Self::End => PayloadKind::None,
        }
    }

    /// Returns `true` if decoding this tag assigns the next block index.
    #[must_use]
    pub const fn produces_block(self) -> bool {
        match self {
            Self::Null => true,
            Self::Undefined => true,
            Self::UInt8 => true,
            Self::UInt16 => true,
            Self::UInt24 => true,
            Self::UInt32 => true,
            Self::UInt40 => true,
            Self::UInt48 => true,
            Self::UIntN => true,
            Self::Int8 => true,
            Self::Int16 => true,
            Self::Int24 => true,
            Self::Int32 => true,
            Self::Int40 => true,
            Self::Int48 => true,
            Self::IntN => true,
            Self::Float64 => true,
            Self::Str8 => true,
            Self::Str16 => true,
            Self::Str32 => true,
            Self::Str64 => true,
            Self::Bin8 => true,
            Self::Bin16 => true,
            Self::Bin32 => true,
            Self::Ref8 => false,
            Self::Ref16 => false,
            Self::Ref24 => false,
            Self::Ref32 => false,
            Self::Ref40 => false,
            Self::Ref48 => false,
            Self::RefN => false,
            Self::True => true,
            Self::False => true,
            Self::ArrayStart => false,
            Self::Array8 => false,
            Self::Array16 => false,
            Self::Array32 => false,
            Self::ArrayPush => false,
            Self::ArrayEnd => true,
            Self::ObjectStart => false,
            Self::ObjectPush => false,
            Self::ObjectEnd => true,
            Self::Constructor => true,
            Self::ProgramStart => false,
            Self::ProgramEnd => true,
            Self::If => false,
            Self::EndIf => false,
            Self::While => false,
            Self::EndWhile => false,
            Self::Test => false,
            Self::Slot => false,
            Self::Mov => false,
            Self::IsBigger => false,
            Self::AddTo => false,
            Self::Mul => false,
            Self::Sin => false,
            Self::Jump => false,
            Self::Exit => false,
            Self::Address => false,
            Self::End => false,
        }
    }

    /// Returns the roles of the address-width operands carried by this tag.
    #[must_use]
    pub const fn operand_roles(self) -> &'static [OperandRole] {
        match self {
            Self::Null => &[],
            Self::Undefined => &[],
            Self::UInt8 => &[],
            Self::UInt16 => &[],
            Self::UInt24 => &[],
            Self::UInt32 => &[],
            Self::UInt40 => &[],
            Self::UInt48 => &[],
            Self::UIntN => &[],
            Self::Int8 => &[],
            Self::Int16 => &[],
            Self::Int24 => &[],
            Self::Int32 => &[],
            Self::Int40 => &[],
            Self::Int48 => &[],
            Self::IntN => &[],
            Self::Float64 => &[],
            Self::Str8 => &[],
            Self::Str16 => &[],
            Self::Str32 => &[],
            Self::Str64 => &[],
            Self::Bin8 => &[],
            Self::Bin16 => &[],
            Self::Bin32 => &[],
            Self::Ref8 => &[],
            Self::Ref16 => &[],
            Self::Ref24 => &[],
            Self::Ref32 => &[],
            Self::Ref40 => &[],
            Self::Ref48 => &[],
            Self::RefN => &[],
            Self::True => &[],
            Self::False => &[],
            Self::ArrayStart => &[],
            Self::Array8 => &[],
            Self::Array16 => &[],
            Self::Array32 => &[],
            Self::ArrayPush => &[OperandRole::Src],
            Self::ArrayEnd => &[],
            Self::ObjectStart => &[],
            Self::ObjectPush => &[OperandRole::Src],
            Self::ObjectEnd => &[],
            Self::Constructor => &[OperandRole::Code, OperandRole::Args],
            Self::ProgramStart => &[],
            Self::ProgramEnd => &[],
            Self::If => &[],
            Self::EndIf => &[],
            Self::While => &[],
            Self::EndWhile => &[],
            Self::Test => &[OperandRole::Test],
            Self::Slot => &[OperandRole::Dst, OperandRole::Block],
            Self::Mov => &[OperandRole::Dst, OperandRole::Src],
            Self::IsBigger => &[OperandRole::Dst, OperandRole::Lhs, OperandRole::Rhs],
            Self::AddTo => &[OperandRole::Dst, OperandRole::Src],
            Self::Mul => &[OperandRole::Dst, OperandRole::Lhs, OperandRole::Rhs],
            Self::Sin => &[OperandRole::Dst, OperandRole::Src],
            Self::Jump => &[OperandRole::Target],
            Self::Exit => &[],
            Self::Address => &[],
            Self::End => &[],
        }
    }
}
