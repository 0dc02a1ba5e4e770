use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    UnexpectedEof,
    InvalidMagic(u32),
    BadConstantIndex(u16),
    BadConstantTag(u8),
    ConstantTypeMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    InvalidModifiedUtf8,
    InvalidDescriptor(String),
    MalformedAttribute(&'static str),
    UnknownOpcode { opcode: u8, pc: u32 },
    TruncatedCode(u32),
    Malformed(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEof => write!(f, "unexpected end of class file"),
            Error::InvalidMagic(magic) => write!(f, "invalid class file magic: 0x{magic:08x}"),
            Error::BadConstantIndex(index) => {
                write!(f, "constant pool index {index} out of range")
            }
            Error::BadConstantTag(tag) => write!(f, "unknown constant pool tag: {tag}"),
            Error::ConstantTypeMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "constant pool entry {index} is {found}, expected {expected}"
            ),
            Error::InvalidModifiedUtf8 => write!(f, "invalid modified UTF-8 in constant pool"),
            Error::InvalidDescriptor(desc) => write!(f, "invalid descriptor: {desc}"),
            Error::MalformedAttribute(name) => write!(f, "malformed {name} attribute"),
            Error::UnknownOpcode { opcode, pc } => {
                write!(f, "unknown opcode 0x{opcode:02x} at pc {pc}")
            }
            Error::TruncatedCode(pc) => write!(f, "instruction at pc {pc} runs past end of code"),
            Error::Malformed(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {}
