use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// One constant pool entry. Cross-entry references are kept as raw indices
/// and resolved through the accessor methods on [`ConstantPool`].
#[derive(Debug, Clone)]
pub enum Const {
    Utf8(String),
    Int(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name: u16 },
    Str { utf8: u16 },
    FieldRef { class: u16, name_and_type: u16 },
    MethodRef { class: u16, name_and_type: u16 },
    InterfaceMethodRef { class: u16, name_and_type: u16 },
    NameAndType { name: u16, descriptor: u16 },
    MethodHandle { kind: u8, reference: u16 },
    MethodType { descriptor: u16 },
    Dynamic { bootstrap: u16, name_and_type: u16 },
    InvokeDynamic { bootstrap: u16, name_and_type: u16 },
    Module { name: u16 },
    Package { name: u16 },
}

impl Const {
    fn kind(&self) -> &'static str {
        match self {
            Const::Utf8(_) => "Utf8",
            Const::Int(_) => "Integer",
            Const::Float(_) => "Float",
            Const::Long(_) => "Long",
            Const::Double(_) => "Double",
            Const::Class { .. } => "Class",
            Const::Str { .. } => "String",
            Const::FieldRef { .. } => "Fieldref",
            Const::MethodRef { .. } => "Methodref",
            Const::InterfaceMethodRef { .. } => "InterfaceMethodref",
            Const::NameAndType { .. } => "NameAndType",
            Const::MethodHandle { .. } => "MethodHandle",
            Const::MethodType { .. } => "MethodType",
            Const::Dynamic { .. } => "Dynamic",
            Const::InvokeDynamic { .. } => "InvokeDynamic",
            Const::Module { .. } => "Module",
            Const::Package { .. } => "Package",
        }
    }
}

/// A fully resolved field or method reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    /// Internal name of the owning class, e.g. `javax/ws/rs/core/Response`.
    pub class: String,
    pub name: String,
    pub descriptor: String,
}

#[derive(Debug, Clone)]
pub struct ConstantPool {
    entries: Vec<Option<Const>>,
}

impl ConstantPool {
    pub fn parse(cur: &mut Cursor<'_>) -> Result<Self> {
        let count = cur.u16()? as usize;
        if count == 0 {
            return Err(Error::Malformed("constant_pool_count must be >= 1"));
        }

        let mut entries = vec![None; count];
        let mut index = 1usize;
        while index < count {
            let tag = cur.u8()?;
            let entry = match tag {
                1 => {
                    let len = cur.u16()? as usize;
                    Const::Utf8(decode_modified_utf8(cur.take(len)?)?)
                }
                3 => Const::Int(cur.i32()?),
                4 => Const::Float(f32::from_bits(cur.u32()?)),
                5 => Const::Long(cur.i64()?),
                6 => Const::Double(f64::from_bits(cur.i64()? as u64)),
                7 => Const::Class { name: cur.u16()? },
                8 => Const::Str { utf8: cur.u16()? },
                9 => Const::FieldRef {
                    class: cur.u16()?,
                    name_and_type: cur.u16()?,
                },
                10 => Const::MethodRef {
                    class: cur.u16()?,
                    name_and_type: cur.u16()?,
                },
                11 => Const::InterfaceMethodRef {
                    class: cur.u16()?,
                    name_and_type: cur.u16()?,
                },
                12 => Const::NameAndType {
                    name: cur.u16()?,
                    descriptor: cur.u16()?,
                },
                15 => Const::MethodHandle {
                    kind: cur.u8()?,
                    reference: cur.u16()?,
                },
                16 => Const::MethodType {
                    descriptor: cur.u16()?,
                },
                17 => Const::Dynamic {
                    bootstrap: cur.u16()?,
                    name_and_type: cur.u16()?,
                },
                18 => Const::InvokeDynamic {
                    bootstrap: cur.u16()?,
                    name_and_type: cur.u16()?,
                },
                19 => Const::Module { name: cur.u16()? },
                20 => Const::Package { name: cur.u16()? },
                other => return Err(Error::BadConstantTag(other)),
            };

            // Long and Double occupy two slots.
            let wide = matches!(entry, Const::Long(_) | Const::Double(_));
            entries[index] = Some(entry);
            index += if wide { 2 } else { 1 };
            if wide && index > count {
                return Err(Error::Malformed("wide constant overruns pool"));
            }
        }

        Ok(Self { entries })
    }

    pub fn get(&self, index: u16) -> Result<&Const> {
        let i = index as usize;
        if i == 0 || i >= self.entries.len() {
            return Err(Error::BadConstantIndex(index));
        }
        self.entries[i].as_ref().ok_or(Error::BadConstantIndex(index))
    }

    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Const::Utf8(s) => Ok(s.as_str()),
            other => Err(self.mismatch(index, "Utf8", other)),
        }
    }

    /// Internal name behind a `CONSTANT_Class` entry.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Const::Class { name } => self.utf8(*name),
            other => Err(self.mismatch(index, "Class", other)),
        }
    }

    /// The string behind a `CONSTANT_String` entry.
    pub fn string(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Const::Str { utf8 } => self.utf8(*utf8),
            other => Err(self.mismatch(index, "String", other)),
        }
    }

    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            Const::NameAndType { name, descriptor } => {
                Ok((self.utf8(*name)?, self.utf8(*descriptor)?))
            }
            other => Err(self.mismatch(index, "NameAndType", other)),
        }
    }

    /// Resolve a Fieldref / Methodref / InterfaceMethodref entry.
    pub fn member_ref(&self, index: u16) -> Result<MemberRef> {
        let (class, name_and_type) = match self.get(index)? {
            Const::FieldRef {
                class,
                name_and_type,
            }
            | Const::MethodRef {
                class,
                name_and_type,
            }
            | Const::InterfaceMethodRef {
                class,
                name_and_type,
            } => (*class, *name_and_type),
            other => return Err(self.mismatch(index, "Fieldref/Methodref", other)),
        };
        let class = self.class_name(class)?.to_string();
        let (name, descriptor) = self.name_and_type(name_and_type)?;
        Ok(MemberRef {
            class,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        })
    }

    /// The member a `CONSTANT_MethodHandle` points at, with its reference kind.
    pub fn method_handle(&self, index: u16) -> Result<(u8, MemberRef)> {
        match self.get(index)? {
            Const::MethodHandle { kind, reference } => {
                Ok((*kind, self.member_ref(*reference)?))
            }
            other => Err(self.mismatch(index, "MethodHandle", other)),
        }
    }

    /// Bootstrap method index and call-site name/descriptor of an
    /// `invokedynamic` entry.
    pub fn invoke_dynamic(&self, index: u16) -> Result<(u16, &str, &str)> {
        match self.get(index)? {
            Const::InvokeDynamic {
                bootstrap,
                name_and_type,
            } => {
                let (name, descriptor) = self.name_and_type(*name_and_type)?;
                Ok((*bootstrap, name, descriptor))
            }
            other => Err(self.mismatch(index, "InvokeDynamic", other)),
        }
    }

    fn mismatch(&self, index: u16, expected: &'static str, found: &Const) -> Error {
        Error::ConstantTypeMismatch {
            index,
            expected,
            found: found.kind(),
        }
    }
}

/// Class files encode strings as "modified UTF-8": standard UTF-8 for the
/// BMP, NUL as `0xC0 0x80`, supplementary characters as CESU-8 surrogate
/// pairs, never 4-byte sequences. Decode into UTF-16 code units first;
/// identifiers may legally contain unpaired surrogates, so the final
/// conversion is lossy instead of failing the whole file.
fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied();
    while let Some(b) = iter.next() {
        let unit = match b {
            0x00..=0x7F => b as u16,
            0xC0..=0xDF => {
                let b2 = iter.next().ok_or(Error::InvalidModifiedUtf8)?;
                if b2 & 0xC0 != 0x80 {
                    return Err(Error::InvalidModifiedUtf8);
                }
                ((b as u16 & 0x1F) << 6) | (b2 as u16 & 0x3F)
            }
            0xE0..=0xEF => {
                let b2 = iter.next().ok_or(Error::InvalidModifiedUtf8)?;
                let b3 = iter.next().ok_or(Error::InvalidModifiedUtf8)?;
                if b2 & 0xC0 != 0x80 || b3 & 0xC0 != 0x80 {
                    return Err(Error::InvalidModifiedUtf8);
                }
                ((b as u16 & 0x0F) << 12) | ((b2 as u16 & 0x3F) << 6) | (b3 as u16 & 0x3F)
            }
            _ => return Err(Error::InvalidModifiedUtf8),
        };
        units.push(unit);
    }
    Ok(String::from_utf16_lossy(&units))
}
