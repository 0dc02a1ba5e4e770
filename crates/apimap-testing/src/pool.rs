use std::collections::HashMap;

/// Deduplicating constant pool builder. Indices are 1-based, as in the
/// class-file format. Long/double entries are not needed by any fixture
/// and are unsupported.
#[derive(Default)]
pub struct PoolBuilder {
    entries: Vec<Entry>,
    interned: HashMap<Entry, u16>,
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum Entry {
    Utf8(String),
    Int(i32),
    Class(u16),
    Str(u16),
    NameAndType(u16, u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    MethodHandle(u8, u16),
    InvokeDynamic(u16, u16),
}

impl PoolBuilder {
    fn intern(&mut self, entry: Entry) -> u16 {
        if let Some(&index) = self.interned.get(&entry) {
            return index;
        }
        self.entries.push(entry.clone());
        let index = self.entries.len() as u16;
        self.interned.insert(entry, index);
        index
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        self.intern(Entry::Utf8(value.to_string()))
    }

    pub fn int(&mut self, value: i32) -> u16 {
        self.intern(Entry::Int(value))
    }

    pub fn class(&mut self, internal_name: &str) -> u16 {
        let name = self.utf8(internal_name);
        self.intern(Entry::Class(name))
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let utf8 = self.utf8(value);
        self.intern(Entry::Str(utf8))
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.intern(Entry::NameAndType(name, descriptor))
    }

    pub fn field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(class);
        let nat = self.name_and_type(name, descriptor);
        self.intern(Entry::FieldRef(class, nat))
    }

    pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(class);
        let nat = self.name_and_type(name, descriptor);
        self.intern(Entry::MethodRef(class, nat))
    }

    pub fn interface_method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(class);
        let nat = self.name_and_type(name, descriptor);
        self.intern(Entry::InterfaceMethodRef(class, nat))
    }

    /// `kind` is a `REF_*` constant; 6 = invokestatic.
    pub fn method_handle(&mut self, kind: u8, member_ref: u16) -> u16 {
        self.intern(Entry::MethodHandle(kind, member_ref))
    }

    pub fn invoke_dynamic(&mut self, bootstrap_index: u16, name: &str, descriptor: &str) -> u16 {
        let nat = self.name_and_type(name, descriptor);
        self.intern(Entry::InvokeDynamic(bootstrap_index, nat))
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.entries.len() as u16 + 1).to_be_bytes());
        for entry in &self.entries {
            match entry {
                Entry::Utf8(value) => {
                    out.push(1);
                    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
                    out.extend_from_slice(value.as_bytes());
                }
                Entry::Int(value) => {
                    out.push(3);
                    out.extend_from_slice(&value.to_be_bytes());
                }
                Entry::Class(name) => {
                    out.push(7);
                    out.extend_from_slice(&name.to_be_bytes());
                }
                Entry::Str(utf8) => {
                    out.push(8);
                    out.extend_from_slice(&utf8.to_be_bytes());
                }
                Entry::FieldRef(class, nat) => {
                    out.push(9);
                    out.extend_from_slice(&class.to_be_bytes());
                    out.extend_from_slice(&nat.to_be_bytes());
                }
                Entry::MethodRef(class, nat) => {
                    out.push(10);
                    out.extend_from_slice(&class.to_be_bytes());
                    out.extend_from_slice(&nat.to_be_bytes());
                }
                Entry::InterfaceMethodRef(class, nat) => {
                    out.push(11);
                    out.extend_from_slice(&class.to_be_bytes());
                    out.extend_from_slice(&nat.to_be_bytes());
                }
                Entry::NameAndType(name, descriptor) => {
                    out.push(12);
                    out.extend_from_slice(&name.to_be_bytes());
                    out.extend_from_slice(&descriptor.to_be_bytes());
                }
                Entry::MethodHandle(kind, reference) => {
                    out.push(15);
                    out.push(*kind);
                    out.extend_from_slice(&reference.to_be_bytes());
                }
                Entry::InvokeDynamic(bootstrap, nat) => {
                    out.push(18);
                    out.extend_from_slice(&bootstrap.to_be_bytes());
                    out.extend_from_slice(&nat.to_be_bytes());
                }
            }
        }
    }
}
