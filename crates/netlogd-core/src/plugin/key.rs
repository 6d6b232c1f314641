//! The key/value data model shared by every stage in a stack (spec.md §3).

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::kernel::constants::MAX_KEY_NAME_LEN;

/// The type tag carried by a key. Adjacent stages' schemas are checked for
/// compatibility by comparing these tags (not the runtime `Value` variant,
/// which only exists once a value has actually been written).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    Ipv4,
    Ipv6,
    String,
    Bytes,
    /// A borrowed raw packet pointer, as the original ulogd2 `RAWDATA` type.
    /// Never flagged `needs_free_on_release`: the producer owns the buffer
    /// for the lifetime of the capture and the key only borrows it.
    RawPacket,
}

/// A runtime value stored in a key's slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    String(String),
    Bytes(Vec<u8>),
    RawPacket(*const u8, usize),
}

// `Value::RawPacket` carries a raw pointer so the key can borrow a packet
// buffer without copying it; the pointer is only ever dereferenced for the
// lifetime of a single dispatch on the reactor thread (spec.md §5).
unsafe impl Send for Value {}
unsafe impl Sync for Value {}

impl Value {
    pub fn type_tag(&self) -> KeyType {
        match self {
            Value::Bool(_) => KeyType::Bool,
            Value::I8(_) => KeyType::I8,
            Value::U8(_) => KeyType::U8,
            Value::I16(_) => KeyType::I16,
            Value::U16(_) => KeyType::U16,
            Value::I32(_) => KeyType::I32,
            Value::U32(_) => KeyType::U32,
            Value::I64(_) => KeyType::I64,
            Value::U64(_) => KeyType::U64,
            Value::Ipv4(_) => KeyType::Ipv4,
            Value::Ipv6(_) => KeyType::Ipv6,
            Value::String(_) => KeyType::String,
            Value::Bytes(_) => KeyType::Bytes,
            Value::RawPacket(..) => KeyType::RawPacket,
        }
    }
}

bitflags::bitflags! {
    /// Per-key flags (spec.md §3: valid, needs-free-on-release, optional, inactive).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct KeyFlags: u8 {
        const VALID = 0b0001;
        const NEEDS_FREE_ON_RELEASE = 0b0010;
        const OPTIONAL = 0b0100;
        const INACTIVE = 0b1000;
    }
}

/// A back-reference from an input key to the output key it reads through.
/// Modeled as indices into the owning stack's pluginstance vector plus a key
/// index (spec.md §9), never as a raw pointer, so the graph stays auditable
/// and immune to reallocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySource {
    /// Index of the producing pluginstance within the stack.
    pub instance_index: usize,
    /// Index of the output key within that pluginstance's output table.
    pub key_index: usize,
}

/// A named, typed slot. `source` is only ever populated on input keys,
/// after stack resolution (spec.md §4.3 pass 2); output keys never carry one.
#[derive(Debug, Clone)]
pub struct Key {
    name: String,
    ty: KeyType,
    flags: KeyFlags,
    value: Option<Value>,
    source: Option<KeySource>,
}

impl Key {
    /// Declare a key template, as a plugin descriptor would (no source, no value).
    pub fn template(name: impl Into<String>, ty: KeyType, flags: KeyFlags) -> Self {
        let mut name = name.into();
        name.truncate(MAX_KEY_NAME_LEN);
        Self { name, ty, flags, value: None, source: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_type(&self) -> KeyType {
        self.ty
    }

    pub fn flags(&self) -> KeyFlags {
        self.flags
    }

    pub fn is_optional(&self) -> bool {
        self.flags.contains(KeyFlags::OPTIONAL)
    }

    pub fn is_inactive(&self) -> bool {
        self.flags.contains(KeyFlags::INACTIVE)
    }

    pub fn set_inactive(&mut self, inactive: bool) {
        if inactive {
            self.flags |= KeyFlags::INACTIVE;
        } else {
            self.flags -= KeyFlags::INACTIVE;
        }
    }

    pub fn needs_free_on_release(&self) -> bool {
        self.flags.contains(KeyFlags::NEEDS_FREE_ON_RELEASE)
    }

    pub fn source(&self) -> Option<KeySource> {
        self.source
    }

    pub fn bind_source(&mut self, source: KeySource) {
        self.source = Some(source);
    }

    pub fn is_bound(&self) -> bool {
        self.source.is_some()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Write a value into this (output) key. Type-compatibility with the
    /// declared `ty` is the caller's responsibility, as with the original
    /// descriptor contract; mismatches are a plugin bug, not a runtime error.
    pub fn set_value(&mut self, value: Value) {
        self.flags |= KeyFlags::VALID;
        self.value = Some(value);
    }

    /// Release an owned value and mark the slot invalid again. Called by
    /// `clean_results` after every dispatch (spec.md §4.4).
    pub fn release(&mut self) {
        self.value = None;
        self.flags -= KeyFlags::VALID;
    }

    pub fn is_valid(&self) -> bool {
        self.flags.contains(KeyFlags::VALID)
    }
}
