//! The variant value model: a closed tagged union plus the ordered struct map.

/// Wire type tags for variant values.
///
/// Tag 0 is reserved as the struct-body terminator and is deliberately not a
/// member of this enum; a value can never carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VariantKind {
    /// Single-bit boolean.
    Bool = 1,
    /// 32-bit signed integer.
    Int = 2,
    /// 32-bit unsigned integer.
    UInt = 3,
    /// Fixed-point encoded float.
    Float = 4,
    /// Length-prefixed byte string.
    String = 5,
    /// Pair of floats.
    Vec2 = 10,
    /// Ordered key/value map.
    Struct = 14,
    /// Homogeneous array.
    Array = 15,
}

impl VariantKind {
    /// Decodes a raw 4-bit tag. Returns `None` for the terminator tag (0) and
    /// for every value outside the closed set.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Bool),
            2 => Some(Self::Int),
            3 => Some(Self::UInt),
            4 => Some(Self::Float),
            5 => Some(Self::String),
            10 => Some(Self::Vec2),
            14 => Some(Self::Struct),
            15 => Some(Self::Array),
            _ => None,
        }
    }

    /// Returns the raw 4-bit tag.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }
}

/// A self-describing typed value.
///
/// Variants own their payload exclusively. Equality is structural; note that
/// floats compare with `f64` semantics, so `NaN != NaN`.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    /// Boolean flag.
    Bool(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// 32-bit unsigned integer.
    UInt(u32),
    /// Floating point value (encoded as 32.32 fixed point on the wire).
    Float(f64),
    /// Raw byte string. Usually UTF-8 but the format does not guarantee it.
    String(Vec<u8>),
    /// Pair of floats.
    Vec2(f64, f64),
    /// Homogeneous-by-convention array with a declared element kind.
    Array(VariantKind, Vec<Variant>),
    /// Ordered key/value map.
    Struct(StructMap),
}

impl Variant {
    /// Returns the wire kind of this value.
    #[must_use]
    pub const fn kind(&self) -> VariantKind {
        match self {
            Self::Bool(_) => VariantKind::Bool,
            Self::Int(_) => VariantKind::Int,
            Self::UInt(_) => VariantKind::UInt,
            Self::Float(_) => VariantKind::Float,
            Self::String(_) => VariantKind::String,
            Self::Vec2(_, _) => VariantKind::Vec2,
            Self::Array(_, _) => VariantKind::Array,
            Self::Struct(_) => VariantKind::Struct,
        }
    }

    /// Returns the boolean payload, if this is a `Bool`.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the signed integer payload, if this is an `Int`.
    #[must_use]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the unsigned integer payload, if this is a `UInt`.
    #[must_use]
    pub const fn as_uint(&self) -> Option<u32> {
        match self {
            Self::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float payload, if this is a `Float`.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the byte-string payload, if this is a `String`.
    #[must_use]
    pub fn as_str_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the struct payload, if this is a `Struct`.
    #[must_use]
    pub const fn as_struct(&self) -> Option<&StructMap> {
        match self {
            Self::Struct(map) => Some(map),
            _ => None,
        }
    }
}

/// An ordered string-keyed map of variants.
///
/// Insertion order is preserved and is semantically significant: re-encoding
/// emits entries in stored order, which is what makes decode/encode round
/// trips byte-exact. Inserting an existing key replaces the value in place
/// without moving the entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructMap {
    entries: Vec<(String, Variant)>,
}

impl StructMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a value, replacing in place if the key already exists.
    ///
    /// Returns the previous value for the key, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Variant) -> Option<Variant> {
        let key = key.into();
        for (k, v) in &mut self.entries {
            if *k == key {
                return Some(std::mem::replace(v, value));
            }
        }
        self.entries.push((key, value));
        None
    }

    /// Looks up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Looks up a value by key, mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Variant> {
        self.entries
            .iter_mut()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Removes an entry by key, preserving the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Variant> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variant)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Variant)> for StructMap {
    fn from_iter<I: IntoIterator<Item = (String, Variant)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<'a> IntoIterator for &'a StructMap {
    type Item = &'a (String, Variant);
    type IntoIter = std::slice::Iter<'a, (String, Variant)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
