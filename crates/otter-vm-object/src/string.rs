//! Immutable JavaScript strings
//!
//! Strings are sequences of UTF-16 code units. Lone surrogates are legal and
//! survive every operation untouched. Literals used by the engine itself
//! (`"length"`, `"prototype"`, ...) are interned so repeated lookups share
//! one allocation.

use dashmap::DashMap;
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Global string intern table
static STRING_TABLE: std::sync::LazyLock<DashMap<u64, JsString>> =
    std::sync::LazyLock::new(DashMap::new);

/// An immutable JavaScript string
#[derive(Clone)]
pub struct JsString {
    units: Arc<[u16]>,
    /// Precomputed hash for fast lookup
    hash: u64,
}

impl JsString {
    /// Create or retrieve an interned string (using global table)
    pub fn intern(s: &str) -> Self {
        let units: Vec<u16> = s.encode_utf16().collect();
        let hash = Self::compute_hash(&units);

        if let Some(existing) = STRING_TABLE.get(&hash)
            && *existing.units == *units
        {
            return existing.clone();
        }

        let js_str = Self {
            units: Arc::from(units),
            hash,
        };
        // On a hash collision the newcomer simply stays un-interned.
        STRING_TABLE.entry(hash).or_insert_with(|| js_str.clone());
        js_str
    }

    /// Create a string without interning
    pub fn new(s: &str) -> Self {
        Self::from_utf16(s.encode_utf16().collect())
    }

    /// Create a string from raw UTF-16 code units
    pub fn from_utf16(units: Vec<u16>) -> Self {
        let hash = Self::compute_hash(&units);
        Self {
            units: Arc::from(units),
            hash,
        }
    }

    /// The empty string
    pub fn empty() -> Self {
        Self::intern("")
    }

    fn compute_hash(units: &[u16]) -> u64 {
        let mut hasher = FxHasher::default();
        units.hash(&mut hasher);
        hasher.finish()
    }

    /// The code units of this string
    #[inline]
    pub fn as_utf16(&self) -> &[u16] {
        &self.units
    }

    /// Length in UTF-16 code units
    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Precomputed hash
    pub fn hash_value(&self) -> u64 {
        self.hash
    }

    /// Code unit at `index`
    pub fn code_unit_at(&self, index: usize) -> Option<u16> {
        self.units.get(index).copied()
    }

    /// One-code-unit substring at `index`
    pub fn unit_string_at(&self, index: usize) -> Option<JsString> {
        self.code_unit_at(index).map(|unit| Self::from_utf16(vec![unit]))
    }

    /// Concatenate two strings
    pub fn concat(&self, other: &JsString) -> Self {
        let mut units = Vec::with_capacity(self.len() + other.len());
        units.extend_from_slice(&self.units);
        units.extend_from_slice(&other.units);
        Self::from_utf16(units)
    }

    /// Substring over code units `[start, end)`, clamped to the length.
    pub fn substring(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.len());
        let start = start.min(end);
        Self::from_utf16(self.units[start..end].to_vec())
    }

    /// Convert to a Rust string, replacing lone surrogates with U+FFFD.
    pub fn to_std_string(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }

    /// Compare against a Rust string without allocating.
    pub fn eq_str(&self, s: &str) -> bool {
        let mut theirs = s.encode_utf16();
        for unit in self.units.iter() {
            if theirs.next() != Some(*unit) {
                return false;
            }
        }
        theirs.next().is_none()
    }

    /// Whether both handles share one allocation.
    pub fn ptr_eq(&self, other: &JsString) -> bool {
        Arc::ptr_eq(&self.units, &other.units)
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.hash == other.hash && self.units == other.units)
    }
}

impl Eq for JsString {}

impl Hash for JsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialOrd for JsString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Code-unit order, as used by `IsLessThan` on strings.
impl Ord for JsString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.units.cmp(&other.units)
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_std_string())
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_std_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_shares_storage() {
        let a = JsString::intern("length");
        let b = JsString::intern("length");
        assert!(a.ptr_eq(&b));
        assert_eq!(a, JsString::new("length"));
    }

    #[test]
    fn test_utf16_length() {
        let s = JsString::new("a😀");
        assert_eq!(s.len(), 3);
        assert_eq!(s.code_unit_at(1), Some(0xD83D));
        assert_eq!(s.code_unit_at(3), None);
    }

    #[test]
    fn test_lone_surrogate_preserved() {
        let s = JsString::from_utf16(vec![0x61, 0xD800]);
        assert_eq!(s.as_utf16(), &[0x61, 0xD800]);
        assert_eq!(s.to_std_string(), "a\u{FFFD}");
    }

    #[test]
    fn test_concat_and_substring() {
        let s = JsString::new("foo").concat(&JsString::new("bar"));
        assert!(s.eq_str("foobar"));
        assert!(s.substring(2, 4).eq_str("ob"));
        assert!(s.substring(4, 100).eq_str("ar"));
        assert!(!s.eq_str("foo"));
    }

    #[test]
    fn test_ordering_by_code_units() {
        assert!(JsString::new("a") < JsString::new("b"));
        assert!(JsString::new("Z") < JsString::new("a"));
    }
}
