use std::fmt;

/// Attributes of a root tag, in source order, with case-insensitive keys.
///
/// Lookups ignore case but the stored spelling of a key is kept, so a
/// rebuilt tag reads like the input apart from the entries that were
/// deliberately changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: Vec<(String, String)>,
}

impl AttributeMap {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Scans `name="value"` and `name='value'` pairs.
    ///
    /// Anything else is skipped: bare flags, unquoted values and stray
    /// characters. An unterminated quote ends the scan. A repeated key keeps
    /// its first position and takes the later value.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut map = Self::new();
        let bytes = source.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            if !is_name_byte(bytes[pos]) {
                pos += 1;
                continue;
            }

            let name_start = pos;
            while pos < bytes.len() && is_name_byte(bytes[pos]) {
                pos += 1;
            }
            let name = &source[name_start..pos];

            pos = skip_whitespace(bytes, pos);
            if bytes.get(pos) != Some(&b'=') {
                continue;
            }
            pos = skip_whitespace(bytes, pos + 1);

            match bytes.get(pos) {
                Some(&quote @ (b'"' | b'\'')) => {
                    let value_start = pos + 1;
                    let Some(len) = bytes[value_start..].iter().position(|&b| b == quote) else {
                        break;
                    };
                    map.insert(name, &source[value_start..value_start + len]);
                    pos = value_start + len + 1;
                }
                _ => {
                    while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
                        pos += 1;
                    }
                }
            }
        }

        map
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.entries[i].1.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Sets a value. An existing key, in any case, is updated in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let i = self.position(key)?;
        Some(self.entries.remove(i).1)
    }

    /// Rewrites the stored spelling of `key` to exactly `key`.
    pub fn canonicalize(&mut self, key: &str) {
        if let Some(i) = self.position(key) {
            key.clone_into(&mut self.entries[i].0);
        }
    }

    /// Canonicalizes `key`, inserting `default` when absent.
    pub fn ensure(&mut self, key: &str, default: &str) {
        if self.contains_key(key) {
            self.canonicalize(key);
        } else {
            self.entries.push((key.to_string(), default.to_string()));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }
}

/// Writes ` k="v"` for every entry. Values holding a double quote are
/// written with single quotes.
impl fmt::Display for AttributeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            match (value.contains('"'), value.contains('\'')) {
                (false, _) => write!(f, " {key}=\"{value}\"")?,
                (true, false) => write!(f, " {key}='{value}'")?,
                (true, true) => write!(f, " {key}=\"{}\"", value.replace('"', "&quot;"))?,
            }
        }
        Ok(())
    }
}

const fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'.' | b'-')
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}
