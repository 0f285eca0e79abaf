// src/arj/params.rs

/// Ordered flat query parameters of one legacy GET request.
///
/// Insertion order is the wire order. `set` replaces an existing key in
/// place, so a later write never reorders the string the exchange sees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing in place when the key exists.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the `k=v&k=v` query string with component-encoded values.
    pub fn encode(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", k, percent_encode_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Percent-encode a query component over the unreserved character set.
pub fn percent_encode_component(component: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(component.len());
    for &byte in component.as_bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(byte as char);
        } else {
            out.push('%');
            out.push(HEX[(byte >> 4) as usize] as char);
            out.push(HEX[(byte & 0x0F) as usize] as char);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_preserves_insertion_order() {
        let mut params = QueryParams::new();
        params.set("ju", "https://example.com");
        params.set("be", "1");
        params.set("auid", "540141567");
        let keys: Vec<_> = params.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["ju", "be", "auid"]);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut params = QueryParams::new();
        params.set("vwd", "0");
        params.set("vht", "0");
        params.set("vwd", "640");
        let keys: Vec<_> = params.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["vwd", "vht"]);
        assert_eq!(params.get("vwd"), Some("640"));
    }

    #[test]
    fn encode_escapes_reserved_characters() {
        let mut params = QueryParams::new();
        params.set("ju", "https://example.com/page?a=1");
        assert_eq!(
            params.encode(),
            "ju=https%3A%2F%2Fexample.com%2Fpage%3Fa%3D1"
        );
    }

    #[test]
    fn component_encoding_keeps_unreserved() {
        assert_eq!(percent_encode_component("abc-XYZ_0.9~"), "abc-XYZ_0.9~");
        assert_eq!(percent_encode_component("a b+c"), "a%20b%2Bc");
    }
}
