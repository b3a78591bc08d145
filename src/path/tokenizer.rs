//! Quote-aware splitting of path expressions into segments

/// Split a path expression into ordered segments
///
/// `/` delimits segments. A single quote toggles quoted mode, inside which
/// `/` is literal content; quote characters are stripped from the emitted
/// tokens. A leading `/` yields a leading empty segment (the root marker),
/// which the resolver consumes with no effect. Empty input yields no
/// segments, and a trailing unquoted `/` emits nothing after it.
///
/// An unmatched quote leaves the remainder of the input in quoted mode;
/// there is no further escaping mechanism.
///
/// ```rust
/// use refract::path::tokenize;
///
/// assert_eq!(tokenize("/foo/bar"), vec!["", "foo", "bar"]);
/// assert_eq!(tokenize("/'Microsoft.Network/virtualNetworks'/vnet"),
///            vec!["", "Microsoft.Network/virtualNetworks", "vnet"]);
/// ```
pub fn tokenize(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }

    let mut tokens = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    // Delimiter and quote are both ASCII, so a byte scan is safe on UTF-8.
    for (index, byte) in path.bytes().enumerate() {
        match byte {
            b'/' if !quoted => {
                tokens.push(strip_quotes(&path[start..index]));
                start = index + 1;
            }
            b'\'' => quoted = !quoted,
            _ => {}
        }
    }
    if start < path.len() {
        tokens.push(strip_quotes(&path[start..]));
    }

    tokens
}

fn strip_quotes(segment: &str) -> String {
    segment.replace('\'', "")
}
