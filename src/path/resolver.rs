//! Recursive resolution of token sequences against dynamic values

use std::sync::LazyLock;

use regex::Regex;

use super::tokenizer::tokenize;
use crate::value::{Scalar, Value};

// Index expression grammar shared by both patterns: a signed integer or a
// `field=value` equality filter, always bracketed and at the end of the
// token.
const INDEX_EXPR: &str = r"\[(?P<expr>(?P<num>[+-]?[0-9]+)|((?P<lhs>.*)=(?P<rhs>.*)))\]$";

static KEY_WITH_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^(?P<name>.*){INDEX_EXPR}")).expect("key+index pattern is valid")
});

static INDEX_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{INDEX_EXPR}")).expect("index pattern is valid"));

/// Resolve a token sequence against a value
///
/// Tokens are applied left to right. An empty sequence returns the input
/// value; an empty token (the root marker from a leading `/`) is consumed
/// with no effect. Four token forms are recognized:
///
/// 1. **Combined key+index** - `name[idx]` is rewritten into `name` then
///    `[idx]` and resolution restarts on the expanded sequence.
/// 2. **Numeric index** - `[n]` against a sequence, negative `n` counting
///    from the end (`[-1]` is the last element). Out-of-range yields `None`.
/// 3. **Filter index** - `[field=value]` against a sequence scans in order
///    for the first element whose `field` (itself a path expression)
///    stringifies to `value`.
/// 4. **Plain key** - mapping key or record field, by the *value's* shape.
///
/// Dispatch is driven by the current value's runtime shape, not the token's
/// syntax: a plain key against a sequence yields `None`; only explicit
/// index and filter tokens address sequences. Resolution is total and never
/// panics; every mismatch degrades to `None`.
pub fn resolve<'a>(value: &'a Value, path: &[String]) -> Option<&'a Value> {
    let (token, rest) = match path.split_first() {
        Some((token, rest)) => (token.as_str(), rest),
        None => return Some(value),
    };
    if token.is_empty() {
        return resolve(value, rest);
    }

    // `name[idx]` addresses a field and then indexes into it: rewrite into
    // two tokens and restart on the expanded sequence.
    if let Some(captures) = KEY_WITH_INDEX.captures(token) {
        let name = &captures["name"];
        if !name.is_empty() {
            let mut expanded = Vec::with_capacity(rest.len() + 2);
            expanded.push(name.to_string());
            expanded.push(format!("[{}]", &captures["expr"]));
            expanded.extend(rest.iter().cloned());
            return resolve(value, &expanded);
        }
    }

    match value {
        Value::Sequence(items) => {
            let captures = INDEX_ONLY.captures(token)?;
            if let Some(number) = captures.name("num") {
                let index: i64 = number.as_str().parse().ok()?;
                let length = items.len() as i64;
                let normalized = if index < 0 { length + index } else { index };
                if !(0..length).contains(&normalized) {
                    return None;
                }
                resolve(&items[normalized as usize], rest)
            } else {
                // Equality filter: the lhs is itself a path expression, so
                // `[Tags/Name=manager]` can select on nested fields.
                let needle = tokenize(captures.name("lhs")?.as_str());
                let expected = captures.name("rhs")?.as_str();
                let matched = items.iter().find(|element| {
                    resolve(element, &needle)
                        .and_then(comparison_text)
                        .is_some_and(|text| text == expected)
                })?;
                resolve(matched, rest)
            }
        }
        Value::Mapping(entries) => resolve(entries.get(token)?, rest),
        Value::Record(record) => resolve(record.field(token)?, rest),
        Value::Scalar(_) => None,
    }
}

/// Text image used for `[field=value]` comparisons
///
/// Only non-null scalars participate: a filter literal never matches a
/// mapping, sequence, record or null.
fn comparison_text(value: &Value) -> Option<String> {
    match value {
        Value::Scalar(Scalar::Text(text)) => Some(text.clone()),
        Value::Scalar(Scalar::Number(number)) => Some(number.to_string()),
        Value::Scalar(Scalar::Bool(flag)) => Some(flag.to_string()),
        Value::Scalar(Scalar::Null) | Value::Sequence(_) | Value::Mapping(_) | Value::Record(_) => {
            None
        }
    }
}
