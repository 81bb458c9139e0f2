// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! [RFC 6901](https://www.rfc-editor.org/rfc/rfc6901) JSON pointers.

use serde_json::Value;

use crate::errors::Error;

/// Splits a pointer into unescaped reference tokens. The empty pointer refers to the whole document.
pub fn parse_pointer(pointer: &str) -> Result<Vec<String>, Error> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let tokens = pointer
        .strip_prefix('/')
        .ok_or_else(|| Error::Pointer(format!("\"{}\" must start with \"/\"", pointer)))?;
    Ok(tokens
        .split('/')
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect())
}

/// Child of `value` addressed by a single reference token.
pub fn child<'a>(value: &'a Value, token: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(token),
        Value::Array(items) => array_index(token).and_then(|index| items.get(index)),
        _ => None,
    }
}

/// Array indexes are decimal without leading zeros.
pub fn array_index(token: &str) -> Option<usize> {
    if token.is_empty() || (token.len() > 1 && token.starts_with('0')) || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve<'a>(document: &'a Value, pointer: &str) -> Result<Option<&'a Value>, Error> {
        let tokens = parse_pointer(pointer)?;
        Ok(tokens.iter().try_fold(document, |value, token| child(value, token)))
    }

    #[test]
    fn escaping() {
        assert_eq!(parse_pointer("/a~1b/m~0n/~01").unwrap(), vec!["a/b", "m~n", "~1"]);
        assert_eq!(parse_pointer("").unwrap(), Vec::<String>::new());
        assert_eq!(parse_pointer("/").unwrap(), vec![""]);
        assert!(matches!(parse_pointer("a/b"), Err(Error::Pointer(_))));
    }

    #[test]
    fn rfc6901_examples() {
        let document = json!({
            "foo": ["bar", "baz"],
            "": 0,
            "a/b": 1,
            "m~n": 8
        });
        assert_eq!(resolve(&document, "/foo/0").unwrap(), Some(&json!("bar")));
        assert_eq!(resolve(&document, "/").unwrap(), Some(&json!(0)));
        assert_eq!(resolve(&document, "/a~1b").unwrap(), Some(&json!(1)));
        assert_eq!(resolve(&document, "/m~0n").unwrap(), Some(&json!(8)));
        assert_eq!(resolve(&document, "/foo/2").unwrap(), None);
        assert_eq!(resolve(&document, "/foo/01").unwrap(), None);
    }
}
