//! Rendering of headers and bodies with masking applied.
//!
//! JSON bodies are walked field by field. Anything else that is valid UTF-8
//! is scanned for `name=value` / `"name": "value"` pairs. Neither path can
//! fail the request: errors and panics raised by a masker collapse into
//! [`UNMASKABLE_PAYLOAD`]. The same holds for query strings in logged URLs.

use super::{ALWAYS_MASKED_HEADERS, FieldMasker, MASKED_VALUE, UNMASKABLE_PAYLOAD};

use std::panic::{AssertUnwindSafe, catch_unwind};

use log::warn;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::header::HeaderMap;
use serde_json::{Map, Value};
use url::Url;

const EMPTY_BODY: &str = "-";

static TEXT_FIELD_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r#"(?P<prefix>"?(?P<key>[A-Za-z0-9_.\-]+)"?\s*[:=]\s*"?)(?P<value>[^"&,;\s}\]]+)"#)
        .map_err(|e| warn!("Text masking pattern failed to compile: {e}"))
        .ok()
});

/// Render headers as a JSON object (keys sorted) with sensitive values masked.
pub fn mask_headers(headers: &HeaderMap, masker: &dyn FieldMasker) -> String {
    guarded(|| {
        let mut rendered = Map::new();
        for name in headers.keys() {
            let key = name.as_str();
            let value = if ALWAYS_MASKED_HEADERS.contains(&key) {
                MASKED_VALUE.to_string()
            } else {
                let joined = headers
                    .get_all(name)
                    .iter()
                    .map(|v| v.to_str().map(str::to_string))
                    .collect::<Result<Vec<_>, _>>()
                    .ok()?
                    .join(", ");
                masker.mask(key, &joined).unwrap_or(joined)
            };
            rendered.insert(key.to_string(), Value::String(value));
        }
        Some(Value::Object(rendered).to_string())
    })
}

/// Render a body with every sensitive field masked.
pub fn mask_body(body: Option<&[u8]>, masker: &dyn FieldMasker) -> String {
    let Some(bytes) = body.filter(|b| !b.is_empty()) else {
        return EMPTY_BODY.to_string();
    };

    guarded(|| {
        let text = std::str::from_utf8(bytes).ok()?;
        match serde_json::from_str::<Value>(text) {
            Ok(mut json) => {
                mask_json(&mut json, masker);
                Some(json.to_string())
            }
            Err(_) => mask_text(text, masker),
        }
    })
}

fn mask_json(value: &mut Value, masker: &dyn FieldMasker) {
    match value {
        Value::Object(fields) => {
            for (key, field) in fields.iter_mut() {
                let scalar = match field {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                };
                match scalar {
                    Some(text) => {
                        if let Some(masked) = masker.mask(key, &text) {
                            *field = Value::String(masked);
                        }
                    }
                    None => mask_json(field, masker),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                mask_json(item, masker);
            }
        }
        _ => {}
    }
}

fn mask_text(text: &str, masker: &dyn FieldMasker) -> Option<String> {
    let pattern = TEXT_FIELD_PATTERN.as_ref()?;
    let masked = pattern.replace_all(text, |caps: &Captures<'_>| {
        let prefix = &caps["prefix"];
        let value = &caps["value"];
        match masker.mask(&caps["key"], value) {
            Some(masked) => format!("{prefix}{masked}"),
            None => format!("{prefix}{value}"),
        }
    });
    Some(masked.into_owned())
}

/// Render `url` with its query parameters masked like body fields.
///
/// A panicking masker replaces the whole query with the placeholder.
pub fn mask_url(url: &Url, masker: &dyn FieldMasker) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    match catch_unwind(AssertUnwindSafe(|| mask_query(url, masker))) {
        Ok(masked) => masked,
        Err(_) => {
            warn!("Masking panicked, query replaced by placeholder");
            let mut bare = url.clone();
            bare.set_query(None);
            bare.set_fragment(None);
            format!("{bare}?{UNMASKABLE_PAYLOAD}")
        }
    }
}

fn mask_query(url: &Url, masker: &dyn FieldMasker) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let masked = masker.mask(&key, &value).unwrap_or_else(|| value.into_owned());
            (key.into_owned(), masked)
        })
        .collect();

    let mut masked = url.clone();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

/// Run `render`, degrading to the placeholder on `None` or panic.
fn guarded<F>(render: F) -> String
where
    F: FnOnce() -> Option<String>,
{
    match catch_unwind(AssertUnwindSafe(render)) {
        Ok(Some(rendered)) => rendered,
        Ok(None) => UNMASKABLE_PAYLOAD.to_string(),
        Err(_) => {
            warn!("Masking panicked, payload replaced by placeholder");
            UNMASKABLE_PAYLOAD.to_string()
        }
    }
}
