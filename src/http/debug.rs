use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use std::borrow::Cow;

const MASK: &str = "***REDACTED***";
const SECRET_SUFFIXES: [&str; 5] = ["key", "token", "secret", "password", "authorization"];

/// Controls the `[http-debug]` lines printed on stderr with `--verbose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpDebugConfig {
    pub enabled: bool,
    pub redact_secrets: bool,
    pub max_body_chars: usize,
}

impl HttpDebugConfig {
    pub fn from_verbose(verbose: bool) -> Self {
        Self {
            enabled: verbose,
            redact_secrets: true,
            max_body_chars: 4_000,
        }
    }

    pub fn disabled() -> Self {
        Self::from_verbose(false)
    }

    pub fn header_value<'a>(&self, name: &str, value: &'a HeaderValue) -> Cow<'a, str> {
        if self.redact_secrets && is_secret(name) {
            return Cow::Borrowed(MASK);
        }
        value
            .to_str()
            .map_or(Cow::Borrowed("<non-utf8>"), Cow::Borrowed)
    }

    /// Masks secret JSON fields, then caps the length.
    pub fn body(&self, raw: &str) -> String {
        let body = if self.redact_secrets {
            redact_json_body(raw)
        } else {
            Cow::Borrowed(raw)
        };
        truncate_for_log(&body, self.max_body_chars).into_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    fn marker(self) -> char {
        match self {
            Self::Outgoing => '>',
            Self::Incoming => '<',
        }
    }
}

pub fn debug_lines(
    config: HttpDebugConfig,
    direction: Direction,
    start_line: &str,
    headers: &HeaderMap,
    body: &str,
) -> Vec<String> {
    let marker = direction.marker();
    let mut lines = vec![format!("[http-debug] {marker} {start_line}")];
    lines.extend(headers.iter().map(|(name, value)| {
        format!(
            "[http-debug] {marker} {}: {}",
            name.as_str(),
            config.header_value(name.as_str(), value)
        )
    }));
    lines.push(format!("[http-debug] {marker}"));

    let body = config.body(body);
    if body.is_empty() {
        lines.push(format!("[http-debug] {marker} <empty body>"));
    } else {
        lines.extend(body.lines().map(|line| format!("[http-debug] {marker} {line}")));
    }
    lines
}

pub fn truncate_for_log(input: &str, max_chars: usize) -> Cow<'_, str> {
    match input.char_indices().nth(max_chars) {
        None => Cow::Borrowed(input),
        Some((cut, _)) => {
            let dropped = input[cut..].chars().count();
            Cow::Owned(format!("{}... <truncated {dropped} chars>", &input[..cut]))
        }
    }
}

fn redact_json_body(raw: &str) -> Cow<'_, str> {
    let Ok(mut json) = serde_json::from_str::<Value>(raw) else {
        return Cow::Borrowed(raw);
    };
    if !mask_secret_fields(&mut json) {
        return Cow::Borrowed(raw);
    }
    serde_json::to_string(&json).map_or(Cow::Borrowed(raw), Cow::Owned)
}

fn mask_secret_fields(value: &mut Value) -> bool {
    match value {
        Value::Object(map) => {
            let mut masked = false;
            for (key, item) in map.iter_mut() {
                if is_secret(key) {
                    *item = Value::String(MASK.to_string());
                    masked = true;
                } else {
                    masked |= mask_secret_fields(item);
                }
            }
            masked
        }
        Value::Array(items) => items
            .iter_mut()
            .fold(false, |masked, item| mask_secret_fields(item) || masked),
        _ => false,
    }
}

fn is_secret(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    SECRET_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}
