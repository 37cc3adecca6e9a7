use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::classifier::classify;
use crate::constants::{is_ignored_sdk_attribute, RAW_LIST_SDK_ATTRIBUTE, STACK_TRACE_MARKER};
use crate::skip::is_skipped;
use crate::types::{AttributeDomain, NormalizedValue, RawAttribute};

use super::AttributeNormalizer;

/// Default `toString` of a plain object: `com.example.Foo@1a2b3c`. The
/// hex suffix is a memory address, different on every run, so these carry
/// zero signal.
static OBJECT_IDENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w$.]+@[0-9a-fA-F]+$").unwrap());

/// Default `toString` of an array: `[I@7f3c`, `[Ljava.lang.String;@1a2b`.
static ARRAY_IDENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[+L?[\w$.]+;?@[0-9a-fA-F]+$").unwrap());

/// Package-manager record dumps: `ModuleInfo{e90ffd2c com.google.mainline}`.
static MODULE_INFO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+Info\{\w+ ([^}]+)\}").unwrap());

/// Dotted identifiers (package or class names) embedded in free text.
static PACKAGE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-zA-Z][a-zA-Z0-9_]*(?:\.[a-zA-Z][a-zA-Z0-9_]*)+\b").unwrap());

/// Normalizes reflection-explorer output. Keys are `class.member` paths;
/// values are whatever `toString` produced, so most of the work is
/// recovering structure from strings and stripping memory-address noise.
#[derive(Debug, Default)]
pub struct SdkReflectionNormalizer;

impl SdkReflectionNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl AttributeNormalizer for SdkReflectionNormalizer {
    fn domain(&self) -> AttributeDomain {
        AttributeDomain::Sdk
    }

    fn name(&self) -> &'static str {
        "sdk_reflection"
    }

    fn normalize(&self, attribute: &RawAttribute) -> Option<NormalizedValue> {
        if classify(&attribute.key) != AttributeDomain::Sdk {
            return None;
        }
        if is_skipped(&attribute.value) {
            return None;
        }
        if attribute.key.contains(STACK_TRACE_MARKER) {
            return None;
        }
        if is_ignored_sdk_attribute(&attribute.key) {
            return None;
        }
        match &attribute.value {
            Value::String(s) => coerce_string(s),
            Value::Object(_) => flatten_map(&attribute.value),
            Value::Array(items) => {
                if attribute.key == RAW_LIST_SDK_ATTRIBUTE {
                    Some(attribute.value.clone())
                } else {
                    reduce_list(items)
                }
            }
            other => Some(other.clone()),
        }
    }
}

/// Recovers a typed value from a `toString` rendering: booleans, then the
/// identity noise patterns, then numbers, then embedded module or package
/// names. Anything unrecognized stays a trimmed string.
fn coerce_string(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return Some(Value::Bool(true));
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Some(Value::Bool(false));
    }
    if OBJECT_IDENTITY_RE.is_match(trimmed) || ARRAY_IDENTITY_RE.is_match(trimmed) {
        return None;
    }
    if let Some(number) = parse_number(trimmed) {
        return Some(number);
    }

    let module_matches: Vec<&str> = MODULE_INFO_RE
        .captures_iter(trimmed)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    if !module_matches.is_empty() {
        return Some(collapse_matches(module_matches));
    }
    let package_matches: Vec<&str> = PACKAGE_NAME_RE
        .find_iter(trimmed)
        .map(|m| m.as_str())
        .collect();
    if !package_matches.is_empty() {
        return Some(collapse_matches(package_matches));
    }

    Some(Value::from(trimmed))
}

fn parse_number(trimmed: &str) -> Option<Value> {
    if trimmed.contains('.') {
        let parsed: f64 = trimmed.parse().ok()?;
        return Number::from_f64(parsed).map(Value::Number);
    }
    trimmed.parse::<i64>().ok().map(Value::from)
}

fn collapse_matches(matches: Vec<&str>) -> Value {
    if matches.len() == 1 {
        Value::from(matches[0])
    } else {
        Value::Array(matches.into_iter().map(Value::from).collect())
    }
}

/// Flattens nested maps into dot-joined paths. List values descend into
/// their elements under the parent path, without index suffixes, so path
/// collisions overwrite and the last-visited value wins. A list element
/// that is not itself a map aborts the whole flatten.
fn flatten_map(value: &Value) -> Option<NormalizedValue> {
    let mut flat = Map::new();
    let mut stack: Vec<(&Value, String)> = vec![(value, String::new())];
    while let Some((node, prefix)) = stack.pop() {
        let Value::Object(fields) = node else {
            return None;
        };
        for (field, nested) in fields {
            let path = if prefix.is_empty() {
                field.clone()
            } else {
                format!("{prefix}.{field}")
            };
            match nested {
                Value::Object(_) => stack.push((nested, path)),
                Value::Array(items) => {
                    for item in items {
                        stack.push((item, path.clone()));
                    }
                }
                Value::String(s) => {
                    if let Some(coerced) = coerce_string(s) {
                        if !is_skipped(&coerced) {
                            flat.insert(path, coerced);
                        }
                    }
                }
                _ => {
                    if !is_skipped(nested) {
                        flat.insert(path, nested.clone());
                    }
                }
            }
        }
    }
    if flat.is_empty() {
        return None;
    }
    Some(Value::Object(flat))
}

/// Per-element cleanup for list values: skip-worthy elements go, strings
/// are coerced (a coercion that yields a list splices in, a scalar one is
/// re-checked for skip-worthiness), maps are flattened. The survivors are
/// deduplicated preserving first-seen order, keyed on their canonical
/// serialization so map elements dedup too.
fn reduce_list(items: &[Value]) -> Option<NormalizedValue> {
    let mut reduced: Vec<Value> = Vec::new();
    for element in items {
        if is_skipped(element) {
            continue;
        }
        match element {
            Value::String(s) => match coerce_string(s) {
                Some(Value::Array(spliced)) => reduced.extend(spliced),
                Some(coerced) if !is_skipped(&coerced) => reduced.push(coerced),
                _ => continue,
            },
            Value::Object(_) => {
                if let Some(flattened) = flatten_map(element) {
                    reduced.push(flattened);
                }
            }
            other => reduced.push(other.clone()),
        }
    }

    let mut seen = HashSet::new();
    let mut deduped = Vec::new();
    for item in reduced {
        if seen.insert(item.to_string()) {
            deduped.push(item);
        }
    }

    let result = Value::Array(deduped);
    if is_skipped(&result) {
        return None;
    }
    Some(result)
}
