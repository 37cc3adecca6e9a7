use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use super::{CommandDecoder, CommandKind, DecodeError};

static IPV4_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"inet (?:addr:)?(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})").unwrap());

/// Line-format parsers for the fixed set of commands the collector runs.
/// Android ships busybox/toybox variants of these tools, so the parsers
/// are tolerant: unknown lines are ignored rather than rejected.
#[derive(Debug, Default, Clone)]
pub struct BuiltinDecoder;

impl BuiltinDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl CommandDecoder for BuiltinDecoder {
    fn decode(&self, command: CommandKind, text: &str) -> Result<Value, DecodeError> {
        match command {
            CommandKind::Free => decode_free(text),
            CommandKind::ProcMeminfo => Ok(decode_meminfo(text)),
            CommandKind::ProcCpuinfo => Ok(decode_cpuinfo(text)),
            CommandKind::Df => Ok(decode_df(text)),
            CommandKind::Ifconfig => Ok(decode_ifconfig(text)),
            CommandKind::Netstat => Ok(decode_netstat(text)),
        }
    }
}

/// `free` output: a header naming the columns, then one row per memory
/// class ("Mem:", "Swap:").
fn decode_free(text: &str) -> Result<Value, DecodeError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| DecodeError::malformed(CommandKind::Free, "empty output"))?;
    let columns: Vec<String> = header
        .split_whitespace()
        .map(|c| c.replace('/', "_"))
        .collect();
    if columns.is_empty() {
        return Err(DecodeError::malformed(CommandKind::Free, "missing header"));
    }

    let mut rows = Vec::new();
    for line in lines {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else { continue };
        let mut row = Map::new();
        row.insert("type".to_string(), Value::from(label.trim_end_matches(':')));
        for (column, field) in columns.iter().zip(fields) {
            row.insert(column.clone(), number_or_string(field));
        }
        rows.push(Value::Object(row));
    }
    Ok(Value::Array(rows))
}

/// `/proc/meminfo`: `Key:  12345 kB` per line. Values are reported in kB;
/// the unit suffix is dropped.
fn decode_meminfo(text: &str) -> Value {
    let mut map = Map::new();
    for line in text.lines() {
        let Some((key, rest)) = line.split_once(':') else { continue };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let Some(amount) = rest.split_whitespace().next() else { continue };
        map.insert(key.to_string(), number_or_string(amount));
    }
    Value::Object(map)
}

/// `/proc/cpuinfo`: blank-line separated blocks of `field : value` pairs,
/// one block per logical processor. Field names are lowercased with
/// underscores so consumers see stable keys.
fn decode_cpuinfo(text: &str) -> Value {
    let mut rows = Vec::new();
    let mut row = Map::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !row.is_empty() {
                rows.push(Value::Object(std::mem::take(&mut row)));
            }
            continue;
        }
        let Some((field, value)) = line.split_once(':') else { continue };
        let field = field.trim().to_lowercase().replace(' ', "_");
        if field.is_empty() {
            continue;
        }
        row.insert(field, number_or_string(value.trim()));
    }
    if !row.is_empty() {
        rows.push(Value::Object(row));
    }
    Value::Array(rows)
}

/// `df` output: six columns with the mount point last. Mount points may
/// contain spaces, so everything past the fifth column joins back up.
fn decode_df(text: &str) -> Value {
    let mut rows = Vec::new();
    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 || fields[0] == "Filesystem" {
            continue;
        }
        rows.push(json!({
            "filesystem": fields[0],
            "1k_blocks": number_or_string(fields[1]),
            "used": number_or_string(fields[2]),
            "available": number_or_string(fields[3]),
            "use_percent": number_or_string(fields[4].trim_end_matches('%')),
            "mounted_on": fields[5..].join(" "),
        }));
    }
    Value::Array(rows)
}

/// `ifconfig` in either the classic (`inet addr:…`) or net-tools 2
/// (`inet …`) layout. One row per interface; `ipv4_addr` is null when the
/// interface has no IPv4 address.
fn decode_ifconfig(text: &str) -> Value {
    let mut rows: Vec<Value> = Vec::new();
    let mut current: Option<Map<String, Value>> = None;
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        if !line.starts_with(char::is_whitespace) {
            if let Some(row) = current.take() {
                rows.push(Value::Object(row));
            }
            let Some(name) = line.split_whitespace().next() else { continue };
            let mut row = Map::new();
            row.insert("name".to_string(), Value::from(name.trim_end_matches(':')));
            row.insert("ipv4_addr".to_string(), Value::Null);
            current = Some(row);
            continue;
        }
        if let Some(row) = current.as_mut() {
            if let Some(addr) = IPV4_RE.captures(line).and_then(|c| c.get(1)) {
                row.insert("ipv4_addr".to_string(), Value::from(addr.as_str()));
            }
        }
    }
    if let Some(row) = current.take() {
        rows.push(Value::Object(row));
    }
    Value::Array(rows)
}

/// `netstat` internet-connection tables. Rows before the column header or
/// in the UNIX-socket section are ignored.
fn decode_netstat(text: &str) -> Value {
    let mut rows = Vec::new();
    let mut in_table = false;
    for line in text.lines() {
        if line.starts_with("Proto") {
            in_table = line.contains("Local Address");
            continue;
        }
        if !in_table {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5
            || (!fields[0].starts_with("tcp") && !fields[0].starts_with("udp"))
        {
            continue;
        }
        rows.push(json!({
            "proto": fields[0],
            "local_address": fields[3],
            "foreign_address": fields[4],
            "state": fields.get(5).copied().unwrap_or(""),
        }));
    }
    Value::Array(rows)
}

fn number_or_string(field: &str) -> Value {
    if !field.is_empty() && field.chars().all(|c| c.is_ascii_digit()) {
        match field.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::from(field),
        }
    } else {
        Value::from(field)
    }
}
