use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::LOOPBACK_INTERFACE;
use crate::decoder::{CommandDecoder, CommandKind};

use super::{lines_value, push_unique, string_lines};

/// Everything after this line is local IPC plumbing, not network state.
const UNIX_SOCKETS_MARKER: &str = "Active UNIX domain sockets (w/o servers)";

fn decode(decoder: &dyn CommandDecoder, command: CommandKind, lines: &[&str]) -> Option<Value> {
    match decoder.decode(command, &lines.join("\n")) {
        Ok(decoded) => Some(decoded),
        Err(error) => {
            debug!("undecodable {} output: {}", command.as_str(), error);
            None
        }
    }
}

/// `free`: one total per memory class, labeled `MemTotal`/`SwapTotal`.
pub(super) fn memory_totals(decoder: &dyn CommandDecoder, value: &Value) -> Option<Value> {
    let lines = string_lines(value)?;
    let rows = decode(decoder, CommandKind::Free, &lines)?;
    let mut totals = Map::new();
    for row in rows.as_array()?.iter() {
        let Some(class) = row.get("type").and_then(Value::as_str) else {
            continue;
        };
        if class != "Mem" && class != "Swap" {
            continue;
        }
        let Some(total) = row.get("total") else {
            continue;
        };
        totals.insert(format!("{class}Total"), total.clone());
    }
    Some(Value::Object(totals))
}

/// `/proc/meminfo`: only the two totals matter for profiling.
pub(super) fn meminfo_totals(decoder: &dyn CommandDecoder, value: &Value) -> Option<Value> {
    let lines = string_lines(value)?;
    let decoded = decode(decoder, CommandKind::ProcMeminfo, &lines)?;
    let mut totals = Map::new();
    for field in ["MemTotal", "SwapTotal"] {
        if let Some(amount) = decoded.get(field) {
            totals.insert(field.to_string(), amount.clone());
        }
    }
    Some(Value::Object(totals))
}

/// `/proc/cpuinfo`: processor count plus each field's distinct readings
/// across cores. A field uniform across cores collapses to a scalar;
/// cores that disagree produce a list in first-seen order.
pub(super) fn cpu_profile(decoder: &dyn CommandDecoder, value: &Value) -> Option<Value> {
    let lines = string_lines(value)?;
    let decoded = decode(decoder, CommandKind::ProcCpuinfo, &lines)?;
    let rows = decoded.as_array()?;

    let mut distinct: BTreeMap<&String, Vec<&Value>> = BTreeMap::new();
    for row in rows {
        let Some(fields) = row.as_object() else {
            continue;
        };
        for (field, reading) in fields {
            if field == "processor" {
                continue;
            }
            let readings = distinct.entry(field).or_default();
            if !readings.contains(&reading) {
                readings.push(reading);
            }
        }
    }

    let mut profile = Map::new();
    profile.insert("nproc".to_string(), Value::from(rows.len()));
    for (field, readings) in distinct {
        if profile.contains_key(field) {
            continue;
        }
        let entry = if readings.len() == 1 {
            readings[0].clone()
        } else {
            Value::Array(readings.into_iter().cloned().collect())
        };
        profile.insert(field.clone(), entry);
    }
    Some(Value::Object(profile))
}

/// `df` rows keyed for dedup. The historical record format pairs the
/// filesystem with itself rather than its mount point; downstream
/// profiles match on that shape.
pub(super) fn filesystems(decoder: &dyn CommandDecoder, value: &Value) -> Option<Value> {
    let lines = string_lines(value)?;
    let rows = decode(decoder, CommandKind::Df, &lines)?;
    let mut mounts: Vec<String> = Vec::new();
    for row in rows.as_array()?.iter() {
        let Some(filesystem) = row.get("filesystem").and_then(Value::as_str) else {
            continue;
        };
        push_unique(&mut mounts, format!("{filesystem} {filesystem}"));
    }
    Some(lines_value(mounts))
}

/// `ifconfig`: distinct IPv4 addresses of the non-loopback interfaces.
pub(super) fn interface_addresses(decoder: &dyn CommandDecoder, value: &Value) -> Option<Value> {
    let lines = string_lines(value)?;
    let rows = decode(decoder, CommandKind::Ifconfig, &lines)?;
    let mut addresses: Vec<String> = Vec::new();
    for row in rows.as_array()?.iter() {
        let Some(name) = row.get("name").and_then(Value::as_str) else {
            continue;
        };
        if name.is_empty() || name.to_lowercase() == LOOPBACK_INTERFACE {
            continue;
        }
        let Some(address) = row.get("ipv4_addr").and_then(Value::as_str) else {
            continue;
        };
        if address.is_empty() {
            continue;
        }
        push_unique(&mut addresses, address.to_string());
    }
    Some(lines_value(addresses))
}

/// `netstat`: distinct local socket addresses, with the UNIX domain
/// section cut off before decoding.
pub(super) fn socket_addresses(decoder: &dyn CommandDecoder, value: &Value) -> Option<Value> {
    let lines = string_lines(value)?;
    let retained: Vec<&str> = lines
        .iter()
        .copied()
        .take_while(|&line| line != UNIX_SOCKETS_MARKER)
        .collect();
    let rows = decode(decoder, CommandKind::Netstat, &retained)?;
    let mut addresses: Vec<String> = Vec::new();
    for row in rows.as_array()?.iter() {
        let Some(address) = row.get("local_address").and_then(Value::as_str) else {
            continue;
        };
        push_unique(&mut addresses, address.to_string());
    }
    Some(lines_value(addresses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{BuiltinDecoder, DecodeError};
    use serde_json::json;

    fn decoder() -> BuiltinDecoder {
        BuiltinDecoder::new()
    }

    #[test]
    fn test_memory_totals() {
        let value = json!([
            "              total        used        free      shared  buff/cache   available",
            "Mem:        3882924     2118812      268744       84512     1495368     1442520",
            "Swap:       2097148      524288     1572860",
        ]);
        assert_eq!(
            memory_totals(&decoder(), &value),
            Some(json!({"MemTotal": 3882924, "SwapTotal": 2097148}))
        );
    }

    #[test]
    fn test_meminfo_totals() {
        let value = json!([
            "MemTotal:        3882924 kB",
            "MemFree:          268744 kB",
            "SwapTotal:       2097148 kB",
            "SwapFree:        1572860 kB",
        ]);
        assert_eq!(
            meminfo_totals(&decoder(), &value),
            Some(json!({"MemTotal": 3882924, "SwapTotal": 2097148}))
        );
    }

    #[test]
    fn test_cpu_profile_collapses_uniform_fields() {
        let value = json!([
            "processor\t: 0",
            "model name\t: ARMv8 Processor rev 4 (v8l)",
            "BogoMIPS\t: 38.40",
            "",
            "processor\t: 1",
            "model name\t: ARMv8 Processor rev 4 (v8l)",
            "BogoMIPS\t: 26.00",
        ]);
        assert_eq!(
            cpu_profile(&decoder(), &value),
            Some(json!({
                "nproc": 2,
                "model_name": "ARMv8 Processor rev 4 (v8l)",
                "bogomips": ["38.40", "26.00"],
            }))
        );
    }

    #[test]
    fn test_filesystems_self_paired_and_deduped() {
        let value = json!([
            "Filesystem     1K-blocks     Used Available Use% Mounted on",
            "/dev/block/dm-4  1486824  1485768         0 100% /",
            "/dev/block/dm-4  1486824  1485768         0 100% /product",
            "tmpfs            1941460     1204   1940256   1% /dev/shm",
        ]);
        assert_eq!(
            filesystems(&decoder(), &value),
            Some(json!(["/dev/block/dm-4 /dev/block/dm-4", "tmpfs tmpfs"]))
        );
    }

    #[test]
    fn test_interface_addresses_skip_loopback() {
        let value = json!([
            "wlan0     Link encap:Ethernet  HWaddr aa:bb:cc:dd:ee:ff",
            "          inet addr:192.168.1.42  Bcast:192.168.1.255  Mask:255.255.255.0",
            "lo        Link encap:Local Loopback",
            "          inet addr:127.0.0.1  Mask:255.0.0.0",
            "dummy0    Link encap:Ethernet  HWaddr 00:00:00:00:00:00",
        ]);
        assert_eq!(
            interface_addresses(&decoder(), &value),
            Some(json!(["192.168.1.42"]))
        );
    }

    #[test]
    fn test_socket_addresses_truncate_unix_section() {
        let value = json!([
            "Active Internet connections (w/o servers)",
            "Proto Recv-Q Send-Q Local Address           Foreign Address         State",
            "tcp        0      0 localhost:5037          localhost:43210         ESTABLISHED",
            "tcp        0      0 localhost:5037          localhost:43211         ESTABLISHED",
            "udp        0      0 0.0.0.0:68              0.0.0.0:*",
            "Active UNIX domain sockets (w/o servers)",
            "Proto RefCnt Flags       Type       State         I-Node Path",
            "unix  2      [ ]         DGRAM                    12345  /dev/socket/logdw",
        ]);
        assert_eq!(
            socket_addresses(&decoder(), &value),
            Some(json!(["localhost:5037", "0.0.0.0:68"]))
        );
    }

    #[test]
    fn test_socket_truncation_requires_exact_marker_line() {
        let value = json!([
            "Active Internet connections (w/o servers)",
            "Proto Recv-Q Send-Q Local Address           Foreign Address         State",
            "tcp        0      0 localhost:5037          localhost:43210         ESTABLISHED",
            "note: Active UNIX domain sockets (w/o servers) section follows",
            "tcp        0      0 localhost:8080          localhost:43211         ESTABLISHED",
            "Active UNIX domain sockets (w/o servers)",
            "unix  2      [ ]         DGRAM                    12345  /dev/socket/logdw",
        ]);
        assert_eq!(
            socket_addresses(&decoder(), &value),
            Some(json!(["localhost:5037", "localhost:8080"]))
        );
    }

    #[test]
    fn test_decode_failure_drops() {
        struct FailingDecoder;
        impl CommandDecoder for FailingDecoder {
            fn decode(&self, command: CommandKind, _text: &str) -> Result<Value, DecodeError> {
                Err(DecodeError::malformed(command, "stubbed"))
            }
        }
        let value = json!(["whatever"]);
        assert_eq!(memory_totals(&FailingDecoder, &value), None);
        assert_eq!(filesystems(&FailingDecoder, &value), None);
    }
}
