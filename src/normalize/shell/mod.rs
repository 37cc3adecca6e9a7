mod decoded;
mod dmesg;
mod listing;
mod uptime;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::constants::{
    is_listing_shell_attribute, is_presence_only_shell_attribute, is_shell_attribute,
};
use crate::decoder::CommandDecoder;
use crate::skip::is_skipped;
use crate::types::{presence_marker, AttributeDomain, NormalizedValue, RawAttribute};

use super::AttributeNormalizer;

static PROPERTY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[(.+?)\]: \[(.+?)\]").unwrap());

const ACPI_DEVICE_CLASSES: [&str; 4] = ["cooling", "thermal", "adapter", "battery"];

/// Normalizes shell-command output. Dispatch is per command alias: most
/// commands collapse to the presence marker or run one of the
/// line-walking extractors; the six table formats go through the decoder.
pub struct ShellOutputNormalizer {
    decoder: Arc<dyn CommandDecoder>,
}

impl ShellOutputNormalizer {
    pub fn new(decoder: Arc<dyn CommandDecoder>) -> Self {
        Self { decoder }
    }
}

impl AttributeNormalizer for ShellOutputNormalizer {
    fn domain(&self) -> AttributeDomain {
        AttributeDomain::Shell
    }

    fn name(&self) -> &'static str {
        "shell_output"
    }

    fn normalize(&self, attribute: &RawAttribute) -> Option<NormalizedValue> {
        let key = attribute.key.as_str();
        if !is_shell_attribute(key) {
            return None;
        }
        if is_skipped(&attribute.value) {
            return None;
        }
        let value = &attribute.value;
        let result = if is_presence_only_shell_attribute(key) {
            Some(presence_marker())
        } else if is_listing_shell_attribute(key) {
            listing::reduce(value)
        } else {
            match key {
                "system_uptime" => uptime::last_reboot(value, attribute.collected_at_seconds()),
                "memory_information" => decoded::memory_totals(self.decoder.as_ref(), value),
                "meminfo" => decoded::meminfo_totals(self.decoder.as_ref(), value),
                "cpuinfo" => decoded::cpu_profile(self.decoder.as_ref(), value),
                "getprop" => properties(value),
                "acpi_battery" => acpi_readings(value),
                "df" => decoded::filesystems(self.decoder.as_ref(), value),
                "dmesg_first_1000_lines" | "dmesg_last_1000_lines" | "system_logs" => {
                    dmesg::boot_facts(value)
                }
                "network_interfaces" => decoded::interface_addresses(self.decoder.as_ref(), value),
                "netstat" => decoded::socket_addresses(self.decoder.as_ref(), value),
                "dumpsys" => running_services(value),
                _ => single_or_raw(value),
            }
        };
        // Extractors can reduce real output down to nothing; an empty
        // result is a drop, same as an empty capture.
        result.filter(|v| !is_skipped(v))
    }
}

/// Line list out of a raw capture. All-or-nothing: one non-string element
/// poisons the whole capture.
fn string_lines(value: &Value) -> Option<Vec<&str>> {
    let items = value.as_array()?;
    items.iter().map(Value::as_str).collect()
}

/// Appends unless already present, preserving first-seen order.
fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}

fn lines_value(lines: Vec<String>) -> Value {
    Value::Array(lines.into_iter().map(Value::from).collect())
}

/// `getprop` dump: `[key]: [value]` lines folded into a map. All-digit
/// values become integers.
fn properties(value: &Value) -> Option<Value> {
    let lines = string_lines(value)?;
    let mut props = Map::new();
    for line in lines {
        let Some(caps) = PROPERTY_RE.captures(line) else {
            continue;
        };
        let raw = &caps[2];
        if raw.contains(',') {
            // Comma-separated values have never made it into the map;
            // downstream profiles expect them absent.
            continue;
        }
        let parsed = if raw.chars().all(|c| c.is_ascii_digit()) {
            raw.parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::from(raw))
        } else {
            Value::from(raw)
        };
        props.insert(caps[1].to_string(), parsed);
    }
    Some(Value::Object(props))
}

/// `acpi -V` output: one `class reading` pair per distinct device line.
/// Lines naming none of the four device classes are dropped.
fn acpi_readings(value: &Value) -> Option<Value> {
    let lines = string_lines(value)?;
    let mut readings: Vec<String> = Vec::new();
    for line in lines {
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() < 2 {
            continue;
        }
        let label = parts[0].to_lowercase();
        let Some(class) = ACPI_DEVICE_CLASSES.iter().find(|c| label.contains(*c)) else {
            continue;
        };
        let Some(reading) = parts[1].trim().split(' ').next() else {
            continue;
        };
        push_unique(&mut readings, format!("{class} {reading}"));
    }
    Some(lines_value(readings))
}

/// `dumpsys activity services` header block: service lines up to the
/// dashed divider.
fn running_services(value: &Value) -> Option<Value> {
    let lines = string_lines(value)?;
    let mut services: Vec<String> = Vec::new();
    for line in lines {
        if line == "Currently running services:" {
            continue;
        }
        // An empty line ends the block just like the dashed rule does.
        if line.chars().all(|c| c == '-') {
            break;
        }
        services.push(line.trim().to_string());
    }
    Some(lines_value(services))
}

/// Commands without a dedicated extractor: a single line becomes an
/// integer when it is digits with no padding, else a trimmed string;
/// anything longer stays as captured.
fn single_or_raw(value: &Value) -> Option<Value> {
    if let Value::Array(items) = value {
        if items.len() == 1 {
            let line = items[0].as_str()?;
            if !line.is_empty() && line.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(n) = line.parse::<i64>() {
                    return Some(Value::from(n));
                }
            }
            return Some(Value::from(line.trim()));
        }
    }
    Some(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::BuiltinDecoder;
    use serde_json::json;

    fn normalizer() -> ShellOutputNormalizer {
        ShellOutputNormalizer::new(Arc::new(BuiltinDecoder::new()))
    }

    fn normalize(key: &str, value: Value) -> Option<NormalizedValue> {
        normalizer().normalize(&RawAttribute::new(key, value))
    }

    #[test]
    fn test_foreign_key_dropped() {
        assert_eq!(normalize("android.os.Build.MODEL", json!(["x"])), None);
        assert_eq!(normalize("content://settings/global", json!(["x"])), None);
    }

    #[test]
    fn test_skipped_capture_dropped() {
        assert_eq!(normalize("getprop", Value::Null), None);
        assert_eq!(normalize("getprop", json!([])), None);
        assert_eq!(normalize("getprop", json!("ERR")), None);
    }

    #[test]
    fn test_presence_only_commands_marked() {
        assert_eq!(normalize("lsmod", json!(["snd_seq 61440 0"])), Some(json!(1)));
        assert_eq!(
            normalize("installed_packages", json!(["package:com.android.shell"])),
            Some(json!(1))
        );
    }

    #[test]
    fn test_properties_map() {
        let result = normalize(
            "getprop",
            json!([
                "[ro.build.version.sdk]: [34]",
                "[ro.product.model]: [Pixel 7]",
                "[ro.boot.hardware.revision]: [MP1.0]",
                "no brackets here",
            ]),
        );
        assert_eq!(
            result,
            Some(json!({
                "ro.build.version.sdk": 34,
                "ro.product.model": "Pixel 7",
                "ro.boot.hardware.revision": "MP1.0",
            }))
        );
    }

    #[test]
    fn test_properties_comma_values_never_stored() {
        let result = normalize(
            "getprop",
            json!([
                "[ro.product.cpu.abilist]: [arm64-v8a,armeabi-v7a,armeabi]",
                "[ro.product.model]: [Pixel 7]",
            ]),
        );
        assert_eq!(result, Some(json!({"ro.product.model": "Pixel 7"})));
    }

    #[test]
    fn test_acpi_readings_classified_and_deduped() {
        let result = normalize(
            "acpi_battery",
            json!([
                "Battery 0: Full, 100%",
                "Battery 0: Full, 100%",
                "Adapter 0: on-line",
                "Thermal 0: ok, 31.0 degrees C",
                "Unrelated line: ignored",
            ]),
        );
        assert_eq!(
            result,
            Some(json!(["battery Full,", "adapter on-line", "thermal ok,"]))
        );
    }

    #[test]
    fn test_running_services_until_divider() {
        let result = normalize(
            "dumpsys",
            json!([
                "Currently running services:",
                "  accessibility",
                "  account",
                "---------------------------------------",
                "DUMP OF SERVICE accessibility:",
            ]),
        );
        assert_eq!(result, Some(json!(["accessibility", "account"])));
    }

    #[test]
    fn test_single_line_numeric() {
        assert_eq!(normalize("nproc", json!(["8"])), Some(json!(8)));
        assert_eq!(
            normalize("hostname", json!([" localhost "])),
            Some(json!("localhost"))
        );
        assert_eq!(
            normalize("getprop_net_dns1", json!(["8.8.8.8"])),
            Some(json!("8.8.8.8"))
        );
    }

    #[test]
    fn test_single_line_padded_digits_stay_string() {
        // Only an unpadded digit line converts; padding keeps it textual.
        assert_eq!(normalize("nproc", json!([" 8 "])), Some(json!("8")));
    }

    #[test]
    fn test_single_non_string_element_dropped() {
        assert_eq!(normalize("nproc", json!([8])), None);
    }

    #[test]
    fn test_multi_line_fallback_kept_raw() {
        let lines = json!(["uid=0(root) gid=0(root)", "context=kernel"]);
        assert_eq!(normalize("user_accounts", lines.clone()), Some(lines));
    }

    #[test]
    fn test_non_string_line_poisons_extractors() {
        assert_eq!(
            normalize("getprop", json!(["[a]: [1]", 7])),
            None
        );
        assert_eq!(normalize("dumpsys", json!([null, "svc"])), None);
    }

    #[test]
    fn test_empty_after_reduction_dropped() {
        // Real lines, none of which survive their extractor.
        assert_eq!(
            normalize("acpi_battery", json!(["nothing useful here"])),
            None
        );
        assert_eq!(normalize("getprop", json!(["no brackets"])), None);
    }
}
