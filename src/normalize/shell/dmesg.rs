use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{lines_value, push_unique, string_lines};

/// Marker opening the supported-CPU listing in the boot header.
const SUPPORTED_CPUS_MARKER: &str = "KERNEL supported cpus";

/// Banner facts worth keeping, in extraction order: kernel version,
/// compiled-by, compiler version, build date, command line, hypervisor,
/// product, manufacturer.
static BOOT_FACT_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)Linux version ([\d+.]+)",
        r"(?i)\(([^@)]+@[^)]+)\)",
        r"(?i)gcc version ([\d+.x]+)",
        r"(?i)#\d+ SMP PREEMPT (.+)",
        r"(?i)Command line: (.+)",
        r"(?i)Hypervisor detected: (\w+)",
        r"(?i)Product: ([\w\s]+)",
        r"(?i)Manufacturer: ([\w\s]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// A supported-CPU name is bare text; the first line carrying digits or
/// punctuation is the next log entry and ends the capture.
static CPU_SECTION_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[:\d\-_+]").unwrap());

/// Distills kernel log lines into identifying facts: the build banner
/// fields plus the supported-CPU names that follow the boot header. Lines
/// keep their first-seen order and never repeat.
pub(super) fn boot_facts(value: &Value) -> Option<Value> {
    let lines = string_lines(value)?;
    let mut facts: Vec<String> = Vec::new();
    let mut capturing_cpus = false;
    for line in lines {
        let parts: Vec<&str> = line.splitn(3, "] ").collect();
        if parts.len() != 2 {
            continue;
        }
        let content = parts[1].trim();
        if content.contains(SUPPORTED_CPUS_MARKER) {
            capturing_cpus = true;
            continue;
        }
        if capturing_cpus {
            if CPU_SECTION_END_RE.is_match(content) {
                capturing_cpus = false;
            } else {
                push_unique(&mut facts, content.to_string());
            }
            continue;
        }
        for re in BOOT_FACT_RES.iter() {
            for caps in re.captures_iter(content) {
                if let Some(m) = caps.get(1) {
                    push_unique(&mut facts, m.as_str().trim().to_string());
                }
            }
        }
    }
    Some(lines_value(facts))
}
