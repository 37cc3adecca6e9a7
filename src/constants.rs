/// Fixed attribute vocabularies shared across the normalizers.
/// These lists mirror what the on-device collector emits and must stay in
/// sync with it; keys are matched exactly, never by pattern.

/// Placeholder strings the collector writes when a probe produced no data
/// (method not called, field not captured, probe error, textual nulls).
pub const SKIP_SENTINELS: [&str; 5] = ["MNC", "FNC", "ERR", "NULL", "UNDEFINED"];

/// Collector bookkeeping keys. These describe the snapshot itself rather
/// than a device attribute and are consumed upstream, so no normalizer
/// owns them.
pub const METADATA_ATTRIBUTES: [&str; 8] = [
    "isDeviceRooted",
    "execution_time",
    "uuid",
    "timestamp",
    "nbSdk",
    "isDeveloperModeEnabled",
    "isDeviceVirtual",
    "structureSdk",
];

/// Every attribute produced by the shell-command explorer, keyed by the
/// collector's command aliases.
pub const SHELL_ATTRIBUTES: [&str; 44] = [
    "cpu_information",
    "memory_information",
    "device_tree",
    "storage_information",
    "acpi_battery",
    "nproc",
    "lsmod",
    "lspci",
    "lsusb",
    "system_root_structure",
    "system_typefaces",
    "ringtones_list",
    "ringtones_list_ext",
    "df",
    "kernel_information",
    "distribution_information",
    "system_uptime",
    "sysctl",
    "system_conf_vars",
    "installed_packages",
    "running_processes",
    "user_accounts",
    "groups",
    "hostname",
    "hwclock",
    "tty",
    "ssty_active",
    "dmesg_first_1000_lines",
    "dmesg_last_1000_lines",
    "authentication_logs",
    "arp_cache",
    "dumpsys",
    "meminfo",
    "cpuinfo",
    "system_logs",
    "getprop_net_dns1",
    "getprop_net_dns2",
    "getprop_net_dns3",
    "getprop_net_dns4",
    "getprop",
    "netstat",
    "network_interfaces",
    "routing_table",
    "routing_table_n",
];

/// Shell attributes whose only signal is "the command ran without error".
/// Their output is replaced by the presence marker.
pub const PRESENCE_ONLY_SHELL_ATTRIBUTES: [&str; 17] = [
    "cpu_information",
    "device_tree",
    "storage_information",
    "lsmod",
    "lspci",
    "lsusb",
    "distribution_information",
    "sysctl",
    "system_conf_vars",
    "installed_packages",
    "running_processes",
    "hwclock",
    "tty",
    "ssty_active",
    "authentication_logs",
    "routing_table",
    "routing_table_n",
];

/// Shell attributes carrying `ls -l` style directory listings.
pub const LISTING_SHELL_ATTRIBUTES: [&str; 4] = [
    "system_root_structure",
    "system_typefaces",
    "ringtones_list",
    "ringtones_list_ext",
];

/// Settings endpoints that return multi-row `name`/`value` dumps and are
/// coalesced into a single map instead of a presence marker.
pub const SETTINGS_PROVIDER_ATTRIBUTES: [&str; 6] = [
    "content://settings/system/alarm_alert",
    "content://settings/system/notification_sound",
    "content://settings/secure",
    "content://settings/global",
    "content://settings/system",
    "content://settings/system/ringtone",
];

/// Reflection attributes with no fingerprinting signal (clipboard
/// accessors return per-session content, not device identity).
pub const IGNORED_SDK_ATTRIBUTES: [&str; 4] = [
    "android.content.ClipboardManager.getPrimaryClip",
    "android.content.ClipboardManager.getText",
    "android.text.ClipboardManager.getPrimaryClip",
    "android.text.ClipboardManager.getText",
];

/// Reflection key whose list value is forwarded untouched; the profile
/// builder needs the raw account structure.
pub const RAW_LIST_SDK_ATTRIBUTE: &str = "android.accounts.AccountManager.getAccounts";

/// Substring marking reflection keys that captured a stack trace.
pub const STACK_TRACE_MARKER: &str = "getStackTrace";

/// URI scheme prefix identifying content-provider attributes.
pub const CONTENT_PROVIDER_SCHEME: &str = "content://";

/// Interface name excluded from the network-address extraction.
pub const LOOPBACK_INTERFACE: &str = "lo";

/// Snapshot key holding the collection timestamp (Unix seconds or
/// milliseconds), consumed by the uptime extractor.
pub const TIMESTAMP_ATTRIBUTE: &str = "timestamp";

/// Whether a key is collector bookkeeping rather than a device attribute.
pub fn is_metadata_attribute(key: &str) -> bool {
    METADATA_ATTRIBUTES.contains(&key)
}

/// Whether a key is one of the shell command aliases.
pub fn is_shell_attribute(key: &str) -> bool {
    SHELL_ATTRIBUTES.contains(&key)
}

/// Whether a key addresses a content provider.
pub fn is_content_provider_attribute(key: &str) -> bool {
    key.starts_with(CONTENT_PROVIDER_SCHEME)
}

pub fn is_presence_only_shell_attribute(key: &str) -> bool {
    PRESENCE_ONLY_SHELL_ATTRIBUTES.contains(&key)
}

pub fn is_listing_shell_attribute(key: &str) -> bool {
    LISTING_SHELL_ATTRIBUTES.contains(&key)
}

pub fn is_settings_provider_attribute(key: &str) -> bool {
    SETTINGS_PROVIDER_ATTRIBUTES.contains(&key)
}

pub fn is_ignored_sdk_attribute(key: &str) -> bool {
    IGNORED_SDK_ATTRIBUTES.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_only_and_listing_are_shell_attributes() {
        for key in PRESENCE_ONLY_SHELL_ATTRIBUTES {
            assert!(is_shell_attribute(key), "{key} missing from shell list");
        }
        for key in LISTING_SHELL_ATTRIBUTES {
            assert!(is_shell_attribute(key), "{key} missing from shell list");
        }
    }

    #[test]
    fn test_vocabularies_disjoint() {
        for key in SHELL_ATTRIBUTES {
            assert!(!is_metadata_attribute(key));
            assert!(!is_content_provider_attribute(key));
        }
        for key in SETTINGS_PROVIDER_ATTRIBUTES {
            assert!(is_content_provider_attribute(key));
        }
    }
}
