// Interface and IP address parsers for terse `print detail` output

use super::{Interface, IpAddressBinding};
use crate::error::RecordIssue;
use crate::terse::{Record, recordize};

/// Name prefixes of real device interfaces: ethernet and SFP ports, LTE,
/// VLAN, bridge, loopback, wireless, and tunnel/overlay types.
const INTERFACE_PREFIXES: &[&str] = &[
    "ether", "sfp", "combo", "lte", "vlan", "bridge", "loopback", "wlan", "wifi", "l2tp",
    "pppoe", "eoip", "gre", "ipip", "vxlan",
];

/// Dynamic PPPoE/L2TP server-side clients show up as `<pppoe-user>`.
const CLIENT_PREFIXES: &[&str] = &["<pppoe-", "<l2tp-"];

pub fn is_device_interface(name: &str) -> bool {
    let normalized = name.to_ascii_lowercase();
    INTERFACE_PREFIXES.iter().any(|p| normalized.starts_with(p))
        || CLIENT_PREFIXES.iter().any(|p| normalized.starts_with(p))
}

pub fn parse_interfaces(text: &str, source_ip: &str) -> Vec<Interface> {
    parse_interfaces_with_issues(text, source_ip).0
}

pub fn parse_interfaces_with_issues(
    text: &str,
    source_ip: &str,
) -> (Vec<Interface>, Vec<RecordIssue>) {
    let mut out = Vec::new();
    let mut issues = Vec::new();

    for raw in recordize(text) {
        let record = Record::parse(&raw);
        let Some(name) = record.non_empty("name") else {
            issues.push(RecordIssue::malformed("interface", vec!["name"], &raw));
            continue;
        };

        if !is_device_interface(name) {
            tracing::trace!(name, "ignoring non-device interface");
            continue;
        }

        out.push(Interface {
            source_ip: source_ip.to_string(),
            name: name.to_string(),
            comment: record.get("comment").unwrap_or_default().to_string(),
            parent_interface_name: record.non_empty("interface").map(str::to_string),
            mac_address: record.non_empty("mac-address").map(normalize_mac),
            interface_type: record.non_empty("type").map(str::to_string),
        });
    }

    (out, issues)
}

pub fn parse_ip_addresses(text: &str, source_ip: &str) -> Vec<IpAddressBinding> {
    parse_ip_addresses_with_issues(text, source_ip).0
}

pub fn parse_ip_addresses_with_issues(
    text: &str,
    source_ip: &str,
) -> (Vec<IpAddressBinding>, Vec<RecordIssue>) {
    let mut out = Vec::new();
    let mut issues = Vec::new();

    for raw in recordize(text) {
        let record = Record::parse(&raw);
        let address = record.non_empty("address");
        let interface = record.non_empty("interface");

        let (Some(address), Some(interface)) = (address, interface) else {
            let mut missing = Vec::new();
            if address.is_none() {
                missing.push("address");
            }
            if interface.is_none() {
                missing.push("interface");
            }
            issues.push(RecordIssue::malformed("ip-address", missing, &raw));
            continue;
        };

        out.push(IpAddressBinding {
            source_ip: source_ip.to_string(),
            address: address.to_string(),
            interface_name: interface.to_string(),
            comment: record.get("comment").unwrap_or_default().to_string(),
        });
    }

    (out, issues)
}

pub fn normalize_mac(mac: &str) -> String {
    mac.trim().to_ascii_uppercase().replace('-', ":")
}
