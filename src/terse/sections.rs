// Section splitter: partitions a combined dump into interface, IP address
// and route buckets using structural signatures

use serde::{Deserialize, Serialize};

use super::record::{Record, recordize};
use crate::error::RecordIssue;

/// Raw text buckets, one record per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sections {
    pub interfaces: String,
    pub ip_addresses: String,
    pub routes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Route,
    Interface,
    IpAddress,
}

/// Classify one parsed record.
///
/// Two-field signatures are checked first in priority order (route,
/// interface, IP address); only when none match do single-signal
/// fallbacks apply, in the same order.
pub fn classify(record: &Record) -> Option<SectionKind> {
    let is_route =
        record.has("dst-address") && (record.has("gateway") || record.has("immediate-gw"));
    let is_interface = record.has("name") && record.has("type");
    let is_ip_address = record.has("address") && record.has("network");

    if is_route {
        Some(SectionKind::Route)
    } else if is_interface {
        Some(SectionKind::Interface)
    } else if is_ip_address {
        Some(SectionKind::IpAddress)
    } else if record.has("dst-address") {
        Some(SectionKind::Route)
    } else if record.has("name") {
        Some(SectionKind::Interface)
    } else if record.has("address") {
        Some(SectionKind::IpAddress)
    } else {
        None
    }
}

/// Split a combined dump into its three buckets.
pub fn split_sections(raw: &str) -> Sections {
    split_sections_with_issues(raw).0
}

/// Same as [`split_sections`], also returning the records that matched
/// no bucket.
pub fn split_sections_with_issues(raw: &str) -> (Sections, Vec<RecordIssue>) {
    let mut interfaces = Vec::new();
    let mut ip_addresses = Vec::new();
    let mut routes = Vec::new();
    let mut issues = Vec::new();

    for rec in recordize(raw) {
        match classify(&Record::parse(&rec)) {
            Some(SectionKind::Route) => routes.push(rec),
            Some(SectionKind::Interface) => interfaces.push(rec),
            Some(SectionKind::IpAddress) => ip_addresses.push(rec),
            None => {
                tracing::trace!(record = %rec, "record matches no section");
                issues.push(RecordIssue::AmbiguousClassification { record: rec });
            }
        }
    }

    (
        Sections {
            interfaces: interfaces.join("\n"),
            ip_addresses: ip_addresses.join("\n"),
            routes: routes.join("\n"),
        },
        issues,
    )
}
