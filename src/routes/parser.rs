// Route parser for terse `/ip route print detail` output
//
// Two passes: an interface index is built first (comments, declared and
// MAC-inferred parents), then route records are extracted and enriched.

use std::net::IpAddr;

use super::cidr::longest_match;
use super::{Route, VcnTable, status_reachable};
use crate::error::RecordIssue;
use crate::interfaces::{Interface, InterfaceIndex, IpAddressBinding};
use crate::terse::{Record, recordize};

/// A gateway token split into its address and interface parts.
///
/// `immediate-gw` may read `10.0.0.2%vlan100`; plain `gateway` is either
/// an address or an interface name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayRef<'a> {
    pub ip: Option<IpAddr>,
    pub interface: Option<&'a str>,
}

impl<'a> GatewayRef<'a> {
    pub fn parse(gateway: &'a str) -> Self {
        let gateway = gateway.trim();
        match gateway.split_once('%') {
            Some((addr, iface)) => GatewayRef {
                ip: addr.parse().ok(),
                interface: Some(iface).filter(|i| !i.is_empty()),
            },
            None => match gateway.parse() {
                Ok(ip) => GatewayRef {
                    ip: Some(ip),
                    interface: None,
                },
                Err(_) => GatewayRef {
                    ip: None,
                    interface: Some(gateway).filter(|g| !g.is_empty()),
                },
            },
        }
    }
}

pub struct RouteParser<'a> {
    source_ip: &'a str,
    ip_addresses: &'a [IpAddressBinding],
    index: InterfaceIndex,
    table: &'a VcnTable,
    log_dropped: bool,
}

impl<'a> RouteParser<'a> {
    pub fn new(
        source_ip: &'a str,
        ip_addresses: &'a [IpAddressBinding],
        interfaces: &[Interface],
        table: &'a VcnTable,
    ) -> Self {
        RouteParser {
            source_ip,
            ip_addresses,
            index: InterfaceIndex::new(interfaces),
            table,
            log_dropped: false,
        }
    }

    /// Log dropped records at warn instead of debug
    pub fn log_dropped(mut self, enabled: bool) -> Self {
        self.log_dropped = enabled;
        self
    }

    pub fn index(&self) -> &InterfaceIndex {
        &self.index
    }

    pub fn parse(&self, text: &str) -> (Vec<Route>, Vec<RecordIssue>) {
        let mut routes = Vec::new();
        let mut issues = Vec::new();

        for raw in recordize(text) {
            match self.parse_record(&Record::parse(&raw)) {
                Ok(route) => routes.push(route),
                Err(missing) => {
                    let issue = RecordIssue::malformed("route", missing, &raw);
                    if self.log_dropped {
                        tracing::warn!(source_ip = %self.source_ip, "{}", issue);
                    } else {
                        tracing::debug!(source_ip = %self.source_ip, "{}", issue);
                    }
                    issues.push(issue);
                }
            }
        }

        (routes, issues)
    }

    fn parse_record(&self, record: &Record) -> Result<Route, Vec<&'static str>> {
        let destination = record.non_empty("dst-address");
        let gateway = record
            .non_empty("immediate-gw")
            .or_else(|| record.non_empty("gateway"));
        let distance = record.non_empty("distance");

        let (Some(destination), Some(gateway), Some(distance)) = (destination, gateway, distance)
        else {
            let missing = [
                ("dst-address", destination.is_none()),
                ("gateway", gateway.is_none()),
                ("distance", distance.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, absent)| absent.then_some(field))
            .collect();
            return Err(missing);
        };

        let gateway_status = record.non_empty("gateway-status").map(str::to_string);
        let observation = record.non_empty("comment").map(str::to_string);

        let vcn = self.table.classify(destination, observation.as_deref());
        let active = record.has_flag('A') || gateway_status.as_deref().is_some_and(status_reachable);

        let mut route = Route {
            vcn,
            source_ip: self.source_ip.to_string(),
            destination: destination.to_string(),
            gateway: gateway.to_string(),
            gateway_status,
            distance: distance.to_string(),
            comment: None,
            observation,
            active,
        };

        if route.gateway_unreachable() {
            route.comment = self.resolve_comment(&route.gateway).map(str::to_string);
        }

        Ok(route)
    }

    /// Comment of the interface behind an unreachable gateway: the owner
    /// of the gateway address first, then the gateway as an interface name.
    pub fn resolve_comment(&self, gateway: &str) -> Option<&str> {
        let gw = GatewayRef::parse(gateway);
        self.owner_by_address(&gw).or_else(|| self.gateway_interface(&gw))
    }

    fn owner_by_address(&self, gw: &GatewayRef<'_>) -> Option<&str> {
        let ip = gw.ip?;
        let binding = longest_match(self.ip_addresses, ip, |b| b.address.as_str())?;
        self.index.comment_or_parent(&binding.interface_name)
    }

    fn gateway_interface(&self, gw: &GatewayRef<'_>) -> Option<&str> {
        self.index.comment_or_parent(gw.interface?)
    }
}

pub fn parse_routes(
    text: &str,
    source_ip: &str,
    ip_addresses: &[IpAddressBinding],
    interfaces: &[Interface],
) -> Vec<Route> {
    parse_routes_with_table(text, source_ip, ip_addresses, interfaces, &VcnTable::default())
}

pub fn parse_routes_with_table(
    text: &str,
    source_ip: &str,
    ip_addresses: &[IpAddressBinding],
    interfaces: &[Interface],
    table: &VcnTable,
) -> Vec<Route> {
    RouteParser::new(source_ip, ip_addresses, interfaces, table)
        .parse(text)
        .0
}
