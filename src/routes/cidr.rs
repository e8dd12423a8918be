// CIDR parsing and containment
//
// Malformed addresses or prefixes never raise: they simply match nothing.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    pub network: IpAddr,
    pub prefix_len: u8,
}

impl Cidr {
    /// Parse `a.b.c.d/nn`, a bare address (host route) or `default`.
    pub fn parse(cidr: &str) -> Option<Self> {
        let cidr = cidr.trim();
        if cidr == "default" {
            return Some(Cidr {
                network: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                prefix_len: 0,
            });
        }

        let (addr, prefix) = match cidr.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (cidr, None),
        };

        let network: IpAddr = addr.parse().ok()?;
        let max = max_prefix(network);
        let prefix_len = match prefix {
            Some(p) => p.parse::<u8>().ok().filter(|&len| len <= max)?,
            None => max,
        };

        Some(Cidr {
            network,
            prefix_len,
        })
    }

    /// Whether `ip` falls inside this network.
    pub fn contains_ip(&self, ip: IpAddr) -> bool {
        match (self.network, ip) {
            (IpAddr::V4(net), IpAddr::V4(addr)) => ip_v4_matches(net, addr, self.prefix_len),
            (IpAddr::V6(net), IpAddr::V6(addr)) => ip_v6_matches(net, addr, self.prefix_len),
            _ => false,
        }
    }

    /// Whether `other` is equal to or a subnet of this network.
    pub fn contains(&self, other: &Cidr) -> bool {
        self.prefix_len <= other.prefix_len && self.contains_ip(other.network)
    }
}

fn max_prefix(ip: IpAddr) -> u8 {
    match ip {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

/// `outer` contains `inner` (exact match or subnet containment).
/// Either side failing to parse is a non-match.
pub fn cidr_contains(outer: &str, inner: &str) -> bool {
    match (Cidr::parse(outer), Cidr::parse(inner)) {
        (Some(outer), Some(inner)) => outer.contains(&inner),
        _ => false,
    }
}

/// Check if an IP matches a CIDR and return the prefix length if it does
pub fn matches_cidr(cidr: &str, ip: IpAddr) -> Option<u8> {
    let cidr = Cidr::parse(cidr)?;
    cidr.contains_ip(ip).then_some(cidr.prefix_len)
}

/// Pick the most specific CIDR among `candidates` that contains `ip`.
pub fn longest_match<'a, T, F>(candidates: &'a [T], ip: IpAddr, cidr_of: F) -> Option<&'a T>
where
    F: Fn(&T) -> &str,
{
    let mut best_match: Option<(&T, u8)> = None;

    for candidate in candidates {
        if let Some(prefix_len) = matches_cidr(cidr_of(candidate), ip) {
            match best_match {
                None => best_match = Some((candidate, prefix_len)),
                Some((_, current_len)) if prefix_len > current_len => {
                    best_match = Some((candidate, prefix_len));
                }
                _ => {}
            }
        }
    }

    best_match.map(|(candidate, _)| candidate)
}

fn ip_v4_matches(network: Ipv4Addr, addr: Ipv4Addr, prefix_len: u8) -> bool {
    if prefix_len == 0 {
        return true;
    }
    if prefix_len > 32 {
        return false;
    }

    let mask = u32::MAX << (32 - prefix_len);
    (u32::from(network) & mask) == (u32::from(addr) & mask)
}

fn ip_v6_matches(network: Ipv6Addr, addr: Ipv6Addr, prefix_len: u8) -> bool {
    if prefix_len == 0 {
        return true;
    }
    if prefix_len > 128 {
        return false;
    }

    let mask = u128::MAX << (128 - prefix_len);
    (u128::from(network) & mask) == (u128::from(addr) & mask)
}
