// Partner resolver: which upstream partner is serving each VCN right now
//
// Per VCN the best route wins (active first, then lowest distance) and its
// partner name comes from the first evidence step that produces one.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::cidr::longest_match;
use super::parser::GatewayRef;
use super::{Route, Vcn};
use crate::interfaces::{Interface, InterfaceIndex, IpAddressBinding};

/// Sentinel returned when no evidence step resolves a partner
pub const NOT_FOUND: &str = "NOT_FOUND";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Partner {
    Found(String),
    NotFound,
}

impl Partner {
    pub fn as_str(&self) -> &str {
        match self {
            Partner::Found(name) => name,
            Partner::NotFound => NOT_FOUND,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Partner::Found(_))
    }
}

impl fmt::Display for Partner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Partner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Which evidence step produced the partner name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    GatewayTunnel,
    StatusTunnel,
    StatusInterface,
    ResolvedComment,
    GatewayInterface,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerResolution {
    pub vcn: Vcn,
    pub partner: Partner,
    pub evidence: Option<Evidence>,
    pub best_route: Option<Route>,
}

type EvidenceStep<'s> = fn(&PartnerResolver<'s>, &Route) -> Option<String>;

pub struct PartnerResolver<'a> {
    index: InterfaceIndex,
    ip_addresses: &'a [IpAddressBinding],
}

impl<'a> PartnerResolver<'a> {
    pub fn new(interfaces: &[Interface], ip_addresses: &'a [IpAddressBinding]) -> Self {
        PartnerResolver {
            index: InterfaceIndex::new(interfaces),
            ip_addresses,
        }
    }

    /// Resolve every known VCN, in VCN order.
    pub fn resolve_all(&self, routes: &[Route]) -> Vec<PartnerResolution> {
        Vcn::KNOWN
            .iter()
            .map(|&vcn| {
                let group: Vec<&Route> = routes.iter().filter(|r| r.vcn == vcn).collect();
                self.resolve(vcn, &group)
            })
            .collect()
    }

    pub fn resolve(&self, vcn: Vcn, routes: &[&Route]) -> PartnerResolution {
        let Some(best) = best_route(routes) else {
            return PartnerResolution {
                vcn,
                partner: Partner::NotFound,
                evidence: None,
                best_route: None,
            };
        };

        let steps: [(Evidence, EvidenceStep<'a>); 5] = [
            (Evidence::GatewayTunnel, Self::gateway_tunnel),
            (Evidence::StatusTunnel, Self::status_tunnel),
            (Evidence::StatusInterface, Self::status_interface),
            (Evidence::ResolvedComment, Self::resolved_comment),
            (Evidence::GatewayInterface, Self::gateway_interface),
        ];

        let hit = steps
            .iter()
            .find_map(|(evidence, step)| step(self, best).map(|name| (name, *evidence)));

        match hit {
            Some((name, evidence)) => {
                tracing::debug!(%vcn, partner = %name, ?evidence, "partner resolved");
                PartnerResolution {
                    vcn,
                    partner: Partner::Found(name),
                    evidence: Some(evidence),
                    best_route: Some(best.clone()),
                }
            }
            None => {
                tracing::debug!(%vcn, gateway = %best.gateway, "no evidence for partner");
                PartnerResolution {
                    vcn,
                    partner: Partner::NotFound,
                    evidence: None,
                    best_route: Some(best.clone()),
                }
            }
        }
    }

    fn gateway_tunnel(&self, route: &Route) -> Option<String> {
        is_pppoe_token(trim_brackets(&route.gateway)).then(|| route.gateway.clone())
    }

    fn status_tunnel(&self, route: &Route) -> Option<String> {
        if !route.gateway_reachable() {
            return None;
        }
        route
            .gateway_status
            .as_deref()?
            .split_whitespace()
            .map(trim_brackets)
            .filter(|t| is_pppoe_token(t))
            .filter_map(|t| t.get(PPPOE_PREFIX.len()..))
            .find(|name| !name.is_empty())
            .map(str::to_string)
    }

    fn status_interface(&self, route: &Route) -> Option<String> {
        if !route.gateway_reachable() {
            return None;
        }
        let candidate = route.gateway_status.as_deref()?.split_whitespace().last()?;
        self.index.comment(candidate).map(str::to_string)
    }

    fn resolved_comment(&self, route: &Route) -> Option<String> {
        route.comment.clone().filter(|c| !c.is_empty())
    }

    fn gateway_interface(&self, route: &Route) -> Option<String> {
        let gw = GatewayRef::parse(&route.gateway);
        let name = match (gw.interface, gw.ip) {
            (Some(iface), _) => iface,
            (None, Some(ip)) => {
                let binding = longest_match(self.ip_addresses, ip, |b| b.address.as_str())?;
                binding.interface_name.as_str()
            }
            (None, None) => return None,
        };
        self.index.comment(name).map(str::to_string)
    }
}

const PPPOE_PREFIX: &str = "pppoe-";

/// Dynamic PPPoE clients show up as `<pppoe-user>`
fn trim_brackets(token: &str) -> &str {
    token.trim_matches(|c| c == '<' || c == '>')
}

fn is_pppoe_token(token: &str) -> bool {
    token
        .get(..PPPOE_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(PPPOE_PREFIX))
}

/// Active beats inactive; then lowest distance. Unparsable distances sort
/// as 255. Ties keep input order.
pub fn best_route<'r>(routes: &[&'r Route]) -> Option<&'r Route> {
    routes
        .iter()
        .copied()
        .min_by_key(|r| (!r.active, r.distance_value()))
}

/// Partner per known VCN, `NOT_FOUND` where nothing resolves.
pub fn resolve_partners(
    interfaces: &[Interface],
    routes: &[Route],
    ip_addresses: &[IpAddressBinding],
) -> BTreeMap<Vcn, Partner> {
    PartnerResolver::new(interfaces, ip_addresses)
        .resolve_all(routes)
        .into_iter()
        .map(|r| (r.vcn, r.partner))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(vcn: Vcn, gateway: &str, status: Option<&str>, distance: &str, active: bool) -> Route {
        Route {
            vcn,
            source_ip: "192.0.2.1".to_string(),
            destination: "191.5.128.105/32".to_string(),
            gateway: gateway.to_string(),
            gateway_status: status.map(String::from),
            distance: distance.to_string(),
            comment: None,
            observation: None,
            active,
        }
    }

    fn iface(name: &str, comment: &str) -> Interface {
        Interface {
            source_ip: "192.0.2.1".to_string(),
            name: name.to_string(),
            comment: comment.to_string(),
            parent_interface_name: None,
            mac_address: None,
            interface_type: None,
        }
    }

    #[test]
    fn test_active_beats_lower_distance() {
        let active = route(Vcn::Gary, "10.0.0.1", None, "10", true);
        let inactive = route(Vcn::Gary, "10.0.0.2", None, "1", false);

        let best = best_route(&[&inactive, &active]).unwrap();
        assert_eq!(best.gateway, "10.0.0.1");
    }

    #[test]
    fn test_lowest_distance_and_unparsable() {
        let a = route(Vcn::Gary, "a", None, "abc", false);
        let b = route(Vcn::Gary, "b", None, "200", false);
        let c = route(Vcn::Gary, "c", None, "200", false);

        assert_eq!(best_route(&[&a, &b, &c]).unwrap().gateway, "b");
        assert!(best_route(&[]).is_none());
    }

    #[test]
    fn test_empty_vcn_is_not_found() {
        let partners = resolve_partners(&[], &[], &[]);

        assert_eq!(partners.len(), 2);
        assert_eq!(partners[&Vcn::Gary], Partner::NotFound);
        assert_eq!(partners[&Vcn::Plankton].to_string(), NOT_FOUND);
    }

    #[test]
    fn test_gateway_tunnel_first() {
        let routes = vec![route(Vcn::Gary, "pppoe-gary01", Some("pppoe-gary01 reachable"), "1", true)];
        let partners = resolve_partners(&[iface("pppoe-gary01", "ignored")], &routes, &[]);

        assert_eq!(partners[&Vcn::Gary], Partner::Found("pppoe-gary01".to_string()));
    }

    #[test]
    fn test_reachable_status_tunnel_and_interface() {
        let interfaces = vec![iface("ether3", "Link Plankton 200M")];
        let routes = vec![
            route(Vcn::Gary, "10.0.0.1", Some("10.0.0.1 reachable via  <pppoe-garyx>"), "1", true),
            route(Vcn::Plankton, "10.0.1.1", Some("10.0.1.1 reachable via  ether3"), "1", true),
        ];

        let resolver = PartnerResolver::new(&interfaces, &[]);
        let resolved = resolver.resolve_all(&routes);

        assert_eq!(resolved[0].partner, Partner::Found("garyx".to_string()));
        assert_eq!(resolved[0].evidence, Some(Evidence::StatusTunnel));
        assert_eq!(resolved[1].partner, Partner::Found("Link Plankton 200M".to_string()));
        assert_eq!(resolved[1].evidence, Some(Evidence::StatusInterface));
    }

    #[test]
    fn test_status_tunnel_returns_name_after_prefix() {
        let bare = route(Vcn::Gary, "10.0.0.1", Some("10.0.0.1 reachable via  pppoe-garyx"), "1", true);
        let resolved = PartnerResolver::new(&[], &[]).resolve(Vcn::Gary, &[&bare]);

        assert_eq!(resolved.partner.as_str(), "garyx");
        assert_eq!(resolved.evidence, Some(Evidence::StatusTunnel));

        let empty = route(Vcn::Gary, "10.0.0.1", Some("10.0.0.1 reachable via  pppoe-"), "1", true);
        let resolved = PartnerResolver::new(&[], &[]).resolve(Vcn::Gary, &[&empty]);
        assert_eq!(resolved.partner, Partner::NotFound);
    }

    #[test]
    fn test_bracketed_pppoe_gateway() {
        let routes = vec![route(
            Vcn::Plankton,
            "<pppoe-cli01>",
            Some("<pppoe-cli01> unreachable"),
            "1",
            false,
        )];
        let resolved = PartnerResolver::new(&[], &[]).resolve_all(&routes);

        assert_eq!(resolved[1].partner, Partner::Found("<pppoe-cli01>".to_string()));
        assert_eq!(resolved[1].evidence, Some(Evidence::GatewayTunnel));
    }

    #[test]
    fn test_resolved_comment_then_gateway_interface() {
        let interfaces = vec![iface("ether4", "Backup radio"), iface("vlan50", "Gary via vlan")];
        let addresses = vec![IpAddressBinding {
            source_ip: "192.0.2.1".to_string(),
            address: "10.5.0.1/30".to_string(),
            interface_name: "vlan50".to_string(),
            comment: String::new(),
        }];

        let mut unreachable = route(Vcn::Gary, "10.9.9.9", Some("10.9.9.9 unreachable"), "1", false);
        unreachable.comment = Some("gary-uplink".to_string());
        let by_name = route(Vcn::Plankton, "ether4", Some("ether4 unreachable"), "1", false);

        let resolver = PartnerResolver::new(&interfaces, &addresses);
        let resolved = resolver.resolve_all(&[unreachable, by_name]);
        assert_eq!(resolved[0].partner.as_str(), "gary-uplink");
        assert_eq!(resolved[0].evidence, Some(Evidence::ResolvedComment));
        assert_eq!(resolved[1].partner.as_str(), "Backup radio");
        assert_eq!(resolved[1].evidence, Some(Evidence::GatewayInterface));

        let by_ip = route(Vcn::Gary, "10.5.0.2", None, "1", false);
        let resolved = resolver.resolve(Vcn::Gary, &[&by_ip]);
        assert_eq!(resolved.partner.as_str(), "Gary via vlan");
    }

    #[test]
    fn test_no_evidence_is_not_found() {
        let routes = vec![route(Vcn::Plankton, "10.0.0.1", Some("10.0.0.1 unreachable"), "1", false)];
        let resolver = PartnerResolver::new(&[], &[]);
        let resolved = resolver.resolve_all(&routes);

        assert_eq!(resolved[1].partner, Partner::NotFound);
        assert!(resolved[1].best_route.is_some());
        assert_eq!(serde_json::to_value(&resolved[1].partner).unwrap(), "NOT_FOUND");
    }

    #[test]
    fn test_unknown_routes_ignored() {
        let routes = vec![route(Vcn::Unknown, "pppoe-x", None, "1", true)];
        let partners = resolve_partners(&[], &routes, &[]);
        assert!(partners.values().all(|p| !p.is_found()));
        assert!(!partners.contains_key(&Vcn::Unknown));
    }
}
