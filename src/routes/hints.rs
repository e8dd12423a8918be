// Provider hints: a coarse provider label per route, with the evidence used

use serde::Serialize;

use super::parser::GatewayRef;
use super::{Route, Vcn};
use crate::interfaces::InterfaceIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HintEvidence {
    InterfaceComment,
    RouteComment,
    GatewayName,
    GatewayPrefix,
    Unclassified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderHint {
    pub vcn: Vcn,
    pub destination: String,
    pub gateway: String,
    pub provider: String,
    pub evidence: HintEvidence,
    pub interface_comment: Option<String>,
}

/// (provider, keywords) checked in order against interface comments
const INTERFACE_KEYWORDS: &[(&str, &[&str])] = &[
    ("gary", &["gary"]),
    ("plankton", &["plankton", "plakton"]),
    ("weclix", &["weclix"]),
    ("maxvibe", &["maxvibe"]),
    ("radio", &["radio"]),
    ("mpls", &["mpls"]),
];

const ROUTE_KEYWORDS: &[(&str, &[&str])] = &[
    ("gary", &["gary"]),
    ("plankton", &["plankton", "plakton"]),
];

const GATEWAY_KEYWORDS: &[(&str, &[&str])] = &[("weclix", &["weclix"]), ("maxvibe", &["maxvibe"])];

/// (gateway prefix, provider)
const GATEWAY_PREFIXES: &[(&str, &str)] = &[
    ("pppoe-", "pppoe"),
    ("l2tp-", "tunnel"),
    ("vlan", "vlan"),
    ("ether", "ether"),
];

fn keyword_match(text: &str, table: &[(&'static str, &[&str])]) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(provider, _)| *provider)
}

pub fn provider_hint(route: &Route, index: &InterfaceIndex) -> ProviderHint {
    let gw = GatewayRef::parse(&route.gateway);
    let interface_comment = gw
        .interface
        .and_then(|name| index.comment(name))
        .map(str::to_string);

    let iface_comment = interface_comment.as_deref().unwrap_or_default().to_lowercase();
    let route_comment = route.observation.as_deref().unwrap_or_default().to_lowercase();
    let gateway = route.gateway.to_lowercase();

    let (provider, evidence) = keyword_match(&iface_comment, INTERFACE_KEYWORDS)
        .map(|p| (p, HintEvidence::InterfaceComment))
        .or_else(|| keyword_match(&route_comment, ROUTE_KEYWORDS).map(|p| (p, HintEvidence::RouteComment)))
        .or_else(|| keyword_match(&gateway, GATEWAY_KEYWORDS).map(|p| (p, HintEvidence::GatewayName)))
        .or_else(|| {
            GATEWAY_PREFIXES
                .iter()
                .find(|(prefix, _)| gateway.starts_with(prefix))
                .map(|(_, p)| (*p, HintEvidence::GatewayPrefix))
        })
        .unwrap_or(("unknown", HintEvidence::Unclassified));

    ProviderHint {
        vcn: route.vcn,
        destination: route.destination.clone(),
        gateway: route.gateway.clone(),
        provider: provider.to_string(),
        evidence,
        interface_comment,
    }
}

pub fn provider_hints(routes: &[Route], index: &InterfaceIndex) -> Vec<ProviderHint> {
    routes.iter().map(|r| provider_hint(r, index)).collect()
}
