// Classifier pipeline: raw dump -> sections -> interfaces/addresses -> routes -> partners
//
// Each call builds and discards its own lookup maps, so one Classifier can
// serve any number of concurrent dumps.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{AppResult, ClassifierError, RecordIssue};
use crate::interfaces::parser::{parse_interfaces_with_issues, parse_ip_addresses_with_issues};
use crate::interfaces::{Interface, IpAddressBinding};
use crate::routes::hints::{ProviderHint, provider_hints};
use crate::routes::parser::RouteParser;
use crate::routes::partner::PartnerResolver;
use crate::routes::{Partner, PartnerResolution, Route, Vcn, VcnTable};
use crate::terse::sections::split_sections_with_issues;

#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    pub vcn_table: VcnTable,
    /// Log dropped records at warn level instead of debug
    pub log_dropped: bool,
}

/// Everything extracted from one dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub source_ip: String,
    pub interfaces: Vec<Interface>,
    pub ip_addresses: Vec<IpAddressBinding>,
    pub routes: Vec<Route>,
    pub partners: BTreeMap<Vcn, Partner>,
    pub partner_details: Vec<PartnerResolution>,
    pub provider_hints: Vec<ProviderHint>,
    /// VLAN name to the physical port it was attached to by MAC
    pub inferred_parents: BTreeMap<String, String>,
    pub issues: Vec<RecordIssue>,
}

impl Classification {
    pub fn partner(&self, vcn: Vcn) -> Option<&Partner> {
        self.partners.get(&vcn)
    }

    pub fn dropped_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_malformed()).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Classifier { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Run the full pipeline on a captured dump.
    pub fn classify(&self, raw: &str, source_ip: &str) -> Classification {
        let (sections, mut issues) = split_sections_with_issues(raw);

        let (interfaces, iface_issues) = parse_interfaces_with_issues(&sections.interfaces, source_ip);
        let (ip_addresses, ip_issues) =
            parse_ip_addresses_with_issues(&sections.ip_addresses, source_ip);

        for issue in iface_issues.iter().chain(&ip_issues) {
            if self.config.log_dropped {
                tracing::warn!(source_ip, "{}", issue);
            } else {
                tracing::debug!(source_ip, "{}", issue);
            }
        }
        issues.extend(iface_issues);
        issues.extend(ip_issues);

        let route_parser =
            RouteParser::new(source_ip, &ip_addresses, &interfaces, &self.config.vcn_table)
                .log_dropped(self.config.log_dropped);
        let (routes, route_issues) = route_parser.parse(&sections.routes);
        issues.extend(route_issues);

        let partner_details = PartnerResolver::new(&interfaces, &ip_addresses).resolve_all(&routes);
        let partners = partner_details
            .iter()
            .map(|r| (r.vcn, r.partner.clone()))
            .collect();

        let provider_hints = provider_hints(&routes, route_parser.index());
        let inferred_parents = route_parser.index().inferred_parents().clone();

        tracing::info!(
            source_ip,
            interfaces = interfaces.len(),
            ip_addresses = ip_addresses.len(),
            routes = routes.len(),
            issues = issues.len(),
            "classified dump"
        );

        Classification {
            source_ip: source_ip.to_string(),
            interfaces,
            ip_addresses,
            routes,
            partners,
            partner_details,
            provider_hints,
            inferred_parents,
            issues,
        }
    }

    /// Like [`Classifier::classify`], for input that has not been decoded yet.
    /// Anything other than UTF-8 text is a caller error.
    pub fn classify_bytes(&self, raw: &[u8], source_ip: &str) -> AppResult<Classification> {
        let text = std::str::from_utf8(raw)
            .map_err(|e| ClassifierError::InvalidInput(format!("dump is not UTF-8: {}", e)))?;
        Ok(self.classify(text, source_ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"
Flags: X - disabled, R - running
 0  R  name=ether1 default-name=ether1 type=ether mtu=1500 actual-mtu=1500
       mac-address=AA:BB:CC:DD:EE:FF comment=gary-uplink
 1  R  name=ether2 default-name=ether2 type=ether mtu=1500
       mac-address=11:22:33:44:55:66 comment=Link Plankton
 2  R  name=vlan100 type=vlan mtu=1500 mac-address=AA:BB:CC:DD:EE:FF
 3  R  name=pppoe-out1 type=pppoe-out comment=
 0   address=10.10.0.1/30 network=10.10.0.0 interface=vlan100
     actual-interface=vlan100
 1   address=10.20.0.1/30 network=10.20.0.0 interface=ether2
 0   S  dst-address=191.5.128.105/32 gateway=10.10.0.2
        gateway-status=10.10.0.2 unreachable distance=1 scope=30
        target-scope=10 comment=VCN primaria
 1 A S  dst-address=191.5.128.105/32 gateway=10.20.0.2
        gateway-status=10.20.0.2 reachable via  ether2 distance=10
 2 A S  dst-address=172.31.0.0/16 gateway=10.20.0.2
        gateway-status=10.20.0.2 reachable via  ether2 distance=1
        comment=rede plankton
 3   S  dst-address=172.16.0.0/12 gateway=10.10.0.2 comment=sem distancia
"#;

    #[test]
    fn test_full_pipeline() {
        let classifier = Classifier::default();
        let result = classifier.classify(DUMP, "192.0.2.1");

        assert_eq!(result.interfaces.len(), 4);
        assert_eq!(result.ip_addresses.len(), 2);
        assert_eq!(result.routes.len(), 3);
        assert_eq!(result.dropped_count(), 1);

        let unreachable = &result.routes[0];
        assert_eq!(unreachable.vcn, Vcn::Gary);
        assert!(!unreachable.active);
        assert_eq!(unreachable.comment.as_deref(), Some("gary-uplink"));
        assert_eq!(unreachable.observation.as_deref(), Some("VCN primaria"));

        assert_eq!(result.routes[2].vcn, Vcn::Plankton);
        assert_eq!(
            result.inferred_parents.get("vlan100").map(String::as_str),
            Some("ether1")
        );

        // The active route wins for gary even though its distance is higher
        assert_eq!(
            result.partner(Vcn::Gary),
            Some(&Partner::Found("Link Plankton".to_string()))
        );
        assert_eq!(
            result.partner(Vcn::Plankton),
            Some(&Partner::Found("Link Plankton".to_string()))
        );
        assert_eq!(result.provider_hints.len(), 3);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let classifier = Classifier::default();
        let first = classifier.classify(DUMP, "192.0.2.1");
        let second = classifier.classify(DUMP, "192.0.2.1");

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_dump() {
        let result = Classifier::default().classify("", "192.0.2.1");

        assert!(result.routes.is_empty());
        assert_eq!(result.partner(Vcn::Gary), Some(&Partner::NotFound));
        assert_eq!(result.partner(Vcn::Plankton), Some(&Partner::NotFound));
    }

    #[test]
    fn test_classify_bytes_rejects_invalid_utf8() {
        let classifier = Classifier::default();

        assert!(matches!(
            classifier.classify_bytes(&[0xff, 0xfe, 0x00], "192.0.2.1"),
            Err(ClassifierError::InvalidInput(_))
        ));
        assert!(classifier.classify_bytes(DUMP.as_bytes(), "192.0.2.1").is_ok());
    }

    #[test]
    fn test_serialized_field_names() {
        let result = Classifier::default().classify(DUMP, "192.0.2.1");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["partners"]["gary"], "Link Plankton");
        assert_eq!(json["routes"][0]["sourceIp"], "192.0.2.1");
        assert_eq!(json["routes"][0]["gatewayStatus"], "10.10.0.2 unreachable");
        assert_eq!(json["interfaces"][2]["parentInterfaceName"], serde_json::Value::Null);
    }
}
