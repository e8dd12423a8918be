// Routes module - route entities, VCN classification and partner resolution

pub mod cidr;
pub mod hints;
pub mod parser;
pub mod partner;
pub mod vcn;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use parser::{parse_routes, parse_routes_with_table};
pub use partner::{Partner, PartnerResolution, resolve_partners};
pub use vcn::{VcnRule, VcnTable};

/// Distance assigned to routes whose distance is not a number
pub const UNPARSABLE_DISTANCE: u32 = 255;

/// Upstream carrier grouping a route belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vcn {
    Gary,
    Plankton,
    Unknown,
}

impl Vcn {
    /// VCNs that get a partner resolved
    pub const KNOWN: [Vcn; 2] = [Vcn::Gary, Vcn::Plankton];

    pub fn as_str(&self) -> &'static str {
        match self {
            Vcn::Gary => "gary",
            Vcn::Plankton => "plankton",
            Vcn::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Vcn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub vcn: Vcn,
    pub source_ip: String,
    pub destination: String, // CIDR notation
    /// Immediate gateway when the device reports one, otherwise `gateway`
    pub gateway: String,
    pub gateway_status: Option<String>,
    /// Kept as the device printed it
    pub distance: String,
    /// Comment resolved from the owning interface of an unreachable gateway
    pub comment: Option<String>,
    /// The route's own comment
    pub observation: Option<String>,
    pub active: bool,
}

impl Route {
    pub fn distance_value(&self) -> u32 {
        self.distance.trim().parse().unwrap_or(UNPARSABLE_DISTANCE)
    }

    pub fn gateway_reachable(&self) -> bool {
        self.gateway_status.as_deref().is_some_and(status_reachable)
    }

    pub fn gateway_unreachable(&self) -> bool {
        self.gateway_status.as_deref().is_some_and(status_unreachable)
    }
}

pub fn status_unreachable(status: &str) -> bool {
    status.to_ascii_lowercase().contains("unreachable")
}

/// "reachable" without also saying "unreachable"
pub fn status_reachable(status: &str) -> bool {
    let status = status.to_ascii_lowercase();
    status.contains("reachable") && !status.contains("unreachable")
}
