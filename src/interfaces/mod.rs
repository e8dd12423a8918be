// Interfaces module - interface and IP address entities parsed from a dump

pub mod index;
pub mod parser;

use serde::{Deserialize, Serialize};

pub use index::InterfaceIndex;
pub use parser::{parse_interfaces, parse_ip_addresses};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interface {
    pub source_ip: String,
    pub name: String,
    /// Empty when the device carries no comment
    pub comment: String,
    /// Parent declared by the device itself (`interface=`)
    pub parent_interface_name: Option<String>,
    pub mac_address: Option<String>,
    /// Device-reported type (`type=`), e.g. `ether`, `vlan`, `pppoe-out`
    #[serde(rename = "type")]
    pub interface_type: Option<String>,
}

impl Interface {
    pub fn is_vlan(&self) -> bool {
        match self.interface_type.as_deref() {
            Some(t) => t.eq_ignore_ascii_case("vlan"),
            None => self.name.to_ascii_lowercase().starts_with("vlan"),
        }
    }

    /// Physical ethernet ports, including SFP cages reported as `ether`.
    pub fn is_physical_ethernet(&self) -> bool {
        match self.interface_type.as_deref() {
            Some(t) => t.eq_ignore_ascii_case("ether"),
            None => {
                let name = self.name.to_ascii_lowercase();
                name.starts_with("ether") || name.starts_with("sfp") || name.starts_with("combo")
            }
        }
    }
}

/// "This interface owns this address/subnet."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAddressBinding {
    pub source_ip: String,
    /// CIDR, e.g. `10.0.0.1/30`
    pub address: String,
    pub interface_name: String,
    pub comment: String,
}
