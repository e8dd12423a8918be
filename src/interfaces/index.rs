// Interface lookup index: comments, declared parents and MAC-inferred parents
//
// VLANs frequently inherit the MAC of their underlying port without
// declaring it as a parent. The index recovers that link by MAC equality
// with a physical ethernet port. Names are matched case-insensitively.

use std::collections::{BTreeMap, HashMap};

use super::Interface;

#[derive(Debug, Clone, Default)]
pub struct InterfaceIndex {
    comments: HashMap<String, String>,
    declared_parents: HashMap<String, String>,
    inferred_parents: BTreeMap<String, String>,
    physical_by_mac: HashMap<String, String>,
}

impl InterfaceIndex {
    pub fn new(interfaces: &[Interface]) -> Self {
        let mut index = InterfaceIndex::default();

        for iface in interfaces {
            let key = iface.name.to_ascii_lowercase();

            index
                .comments
                .entry(key.clone())
                .or_insert_with(|| iface.comment.clone());

            if let Some(parent) = &iface.parent_interface_name {
                index.declared_parents.entry(key).or_insert_with(|| parent.clone());
            }

            if iface.is_physical_ethernet() {
                if let Some(mac) = &iface.mac_address {
                    index
                        .physical_by_mac
                        .entry(mac.clone())
                        .or_insert_with(|| iface.name.clone());
                }
            }
        }

        for iface in interfaces.iter().filter(|i| i.is_vlan()) {
            let key = iface.name.to_ascii_lowercase();
            if index.declared_parents.contains_key(&key) {
                continue;
            }
            let Some(mac) = &iface.mac_address else {
                continue;
            };
            if let Some(port) = index.physical_by_mac.get(mac) {
                tracing::debug!(vlan = %iface.name, parent = %port, "inferred VLAN parent from MAC");
                index.inferred_parents.insert(key, port.clone());
            }
        }

        index
    }

    /// The interface's own comment, when it has a non-empty one.
    pub fn comment(&self, name: &str) -> Option<&str> {
        self.comments
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }

    /// Declared parent if present, otherwise the MAC-inferred one.
    pub fn parent(&self, name: &str) -> Option<&str> {
        let key = name.to_ascii_lowercase();
        self.declared_parents
            .get(&key)
            .or_else(|| self.inferred_parents.get(&key))
            .map(String::as_str)
    }

    /// The interface's own comment, falling back to its parent's.
    pub fn comment_or_parent(&self, name: &str) -> Option<&str> {
        self.comment(name)
            .or_else(|| self.parent(name).and_then(|p| self.comment(p)))
    }

    /// VLAN name (lowercased) to the physical port it was attached to by MAC.
    pub fn inferred_parents(&self) -> &BTreeMap<String, String> {
        &self.inferred_parents
    }
}
