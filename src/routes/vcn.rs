// VCN table: operator-specific prefixes and name aliases per carrier

use serde::{Deserialize, Serialize};

use super::Vcn;
use super::cidr::{Cidr, cidr_contains};
use crate::error::{AppResult, ClassifierError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcnRule {
    pub name: Vcn,

    /// Destinations equal to or inside any of these CIDRs belong to the VCN
    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Case-insensitive tokens that mark a route comment as this VCN's
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VcnTable {
    rules: Vec<VcnRule>,
}

impl Default for VcnTable {
    fn default() -> Self {
        VcnTable {
            rules: vec![
                VcnRule {
                    name: Vcn::Gary,
                    prefixes: vec!["191.5.128.105/32".to_string()],
                    aliases: vec!["gary".to_string()],
                },
                VcnRule {
                    name: Vcn::Plankton,
                    prefixes: Vec::new(),
                    aliases: vec!["plankton".to_string(), "plakton".to_string()],
                },
            ],
        }
    }
}

impl VcnTable {
    pub fn new(rules: Vec<VcnRule>) -> Self {
        VcnTable { rules }
    }

    pub fn rules(&self) -> &[VcnRule] {
        &self.rules
    }

    /// Prefix containment first, then a scan of the route comment.
    pub fn classify(&self, destination: &str, comment: Option<&str>) -> Vcn {
        match self.classify_destination(destination) {
            Vcn::Unknown => self.classify_comment(comment),
            vcn => vcn,
        }
    }

    pub fn classify_destination(&self, destination: &str) -> Vcn {
        self.rules
            .iter()
            .find(|rule| rule.prefixes.iter().any(|p| cidr_contains(p, destination)))
            .map_or(Vcn::Unknown, |rule| rule.name)
    }

    pub fn classify_comment(&self, comment: Option<&str>) -> Vcn {
        let Some(comment) = comment.map(str::to_lowercase).filter(|c| !c.is_empty()) else {
            return Vcn::Unknown;
        };

        self.rules
            .iter()
            .find(|rule| {
                rule.aliases
                    .iter()
                    .any(|alias| !alias.is_empty() && comment.contains(&alias.to_lowercase()))
            })
            .map_or(Vcn::Unknown, |rule| rule.name)
    }

    /// Reject tables that name `unknown` or carry unparsable prefixes.
    pub fn validate(&self) -> AppResult<()> {
        for rule in &self.rules {
            if rule.name == Vcn::Unknown {
                return Err(ClassifierError::Config(
                    "VCN rule cannot be named 'unknown'".to_string(),
                ));
            }
            if let Some(bad) = rule.prefixes.iter().find(|p| Cidr::parse(p).is_none()) {
                return Err(ClassifierError::Config(format!(
                    "invalid prefix '{}' for VCN {}",
                    bad, rule.name
                )));
            }
        }
        Ok(())
    }
}
