// Router output classifier: turns captured RouterOS terse dumps into typed
// interfaces, IP address bindings and routes, then resolves the upstream
// partner currently serving each VCN.

pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod routes;
pub mod terse;

pub use classifier::{Classification, Classifier, ClassifierConfig};
pub use error::{AppResult, ClassifierError, RecordIssue};
pub use interfaces::{Interface, IpAddressBinding, parse_interfaces, parse_ip_addresses};
pub use routes::{
    Partner, Route, Vcn, VcnRule, VcnTable, parse_routes, parse_routes_with_table,
    resolve_partners,
};
pub use terse::{Sections, recordize, split_sections};
