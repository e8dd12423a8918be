// Terse module - record reconstruction, field extraction and section splitting

pub mod record;
pub mod sections;

pub use record::{Record, pick_field, pick_flags, recordize};
pub use sections::{SectionKind, Sections, split_sections};
