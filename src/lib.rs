pub mod browser;
pub mod config;
pub mod extract;
pub mod record;
pub mod schema;
pub mod scope;

// Exporting types for convenience
pub use config::Config;
pub use extract::{assemble, extract, extract_section, extract_text_list};
pub use record::{FieldValue, ProfileRecord};
pub use schema::{FieldKind, FieldSpec, ItemField, Locator, ProfileSchema, SectionSpec};
pub use scope::Scope;
