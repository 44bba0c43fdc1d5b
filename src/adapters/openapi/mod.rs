mod deref;
mod loader;

pub use deref::{dereference, dereference_bundle, external_locations, resolve_location, Bundle};
pub use loader::{parse_document, OpenApiSource};
