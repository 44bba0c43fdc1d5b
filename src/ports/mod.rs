pub mod alert_sink;
pub mod diagnostics;
pub mod observation_store;
pub mod policy;
pub mod schema_source;
pub mod transport;

pub use alert_sink::{AlertError, AlertSink};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use observation_store::{ObservationStore, StoreError};
pub use policy::{ExampleProvider, StatusPolicy};
pub use schema_source::{SchemaError, SchemaSource};
pub use transport::{HttpTransport, TransportError, TransportResponse};
