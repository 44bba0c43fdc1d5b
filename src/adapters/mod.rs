pub mod alert;
pub mod diagnostics;
pub mod http;
pub mod openapi;
pub mod policy;
pub mod store;

pub use alert::{ConsoleAlert, WebhookAlert};
pub use diagnostics::{RecordingDiagnostics, TracingDiagnostics};
pub use http::ReqwestTransport;
pub use openapi::OpenApiSource;
pub use policy::{ConfiguredExamples, DefaultStatusPolicy, LatencyStatusPolicy, NoExamples};
pub use store::FileStore;
