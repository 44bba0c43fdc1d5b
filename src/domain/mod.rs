pub mod observation;
pub mod report;
pub mod schema;
pub mod status;

pub use observation::{EndpointState, HistoryEntry, Observation, Sample};
pub use report::{EndpointReport, Window, WindowStats};
pub use schema::{ApiSchema, Operation, Parameter, ParameterLocation, ParameterSchema, PathItem, Response, Server};
pub use status::Status;
