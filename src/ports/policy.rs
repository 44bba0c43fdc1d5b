use crate::domain::Status;

/// Supplies concrete values for API parameters
pub trait ExampleProvider: Send + Sync {
    /// Value for `param_name` on the endpoint `path`, or `None` to fall back
    /// to whatever the API description declares
    fn example_value(&self, param_name: &str, path: &str) -> Option<String>;
}

/// Classifies one probe response
pub trait StatusPolicy: Send + Sync {
    fn classify(&self, status_code: u16, path: &str, duration_ms: u64) -> Status;
}
