pub mod aggregator;
pub mod detector;
pub mod monitoring;
pub mod prober;
pub mod reducer;
pub mod resolver;
pub mod throttle;

pub use detector::{AlertDispatcher, AlertRecord};
pub use monitoring::{MonitoringService, RunError, RunSummary};
pub use prober::Prober;
pub use resolver::{MissingParameterPolicy, ResolveError, TargetResolver};
pub use throttle::Throttle;
