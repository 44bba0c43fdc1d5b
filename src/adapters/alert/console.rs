use async_trait::async_trait;

use crate::domain::Observation;
use crate::ports::{AlertError, AlertSink};

/// Prints one line per status change to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleAlert;

impl ConsoleAlert {
    fn line(label: &str, path: &str) -> String {
        format!("[ALERT - {label}] Path: {path} is {label}.")
    }
}

#[async_trait]
impl AlertSink for ConsoleAlert {
    fn name(&self) -> &str {
        "console"
    }

    async fn on_up(&self, path: &str, _observation: &Observation) -> Result<(), AlertError> {
        println!("{}", Self::line("UP", path));
        Ok(())
    }

    async fn on_down(&self, path: &str, _observation: &Observation) -> Result<(), AlertError> {
        println!("{}", Self::line("DOWN", path));
        Ok(())
    }

    async fn on_degraded(&self, path: &str, _observation: &Observation) -> Result<(), AlertError> {
        println!("{}", Self::line("DEGRADED", path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_format() {
        assert_eq!(ConsoleAlert::line("DOWN", "/users"), "[ALERT - DOWN] Path: /users is DOWN.");
    }
}
