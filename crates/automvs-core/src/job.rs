//! Job step results scraped from printer output.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition code expected of a step that is not listed explicitly.
pub const DEFAULT_EXPECTED_CC: &str = "0000";

/// Result of one job step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StepStatus {
    /// Job name
    pub jobname: String,
    /// Procedure step name, empty when the step does not run a procedure
    pub procname: String,
    /// Step name
    pub stepname: String,
    /// Condition code as printed, e.g. `0000`
    pub exitcode: String,
}
