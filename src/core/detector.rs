use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorResult {
    pub name: String,
    pub implemented: bool,
    pub detection_method: String,
    pub match_patterns: Vec<String>,
}
