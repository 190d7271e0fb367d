use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Result code buildbot reports for a successful build.
const RESULT_SUCCESS: i64 = 0;
/// Result code buildbot reports for a failed build.
const RESULT_FAILURE: i64 = 2;

/// Step currently executing inside a running build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStep {
    pub name: String,
}

/// Payload of `json/builders/<target>/builds/-1`, as sent by the CI server.
///
/// Only the fields the dashboard reads are modelled; everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBuild {
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub current_step: Option<RawStep>,
    #[serde(default)]
    pub results: Option<i64>,
    /// `[start, end]` in fractional unix seconds; `end` is null while running.
    #[serde(default)]
    pub times: Vec<Option<f64>>,
    #[serde(default)]
    pub text: Vec<String>,
}

/// Classified outcome of one build fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildStatusSnapshot {
    /// A step is executing right now.
    Running { number: i64, step: String },
    /// Last build succeeded; `finished_at` is in unix seconds.
    Succeeded { finished_at: f64 },
    /// Last build failed; `text` is the failure summary.
    Failed { number: i64, text: Vec<String> },
    /// Any other result code (warnings, exception, ...), kept verbatim.
    Unknown { code: Option<i64> },
}

impl TryFrom<RawBuild> for BuildStatusSnapshot {
    type Error = ModelError;

    fn try_from(raw: RawBuild) -> Result<Self, Self::Error> {
        if let Some(step) = raw.current_step {
            let number = raw.number.ok_or(ModelError::MissingField("number"))?;
            return Ok(BuildStatusSnapshot::Running {
                number,
                step: step.name,
            });
        }

        match raw.results {
            Some(RESULT_SUCCESS) => {
                let finished_at = raw
                    .times
                    .get(1)
                    .copied()
                    .flatten()
                    .ok_or(ModelError::MissingField("times[1]"))?;
                Ok(BuildStatusSnapshot::Succeeded { finished_at })
            }
            Some(RESULT_FAILURE) => {
                let number = raw.number.ok_or(ModelError::MissingField("number"))?;
                Ok(BuildStatusSnapshot::Failed {
                    number,
                    text: raw.text,
                })
            }
            code => Ok(BuildStatusSnapshot::Unknown { code }),
        }
    }
}

impl BuildStatusSnapshot {
    /// Parse and validate a raw JSON body.
    pub fn from_json(body: &str) -> Result<Self, ModelError> {
        let raw: RawBuild =
            serde_json::from_str(body).map_err(|e| ModelError::Decode(e.to_string()))?;
        Self::try_from(raw)
    }
}
