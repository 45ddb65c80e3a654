//! External analysis engine
//!
//! The engine is an executable that reads a JSON array of
//! `{bird_type, food_type, quantity}` objects on stdin and prints a JSON
//! analysis on stdout. It is spawned fresh for every call.
//!
//! No deadline is enforced here: the dispatcher wraps every call in a timeout,
//! and dropping the in-flight future kills the child process.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::AnalysisBackend;
use crate::error::AnalysisEngineError;
use crate::types::{AnalysisOutput, EngineKind, FeedingRecord, Patterns};

/// Record shape sent to the engine
#[derive(Debug, Serialize)]
struct EngineInputRecord<'a> {
    bird_type: &'a str,
    food_type: &'a str,
    quantity: f64,
}

/// `patterns` is an object, or an empty array for an empty input
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPatterns {
    Object(serde_json::Map<String, serde_json::Value>),
    List(Vec<serde_json::Value>),
}

/// Response shape expected on stdout
#[derive(Debug, Deserialize)]
struct EngineResponse {
    #[serde(default)]
    patterns: Option<RawPatterns>,
    recommendations: Vec<String>,
    #[serde(default)]
    analysis_engine: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Out-of-process analysis backend
#[derive(Debug, Clone)]
pub struct ExternalEngine {
    command: PathBuf,
    args: Vec<String>,
}

impl ExternalEngine {
    pub fn new<P: AsRef<Path>>(command: P, args: Vec<String>) -> Self {
        Self {
            command: command.as_ref().to_path_buf(),
            args,
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    /// Serialize records to the engine's input format
    pub fn encode_input(records: &[FeedingRecord]) -> Result<Vec<u8>, serde_json::Error> {
        let input: Vec<EngineInputRecord<'_>> = records
            .iter()
            .map(|r| EngineInputRecord {
                bird_type: &r.bird_type,
                food_type: &r.food_type,
                quantity: r.quantity,
            })
            .collect();
        serde_json::to_vec(&input)
    }

    /// Parse and normalize the engine's stdout
    pub fn parse_output(stdout: &[u8]) -> Result<AnalysisOutput, AnalysisEngineError> {
        let response: EngineResponse = serde_json::from_slice(stdout)
            .map_err(|e| AnalysisEngineError::Malformed(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(AnalysisEngineError::Malformed(format!(
                "engine reported error: {}",
                error
            )));
        }

        let patterns = match response.patterns {
            Some(RawPatterns::Object(fields)) => {
                if !fields.contains_key("record_count") && !fields.contains_key("total_feedings") {
                    return Err(AnalysisEngineError::Malformed(
                        "patterns is missing record_count".to_string(),
                    ));
                }
                serde_json::from_value::<Patterns>(serde_json::Value::Object(fields))
                    .map_err(|e| AnalysisEngineError::Malformed(e.to_string()))?
            }
            Some(RawPatterns::List(list)) if list.is_empty() => Patterns::default(),
            Some(RawPatterns::List(_)) => {
                return Err(AnalysisEngineError::Malformed(
                    "patterns must be an object".to_string(),
                ))
            }
            None => {
                return Err(AnalysisEngineError::Malformed(
                    "missing patterns".to_string(),
                ))
            }
        };

        if !patterns.average_quantity.is_finite() || patterns.average_quantity < 0.0 {
            return Err(AnalysisEngineError::Malformed(format!(
                "invalid average_quantity {}",
                patterns.average_quantity
            )));
        }

        Ok(AnalysisOutput {
            patterns,
            recommendations: response.recommendations,
            engine_name: response.analysis_engine,
        })
    }

    /// Spawn the engine, feed it `payload`, and collect stdout
    async fn run(&self, payload: Vec<u8>) -> Result<Vec<u8>, AnalysisEngineError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(AnalysisEngineError::Spawn)?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            AnalysisEngineError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "engine stdin was not captured",
            ))
        })?;

        // Feed stdin concurrently so a chatty engine cannot fill its stdout pipe and stall
        let writer = tokio::spawn(async move {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;

        if let Ok(Err(e)) = writer.await {
            debug!(error = %e, "Analysis engine did not consume its full input");
        }

        if !output.status.success() {
            return Err(AnalysisEngineError::ExitStatus {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl AnalysisBackend for ExternalEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::External
    }

    fn describe(&self) -> String {
        let mut parts = vec![self.command.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    async fn analyze(
        &self,
        records: &[FeedingRecord],
    ) -> Result<AnalysisOutput, AnalysisEngineError> {
        let payload = Self::encode_input(records)
            .map_err(|e| AnalysisEngineError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        debug!(
            engine = %self.command.display(),
            records = records.len(),
            "Invoking external analysis engine"
        );

        let stdout = self.run(payload).await?;
        let output = Self::parse_output(&stdout)?;

        if output.patterns.record_count != records.len() {
            return Err(AnalysisEngineError::Malformed(format!(
                "engine counted {} records, sent {}",
                output.patterns.record_count,
                records.len()
            )));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_encode_input_uses_neutral_field_names() {
        let records = vec![FeedingRecord {
            id: 7,
            bird_type: "Robin".to_string(),
            food_type: "Seeds".to_string(),
            quantity: 20.0,
            location: Some("Backyard feeder".to_string()),
            notes: None,
            created_at: Utc::now(),
        }];

        let bytes = ExternalEngine::encode_input(&records).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"bird_type": "Robin", "food_type": "Seeds", "quantity": 20.0}])
        );
    }

    #[test]
    fn test_parse_legacy_java_output() {
        let stdout = br#"{
            "patterns": {
                "most_common_bird": "Robin",
                "preferred_food": "Seeds",
                "average_quantity": 25.0,
                "total_feedings": 3,
                "bird_diversity": 2,
                "food_variety": 2
            },
            "recommendations": [
                "Consider adding more food variety to attract different bird species"
            ],
            "analysis_engine": "Java Bird Analyzer v1.0 (Demo)",
            "processed_by": "Native Java",
            "timestamp": 1700000000000
        }"#;

        let output = ExternalEngine::parse_output(stdout).unwrap();
        assert_eq!(output.patterns.record_count, 3);
        assert_eq!(output.patterns.distinct_bird_count, 2);
        assert_eq!(output.recommendations.len(), 1);
        assert_eq!(
            output.engine_name.as_deref(),
            Some("Java Bird Analyzer v1.0 (Demo)")
        );
    }

    #[test]
    fn test_parse_empty_pattern_list() {
        let output =
            ExternalEngine::parse_output(br#"{"patterns": [], "recommendations": []}"#).unwrap();
        assert_eq!(output.patterns, Patterns::default());
    }

    #[test]
    fn test_parse_rejects_malformed_output() {
        let cases: [&[u8]; 8] = [
            b"not json",
            br#"{"recommendations": []}"#,
            br#"{"patterns": [1, 2], "recommendations": []}"#,
            br#"{"error": "boom", "recommendations": []}"#,
            br#"{"patterns": {"record_count": 1, "average_quantity": -3.0}, "recommendations": []}"#,
            br#"{"patterns": {}}"#,
            br#"{"patterns": {"record_count": 2}}"#,
            br#"{"patterns": {"unrelated": true}, "recommendations": []}"#,
        ];

        for stdout in cases {
            let err = ExternalEngine::parse_output(stdout).unwrap_err();
            assert!(matches!(err, AnalysisEngineError::Malformed(_)), "{err}");
        }
    }

    #[test]
    fn test_describe_includes_args() {
        let engine = ExternalEngine::new(
            "java",
            vec!["-jar".to_string(), "bird-analyzer.jar".to_string()],
        );
        assert_eq!(engine.describe(), "java -jar bird-analyzer.jar");
    }
}
