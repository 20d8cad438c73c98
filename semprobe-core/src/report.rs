// semprobe-core/src/report.rs
//! Writers for experiment results.
//!
//! The CSV layout has one row per completed query:
//! `Query,Y1,Y2,MutualInformation,AllResponses`. `Y1` and `Y2` are the first
//! two sampled answers (`Y2` is empty when only one was sampled), the score
//! is printed with four decimals and `AllResponses` joins every answer with
//! `|`. Failed queries are left out of the CSV; the JSON report keeps them.
//!
//! The transcript file is JSON Lines: one object per exchanged message with
//! `query`, `role` and `content`, completed queries in run order.
//!
//! License: MIT OR Apache-2.0

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::errors::ProbeError;
use crate::experiment::{ExperimentReport, QueryResult};
use crate::gateway::ChatRole;

pub const CSV_HEADER: [&str; 5] = ["Query", "Y1", "Y2", "MutualInformation", "AllResponses"];

/// Separator used for the `AllResponses` column.
pub const RESPONSE_SEPARATOR: &str = "|";

/// The CSV fields for one completed query.
pub fn csv_record(result: &QueryResult) -> [String; 5] {
    let y1 = result.responses.first().cloned().unwrap_or_default();
    let y2 = result.responses.get(1).cloned().unwrap_or_default();
    [
        result.query.clone(),
        y1,
        y2,
        format!("{:.4}", result.estimate.score),
        result.responses.join(RESPONSE_SEPARATOR),
    ]
}

/// Writes the CSV report (header always, then completed queries in order).
pub fn write_csv<W: Write>(writer: W, report: &ExperimentReport) -> Result<(), ProbeError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for result in report.completed() {
        csv_writer.write_record(csv_record(result))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_file(path: &Path, report: &ExperimentReport) -> Result<(), ProbeError> {
    let file = File::create(path)?;
    write_csv(BufWriter::new(file), report)?;
    info!("CSV report written to {}", path.display());
    Ok(())
}

#[derive(Serialize)]
struct TranscriptLine<'a> {
    query: &'a str,
    role: ChatRole,
    content: &'a str,
}

/// Writes every message of every completed query as one JSON line.
pub fn write_transcript_jsonl<W: Write>(mut writer: W, report: &ExperimentReport) -> Result<(), ProbeError> {
    for result in report.completed() {
        for message in &result.transcript {
            let line = TranscriptLine { query: &result.query, role: message.role, content: &message.content };
            serde_json::to_writer(&mut writer, &line)?;
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_transcript_file(path: &Path, report: &ExperimentReport) -> Result<(), ProbeError> {
    let file = File::create(path)?;
    write_transcript_jsonl(BufWriter::new(file), report)?;
    info!("Transcript written to {}", path.display());
    Ok(())
}

pub fn to_json_string(report: &ExperimentReport) -> Result<String, ProbeError> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn write_json_file(path: &Path, report: &ExperimentReport) -> Result<(), ProbeError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    info!("JSON report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{estimate_from_clusters, ResponseCluster};
    use crate::experiment::QueryOutcome;
    use crate::gateway::ChatMessage;
    use chrono::Utc;
    use uuid::Uuid;

    fn completed(query: &str, responses: &[&str]) -> QueryOutcome {
        let responses: Vec<String> = responses.iter().map(|s| s.to_string()).collect();
        let cluster = ResponseCluster {
            representative: responses[0].clone(),
            members: responses.clone(),
            indices: (0..responses.len()).collect(),
        };
        QueryOutcome::Completed(QueryResult {
            query: query.to_string(),
            estimate: estimate_from_clusters(vec![cluster], responses.len()).unwrap(),
            digest: crate::experiment::response_set_digest(&responses),
            transcript: responses
                .iter()
                .flat_map(|r| [ChatMessage::user(format!("{}\nA:", query)), ChatMessage::assistant(r.clone())])
                .collect(),
            responses,
            failed_calls: 0,
        })
    }

    fn report(outcomes: Vec<QueryOutcome>) -> ExperimentReport {
        ExperimentReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            strategy: "lexical".to_string(),
            threshold: 85.0,
            repeat_count: 2,
            outcomes,
        }
    }

    #[test]
    fn test_csv_layout() {
        let report = report(vec![
            completed("Q1?", &["A", "B"]),
            QueryOutcome::Failed { query: "Q2?".to_string(), error: "boom".to_string() },
            completed("Q3, with comma?", &["only"]),
        ]);
        let mut buf = Vec::new();
        write_csv(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Query,Y1,Y2,MutualInformation,AllResponses");
        assert_eq!(lines[1], "Q1?,A,B,0.0000,A|B");
        assert_eq!(lines[2], "\"Q3, with comma?\",only,,0.0000,only");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_header_written_without_rows() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &report(Vec::new())).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Query,Y1,Y2,MutualInformation,AllResponses\n");
    }

    #[test]
    fn test_transcript_is_one_json_object_per_message() {
        let report = report(vec![
            completed("Q1?", &["A", "B"]),
            QueryOutcome::Failed { query: "Q2?".to_string(), error: "boom".to_string() },
        ]);
        let mut buf = Vec::new();
        write_transcript_jsonl(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["query"], "Q1?");
        assert_eq!(lines[0]["role"], "user");
        assert_eq!(lines[1]["role"], "assistant");
        assert_eq!(lines[1]["content"], "A");
        assert_eq!(lines[3]["content"], "B");
    }

    #[test]
    fn test_json_keeps_failures() {
        let json = to_json_string(&report(vec![
            QueryOutcome::Failed { query: "Q?".to_string(), error: "boom".to_string() },
        ])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["outcomes"][0]["status"], "failed");
        assert_eq!(value["outcomes"][0]["error"], "boom");
    }
}
