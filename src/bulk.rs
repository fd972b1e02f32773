use std::io::Read;
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::debug;

use crate::error::Error;
use crate::quick_test::QuickTest;
use crate::registry;
use crate::rule_set::RuleSet;

#[derive(Debug, Error)]
pub enum BulkError {
    #[error(transparent)]
    QuickTest(#[from] Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// 行の形式が不正
    #[error("line {line}: {reason}")]
    Row { line: u64, reason: String },
}

/// 回答CSVを一括で読み込む
///
/// 1行目は見出し。列は `id`, `participant_type`, 設問1, 設問2, ... の順。
/// 空欄は未回答として扱う。
pub fn read_bulk<R: Read>(
    reader: R,
    version: Option<&str>,
) -> Result<impl Iterator<Item = Result<(String, QuickTest), BulkError>>, BulkError> {
    let rule_set = registry::rule_set(version.unwrap_or(registry::DEFAULT_MATRIX_VERSION))?;
    let records = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
        .into_records();
    Ok(records.map(move |record| parse_row(&rule_set, &record?)))
}

fn parse_row(
    rule_set: &Arc<RuleSet>,
    record: &StringRecord,
) -> Result<(String, QuickTest), BulkError> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();
    let row_error = |reason: String| BulkError::Row { line, reason };

    let id = record
        .get(0)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| row_error("missing id".to_string()))?;
    let mut test = QuickTest::new(Arc::clone(rule_set));
    if let Some(participant_type) = record.get(1).filter(|value| !value.is_empty()) {
        test.set_participant_type(participant_type)?;
    }

    for (question, value) in (1u32..).zip(record.iter().skip(2)) {
        if value.is_empty() {
            continue;
        }
        let value = value.parse::<u8>().map_err(|_| {
            row_error(format!(
                "answer to question {question} is not a number: '{value}'"
            ))
        })?;
        test.set_answer(question, value)?;
    }
    debug!(id, answers = test.answers_count(), "row read");
    Ok((id.to_string(), test))
}
