use std::collections::BTreeMap;

use serde::Serialize;

use crate::rule_set::RuleSet;

/// 評価段階
///
/// 得点の区分は全回答者区分共通で、最高128点の尺度に合わせてある。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub enum Level {
    /// 0〜32点
    Beginning,
    /// 33〜62点
    Advanced,
    /// 63〜94点
    Experienced,
    /// 95点以上
    Exemplary,
}

impl Level {
    pub fn from_points(points: u32) -> Level {
        match points {
            0..=32 => Level::Beginning,
            33..=62 => Level::Advanced,
            63..=94 => Level::Experienced,
            _ => Level::Exemplary,
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickTestResult {
    pub points: u32,
    /// 0〜100の整数
    pub percentage: u32,
    pub level: Level,
}

/// 重み付き合計
///
/// 除外設問は回答済みでも数えない。未回答は0点。
pub fn weighted_sum(
    rule_set: &RuleSet,
    participant_type: &str,
    answers: &BTreeMap<u32, u8>,
) -> u32 {
    (1..=rule_set.question_count())
        .filter(|&question| !rule_set.is_skipped(participant_type, question))
        .map(|question| {
            let value = answers.get(&question).copied().unwrap_or(0);
            u32::from(value) * rule_set.weight(question)
        })
        .sum()
}

/// 得点の最高点に対する割合（百分率）
///
/// 比率を小数2桁に四捨五入（0.5は切り上げ）してから100倍したものと同じ値を、整数演算で求める。
pub fn percentage(points: u32, max_points: u32) -> u32 {
    if max_points == 0 {
        return 0;
    }
    let points = u64::from(points);
    let max_points = u64::from(max_points);
    let rounded = (points * 200 + max_points) / (max_points * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

pub fn compute_result(
    rule_set: &RuleSet,
    participant_type: &str,
    answers: &BTreeMap<u32, u8>,
) -> QuickTestResult {
    let sum = weighted_sum(rule_set, participant_type, answers);
    let points = rule_set.scale_factor(participant_type).apply(sum);
    let max_points = rule_set.max_points(participant_type).unwrap_or_default();
    QuickTestResult {
        points,
        percentage: percentage(points, max_points),
        level: Level::from_points(points),
    }
}
