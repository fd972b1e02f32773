use std::collections::BTreeSet;

use crate::rule_set::RuleSet;

/// 設問の前後移動
///
/// 回答者区分の除外設問を飛ばしながら、前後の設問番号を求める。
/// カーソル値 `0` は「最初の設問の手前」を、`question_count + 1` 以上は
/// 「最後の設問の後ろ」を表す。
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'a> {
    question_count: i64,
    skip_questions: &'a BTreeSet<u32>,
}

impl<'a> Navigator<'a> {
    pub fn new(rule_set: &'a RuleSet, participant_type: &str) -> Self {
        Self {
            question_count: i64::from(rule_set.question_count()),
            skip_questions: rule_set.skip_questions(participant_type),
        }
    }

    fn is_skipped(&self, question: i64) -> bool {
        u32::try_from(question)
            .map(|question| self.skip_questions.contains(&question))
            .unwrap_or(false)
    }

    /// 前の設問番号
    ///
    /// 1番目の設問からは `Some(0)` を返す。これは実在の設問ではなく「先頭の手前」を意味する。
    pub fn previous_question(&self, current: i64) -> Option<i64> {
        let count = self.question_count;
        if current <= 0 {
            return None;
        }
        if self.skip_questions.is_empty() {
            return Some((current - 1).min(count));
        }
        let mut current = current;
        loop {
            if self.is_skipped(current - 1) {
                current -= 1;
            } else if current == count || current == count + 1 {
                return Some(count);
            } else if current > count + 1 {
                current = count + 1;
            } else {
                return Some(current - 1);
            }
        }
    }

    /// 次の設問番号
    pub fn next_question(&self, current: i64) -> Option<i64> {
        if self.skip_questions.is_empty() {
            return match current {
                current if current >= self.question_count => None,
                current if current < 0 => Some(0),
                current => Some(current + 1),
            };
        }
        let mut current = current;
        loop {
            if current >= self.question_count {
                return None;
            } else if self.is_skipped(current + 1) {
                current += 1;
            } else if current == -1 {
                return Some(0);
            } else if current < -1 {
                current = -1;
            } else {
                return Some(current + 1);
            }
        }
    }

    /// 先頭から順に辿れる設問番号の一覧
    pub fn questions(&self) -> Vec<i64> {
        std::iter::successors(self.next_question(0), |&question| {
            self.next_question(question)
        })
        .collect()
    }
}
