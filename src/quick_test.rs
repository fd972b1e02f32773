use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Error;
use crate::navigation::Navigator;
use crate::rule_set::RuleSet;
use crate::scoring::{self, QuickTestResult};

/// 受検1回分の回答
///
/// 除外設問や最高点は回答者区分から都度引くため、区分を変えても回答はそのまま残る。
#[derive(Debug, Clone)]
pub struct QuickTest {
    rule_set: Arc<RuleSet>,
    participant_type: String,
    answers: BTreeMap<u32, u8>,
}

impl QuickTest {
    pub fn new(rule_set: Arc<RuleSet>) -> Self {
        let participant_type = rule_set.default_participant_type().to_string();
        Self {
            rule_set,
            participant_type,
            answers: BTreeMap::new(),
        }
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    pub fn participant_type(&self) -> &str {
        &self.participant_type
    }

    /// 回答者区分を設定する
    pub fn set_participant_type(&mut self, participant_type: &str) -> Result<(), Error> {
        if !self.rule_set.is_allowed_participant_type(participant_type) {
            warn!(participant_type, "rejected participant type");
            return Err(Error::IllegalParticipantType {
                participant_type: participant_type.to_string(),
                allowed: self.rule_set.allowed_participant_types().to_vec(),
            });
        }
        debug!(participant_type, "participant type set");
        self.participant_type = participant_type.to_string();
        Ok(())
    }

    /// 設問番号（1始まり）を指定して回答を格納する
    /// 既存の回答は上書きする。
    pub fn set_answer(&mut self, question: u32, value: u8) -> Result<(), Error> {
        let question_count = self.rule_set.question_count();
        if !(1..=question_count).contains(&question) {
            warn!(question, "rejected question number");
            return Err(Error::IllegalQuestion {
                question,
                question_count,
            });
        }
        if !self.rule_set.is_allowed_answer(value) {
            warn!(question, value, "rejected answer value");
            return Err(Error::IllegalAnswer {
                value,
                allowed: self.rule_set.allowed_answers().to_vec(),
            });
        }
        debug!(question, value, "answer set");
        self.answers.insert(question, value);
        Ok(())
    }

    pub fn answer(&self, question: u32) -> Option<u8> {
        self.answers.get(&question).copied()
    }

    pub fn answers(&self) -> &BTreeMap<u32, u8> {
        &self.answers
    }

    /// 回答済みの設問数（除外設問への回答も含む）
    pub fn answers_count(&self) -> usize {
        self.answers.len()
    }

    pub fn skip_questions(&self) -> impl Iterator<Item = u32> + '_ {
        self.rule_set
            .skip_questions(&self.participant_type)
            .iter()
            .copied()
    }

    /// 回答者区分にとっての設問数
    pub fn participant_questions_count(&self) -> u32 {
        let skipped = self.rule_set.skip_questions(&self.participant_type).len();
        self.rule_set.question_count() - u32::try_from(skipped).unwrap_or(u32::MAX)
    }

    pub fn max_points(&self) -> u32 {
        self.rule_set
            .max_points(&self.participant_type)
            .unwrap_or_default()
    }

    fn answered_applicable(&self) -> u32 {
        let count = self
            .answers
            .keys()
            .filter(|&&question| !self.rule_set.is_skipped(&self.participant_type, question))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// 回答の進捗（0〜100、切り捨て）
    pub fn percentage_finished(&self) -> u32 {
        match self.participant_questions_count() {
            0 => 100,
            total => self.answered_applicable() * 100 / total,
        }
    }

    /// 該当設問がすべて回答済みか
    pub fn is_complete(&self) -> bool {
        self.answered_applicable() == self.participant_questions_count()
    }

    pub fn navigator(&self) -> Navigator<'_> {
        Navigator::new(&self.rule_set, &self.participant_type)
    }

    pub fn previous_question(&self, current: i64) -> Option<i64> {
        self.navigator().previous_question(current)
    }

    pub fn next_question(&self, current: i64) -> Option<i64> {
        self.navigator().next_question(current)
    }

    pub fn result(&self) -> QuickTestResult {
        let result =
            scoring::compute_result(&self.rule_set, &self.participant_type, &self.answers);
        debug!(
            version = self.rule_set.version(),
            participant_type = %self.participant_type,
            points = result.points,
            percentage = result.percentage,
            "result computed"
        );
        result
    }
}

impl fmt::Display for QuickTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[QuickTest {}]", self.rule_set.version())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::scoring::Level;
    use pretty_assertions::assert_eq;

    fn quick_test() -> QuickTest {
        let rule_set =
            RuleSet::from_json("4.1", include_str!("../resources/matrix-4.1.json")).unwrap();
        QuickTest::new(Arc::new(rule_set))
    }

    #[test]
    fn test_default_participant_type() {
        let test = quick_test();
        assert_eq!(test.participant_type(), "company");
        assert_eq!(test.answers_count(), 0);
        assert_eq!(test.max_points(), 128);
        assert_eq!(test.to_string(), "[QuickTest 4.1]");
    }

    #[test]
    fn test_set_participant_type() {
        let mut test = quick_test();
        assert!(test.set_participant_type("self-employed").is_ok());
        assert_eq!(test.participant_type(), "self-employed");
        assert_eq!(test.max_points(), 122);
        assert_eq!(test.participant_questions_count(), 20);
        assert_eq!(
            test.skip_questions().collect::<Vec<u32>>(),
            vec![7, 10, 11, 12, 13, 14, 26]
        );

        let error = test.set_participant_type("freelancer").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
        assert_eq!(test.participant_type(), "self-employed");
    }

    #[test]
    fn test_set_answer() {
        let mut test = quick_test();
        assert!(test.set_answer(0, 1).is_err());
        assert!(test.set_answer(1, 1).is_ok());
        assert!(test.set_answer(27, 4).is_ok());
        assert!(test.set_answer(28, 1).is_err());
        assert!(test.set_answer(10, 5).is_err());
        assert_eq!(test.answers_count(), 2);

        assert!(test.set_answer(1, 3).is_ok());
        assert_eq!(test.answer(1), Some(3));
        assert_eq!(test.answer(2), None);
        assert_eq!(test.answers_count(), 2);
    }

    #[test]
    fn test_set_answer_errors() {
        let mut test = quick_test();
        assert_eq!(
            test.set_answer(28, 1),
            Err(Error::IllegalQuestion {
                question: 28,
                question_count: 27,
            })
        );
        assert_eq!(
            test.set_answer(3, 9),
            Err(Error::IllegalAnswer {
                value: 9,
                allowed: vec![0, 1, 2, 3, 4],
            })
        );
        assert_eq!(test.answers_count(), 0);
    }

    #[test]
    fn test_participant_change_keeps_answers() {
        let mut test = quick_test();
        for (question, value) in [(1, 1), (2, 2), (3, 0), (4, 2)] {
            test.set_answer(question, value).unwrap();
        }
        assert_eq!(test.result().points, 5);

        test.set_participant_type("self-employed").unwrap();
        assert_eq!(test.answers_count(), 4);
        assert_eq!(test.result().points, 6);

        test.set_participant_type("company").unwrap();
        assert_eq!(test.result().points, 5);
    }

    #[test]
    fn test_percentage_finished() {
        let mut test = quick_test();
        test.set_participant_type("self-employed").unwrap();
        assert_eq!(test.percentage_finished(), 0);
        assert!(!test.is_complete());

        // skipped questions don't count towards progress
        test.set_answer(7, 2).unwrap();
        assert_eq!(test.percentage_finished(), 0);

        for question in 1..=5 {
            test.set_answer(question, 1).unwrap();
        }
        assert_eq!(test.percentage_finished(), 25);

        let questions = test.navigator().questions();
        for question in questions {
            test.set_answer(question as u32, 0).unwrap();
        }
        assert_eq!(test.percentage_finished(), 100);
        assert!(test.is_complete());

        test.set_participant_type("company").unwrap();
        assert!(!test.is_complete());
    }

    #[test]
    fn test_result_full() {
        let mut test = quick_test();
        for question in 1..=27 {
            test.set_answer(question, 4).unwrap();
        }
        for participant_type in ["company", "self-employed"] {
            test.set_participant_type(participant_type).unwrap();
            let result = test.result();
            assert_eq!(result.points, test.max_points());
            assert_eq!(result.percentage, 100);
            assert_eq!(result.level, Level::Exemplary);
        }
    }

    #[test]
    fn test_navigation_follows_participant_type() {
        let mut test = quick_test();
        assert_eq!(test.next_question(6), Some(7));
        test.set_participant_type("self-employed").unwrap();
        assert_eq!(test.next_question(6), Some(8));
        assert_eq!(test.previous_question(8), Some(6));
    }
}
