use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use tracing::warn;

use crate::error::Error;

static NO_SKIP_QUESTIONS: BTreeSet<u32> = BTreeSet::new();

/// 回答者区分ごとの換算比率
///
/// 端数は切り捨てる。分母・分子は整数で保持し、浮動小数点の誤差を持ち込まない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ScaleFactor {
    pub numerator: u32,
    pub denominator: u32,
}

impl ScaleFactor {
    pub const IDENTITY: ScaleFactor = ScaleFactor {
        numerator: 1,
        denominator: 1,
    };

    pub fn apply(&self, sum: u32) -> u32 {
        let scaled = (u64::from(sum) * u64::from(self.numerator))
            .checked_div(u64::from(self.denominator))
            .unwrap_or(0);
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }
}

/// JSONリソースに書かれたままの設問定義
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSetDefinition {
    pub version: String,
    pub question_count: u32,
    pub allowed_answers: Vec<u8>,
    pub allowed_participant_types: Vec<String>,
    #[serde(default)]
    pub skip_questions: BTreeMap<String, BTreeSet<u32>>,
    pub max_points: BTreeMap<String, u32>,
    #[serde(default)]
    pub double_weight_questions: BTreeSet<u32>,
    #[serde(default)]
    pub scale_factors: BTreeMap<String, ScaleFactor>,
}

/// マトリクスバージョン1つ分の設問定義
///
/// 構築時に検証済みで、以降は読み取り専用。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RuleSetDefinition")]
pub struct RuleSet {
    version: String,
    question_count: u32,
    allowed_answers: Vec<u8>,
    allowed_participant_types: Vec<String>,
    skip_questions: BTreeMap<String, BTreeSet<u32>>,
    max_points: BTreeMap<String, u32>,
    double_weight_questions: BTreeSet<u32>,
    scale_factors: BTreeMap<String, ScaleFactor>,
}

impl RuleSet {
    /// JSON文書から設問定義を読み込む
    ///
    /// 文書内の `version` は登録名と一致しなければならない。
    pub fn from_json(version: &str, json: &str) -> Result<RuleSet, Error> {
        let definition: RuleSetDefinition =
            serde_json::from_str(json).map_err(|e| Error::Configuration {
                version: version.to_string(),
                reason: e.to_string(),
            })?;
        if definition.version != version {
            return Err(Error::Configuration {
                version: version.to_string(),
                reason: format!("document declares version '{}'", definition.version),
            });
        }
        definition.try_into()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn allowed_answers(&self) -> &[u8] {
        &self.allowed_answers
    }

    pub fn allowed_participant_types(&self) -> &[String] {
        &self.allowed_participant_types
    }

    /// 先頭の回答者区分が既定値
    pub fn default_participant_type(&self) -> &str {
        self.allowed_participant_types
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn is_allowed_participant_type(&self, participant_type: &str) -> bool {
        self.allowed_participant_types
            .iter()
            .any(|allowed| allowed == participant_type)
    }

    pub fn is_allowed_answer(&self, value: u8) -> bool {
        self.allowed_answers.contains(&value)
    }

    pub fn max_answer(&self) -> u8 {
        self.allowed_answers.iter().copied().max().unwrap_or_default()
    }

    /// 回答者区分ごとの除外設問
    pub fn skip_questions(&self, participant_type: &str) -> &BTreeSet<u32> {
        self.skip_questions
            .get(participant_type)
            .unwrap_or(&NO_SKIP_QUESTIONS)
    }

    pub fn is_skipped(&self, participant_type: &str, question: u32) -> bool {
        self.skip_questions(participant_type).contains(&question)
    }

    pub fn max_points(&self, participant_type: &str) -> Option<u32> {
        self.max_points.get(participant_type).copied()
    }

    pub fn double_weight_questions(&self) -> &BTreeSet<u32> {
        &self.double_weight_questions
    }

    /// 重要設問は2倍、それ以外は1倍
    pub fn weight(&self, question: u32) -> u32 {
        if self.double_weight_questions.contains(&question) {
            2
        } else {
            1
        }
    }

    pub fn scale_factor(&self, participant_type: &str) -> ScaleFactor {
        self.scale_factors
            .get(participant_type)
            .copied()
            .unwrap_or(ScaleFactor::IDENTITY)
    }

    /// 該当設問すべてに最大の回答をした場合の得点
    ///
    /// u32に収まらない場合は `None`。
    pub fn ceiling(&self, participant_type: &str) -> Option<u32> {
        let max_answer = u64::from(self.max_answer());
        let sum = (1..=self.question_count)
            .filter(|&question| !self.is_skipped(participant_type, question))
            .try_fold(0u64, |sum, question| {
                sum.checked_add(max_answer * u64::from(self.weight(question)))
                    .filter(|&sum| sum <= u64::from(u32::MAX))
            })?;
        let factor = self.scale_factor(participant_type);
        let scaled = sum.checked_mul(u64::from(factor.numerator))? / u64::from(factor.denominator);
        u32::try_from(scaled).ok()
    }

    fn validate(&self) -> Result<(), String> {
        if self.question_count < 1 {
            return Err("question_count must be at least 1".to_string());
        }
        if self.allowed_answers.is_empty() {
            return Err("allowed_answers must not be empty".to_string());
        }
        if self.allowed_participant_types.is_empty() {
            return Err("allowed_participant_types must not be empty".to_string());
        }
        let unique = self
            .allowed_participant_types
            .iter()
            .collect::<BTreeSet<&String>>();
        if unique.len() != self.allowed_participant_types.len() {
            return Err("allowed_participant_types contains duplicates".to_string());
        }

        let in_range = |question: &u32| (1..=self.question_count).contains(question);
        for (participant_type, questions) in &self.skip_questions {
            self.check_participant_key("skip_questions", participant_type)?;
            if let Some(question) = questions.iter().find(|&q| !in_range(q)) {
                return Err(format!(
                    "skip question {question} of '{participant_type}' is outside 1..={}",
                    self.question_count
                ));
            }
        }
        if let Some(question) = self.double_weight_questions.iter().find(|&q| !in_range(q)) {
            return Err(format!(
                "double weight question {question} is outside 1..={}",
                self.question_count
            ));
        }
        for participant_type in self.max_points.keys() {
            self.check_participant_key("max_points", participant_type)?;
        }
        for (participant_type, factor) in &self.scale_factors {
            self.check_participant_key("scale_factors", participant_type)?;
            if factor.numerator == 0 || factor.denominator == 0 {
                return Err(format!(
                    "scale factor of '{participant_type}' must be a positive ratio"
                ));
            }
        }

        for participant_type in &self.allowed_participant_types {
            let max_points = match self.max_points(participant_type) {
                Some(0) | None => {
                    return Err(format!(
                        "max_points of '{participant_type}' must be greater than 0"
                    ))
                }
                Some(max_points) => max_points,
            };
            let ceiling = self.ceiling(participant_type).ok_or_else(|| {
                format!("the answers of '{participant_type}' add up to more than {}", u32::MAX)
            })?;
            if ceiling != max_points {
                return Err(format!(
                    "max_points of '{participant_type}' is {max_points}, but the answers add up to {ceiling}"
                ));
            }
        }
        Ok(())
    }

    fn check_participant_key(&self, field: &str, participant_type: &str) -> Result<(), String> {
        if self.is_allowed_participant_type(participant_type) {
            Ok(())
        } else {
            Err(format!(
                "{field} refers to unknown participant type '{participant_type}'"
            ))
        }
    }
}

impl TryFrom<RuleSetDefinition> for RuleSet {
    type Error = Error;

    fn try_from(definition: RuleSetDefinition) -> Result<Self, Self::Error> {
        let rule_set = RuleSet {
            version: definition.version,
            question_count: definition.question_count,
            allowed_answers: definition.allowed_answers,
            allowed_participant_types: definition.allowed_participant_types,
            skip_questions: definition.skip_questions,
            max_points: definition.max_points,
            double_weight_questions: definition.double_weight_questions,
            scale_factors: definition.scale_factors,
        };
        rule_set.validate().map_err(|reason| {
            warn!(version = %rule_set.version, %reason, "rejected rule set");
            Error::Configuration {
                version: rule_set.version.clone(),
                reason,
            }
        })?;
        Ok(rule_set)
    }
}
