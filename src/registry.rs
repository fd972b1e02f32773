use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::Error;
use crate::quick_test::QuickTest;
use crate::rule_set::RuleSet;

/// バージョン指定を省略したときのマトリクスバージョン
pub const DEFAULT_MATRIX_VERSION: &str = "4.1";

/// 新しいマトリクスバージョンはここにJSONリソースを追加する
const MATRIX_SOURCES: &[(&str, &str)] = &[("4.1", include_str!("../resources/matrix-4.1.json"))];

static RULE_SETS: Lazy<BTreeMap<&'static str, Result<Arc<RuleSet>, Error>>> = Lazy::new(|| {
    MATRIX_SOURCES
        .iter()
        .map(|&(version, json)| (version, RuleSet::from_json(version, json).map(Arc::new)))
        .collect()
});

/// 対応しているマトリクスバージョン
pub fn matrix_versions() -> Vec<&'static str> {
    RULE_SETS.keys().copied().collect()
}

pub fn rule_set(version: &str) -> Result<Arc<RuleSet>, Error> {
    match RULE_SETS.get(version) {
        Some(rule_set) => rule_set.clone(),
        None => Err(Error::UnknownVersion(version.to_string())),
    }
}

/// マトリクスバージョンを指定してクイックテストを作る
pub fn factory(version: Option<&str>) -> Result<QuickTest, Error> {
    let version = version.unwrap_or(DEFAULT_MATRIX_VERSION);
    rule_set(version).map(QuickTest::new)
}
