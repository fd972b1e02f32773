//! ECG（共通善経済）マトリクスのクイックテスト
//!
//! マトリクスバージョンごとの設問定義に従って、設問の前後移動と得点計算を行う。

pub mod bulk;
pub mod error;
pub mod navigation;
pub mod quick_test;
pub mod registry;
pub mod rule_set;
pub mod scoring;
pub mod telemetry;

pub use bulk::{read_bulk, BulkError};
pub use error::{Error, ErrorKind};
pub use navigation::Navigator;
pub use quick_test::QuickTest;
pub use registry::{factory, matrix_versions, DEFAULT_MATRIX_VERSION};
pub use rule_set::{RuleSet, ScaleFactor};
pub use scoring::{Level, QuickTestResult};
