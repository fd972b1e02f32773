use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// 設問定義（マトリクス）が不正
    #[error("invalid rule set for matrix version '{version}': {reason}")]
    Configuration { version: String, reason: String },
    /// 設問番号が範囲外
    #[error("question number must be between 1 and {question_count}, but was {question}")]
    IllegalQuestion { question: u32, question_count: u32 },
    /// 回答選択肢が違反
    #[error("answer value must be one of {allowed:?}, but was {value}")]
    IllegalAnswer { value: u8, allowed: Vec<u8> },
    /// 回答者区分が違反
    #[error("participant type must be one of {allowed:?}, but was '{participant_type}'")]
    IllegalParticipantType {
        participant_type: String,
        allowed: Vec<String>,
    },
    /// 未対応のマトリクスバージョン
    #[error("there is no quick test for the matrix version '{0}'")]
    UnknownVersion(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    InvalidArgument,
    NotFound,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::IllegalQuestion { .. }
            | Error::IllegalAnswer { .. }
            | Error::IllegalParticipantType { .. } => ErrorKind::InvalidArgument,
            Error::UnknownVersion(_) => ErrorKind::NotFound,
        }
    }
}
