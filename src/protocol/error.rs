use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("call message missing required `method` field")]
    MissingMethod,
    #[error("call message field `{0}` has the wrong type")]
    WrongFieldType(&'static str),
    #[error("a reply may not set `continues` unless the call set `more`")]
    ContinuesWithoutMore,
    #[error("a call may not set both `more` and `oneway`")]
    MoreAndOneway,
}
