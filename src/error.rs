use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading aliases, decoding records or building a schedule.
///
/// `Io`, `AliasLoad` and `Archive` abort a build. `CorruptRecord` and
/// `InvalidTimestamp` only ever disqualify the channel pair being decoded.
#[derive(Error, Debug)]
pub enum JtvError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot load channel aliases from {}: {source}", path.display())]
    AliasLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt record at offset {offset}: {reason}")]
    CorruptRecord { offset: usize, reason: String },

    #[error("timestamp {0} precedes the Unix epoch")]
    InvalidTimestamp(u64),

    #[error("archive error: {0:#}")]
    Archive(anyhow::Error),

    #[error("cannot convert from codepage {codepage}: {reason}")]
    Conversion { codepage: String, reason: String },
}

pub type Result<T> = std::result::Result<T, JtvError>;
