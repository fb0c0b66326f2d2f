//! 文件操作错误定义

use rasgeo_core::GeoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid file format: {0}")]
    Format(String),

    #[error("Unknown reach: '{0}'")]
    UnknownReach(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeoError),
}

impl FileError {
    /// 带河段、桩号上下文的格式错误
    pub(crate) fn format_at(reach: &str, station: &str, message: impl std::fmt::Display) -> Self {
        FileError::Format(format!(
            "reach '{}', station {}: {}",
            reach.trim_end(),
            station,
            message
        ))
    }
}
