//! 几何操作错误定义

use thiserror::Error;

use crate::station::StationRange;

/// 断面改造函数的错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("cross-section has no coordinates")]
    EmptyCoordinates,

    #[error("no roughness breakpoint at or left of station {station:.2}")]
    NoRoughness { station: f64 },
}

/// 河段级操作的错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("reach '{reach}': {actual} datum shifts given for {expected} selected stations")]
    LengthMismatch {
        reach: String,
        expected: usize,
        actual: usize,
    },

    #[error("reach '{reach}': no stations in range {range}")]
    StationRangeEmpty { reach: String, range: StationRange },

    #[error("reach '{reach}', station {station}: {source}")]
    Shape {
        reach: String,
        station: String,
        #[source]
        source: ShapeError,
    },
}
