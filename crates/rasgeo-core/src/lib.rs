//! RasGeo 核心断面几何引擎
//!
//! 提供河道断面的标准化表示、河段集合以及断面改造函数。
//!
//! # 架构设计
//!
//! - `Geometry`: 单个断面（坐标、糙率、岸点），已做标准化处理
//! - `Reach`: 按河道桩号组织的断面集合
//! - `GeoFunction`: 纯函数式的断面改造（低水槽、滩地等）
//! - `daylight`: 坡面与现状地形的交点求解
//!
//! # 示例
//!
//! ```rust
//! use rasgeo_core::prelude::*;
//!
//! let geo = Geometry::new(
//!     vec![Point2::new(100.0, 10.0), Point2::new(110.0, 0.0), Point2::new(120.0, 10.0)],
//!     vec![ManningPoint::new(100.0, 0.05), ManningPoint::new(120.0, 0.05)],
//!     Banks::new(100.0, 120.0),
//! )
//! .unwrap();
//!
//! let carved = geo.adjusted(&set_lfc(4.0, 2.0, 2.0, 0.03, 0.04)).unwrap();
//! println!("New banks: {:?}", carved.restore().banks);
//! ```

pub mod daylight;
pub mod distribution;
pub mod error;
pub mod geofun;
pub mod geometry;
pub mod math;
pub mod reach;
pub mod station;

pub use error::{GeoError, ShapeError};

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::daylight::{daylight, Ray, Side};
    pub use crate::distribution::{normalize_distribution, ProfileResult, TwoValuePolicy};
    pub use crate::error::{GeoError, ShapeError};
    pub use crate::geofun::{
        set_afp, set_lfc, ChannelShape, GeoFunction, LowFlowChannel, SetAfp, SetLfc, WidthRule,
    };
    pub use crate::geometry::{Banks, Geometry, ManningPoint, Shape};
    pub use crate::math::Point2;
    pub use crate::reach::{DatumShift, Reach, ReachEdit};
    pub use crate::station::{StationKey, StationRange};
}
