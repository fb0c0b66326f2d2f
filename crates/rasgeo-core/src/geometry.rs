//! 断面几何
//!
//! 为了便于统一处理，所有断面都做标准化：最左端起点距为 0，最低高程为 0。
//! 同时保存偏移量 `offset` 与基准高程 `datum`，以便还原原始坐标。

use crate::error::ShapeError;
use crate::geofun::GeoFunction;
use crate::math::{elevation_extent, station_extent, Point2};
use serde::{Deserialize, Serialize};

/// 曼宁糙率变化点（从该起点距开始向右生效）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManningPoint {
    pub station: f64,
    pub n: f64,
}

impl ManningPoint {
    pub fn new(station: f64, n: f64) -> Self {
        Self { station, n }
    }
}

/// 主槽左右岸点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Banks {
    pub left: f64,
    pub right: f64,
}

impl Banks {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    fn shifted(&self, dx: f64) -> Self {
        Self::new(self.left + dx, self.right + dx)
    }
}

/// 断面形状：坐标、糙率、岸点
///
/// 断面改造函数的输入与输出。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub coordinates: Vec<Point2>,
    pub roughness: Vec<ManningPoint>,
    pub banks: Banks,
}

impl Shape {
    pub fn new(coordinates: Vec<Point2>, roughness: Vec<ManningPoint>, banks: Banks) -> Self {
        Self {
            coordinates,
            roughness,
            banks,
        }
    }

    /// 平移：起点距加 `dx`，高程加 `dy`（糙率值不变）
    pub fn shifted(&self, dx: f64, dy: f64) -> Self {
        Self {
            coordinates: self
                .coordinates
                .iter()
                .map(|p| Point2::new(p.x + dx, p.y + dy))
                .collect(),
            roughness: self
                .roughness
                .iter()
                .map(|m| ManningPoint::new(m.station + dx, m.n))
                .collect(),
            banks: self.banks.shifted(dx),
        }
    }

    /// 起点距范围
    pub fn station_extent(&self) -> Option<(f64, f64)> {
        station_extent(&self.coordinates)
    }

    /// 高程范围
    pub fn elevation_extent(&self) -> Option<(f64, f64)> {
        elevation_extent(&self.coordinates)
    }
}

/// 单个断面（标准化后）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    shape: Shape,
    /// 被减去的首点起点距
    offset: f64,
    /// 被减去的最低高程
    datum: f64,
}

impl Geometry {
    /// 由原始（未标准化）数据创建断面
    pub fn new(
        coordinates: Vec<Point2>,
        roughness: Vec<ManningPoint>,
        banks: Banks,
    ) -> Result<Self, ShapeError> {
        Self::from_shape(Shape::new(coordinates, roughness, banks))
    }

    /// 由原始形状创建断面
    pub fn from_shape(raw: Shape) -> Result<Self, ShapeError> {
        let offset = raw
            .coordinates
            .first()
            .map(|p| p.x)
            .ok_or(ShapeError::EmptyCoordinates)?;
        let (datum, _) = raw
            .elevation_extent()
            .ok_or(ShapeError::EmptyCoordinates)?;

        Ok(Self {
            shape: raw.shifted(-offset, -datum),
            offset,
            datum,
        })
    }

    pub fn coordinates(&self) -> &[Point2] {
        &self.shape.coordinates
    }

    pub fn roughness(&self) -> &[ManningPoint] {
        &self.shape.roughness
    }

    pub fn banks(&self) -> Banks {
        self.shape.banks
    }

    /// 标准化后的形状
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn datum(&self) -> f64 {
        self.datum
    }

    /// 还原为原始坐标（加回偏移量和基准高程）
    pub fn restore(&self) -> Shape {
        self.shape.shifted(self.offset, self.datum)
    }

    /// 就地应用改造函数
    ///
    /// 不做重新标准化，调用者需保证改造函数返回的形状自洽。
    /// 失败时断面保持不变。
    pub fn update<F>(&mut self, f: &F) -> Result<&mut Self, ShapeError>
    where
        F: GeoFunction + ?Sized,
    {
        self.shape = f.apply(&self.shape)?;
        Ok(self)
    }

    /// 返回应用改造函数后的新断面，原断面不变
    pub fn adjusted<F>(&self, f: &F) -> Result<Self, ShapeError>
    where
        F: GeoFunction + ?Sized,
    {
        let mut copy = self.clone();
        copy.update(f)?;
        Ok(copy)
    }

    /// 调整基准高程
    pub(crate) fn shift_datum(&mut self, delta: f64) {
        self.datum += delta;
    }
}
