//! 断面改造函数
//!
//! 改造函数接收标准化后的断面形状（坐标、糙率、岸点），返回新的形状：
//! - 坐标：`[(x, y)]`，左端为 0、最低点为 0
//! - 糙率：`[(x, n)]`，自该点向右生效
//! - 岸点：`(左, 右)`
//!
//! 内置改造均为参数记录（可序列化），也可直接使用闭包：
//!
//! ```rust
//! use rasgeo_core::prelude::*;
//!
//! let raise = |s: &Shape| -> Result<Shape, ShapeError> { Ok(s.shifted(0.0, 1.0)) };
//! let shape = Shape::new(vec![Point2::new(0.0, 0.0)], vec![], Banks::new(0.0, 0.0));
//! assert_eq!(raise.apply(&shape).unwrap().coordinates[0].y, 1.0);
//! ```

use crate::daylight::{daylight, Ray, Side};
use crate::error::ShapeError;
use crate::geometry::{Banks, ManningPoint, Shape};
use crate::math::{Point2, NUDGE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// 断面改造函数
///
/// 要求确定性、无副作用，可对任意断面重复应用。
pub trait GeoFunction {
    fn apply(&self, shape: &Shape) -> Result<Shape, ShapeError>;
}

impl<F> GeoFunction for F
where
    F: Fn(&Shape) -> Result<Shape, ShapeError>,
{
    fn apply(&self, shape: &Shape) -> Result<Shape, ShapeError> {
        self(shape)
    }
}

/// 低水槽（梯形）尺寸
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LowFlowChannel {
    /// 槽底宽
    pub bottom_width: f64,
    /// 槽深
    pub depth: f64,
    /// 边坡（水平:竖直）
    pub side_slope: f64,
}

/// 梯形槽的关键点位
#[derive(Debug, Clone, Copy, PartialEq)]
struct Trapezoid {
    bottom_left: f64,
    bottom_right: f64,
    bottom: f64,
    top_left: f64,
    top_right: f64,
    top: f64,
}

impl LowFlowChannel {
    pub fn new(bottom_width: f64, depth: f64, side_slope: f64) -> Self {
        Self {
            bottom_width,
            depth,
            side_slope,
        }
    }

    /// 以 `center` 为中心、槽底位于 `floor` 布置低水槽
    fn layout(&self, center: f64, floor: f64) -> Trapezoid {
        let bottom_left = center - self.bottom_width / 2.0;
        let bottom_right = center + self.bottom_width / 2.0;
        let side = self.side_slope * self.depth;
        Trapezoid {
            bottom_left,
            bottom_right,
            bottom: floor,
            top_left: bottom_left - side,
            top_right: bottom_right + side,
            top: floor + self.depth,
        }
    }
}

/// 断面范围：水平中心与最低高程
fn center_and_floor(shape: &Shape) -> Result<(f64, f64, f64), ShapeError> {
    let (xmin, xmax) = shape.station_extent().ok_or(ShapeError::EmptyCoordinates)?;
    let (ymin, _) = shape.elevation_extent().ok_or(ShapeError::EmptyCoordinates)?;
    Ok((0.5 * (xmin + xmax), xmax - xmin, ymin))
}

fn sort_by_station(roughness: &mut [ManningPoint]) {
    roughness.sort_by(|a, b| a.station.total_cmp(&b.station));
}

/// 单一低水槽
///
/// 足迹外 0.1 以外的现状地面原样保留，槽顶边直接与之相连。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetLfc {
    pub channel: LowFlowChannel,
    /// 槽底糙率
    pub bottom_n: f64,
    /// 边坡糙率
    pub side_n: f64,
}

/// 构造低水槽改造函数
pub fn set_lfc(lfc_w: f64, lfc_h: f64, lfc_z: f64, bot_n: f64, side_n: f64) -> SetLfc {
    SetLfc {
        channel: LowFlowChannel::new(lfc_w, lfc_h, lfc_z),
        bottom_n: bot_n,
        side_n,
    }
}

impl GeoFunction for SetLfc {
    fn apply(&self, shape: &Shape) -> Result<Shape, ShapeError> {
        let (center, _, floor) = center_and_floor(shape)?;
        let lfc = self.channel.layout(center, floor);

        let outside = |x: f64| x < lfc.top_left - NUDGE || x > lfc.top_right + NUDGE;

        let mut coordinates: Vec<Point2> = shape
            .coordinates
            .iter()
            .copied()
            .filter(|p| p.x < lfc.top_left - NUDGE)
            .collect();
        coordinates.extend([
            Point2::new(lfc.top_left, lfc.top),
            Point2::new(lfc.bottom_left, lfc.bottom),
            Point2::new(lfc.bottom_right, lfc.bottom),
            Point2::new(lfc.top_right, lfc.top),
        ]);
        coordinates.extend(
            shape
                .coordinates
                .iter()
                .copied()
                .filter(|p| p.x > lfc.top_right + NUDGE),
        );

        let mut roughness: Vec<ManningPoint> = shape
            .roughness
            .iter()
            .copied()
            .filter(|m| outside(m.station))
            .collect();
        roughness.extend([
            ManningPoint::new(lfc.top_left, self.side_n),
            ManningPoint::new(lfc.bottom_left, self.bottom_n),
            ManningPoint::new(lfc.bottom_right, self.side_n),
        ]);
        sort_by_station(&mut roughness);

        Ok(Shape::new(
            coordinates,
            roughness,
            Banks::new(lfc.top_left, lfc.top_right),
        ))
    }
}

/// 滩地宽度规则：由单侧可用宽度计算滩地槽底单侧宽度
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthRule {
    /// 固定宽度
    Constant(f64),
    /// 可用宽度的比例
    Fraction(f64),
    /// 自定义规则（不可序列化）
    #[serde(skip)]
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl WidthRule {
    /// 自定义规则，可捕获参数
    pub fn custom<F>(rule: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        WidthRule::Custom(Arc::new(rule))
    }

    pub fn width(&self, available: f64) -> f64 {
        match self {
            WidthRule::Constant(w) => *w,
            WidthRule::Fraction(f) => f * available,
            WidthRule::Custom(rule) => rule(available),
        }
    }
}

impl fmt::Debug for WidthRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidthRule::Constant(w) => f.debug_tuple("Constant").field(w).finish(),
            WidthRule::Fraction(r) => f.debug_tuple("Fraction").field(r).finish(),
            WidthRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// 嵌套在滩地槽内的低水槽
///
/// 断面由两个对称的梯形嵌套组成：较窄的低水槽切入较宽的滩地槽。
/// 滩地边坡按 `afp_slope` 向外放坡，与现状地面求交；岸点设在低水槽顶边。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAfp {
    pub channel: LowFlowChannel,
    /// 滩地槽底单侧宽度规则
    pub afp_width: WidthRule,
    /// 滩地边坡（水平:竖直）
    pub afp_slope: f64,
    pub afp_side_n: f64,
    pub afp_n: f64,
    pub lfc_side_n: f64,
    pub lfc_n: f64,
}

/// 构造滩地 + 低水槽改造函数
#[allow(clippy::too_many_arguments)]
pub fn set_afp(
    lfc_w: f64,
    lfc_h: f64,
    lfc_z: f64,
    afp_wfun: WidthRule,
    afp_z: f64,
    afpside_n: f64,
    afp_n: f64,
    lfcside_n: f64,
    lfc_n: f64,
) -> SetAfp {
    SetAfp {
        channel: LowFlowChannel::new(lfc_w, lfc_h, lfc_z),
        afp_width: afp_wfun,
        afp_slope: afp_z,
        afp_side_n: afpside_n,
        afp_n,
        lfc_side_n: lfcside_n,
        lfc_n,
    }
}

/// 滩地一侧的坡脚与坡顶
#[derive(Debug, Clone, Copy)]
struct AfpEdge {
    bottom: f64,
    top: f64,
    top_elevation: f64,
}

impl SetAfp {
    fn rise(&self, run: f64) -> f64 {
        if self.afp_slope == 0.0 {
            0.0
        } else {
            run / self.afp_slope
        }
    }

    fn edge(&self, ground: &[Point2], bottom: f64, elevation: f64, side: Side) -> AfpEdge {
        let top = daylight(ground, &Ray::new(bottom, elevation, self.afp_slope, side));
        AfpEdge {
            bottom,
            top,
            top_elevation: elevation + self.rise((top - bottom).abs()),
        }
    }
}

impl GeoFunction for SetAfp {
    fn apply(&self, shape: &Shape) -> Result<Shape, ShapeError> {
        let (center, width, floor) = center_and_floor(shape)?;
        let lfc = self.channel.layout(center, floor);
        let ground = &shape.coordinates;

        // 单侧可用宽度
        let available = 0.5 * (width - (lfc.top_right - lfc.top_left));
        let has_afp = available > 0.0;

        let (left, right) = if has_afp {
            let afp_w = self.afp_width.width(available);
            (
                self.edge(ground, lfc.top_left - afp_w, lfc.top, Side::Left),
                self.edge(ground, lfc.top_right + afp_w, lfc.top, Side::Right),
            )
        } else {
            // 没有可用宽度：滩地边缘固定在低水槽外 0.1 处，不做放坡
            (
                AfpEdge {
                    bottom: lfc.top_left,
                    top: lfc.top_left - NUDGE,
                    top_elevation: lfc.top,
                },
                AfpEdge {
                    bottom: lfc.top_right,
                    top: lfc.top_right + NUDGE,
                    top_elevation: lfc.top,
                },
            )
        };

        // 保留的现状地面，包括坡顶附近的陡壁
        let keep_left = ground.iter().copied().filter(|p| {
            p.x < left.top - NUDGE || (p.x <= left.top && p.y - left.top_elevation > NUDGE)
        });
        let keep_right = ground.iter().copied().filter(|p| {
            p.x > right.top + NUDGE || (p.x >= right.top && p.y - right.top_elevation > NUDGE)
        });

        let mut coordinates: Vec<Point2> = keep_left.collect();
        if has_afp {
            coordinates.extend([
                Point2::new(left.top, left.top_elevation),
                Point2::new(left.bottom, lfc.top),
            ]);
        }
        coordinates.extend([
            Point2::new(lfc.top_left, lfc.top),
            Point2::new(lfc.bottom_left, lfc.bottom),
            Point2::new(lfc.bottom_right, lfc.bottom),
            Point2::new(lfc.top_right, lfc.top),
        ]);
        if has_afp {
            coordinates.extend([
                Point2::new(right.bottom, lfc.top),
                Point2::new(right.top, right.top_elevation),
            ]);
        }
        coordinates.extend(keep_right);

        // 右侧坡顶处延续原有糙率
        let carried_n = shape
            .roughness
            .iter()
            .rev()
            .find(|m| m.station <= right.top)
            .map(|m| m.n)
            .ok_or(ShapeError::NoRoughness { station: right.top })?;

        let mut roughness: Vec<ManningPoint> = shape
            .roughness
            .iter()
            .copied()
            .filter(|m| m.station < left.top || m.station > right.top)
            .collect();
        roughness.push(ManningPoint::new(left.top, self.afp_side_n));
        if has_afp {
            roughness.push(ManningPoint::new(left.bottom, self.afp_n));
        }
        roughness.extend([
            ManningPoint::new(lfc.top_left, self.lfc_side_n),
            ManningPoint::new(lfc.bottom_left, self.lfc_n),
            ManningPoint::new(lfc.bottom_right, self.lfc_side_n),
        ]);
        if has_afp {
            roughness.extend([
                ManningPoint::new(lfc.top_right, self.afp_n),
                ManningPoint::new(right.bottom, self.afp_side_n),
            ]);
        } else {
            roughness.push(ManningPoint::new(lfc.top_right, self.afp_side_n));
        }
        roughness.push(ManningPoint::new(right.top, carried_n));
        sort_by_station(&mut roughness);

        Ok(Shape::new(
            coordinates,
            roughness,
            Banks::new(lfc.top_left, lfc.top_right),
        ))
    }
}

/// 可序列化的内置断面改造
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelShape {
    Lfc(SetLfc),
    Afp(SetAfp),
}

impl GeoFunction for ChannelShape {
    fn apply(&self, shape: &Shape) -> Result<Shape, ShapeError> {
        match self {
            ChannelShape::Lfc(f) => f.apply(shape),
            ChannelShape::Afp(f) => f.apply(shape),
        }
    }
}

impl From<SetLfc> for ChannelShape {
    fn from(f: SetLfc) -> Self {
        ChannelShape::Lfc(f)
    }
}

impl From<SetAfp> for ChannelShape {
    fn from(f: SetAfp) -> Self {
        ChannelShape::Afp(f)
    }
}
