//! 放坡求交（daylighting）
//!
//! 从设计断面的坡脚出发，按给定坡比向外放坡，求坡面与现状地面的交点。
//!
//! 可能的情况：
//! - 坡面与地面某一段相交：在该段上线性插值求交点（常见情况）
//! - 坡面在某个地面点处与地面"相等"（容差 0.1）：取该点向内 0.1 处，避免重复点
//! - 坡面高于该侧地面最高点：按解析式求坡面到达最高高程的位置
//! - 坡面始终低于地面：取最外侧地面点向内 0.1 处
//! - 该侧没有地面点：取起点向外 0.1 处

use crate::math::{Point2, EPSILON, NUDGE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 放坡方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// 起点距增长方向：左 -1，右 +1
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// 放坡射线
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// 坡脚起点距
    pub start: f64,
    /// 坡脚高程
    pub start_elevation: f64,
    /// 坡比（水平:竖直），0 表示水平射线
    pub slope: f64,
    pub side: Side,
}

impl Ray {
    pub fn new(start: f64, start_elevation: f64, slope: f64, side: Side) -> Self {
        Self {
            start,
            start_elevation,
            slope,
            side,
        }
    }

    /// 每单位水平距离的高程增量
    fn rise_rate(&self) -> f64 {
        if self.slope == 0.0 {
            0.0
        } else {
            1.0 / self.slope
        }
    }

    /// 射线在指定起点距处的高程
    pub fn height_at(&self, station: f64) -> f64 {
        self.start_elevation + (station - self.start).abs() * self.rise_rate()
    }

    /// 射线到达指定高程时的起点距
    fn station_at(&self, elevation: f64) -> f64 {
        self.start + self.side.sign() * self.slope * (elevation - self.start_elevation)
    }
}

/// 射线相对地面的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Below,
    Level,
    Above,
}

impl Relation {
    fn classify(ray: f64, ground: f64) -> Self {
        if (ray - ground).abs() < NUDGE {
            Relation::Level
        } else if ray > ground {
            Relation::Above
        } else {
            Relation::Below
        }
    }

    fn crosses(self, other: Relation) -> bool {
        matches!(
            (self, other),
            (Relation::Above, Relation::Below) | (Relation::Below, Relation::Above)
        )
    }
}

/// 求放坡射线与地面折线的交点起点距
///
/// `ground` 为按起点距排列的地面点。
pub fn daylight(ground: &[Point2], ray: &Ray) -> f64 {
    let dir = ray.side.sign();

    // 只保留射线一侧的地面点，由近及远
    let mut side: Vec<Point2> = ground
        .iter()
        .copied()
        .filter(|p| (p.x - ray.start) * dir > 0.0)
        .collect();
    if ray.side == Side::Left {
        side.reverse();
    }

    let Some(top) = side.iter().map(|p| p.y).reduce(f64::max) else {
        return ray.start + dir * NUDGE;
    };

    for pair in side.windows(2) {
        let (inner, outer) = (pair[0], pair[1]);
        let ray_inner = ray.height_at(inner.x);
        let ray_outer = ray.height_at(outer.x);
        let rel_inner = Relation::classify(ray_inner, inner.y);
        let rel_outer = Relation::classify(ray_outer, outer.y);

        if rel_inner == Relation::Level {
            return inner.x - dir * NUDGE;
        }
        if rel_inner.crosses(rel_outer) {
            return inner.x + dir * crossing_run(ray, inner, outer, ray_inner);
        }
        if ray_outer >= top {
            return ray.station_at(top);
        }
    }

    // 未找到交点
    let outermost = side[side.len() - 1];
    if ray.height_at(outermost.x) >= top {
        ray.station_at(top)
    } else {
        outermost.x - dir * NUDGE
    }
}

/// 从 `inner` 出发到交点的水平距离
///
/// 两条线都换算成"高程/水平距离"的形式后直接求交。
fn crossing_run(ray: &Ray, inner: Point2, outer: Point2, ray_inner: f64) -> f64 {
    let run = (outer.x - inner.x).abs();
    if run < EPSILON {
        // 竖直地面段
        return 0.0;
    }
    let ground_rate = (outer.y - inner.y) / run;
    let closing = (ray.rise_rate() - ground_rate).abs();
    if closing < EPSILON {
        return 0.0;
    }
    (ray_inner - inner.y).abs() / closing
}
