//! 数学基础类型与常量

/// 二维点：`x` 为起点距（station），`y` 为高程
pub type Point2 = nalgebra::Point2<f64>;

/// 浮点比较容差
pub const EPSILON: f64 = 1e-10;

/// 断面改造时的最小间距，单位与断面数据一致
///
/// 用于避免重复点、判断地面与坡面是否"相等"。
pub const NUDGE: f64 = 0.1;

/// 点集的起点距范围 `(min, max)`
pub fn station_extent(points: &[Point2]) -> Option<(f64, f64)> {
    extent(points.iter().map(|p| p.x))
}

/// 点集的高程范围 `(min, max)`
pub fn elevation_extent(points: &[Point2]) -> Option<(f64, f64)> {
    extent(points.iter().map(|p| p.y))
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extents() {
        let pts = [
            Point2::new(3.0, 5.0),
            Point2::new(-1.0, 7.0),
            Point2::new(4.0, -2.0),
        ];
        assert_eq!(station_extent(&pts), Some((-1.0, 4.0)));
        assert_eq!(elevation_extent(&pts), Some((-2.0, 7.0)));
        assert_eq!(station_extent(&[]), None);
    }
}
