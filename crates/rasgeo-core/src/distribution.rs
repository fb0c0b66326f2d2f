//! 水力计算结果的横向分布
//!
//! 水力模型按左滩、主槽、右滩三部分输出剪应力、流速、最大水深等分布。
//! 部分断面只输出 1 或 2 个值，这里统一整理成 3 个值。

use serde::{Deserialize, Serialize};

/// 缺失值标记
pub const MISSING: f64 = f64::NAN;

/// 两值分布的整理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwoValuePolicy {
    /// 较大值放在零值的对侧
    #[default]
    MaxToCenter,
    /// 三个位置都取平均值
    Average,
}

/// 将 1～3 个值的分布整理为 `[左滩, 主槽, 右滩]`
///
/// 其他长度返回三个 [`MISSING`]。
pub fn normalize_distribution(values: &[f64], policy: TwoValuePolicy) -> [f64; 3] {
    match (values, policy) {
        (&[a, b, c], _) => [a, b, c],
        (&[v], _) => [0.0, v, 0.0],
        (&[a, b], TwoValuePolicy::MaxToCenter) => {
            if b > a {
                [0.0, a, b]
            } else {
                [a, b, 0.0]
            }
        }
        (&[a, b], TwoValuePolicy::Average) => {
            let mean = 0.5 * (a + b);
            [mean; 3]
        }
        _ => [MISSING; 3],
    }
}

/// 单个断面在某一计算方案（profile）下的结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileResult {
    pub flow: f64,
    pub shear: [f64; 3],
    pub velocity: [f64; 3],
    pub max_depth: [f64; 3],
}

impl ProfileResult {
    /// 由模型原始输出构建，分布统一整理为三个值
    pub fn from_raw(
        flow: f64,
        shear: &[f64],
        velocity: &[f64],
        max_depth: &[f64],
        policy: TwoValuePolicy,
    ) -> Self {
        Self {
            flow,
            shear: normalize_distribution(shear, policy),
            velocity: normalize_distribution(velocity, policy),
            max_depth: normalize_distribution(max_depth, policy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_values_unchanged() {
        let v = normalize_distribution(&[1.0, 2.0, 3.0], TwoValuePolicy::Average);
        assert_eq!(v, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_single_value_centered() {
        let v = normalize_distribution(&[4.5], TwoValuePolicy::MaxToCenter);
        assert_eq!(v, [0.0, 4.5, 0.0]);
    }

    #[test]
    fn test_two_values_max_to_center() {
        let v = normalize_distribution(&[3.0, 7.0], TwoValuePolicy::MaxToCenter);
        assert_eq!(v, [0.0, 3.0, 7.0]);
        let v = normalize_distribution(&[7.0, 3.0], TwoValuePolicy::MaxToCenter);
        assert_eq!(v, [7.0, 3.0, 0.0]);
    }

    #[test]
    fn test_two_values_average() {
        let v = normalize_distribution(&[4.0, 6.0], TwoValuePolicy::Average);
        assert_eq!(v, [5.0, 5.0, 5.0]);
    }

    #[test]
    fn test_other_lengths_missing() {
        assert!(normalize_distribution(&[], TwoValuePolicy::Average)
            .iter()
            .all(|v| v.is_nan()));
        assert!(normalize_distribution(&[1.0; 4], TwoValuePolicy::MaxToCenter)
            .iter()
            .all(|v| v.is_nan()));
    }

    #[test]
    fn test_profile_result() {
        let r = ProfileResult::from_raw(120.0, &[2.0], &[1.0, 3.0], &[0.5, 1.5, 0.5], TwoValuePolicy::MaxToCenter);
        assert_eq!(r.shear, [0.0, 2.0, 0.0]);
        assert_eq!(r.velocity, [0.0, 1.0, 3.0]);
        assert_eq!(r.max_depth, [0.5, 1.5, 0.5]);
    }
}
