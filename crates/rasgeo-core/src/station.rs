//! 河道桩号
//!
//! 桩号同时保留数值形式（排序、范围查询）与原始文本形式（文件匹配、
//! 插值标记 `*`），两者不可互相替代。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseFloatError;
use std::ops::{RangeFull, RangeInclusive};
use std::str::FromStr;

/// 插值断面的桩号后缀
pub const INTERPOLATED_MARK: char = '*';

/// 河道桩号
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationKey {
    /// 数值桩号
    pub value: f64,
    /// 文件中的原始文本（已去除首尾空白）
    pub text: String,
}

impl StationKey {
    pub fn new(value: f64, text: impl Into<String>) -> Self {
        Self {
            value,
            text: text.into(),
        }
    }

    /// 是否为插值断面
    pub fn is_interpolated(&self) -> bool {
        self.text.ends_with(INTERPOLATED_MARK)
    }
}

impl FromStr for StationKey {
    type Err = ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let value = text.trim_end_matches(INTERPOLATED_MARK).trim().parse()?;
        Ok(Self::new(value, text))
    }
}

impl fmt::Display for StationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// 桩号选择范围（闭区间，`None` 表示不限）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StationRange {
    pub first: Option<f64>,
    pub last: Option<f64>,
}

impl StationRange {
    /// 整个河段
    pub const fn all() -> Self {
        Self {
            first: None,
            last: None,
        }
    }

    pub const fn new(first: Option<f64>, last: Option<f64>) -> Self {
        Self { first, last }
    }

    pub const fn between(first: f64, last: f64) -> Self {
        Self::new(Some(first), Some(last))
    }

    pub fn contains(&self, value: f64) -> bool {
        self.first.map_or(true, |lo| value >= lo) && self.last.map_or(true, |hi| value <= hi)
    }
}

impl From<RangeInclusive<f64>> for StationRange {
    fn from(range: RangeInclusive<f64>) -> Self {
        Self::between(*range.start(), *range.end())
    }
}

impl From<RangeFull> for StationRange {
    fn from(_: RangeFull) -> Self {
        Self::all()
    }
}

impl fmt::Display for StationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.first, self.last) {
            (Some(lo), Some(hi)) => write!(f, "[{}, {}]", lo, hi),
            (Some(lo), None) => write!(f, "[{}, ..]", lo),
            (None, Some(hi)) => write!(f, "[.., {}]", hi),
            (None, None) => f.write_str("[..]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_station() {
        let key: StationKey = " 43505   ".parse().unwrap();
        assert_eq!(key.value, 43505.0);
        assert_eq!(key.text, "43505");
        assert!(!key.is_interpolated());
    }

    #[test]
    fn test_parse_interpolated_station() {
        let key: StationKey = "1250.5*".parse().unwrap();
        assert_eq!(key.value, 1250.5);
        assert_eq!(key.text, "1250.5*");
        assert!(key.is_interpolated());
    }

    #[test]
    fn test_parse_invalid_station() {
        assert!("abc".parse::<StationKey>().is_err());
    }

    #[test]
    fn test_range_contains() {
        let range = StationRange::from(10000.0..=25000.0);
        assert!(range.contains(10000.0));
        assert!(range.contains(25000.0));
        assert!(!range.contains(5000.0));
        assert!(StationRange::all().contains(-1.0e9));
        assert!(StationRange::new(None, Some(3.0)).contains(-10.0));
    }

    #[test]
    fn test_range_display() {
        assert_eq!(StationRange::between(1.0, 2.5).to_string(), "[1, 2.5]");
        assert_eq!(StationRange::all().to_string(), "[..]");
    }
}
