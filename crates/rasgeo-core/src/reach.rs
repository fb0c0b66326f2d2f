//! 河段
//!
//! 河段由按河道桩号组织的断面组成。所有区间操作都通过 [`Reach::get_sta`]
//! 的选择规则确定作用范围；`set_*` 就地修改，`adjust_*` 返回修改后的副本。

use crate::error::GeoError;
use crate::geofun::{ChannelShape, GeoFunction};
use crate::geometry::Geometry;
use crate::station::{StationKey, StationRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 基准高程调整量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatumShift {
    /// 所有选中断面统一调整
    Uniform(f64),
    /// 逐断面调整，长度须与选中断面数一致
    PerStation(Vec<f64>),
}

impl From<f64> for DatumShift {
    fn from(delta: f64) -> Self {
        DatumShift::Uniform(delta)
    }
}

impl From<Vec<f64>> for DatumShift {
    fn from(deltas: Vec<f64>) -> Self {
        DatumShift::PerStation(deltas)
    }
}

impl From<&[f64]> for DatumShift {
    fn from(deltas: &[f64]) -> Self {
        DatumShift::PerStation(deltas.to_vec())
    }
}

/// 可序列化的河段修改记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReachEdit {
    /// 见 [`Reach::adjust_datums`]
    AdjustDatums {
        down: f64,
        #[serde(default)]
        up: Option<f64>,
        #[serde(default)]
        range: StationRange,
    },
    /// 见 [`Reach::set_datums`]
    SetDatums {
        delta: DatumShift,
        #[serde(default)]
        range: StationRange,
    },
    /// 见 [`Reach::adjust_geometry`]
    AdjustGeometry {
        shape: ChannelShape,
        #[serde(default)]
        range: StationRange,
    },
}

/// 河段
///
/// 只能经由 [`Reach::new`] 构造，基准高程始终由断面导出，因此只实现序列化。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reach {
    /// 河段名（文件原文，含空格填充）
    name: String,
    /// 桩号文本 -> 断面
    geometries: BTreeMap<String, Geometry>,
    /// 按数值升序排列的桩号
    stations: Vec<StationKey>,
    /// 各断面基准高程，按桩号升序
    datums: Vec<f64>,
}

impl Reach {
    /// 创建河段；桩号文本重复时以后出现者为准
    pub fn new(
        name: impl Into<String>,
        sections: impl IntoIterator<Item = (StationKey, Geometry)>,
    ) -> Self {
        let mut geometries = BTreeMap::new();
        let mut stations = Vec::new();
        for (key, geometry) in sections {
            if geometries.insert(key.text.clone(), geometry).is_none() {
                stations.push(key);
            }
        }
        stations.sort_by(|a, b| a.value.total_cmp(&b.value));

        let mut reach = Self {
            name: name.into(),
            geometries,
            stations,
            datums: Vec::new(),
        };
        reach.re_datums();
        reach
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometries(&self) -> &BTreeMap<String, Geometry> {
        &self.geometries
    }

    /// 按桩号文本查找断面
    pub fn geometry(&self, station: &str) -> Option<&Geometry> {
        self.geometries.get(station)
    }

    /// 按数值升序的桩号
    pub fn stations(&self) -> &[StationKey] {
        &self.stations
    }

    pub fn datums(&self) -> &[f64] {
        &self.datums
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// 上游端（最大桩号）
    pub fn upstream(&self) -> Option<f64> {
        self.stations.last().map(|k| k.value)
    }

    /// 下游端（最小桩号）
    pub fn downstream(&self) -> Option<f64> {
        self.stations.first().map(|k| k.value)
    }

    /// 重新计算 `datums`
    ///
    /// 任何断面或基准高程修改之后都必须调用。
    pub fn re_datums(&mut self) {
        self.datums = self
            .stations
            .iter()
            .filter_map(|k| self.geometries.get(&k.text))
            .map(Geometry::datum)
            .collect();
    }

    /// 区间内（闭区间）的数值桩号，升序
    pub fn get_sta(&self, range: impl Into<StationRange>) -> Vec<f64> {
        let range = range.into();
        self.stations
            .iter()
            .map(|k| k.value)
            .filter(|&v| range.contains(v))
            .collect()
    }

    /// 选中区间内的桩号；空区间视为错误
    fn select(&self, range: StationRange) -> Result<Vec<StationKey>, GeoError> {
        let selected: Vec<StationKey> = self
            .stations
            .iter()
            .filter(|k| range.contains(k.value))
            .cloned()
            .collect();
        if selected.is_empty() {
            return Err(GeoError::StationRangeEmpty {
                reach: self.name.clone(),
                range,
            });
        }
        Ok(selected)
    }

    /// 就地调整选中断面的基准高程
    pub fn set_datums(
        &mut self,
        delta: impl Into<DatumShift>,
        range: impl Into<StationRange>,
    ) -> Result<&mut Self, GeoError> {
        let selected = self.select(range.into())?;
        let deltas = match delta.into() {
            DatumShift::Uniform(d) => vec![d; selected.len()],
            DatumShift::PerStation(ds) => {
                if ds.len() != selected.len() {
                    return Err(GeoError::LengthMismatch {
                        reach: self.name.clone(),
                        expected: selected.len(),
                        actual: ds.len(),
                    });
                }
                ds
            }
        };

        for (key, d) in selected.iter().zip(deltas) {
            if let Some(geometry) = self.geometries.get_mut(&key.text) {
                geometry.shift_datum(d);
            }
        }
        self.re_datums();
        Ok(self)
    }

    /// 返回调整基准高程后的副本
    ///
    /// `up_adj` 为 `None` 时整个区间统一调整 `down_adj`；否则从区间下游端
    /// 的 `down_adj` 线性过渡到上游端的 `up_adj`（按距下游端的桩号距离插值）。
    pub fn adjust_datums(
        &self,
        down_adj: f64,
        up_adj: Option<f64>,
        range: impl Into<StationRange>,
    ) -> Result<Reach, GeoError> {
        let range = range.into();
        let mut copy = self.clone();
        match up_adj {
            None => {
                copy.set_datums(down_adj, range)?;
            }
            Some(up) => {
                let stations = self.get_sta(range);
                let deltas = interpolate_shift(&stations, down_adj, up);
                copy.set_datums(deltas, range)?;
            }
        }
        Ok(copy)
    }

    /// 就地对选中断面应用改造函数
    ///
    /// 全部断面改造成功后才写回，任一失败则河段保持不变。
    pub fn set_geometry<F>(
        &mut self,
        f: &F,
        range: impl Into<StationRange>,
    ) -> Result<&mut Self, GeoError>
    where
        F: GeoFunction + ?Sized,
    {
        let selected = self.select(range.into())?;
        let mut updated = Vec::with_capacity(selected.len());
        for key in &selected {
            let Some(geometry) = self.geometries.get(&key.text) else {
                continue;
            };
            let adjusted = geometry.adjusted(f).map_err(|source| GeoError::Shape {
                reach: self.name.clone(),
                station: key.text.clone(),
                source,
            })?;
            updated.push((key.text.clone(), adjusted));
        }

        tracing::debug!(
            "Rebuilt {} cross-sections in reach '{}'",
            updated.len(),
            self.name.trim_end()
        );
        self.geometries.extend(updated);
        self.re_datums();
        Ok(self)
    }

    /// 返回应用改造函数后的副本
    pub fn adjust_geometry<F>(&self, f: &F, range: impl Into<StationRange>) -> Result<Reach, GeoError>
    where
        F: GeoFunction + ?Sized,
    {
        let mut copy = self.clone();
        copy.set_geometry(f, range)?;
        Ok(copy)
    }

    /// 返回应用修改记录后的副本
    pub fn apply_edit(&self, edit: &ReachEdit) -> Result<Reach, GeoError> {
        match edit {
            ReachEdit::AdjustDatums { down, up, range } => self.adjust_datums(*down, *up, *range),
            ReachEdit::SetDatums { delta, range } => {
                let mut copy = self.clone();
                copy.set_datums(delta.clone(), *range)?;
                Ok(copy)
            }
            ReachEdit::AdjustGeometry { shape, range } => self.adjust_geometry(shape, *range),
        }
    }
}

/// 按距首个桩号的距离线性插值调整量
fn interpolate_shift(stations: &[f64], down: f64, up: f64) -> Vec<f64> {
    let (Some(&first), Some(&last)) = (stations.first(), stations.last()) else {
        return Vec::new();
    };
    let span = last - first;
    stations
        .iter()
        .map(|&s| {
            if span == 0.0 {
                down
            } else {
                down + (up - down) * (s - first) / span
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShapeError;
    use crate::geofun::set_lfc;
    use crate::geometry::{Banks, ManningPoint, Shape};
    use crate::math::Point2;
    use approx::assert_abs_diff_eq;

    fn section(datum: f64) -> Geometry {
        Geometry::new(
            vec![
                Point2::new(0.0, datum + 10.0),
                Point2::new(10.0, datum),
                Point2::new(20.0, datum + 10.0),
            ],
            vec![ManningPoint::new(0.0, 0.05), ManningPoint::new(20.0, 0.05)],
            Banks::new(0.0, 20.0),
        )
        .unwrap()
    }

    fn test_reach() -> Reach {
        Reach::new(
            "RiverOne        ,Lower           ",
            [
                ("20000", 120.0),
                ("5000", 105.0),
                ("30000", 130.0),
                ("15000", 115.0),
            ]
            .into_iter()
            .map(|(text, datum)| (text.parse::<StationKey>().unwrap(), section(datum))),
        )
    }

    #[test]
    fn test_new_orders_stations() {
        let reach = test_reach();
        assert_eq!(reach.len(), 4);
        assert_eq!(reach.get_sta(..), vec![5000.0, 15000.0, 20000.0, 30000.0]);
        assert_eq!(reach.datums(), &[105.0, 115.0, 120.0, 130.0]);
        assert_eq!(reach.upstream(), Some(30000.0));
        assert_eq!(reach.downstream(), Some(5000.0));
    }

    #[test]
    fn test_serialized_datums_follow_sections() {
        let reach = test_reach().adjust_datums(1.0, None, ..).unwrap();
        let value = serde_json::to_value(&reach).unwrap();
        let datums: Vec<f64> = serde_json::from_value(value["datums"].clone()).unwrap();
        assert_eq!(datums, reach.datums());

        // 由断面重建得到同一河段
        let rebuilt = Reach::new(
            reach.name(),
            reach
                .stations()
                .iter()
                .map(|key| (key.clone(), reach.geometry(&key.text).unwrap().clone())),
        );
        assert_eq!(rebuilt, reach);
        assert_eq!(rebuilt.datums(), &[106.0, 116.0, 121.0, 131.0]);
    }

    #[test]
    fn test_get_sta_range() {
        let reach = test_reach();
        assert_eq!(reach.get_sta(10000.0..=25000.0), vec![15000.0, 20000.0]);
        assert_eq!(reach.get_sta(15000.0..=20000.0), vec![15000.0, 20000.0]);
        assert!(reach.get_sta(40000.0..=50000.0).is_empty());
        assert_eq!(
            reach.get_sta(StationRange::new(None, Some(15000.0))),
            vec![5000.0, 15000.0]
        );
    }

    #[test]
    fn test_set_datums_uniform() {
        let mut reach = test_reach();
        reach.set_datums(2.0, 10000.0..=25000.0).unwrap();
        assert_eq!(reach.datums(), &[105.0, 117.0, 122.0, 130.0]);
        assert_eq!(reach.geometry("15000").unwrap().datum(), 117.0);
    }

    #[test]
    fn test_set_datums_per_station() {
        let mut reach = test_reach();
        reach.set_datums(vec![1.0, -1.0], 10000.0..=25000.0).unwrap();
        assert_eq!(reach.datums(), &[105.0, 116.0, 119.0, 130.0]);
    }

    #[test]
    fn test_set_datums_length_mismatch() {
        let mut reach = test_reach();
        let err = reach.set_datums(vec![1.0, 2.0, 3.0], 10000.0..=25000.0).unwrap_err();
        assert_eq!(
            err,
            GeoError::LengthMismatch {
                reach: "RiverOne        ,Lower           ".to_string(),
                expected: 2,
                actual: 3,
            }
        );
        assert_eq!(reach.datums(), &[105.0, 115.0, 120.0, 130.0]);
    }

    #[test]
    fn test_empty_range() {
        let mut reach = test_reach();
        let err = reach.set_datums(1.0, 40000.0..=50000.0).unwrap_err();
        assert!(matches!(err, GeoError::StationRangeEmpty { .. }));
        assert!(err.to_string().contains("RiverOne"));
    }

    #[test]
    fn test_adjust_datums_zero_is_identity() {
        let reach = test_reach();
        let same = reach.adjust_datums(0.0, None, ..).unwrap();
        assert_eq!(same, reach);
    }

    #[test]
    fn test_adjust_datums_interpolates() {
        let reach = test_reach();
        let sloped = reach.adjust_datums(0.0, Some(-10.0), 5000.0..=30000.0).unwrap();
        let shifts: Vec<f64> = sloped
            .datums()
            .iter()
            .zip(reach.datums())
            .map(|(new, old)| new - old)
            .collect();
        assert_abs_diff_eq!(shifts[0], 0.0);
        assert_abs_diff_eq!(shifts[1], -4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(shifts[2], -6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(shifts[3], -10.0, epsilon = 1e-9);
        // 原河段不变
        assert_eq!(reach.datums(), &[105.0, 115.0, 120.0, 130.0]);
    }

    #[test]
    fn test_adjust_datums_single_station() {
        let reach = test_reach();
        let shifted = reach.adjust_datums(3.0, Some(9.0), 15000.0..=15000.0).unwrap();
        assert_eq!(shifted.datums(), &[105.0, 118.0, 120.0, 130.0]);
    }

    #[test]
    fn test_adjust_geometry() {
        let reach = test_reach();
        let lfc = set_lfc(4.0, 2.0, 2.0, 0.03, 0.04);
        let carved = reach.adjust_geometry(&lfc, 15000.0..=20000.0).unwrap();

        assert_eq!(carved.geometry("15000").unwrap().banks(), Banks::new(4.0, 16.0));
        assert_eq!(carved.geometry("5000").unwrap(), reach.geometry("5000").unwrap());
        assert_eq!(reach.geometry("15000").unwrap().banks(), Banks::new(0.0, 20.0));
        assert_eq!(carved.datums(), reach.datums());
    }

    #[test]
    fn test_set_geometry_failure_names_station() {
        let mut reach = test_reach();
        let before = reach.clone();
        let failing = |s: &Shape| -> Result<Shape, ShapeError> {
            if s.coordinates.len() == 3 {
                Err(ShapeError::NoRoughness { station: 1.0 })
            } else {
                Ok(s.clone())
            }
        };
        let err = reach.set_geometry(&failing, ..).unwrap_err();
        match err {
            GeoError::Shape { station, .. } => assert_eq!(station, "5000"),
            other => panic!("Expected Shape error, got {:?}", other),
        }
        assert_eq!(reach, before);
    }

    #[test]
    fn test_chained_edits() {
        let reach = test_reach();
        let lfc = set_lfc(4.0, 2.0, 2.0, 0.03, 0.04);
        let scenario = reach
            .adjust_datums(0.0, Some(100.0), 5000.0..=20000.0)
            .and_then(|r| r.adjust_geometry(&lfc, ..))
            .unwrap();
        assert_eq!(scenario.len(), 4);
        assert!(scenario.datums()[2] > reach.datums()[2]);
        assert!(scenario
            .geometries()
            .values()
            .all(|g| g.banks() == Banks::new(4.0, 16.0)));
    }

    #[test]
    fn test_apply_edit_from_json() {
        let json = r#"[
            { "op": "adjust_datums", "down": 0.0, "up": 100.0, "range": { "first": 5000.0, "last": 30000.0 } },
            { "op": "set_datums", "delta": [1.0, 1.0], "range": { "first": 10000.0, "last": 25000.0 } },
            { "op": "adjust_geometry", "shape": {
                "kind": "lfc",
                "channel": { "bottom_width": 4.0, "depth": 2.0, "side_slope": 2.0 },
                "bottom_n": 0.03,
                "side_n": 0.04
            } }
        ]"#;
        let edits: Vec<ReachEdit> = serde_json::from_str(json).unwrap();
        let mut reach = test_reach();
        for edit in &edits {
            reach = reach.apply_edit(edit).unwrap();
        }
        assert_abs_diff_eq!(reach.datums()[3], 230.0, epsilon = 1e-9);
        assert_abs_diff_eq!(reach.datums()[1], 156.0, epsilon = 1e-9);
        assert_eq!(reach.geometry("30000").unwrap().banks(), Banks::new(4.0, 16.0));
    }
}
