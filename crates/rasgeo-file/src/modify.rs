//! 读取、修改、写回
//!
//! 每个河段给出一个修改：直接替换为新河段，或者由原河段计算新河段。
//! 未列出的河段原样保留。任一步失败时不写任何文件。

use crate::error::FileError;
use crate::parser::parse;
use crate::writer::{write_out, WriteOptions};
use rasgeo_core::prelude::{Reach, ReachEdit};
use rasgeo_core::GeoError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

type ReachFn = dyn Fn(&Reach) -> Result<Reach, GeoError> + Send + Sync;

/// 单个河段的修改
pub enum Modification {
    /// 用给定河段替换
    Replace(Reach),
    /// 由原河段计算新河段
    Apply(Box<ReachFn>),
    /// 依次应用修改记录
    Edits(Vec<ReachEdit>),
}

impl Modification {
    pub fn apply<F>(f: F) -> Self
    where
        F: Fn(&Reach) -> Result<Reach, GeoError> + Send + Sync + 'static,
    {
        Modification::Apply(Box::new(f))
    }

    /// 作用于原河段
    pub fn run(&self, reach: &Reach) -> Result<Reach, GeoError> {
        match self {
            Modification::Replace(replacement) => Ok(replacement.clone()),
            Modification::Apply(f) => f(reach),
            Modification::Edits(edits) => edits
                .iter()
                .try_fold(reach.clone(), |current, edit| current.apply_edit(edit)),
        }
    }
}

impl fmt::Debug for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modification::Replace(reach) => f.debug_tuple("Replace").field(&reach.name()).finish(),
            Modification::Apply(_) => f.write_str("Apply(..)"),
            Modification::Edits(edits) => f.debug_tuple("Edits").field(edits).finish(),
        }
    }
}

impl From<Reach> for Modification {
    fn from(reach: Reach) -> Self {
        Modification::Replace(reach)
    }
}

impl From<Vec<ReachEdit>> for Modification {
    fn from(edits: Vec<ReachEdit>) -> Self {
        Modification::Edits(edits)
    }
}

/// 读取 `input`，按河段名应用修改后写回
///
/// 写出前备份为 `<input>.bak`；`output` 为 `None` 时覆盖 `input`。
pub fn read_modify(
    input: &Path,
    modifications: &BTreeMap<String, Modification>,
    output: Option<&Path>,
) -> Result<(), FileError> {
    read_modify_with(input, modifications, output, WriteOptions::default())
}

pub fn read_modify_with(
    input: &Path,
    modifications: &BTreeMap<String, Modification>,
    output: Option<&Path>,
    options: WriteOptions,
) -> Result<(), FileError> {
    let original = std::fs::read_to_string(input)?;
    let reaches = parse(&original)?;

    let mut modified = BTreeMap::new();
    for (name, modification) in modifications {
        let reach = reaches
            .get(name)
            .ok_or_else(|| FileError::UnknownReach(name.clone()))?;
        tracing::debug!("Modifying reach '{}': {:?}", name.trim_end(), modification);
        modified.insert(name.clone(), modification.run(reach)?);
    }

    write_out(input, &original, &modified, output, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasgeo_core::prelude::{set_lfc, ChannelShape, DatumShift, Geometry, StationRange};

    const TEXT: &str = "\
River Reach=Test River      ,Main
Type RM Length L Ch R = 1 ,200     ,100,100,100
#Sta/Elev= 3
       0      10      10       0      20      10
#Mann= 2 ,-1 , 0
       0     .05       0      20     .05       0
Bank Sta=0,20
Type RM Length L Ch R = 1 ,100     ,100,100,100
#Sta/Elev= 3
       0      10      10       0      20      10
#Mann= 2 ,-1 , 0
       0     .05       0      20     .05       0
Bank Sta=0,20
";

    fn reach() -> Reach {
        parse(TEXT).unwrap().into_values().next().unwrap()
    }

    #[test]
    fn test_replace() {
        let replacement = reach().adjust_datums(1.0, None, ..).unwrap();
        let out = Modification::from(replacement.clone()).run(&reach()).unwrap();
        assert_eq!(out, replacement);
    }

    #[test]
    fn test_apply_closure() {
        let modification = Modification::apply(|r: &Reach| r.adjust_datums(-1.0, Some(1.0), ..));
        let out = modification.run(&reach()).unwrap();
        assert_eq!(out.datums(), &[-1.0, 1.0]);
    }

    #[test]
    fn test_edits_in_order() {
        let modification = Modification::from(vec![
            ReachEdit::SetDatums {
                delta: DatumShift::Uniform(2.0),
                range: StationRange::all(),
            },
            ReachEdit::AdjustGeometry {
                shape: ChannelShape::from(set_lfc(4.0, 2.0, 2.0, 0.03, 0.04)),
                range: StationRange::between(150.0, 250.0),
            },
        ]);
        let out = modification.run(&reach()).unwrap();
        assert_eq!(out.datums(), &[2.0, 2.0]);

        let edited: &Geometry = out.geometry("200").unwrap();
        let untouched: &Geometry = out.geometry("100").unwrap();
        assert_eq!(edited.coordinates().len(), 6);
        assert_eq!(untouched.coordinates().len(), 3);
    }

    #[test]
    fn test_failing_edit_propagates() {
        let modification = Modification::from(vec![ReachEdit::SetDatums {
            delta: DatumShift::PerStation(vec![1.0, 2.0, 3.0]),
            range: StationRange::all(),
        }]);
        assert!(matches!(
            modification.run(&reach()),
            Err(GeoError::LengthMismatch { .. })
        ));
    }
}
