//! 修改方案
//!
//! 以 JSON 描述一组河段修改，例如：
//!
//! ```json
//! {
//!   "name": "lower channel",
//!   "reaches": {
//!     "Compton Creek   ,CC              ": [
//!       { "op": "adjust_datums", "down": -2.0, "up": 0.0 },
//!       { "op": "adjust_geometry",
//!         "shape": { "kind": "lfc",
//!                    "channel": { "bottom_width": 30, "depth": 2, "side_slope": 2 },
//!                    "bottom_n": 0.03, "side_n": 0.035 },
//!         "range": { "first": 43000, "last": 43400 } }
//!     ]
//!   }
//! }
//! ```
//!
//! 河段名需与文件中的原文一致（含尾部空格）。

use crate::error::FileError;
use crate::modify::{read_modify_with, Modification};
use crate::writer::WriteOptions;
use rasgeo_core::prelude::ReachEdit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    /// 河段名 -> 按顺序应用的修改记录
    #[serde(default)]
    pub reaches: BTreeMap<String, Vec<ReachEdit>>,
    /// 写出前是否备份原文件
    #[serde(default = "default_backup")]
    pub backup: bool,
}

fn default_backup() -> bool {
    true
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self, FileError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, FileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, FileError> {
        let text = std::fs::read_to_string(path)?;
        let scenario = Self::from_json(&text)?;
        tracing::info!(
            "Loaded scenario '{}' ({} reaches) from {}",
            scenario.name.as_deref().unwrap_or("unnamed"),
            scenario.reaches.len(),
            path.display()
        );
        Ok(scenario)
    }

    pub fn modifications(&self) -> BTreeMap<String, Modification> {
        self.reaches
            .iter()
            .map(|(name, edits)| (name.clone(), Modification::Edits(edits.clone())))
            .collect()
    }

    /// 将方案应用到几何文件
    pub fn apply(&self, input: &Path, output: Option<&Path>) -> Result<(), FileError> {
        let options = WriteOptions {
            backup: self.backup,
        };
        read_modify_with(input, &self.modifications(), output, options)
    }
}
