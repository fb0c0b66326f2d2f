//! HEC-RAS 几何文件（`.g01` 等）读写
//!
//! 支持：
//! - 解析为 [`Reach`](rasgeo_core::reach::Reach) 集合
//! - 只重写被修改过的断面，其余内容逐字节保留
//! - 读取、修改、写回一步完成（[`read_modify`]）
//! - JSON 描述的修改方案（[`Scenario`]）

pub mod error;
pub mod format;
pub mod modify;
pub mod parser;
pub mod scenario;
pub mod writer;

pub use error::FileError;
pub use modify::{read_modify, read_modify_with, Modification};
pub use parser::{parse, parse_file, parse_section, ParsedSection};
pub use scenario::Scenario;
pub use writer::{read_write, read_write_with, write_geometry, WriteOptions};
