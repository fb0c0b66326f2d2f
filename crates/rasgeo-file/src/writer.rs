//! 几何文件写回
//!
//! 以原文件文本为模板：只有几何与原文不同的断面被重写坐标表、糙率表、岸点行，
//! 其余字节（包括未修改断面、桥涵节点、河段头部、文件尾部）原样输出。

use crate::error::FileError;
use crate::format::{
    first_line, header_station, line_ending, render_banks, render_coordinates, render_roughness,
    rest_lines, BANK_HEADER, COORD_HEADER, MANN_FIELDS_PER_LINE, MANN_HEADER, REACH_MARKER,
    SECTION_MARKER,
};
use crate::parser::read_section;
use rasgeo_core::prelude::{Geometry, Reach};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 写回选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// 写出前将原文件备份为 `<input>.bak`
    pub backup: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { backup: true }
    }
}

/// 组装结果
pub(crate) struct Rendered {
    pub text: String,
    /// 被重写的断面数
    pub edited: usize,
}

/// 用 `reaches` 中的断面替换原文中对应的断面，返回新文本
///
/// `reaches` 中的河段名必须在原文中出现，否则返回 [`FileError::UnknownReach`]。
pub fn write_geometry(original: &str, reaches: &BTreeMap<String, Reach>) -> Result<String, FileError> {
    render(original, reaches).map(|r| r.text)
}

/// 读取 `input`，写回修改后的河段
///
/// `output` 为 `None` 时覆盖 `input`。
pub fn read_write(
    input: &Path,
    reaches: &BTreeMap<String, Reach>,
    output: Option<&Path>,
) -> Result<(), FileError> {
    read_write_with(input, reaches, output, WriteOptions::default())
}

pub fn read_write_with(
    input: &Path,
    reaches: &BTreeMap<String, Reach>,
    output: Option<&Path>,
    options: WriteOptions,
) -> Result<(), FileError> {
    let original = std::fs::read_to_string(input)?;
    write_out(input, &original, reaches, output, options)
}

/// 备份文件路径：在原文件名后追加 `.bak`
pub fn backup_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// 先在内存中组装完整文本，成功后才备份、写出
pub(crate) fn write_out(
    input: &Path,
    original: &str,
    reaches: &BTreeMap<String, Reach>,
    output: Option<&Path>,
    options: WriteOptions,
) -> Result<(), FileError> {
    let rendered = render(original, reaches)?;

    if options.backup {
        let backup = backup_path(input);
        save_text(&backup, original)?;
        tracing::debug!("Backed up {} to {}", input.display(), backup.display());
    }

    let output = output.unwrap_or(input);
    save_text(output, &rendered.text)?;

    tracing::info!(
        "Saved {} reaches ({} edited cross-sections) to {}",
        reaches.len(),
        rendered.edited,
        output.display()
    );

    Ok(())
}

fn save_text(path: &Path, text: &str) -> Result<(), FileError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn render(original: &str, reaches: &BTreeMap<String, Reach>) -> Result<Rendered, FileError> {
    let known: BTreeSet<&str> = original.split(REACH_MARKER).skip(1).map(first_line).collect();
    if let Some(unknown) = reaches.keys().find(|name| !known.contains(name.as_str())) {
        return Err(FileError::UnknownReach(unknown.clone()));
    }

    let mut text = String::with_capacity(original.len());
    let mut edited = 0;
    let mut chunks = original.split(REACH_MARKER);
    if let Some(head) = chunks.next() {
        text.push_str(head);
    }
    for chunk in chunks {
        text.push_str(REACH_MARKER);
        match reaches.get(first_line(chunk)) {
            Some(reach) => edited += render_reach(&mut text, chunk, reach)?,
            None => text.push_str(chunk),
        }
    }

    Ok(Rendered { text, edited })
}

/// 输出一个河段，返回重写的断面数
fn render_reach(out: &mut String, chunk: &str, reach: &Reach) -> Result<usize, FileError> {
    let name = first_line(chunk);
    let body_start = chunk.len() - rest_lines(chunk).len();
    out.push_str(&chunk[..body_start]);

    let mut edited = 0;
    for (i, block) in chunk[body_start..].split(SECTION_MARKER).enumerate() {
        if i > 0 {
            out.push_str(SECTION_MARKER);
        }
        let content = rest_lines(block);
        let target = header_station(first_line(block))
            .filter(|_| i > 0 && content.contains(COORD_HEADER))
            .and_then(|station| reach.geometry(station).map(|g| (station, g)));

        let Some((station, geometry)) = target else {
            out.push_str(block);
            continue;
        };

        let current = read_section(content).map_err(|msg| FileError::format_at(name, station, msg))?;
        if current.geometry == *geometry {
            out.push_str(block);
        } else {
            let block = edit_block(block, geometry).map_err(|msg| FileError::format_at(name, station, msg))?;
            tracing::debug!("Rewrote cross-section {} in reach '{}'", station, name.trim_end());
            out.push_str(&block);
            edited += 1;
        }
    }

    Ok(edited)
}

/// 重写单个断面块中的坐标表、糙率表与岸点行
///
/// 糙率表的原有范围为表头行加 ⌈N/3⌉ 行数据（N 取自原表头）。
/// 糙率表与岸点行之间的内容原样保留。
fn edit_block(block: &str, geometry: &Geometry) -> Result<String, String> {
    let newline = line_ending(block);

    let coord = block
        .find(COORD_HEADER)
        .ok_or_else(|| format!("missing '{}'", COORD_HEADER))?;
    let mann = block[coord..]
        .find(MANN_HEADER)
        .map(|i| coord + i)
        .ok_or_else(|| format!("missing '{}'", MANN_HEADER))?;

    let count = roughness_count(first_line(&block[mann..]))?;
    let mut table_end = mann;
    for _ in 0..=count.div_ceil(MANN_FIELDS_PER_LINE / 3) {
        table_end = next_line(block, table_end);
    }

    let bank = block[table_end..]
        .find(BANK_HEADER)
        .map(|i| table_end + i)
        .ok_or_else(|| format!("missing '{}'", BANK_HEADER))?;
    let bank_end = block[bank..]
        .find(['\r', '\n'])
        .map_or(block.len(), |i| bank + i);

    let shape = geometry.restore();
    let mut out = String::with_capacity(block.len() + 256);
    out.push_str(&block[..coord]);
    out.push_str(&render_coordinates(&shape.coordinates, newline));
    out.push_str(&render_roughness(&shape.roughness, newline));
    out.push_str(&block[table_end..bank]);
    out.push_str(&render_banks(shape.banks));
    out.push_str(&block[bank_end..]);
    Ok(out)
}

/// 原糙率表表头 `#Mann= 6 ,-1 , 0 ` 中的变化点数
fn roughness_count(header: &str) -> Result<usize, String> {
    header
        .strip_prefix(MANN_HEADER)
        .and_then(|rest| rest.split(',').next())
        .and_then(|count| count.trim().parse().ok())
        .ok_or_else(|| format!("bad roughness header '{}'", header))
}

/// 下一行的起始位置
fn next_line(text: &str, from: usize) -> usize {
    text[from..].find('\n').map_or(text.len(), |i| from + i + 1)
}
