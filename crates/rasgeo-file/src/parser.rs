//! 几何文件解析
//!
//! 只读取断面的坐标表、糙率表与岸点，其余内容由写入端原样保留。

use crate::error::FileError;
use crate::format::{
    first_line, header_station, rest_lines, BANK_HEADER, COORD_HEADER, MANN_HEADER,
    MAX_TOKEN_LEN, REACH_MARKER, SECTION_MARKER,
};
use rasgeo_core::prelude::{Banks, Geometry, ManningPoint, Point2, Reach, StationKey};
use std::collections::BTreeMap;
use std::path::Path;

/// 单个断面的解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSection {
    pub geometry: Geometry,
    /// 因字段粘连被丢弃的坐标词元数
    pub dropped_tokens: usize,
}

/// 解析断面内容（断面表头行之后的部分）
pub fn parse_section(content: &str) -> Result<ParsedSection, FileError> {
    read_section(content).map_err(FileError::Format)
}

/// 解析整个几何文件，返回 河段名 -> 河段
///
/// 河段名保留文件原文（含尾部空格）。
/// 没有坐标表的节点（桥涵、堰等）被跳过。
pub fn parse(text: &str) -> Result<BTreeMap<String, Reach>, FileError> {
    let mut reaches = BTreeMap::new();

    for chunk in text.split(REACH_MARKER).skip(1) {
        let name = first_line(chunk);
        let mut sections = Vec::new();

        for block in rest_lines(chunk).split(SECTION_MARKER).skip(1) {
            let header = first_line(block);
            let station = header_station(header)
                .ok_or_else(|| FileError::format_at(name, "?", format!("bad section header '{}'", header)))?;
            let content = rest_lines(block);

            if !content.contains(COORD_HEADER) {
                tracing::debug!("Skipping node {} in reach '{}': no cross-section data", station, name.trim_end());
                continue;
            }

            let key: StationKey = station
                .parse()
                .map_err(|e| FileError::format_at(name, station, format!("bad station: {}", e)))?;
            let parsed = read_section(content).map_err(|msg| FileError::format_at(name, station, msg))?;
            if parsed.dropped_tokens > 0 {
                tracing::warn!(
                    "Dropped {} merged coordinate tokens at reach '{}', station {}",
                    parsed.dropped_tokens,
                    name.trim_end(),
                    station
                );
            }
            sections.push((key, parsed.geometry));
        }

        let reach = Reach::new(name, sections);
        tracing::debug!("Parsed reach '{}' with {} cross-sections", name.trim_end(), reach.len());
        reaches.insert(name.to_string(), reach);
    }

    Ok(reaches)
}

/// 读取并解析几何文件
pub fn parse_file(path: &Path) -> Result<BTreeMap<String, Reach>, FileError> {
    let text = std::fs::read_to_string(path)?;
    let reaches = parse(&text)?;

    tracing::info!(
        "Loaded {} reaches ({} cross-sections) from {}",
        reaches.len(),
        reaches.values().map(Reach::len).sum::<usize>(),
        path.display()
    );

    Ok(reaches)
}

pub(crate) fn read_section(content: &str) -> Result<ParsedSection, String> {
    let coord_start = content
        .find(COORD_HEADER)
        .ok_or_else(|| format!("missing '{}'", COORD_HEADER))?;
    let mann_start = content[coord_start..]
        .find(MANN_HEADER)
        .map(|i| coord_start + i)
        .ok_or_else(|| format!("missing '{}'", MANN_HEADER))?;

    let (coordinates, dropped_tokens) = read_coordinates(rest_lines(&content[coord_start..mann_start]))?;
    let roughness = read_roughness(roughness_table(&content[mann_start..]))?;
    let banks = read_banks(&content[mann_start..])?;

    let geometry = Geometry::new(coordinates, roughness, banks).map_err(|e| e.to_string())?;
    Ok(ParsedSection {
        geometry,
        dropped_tokens,
    })
}

/// 坐标表：丢弃粘连词元后两两成对
fn read_coordinates(table: &str) -> Result<(Vec<Point2>, usize), String> {
    let mut dropped = 0;
    let mut values = Vec::new();
    for token in table.split_whitespace() {
        if token.len() > MAX_TOKEN_LEN {
            dropped += 1;
            continue;
        }
        values.push(parse_number(token)?);
    }

    let points = values
        .chunks_exact(2)
        .map(|pair| Point2::new(pair[0], pair[1]))
        .collect();
    Ok((points, dropped))
}

/// 糙率表正文：表头下一行起，到下一个关键字行之前
fn roughness_table(from_header: &str) -> &str {
    let body = rest_lines(from_header);
    let body = match body.find('=') {
        Some(i) => &body[..i],
        None => body,
    };
    match body.rfind('\n') {
        Some(i) => &body[..i],
        None => body,
    }
}

/// 糙率表：每三个词元为一组（起点距、n、0）
fn read_roughness(table: &str) -> Result<Vec<ManningPoint>, String> {
    let tokens: Vec<&str> = table.split_whitespace().collect();
    tokens
        .chunks_exact(3)
        .map(|t| Ok(ManningPoint::new(parse_number(t[0])?, parse_number(t[1])?)))
        .collect()
}

fn read_banks(text: &str) -> Result<Banks, String> {
    let start = text
        .find(BANK_HEADER)
        .ok_or_else(|| format!("missing '{}'", BANK_HEADER))?;
    let line = first_line(&text[start + BANK_HEADER.len()..]);
    let mut parts = line.split(',');
    match (parts.next(), parts.next()) {
        (Some(left), Some(right)) => Ok(Banks::new(parse_number(left)?, parse_number(right)?)),
        _ => Err(format!("bad bank line '{}'", line)),
    }
}

fn parse_number(token: &str) -> Result<f64, String> {
    token
        .trim()
        .parse()
        .map_err(|_| format!("invalid number '{}'", token.trim()))
}
