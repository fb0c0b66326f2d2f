//! 几何文件的文本约定
//!
//! 文件按关键字分段：`River Reach=` 开始一个河段，
//! `Type RM Length L Ch R = ` 开始一个断面（或桥涵等其他节点）。
//! 数值表为定宽格式，每个字段 8 个字符。

use rasgeo_core::prelude::{Banks, ManningPoint, Point2};

/// 河段分隔符
pub const REACH_MARKER: &str = "River Reach=";
/// 断面分隔符
pub const SECTION_MARKER: &str = "Type RM Length L Ch R = ";
/// 坐标表表头
pub const COORD_HEADER: &str = "#Sta/Elev=";
/// 糙率表表头
pub const MANN_HEADER: &str = "#Mann=";
/// 岸点行
pub const BANK_HEADER: &str = "Bank Sta=";

/// 定宽字段宽度
pub const FIELD_WIDTH: usize = 8;
/// 超过该长度的词元视为相邻字段粘连
pub const MAX_TOKEN_LEN: usize = 7;
/// 坐标表每行字段数（5 个点）
pub const COORD_FIELDS_PER_LINE: usize = 10;
/// 糙率表每行字段数（3 个变化点）
pub const MANN_FIELDS_PER_LINE: usize = 9;

/// 第一行（不含行尾）
pub fn first_line(text: &str) -> &str {
    let line = match text.find('\n') {
        Some(i) => &text[..i],
        None => text,
    };
    line.strip_suffix('\r').unwrap_or(line)
}

/// 第一行之后的内容
pub fn rest_lines(text: &str) -> &str {
    match text.find('\n') {
        Some(i) => &text[i + 1..],
        None => "",
    }
}

/// 从断面表头行 `1 ,43366*  ,139,139,139` 取桩号文本
pub fn header_station(header: &str) -> Option<&str> {
    header.split(',').nth(1).map(str::trim)
}

/// 文本使用的换行符
pub fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

pub fn fmt_value(value: f64) -> String {
    format!("{:>8.2}", value)
}

pub fn fmt_manning(n: f64) -> String {
    format!("{:>8.3}", n)
}

/// 按每行 `per_line` 个字段排版，每行以 `newline` 结尾
fn layout(fields: &[String], per_line: usize, newline: &str) -> String {
    let mut out = String::with_capacity(fields.len() * FIELD_WIDTH + fields.len() / per_line + 1);
    for line in fields.chunks(per_line) {
        for field in line {
            out.push_str(field);
        }
        out.push_str(newline);
    }
    out
}

/// 坐标表（表头 + 数据行）
pub fn render_coordinates(points: &[Point2], newline: &str) -> String {
    let fields: Vec<String> = points
        .iter()
        .flat_map(|p| [fmt_value(p.x), fmt_value(p.y)])
        .collect();
    format!("{} {} {}", COORD_HEADER, points.len(), newline)
        + &layout(&fields, COORD_FIELDS_PER_LINE, newline)
}

/// 糙率表，统一写为水平变化（`-1`）类型
pub fn render_roughness(points: &[ManningPoint], newline: &str) -> String {
    let fields: Vec<String> = points
        .iter()
        .flat_map(|m| [fmt_value(m.station), fmt_manning(m.n), format!("{:>8}", 0)])
        .collect();
    format!("{}{:>2} ,-1 , 0 {}", MANN_HEADER, points.len(), newline)
        + &layout(&fields, MANN_FIELDS_PER_LINE, newline)
}

/// 岸点行（不含行尾）
pub fn render_banks(banks: Banks) -> String {
    format!("{}{:.2},{:.2}", BANK_HEADER, banks.left, banks.right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_and_rest() {
        assert_eq!(first_line("abc\r\ndef\n"), "abc");
        assert_eq!(rest_lines("abc\r\ndef\n"), "def\n");
        assert_eq!(first_line("abc"), "abc");
        assert_eq!(rest_lines("abc"), "");
    }

    #[test]
    fn test_header_station() {
        assert_eq!(header_station("1 ,43366*  ,139,139,139"), Some("43366*"));
        assert_eq!(header_station("no commas"), None);
    }

    #[test]
    fn test_field_format() {
        assert_eq!(fmt_value(930.5), "  930.50");
        assert_eq!(fmt_value(-12.25), "  -12.25");
        assert_eq!(fmt_manning(0.017), "   0.017");
    }

    #[test]
    fn test_render_coordinates_wraps() {
        let points: Vec<Point2> = (0..6).map(|i| Point2::new(i as f64, 1.0)).collect();
        let text = render_coordinates(&points, "\n");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "#Sta/Elev= 6 ");
        assert_eq!(lines[1].len(), 80);
        assert_eq!(lines[2], "    5.00    1.00");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_render_roughness() {
        let points = vec![ManningPoint::new(0.0, 0.05), ManningPoint::new(20.0, 0.035)];
        let text = render_roughness(&points, "\r\n");
        assert_eq!(
            text,
            "#Mann= 2 ,-1 , 0 \r\n    0.00   0.050       0   20.00   0.035       0\r\n"
        );

        let many: Vec<ManningPoint> = (0..10).map(|i| ManningPoint::new(i as f64, 0.04)).collect();
        let text = render_roughness(&many, "\n");
        assert!(text.starts_with("#Mann=10 ,-1 , 0 \n"));
        assert_eq!(text.lines().count(), 1 + 4);
    }

    #[test]
    fn test_render_banks() {
        assert_eq!(render_banks(Banks::new(930.5, 1069.0)), "Bank Sta=930.50,1069.00");
    }
}
