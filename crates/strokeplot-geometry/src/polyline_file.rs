//! Plain-text polyline files
//!
//! One `x y` pair per line, printed with six decimals, and a blank line
//! after every polyline (a pen-up boundary). A `#RRGGBB` line sets the
//! color of the polylines that follow it and a bare `#` line clears it.
//! The writer only emits a header when the color changes, so uncolored
//! data is written in the plain coordinate format.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use strokeplot_core::{Color, FileFormatError, Point, Polyline};
use tracing::{debug, warn};

/// Header line that clears the current color
const COLOR_RESET: &str = "#";

/// Write polylines in the text format.
pub fn write_polylines<W: Write>(mut writer: W, polylines: &[Polyline]) -> Result<(), FileFormatError> {
    let mut color: Option<Color> = None;

    for line in polylines {
        if line.color() != color {
            match line.color() {
                Some(c) => writeln!(writer, "{}", c)?,
                None => writeln!(writer, "{}", COLOR_RESET)?,
            }
            color = line.color();
        }
        for p in line.points() {
            writeln!(writer, "{:.6} {:.6}", p.x, p.y)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Parse polylines from the text format.
///
/// Groups with fewer than two points are dropped with a warning. Any line
/// that is neither blank, a color header, nor two numbers is an error.
pub fn read_polylines<R: BufRead>(reader: R) -> Result<Vec<Polyline>, FileFormatError> {
    let mut polylines = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut color: Option<Color> = None;
    let mut line_number = 0;

    for line_result in reader.lines() {
        let line = line_result?;
        line_number += 1;
        let text = line.trim();

        if text.is_empty() {
            flush(&mut polylines, &mut current, color, line_number);
            continue;
        }

        if text == COLOR_RESET {
            flush(&mut polylines, &mut current, color, line_number);
            color = None;
            continue;
        }

        if text.starts_with('#') {
            flush(&mut polylines, &mut current, color, line_number);
            color = Some(text.parse().map_err(|_| FileFormatError::InvalidColor {
                line_number,
                value: text.to_string(),
            })?);
            continue;
        }

        current.push(parse_coordinate(text, line_number)?);
    }

    flush(&mut polylines, &mut current, color, line_number);
    debug!("Read {} polylines", polylines.len());
    Ok(polylines)
}

/// Write polylines to a file.
pub fn save_polylines(path: impl AsRef<Path>, polylines: &[Polyline]) -> Result<(), FileFormatError> {
    let file = File::create(path.as_ref())?;
    write_polylines(BufWriter::new(file), polylines)
}

/// Read polylines from a file.
pub fn load_polylines(path: impl AsRef<Path>) -> Result<Vec<Polyline>, FileFormatError> {
    let file = File::open(path.as_ref())?;
    read_polylines(BufReader::new(file))
}

fn parse_coordinate(text: &str, line_number: usize) -> Result<Point, FileFormatError> {
    let invalid = |reason: String| FileFormatError::InvalidCoordinate {
        line_number,
        reason,
    };

    let mut fields = text.split_whitespace();
    let (Some(x), Some(y), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(invalid(format!("expected two numbers, got '{}'", text)));
    };

    let x: f64 = x.parse().map_err(|e| invalid(format!("x '{}': {}", x, e)))?;
    let y: f64 = y.parse().map_err(|e| invalid(format!("y '{}': {}", y, e)))?;
    Ok(Point::new(x, y))
}

fn flush(
    polylines: &mut Vec<Polyline>,
    current: &mut Vec<Point>,
    color: Option<Color>,
    line_number: usize,
) {
    if current.is_empty() {
        return;
    }
    match Polyline::new(std::mem::take(current)) {
        Ok(line) => polylines.push(line.with_color(color)),
        Err(e) => warn!("Skipping polyline ending at line {}: {}", line_number, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_format() {
        let polylines = vec![
            Polyline::from_coords(&[(0.0, 0.5), (-1.0, 0.25)]).unwrap(),
            Polyline::from_coords(&[(0.125, 1.0), (0.0, 0.0)]).unwrap(),
        ];
        let mut buf = Vec::new();
        write_polylines(&mut buf, &polylines).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "0.000000 0.500000\n-1.000000 0.250000\n\n0.125000 1.000000\n0.000000 0.000000\n\n"
        );
    }

    #[test]
    fn test_color_headers_written_on_change() {
        let red = Color::new(0xDA, 0x29, 0x1C);
        let polylines = vec![
            Polyline::from_coords(&[(0.0, 0.0), (1.0, 0.0)]).unwrap().with_color(Some(red)),
            Polyline::from_coords(&[(0.0, 1.0), (1.0, 1.0)]).unwrap().with_color(Some(red)),
        ];
        let mut buf = Vec::new();
        write_polylines(&mut buf, &polylines).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.matches("#DA291C").count(), 1);
        assert!(text.starts_with("#DA291C\n"));
    }

    #[test]
    fn test_uncolored_after_colored_writes_reset() {
        let red = Color::new(0xFF, 0x00, 0x00);
        let polylines = vec![
            Polyline::from_coords(&[(0.0, 0.0), (1.0, 0.0)]).unwrap().with_color(Some(red)),
            Polyline::from_coords(&[(0.0, 1.0), (1.0, 1.0)]).unwrap(),
        ];
        let mut buf = Vec::new();
        write_polylines(&mut buf, &polylines).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "#FF0000\n0.000000 0.000000\n1.000000 0.000000\n\n#\n0.000000 1.000000\n1.000000 1.000000\n\n"
        );
        let colors: Vec<_> = read_polylines(text.as_bytes())
            .unwrap()
            .iter()
            .map(Polyline::color)
            .collect();
        assert_eq!(colors, vec![Some(red), None]);
    }

    #[test]
    fn test_read_tolerates_layout() {
        let text = "\n\n  0 0\n1\t1\n\n\n\n2 2\n3 3\n4 4";
        let polylines = read_polylines(text.as_bytes()).unwrap();
        assert_eq!(polylines.len(), 2);
        assert_eq!(polylines[1].len(), 3);
        assert_eq!(polylines[1].end(), Point::new(4.0, 4.0));
    }

    #[test]
    fn test_read_drops_single_points() {
        let text = "0 0\n\n1 1\n2 2\n";
        let polylines = read_polylines(text.as_bytes()).unwrap();
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0].start(), Point::new(1.0, 1.0));
    }

    #[test]
    fn test_read_colors() {
        let text = "#00843D\n0 0\n1 1\n\n2 2\n3 3\n\n#FFC72C\n4 4\n5 5\n";
        let polylines = read_polylines(text.as_bytes()).unwrap();
        let green = Some(Color::new(0x00, 0x84, 0x3D));
        assert_eq!(polylines[0].color(), green);
        assert_eq!(polylines[1].color(), green);
        assert_eq!(polylines[2].color(), Some(Color::new(0xFF, 0xC7, 0x2C)));
    }

    #[test]
    fn test_read_errors_carry_line_numbers() {
        let err = read_polylines("0 0\n1 x\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            FileFormatError::InvalidCoordinate { line_number: 2, .. }
        ));

        let err = read_polylines("0 0 0\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            FileFormatError::InvalidCoordinate { line_number: 1, .. }
        ));

        let err = read_polylines("#nope\n".as_bytes()).unwrap_err();
        assert!(matches!(err, FileFormatError::InvalidColor { line_number: 1, .. }));
    }
}
