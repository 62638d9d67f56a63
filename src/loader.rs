//! Import and export of curves as delimited text.
//!
//! Rows hold numbers separated by commas, tabs or spaces. Lines starting
//! with `#` are comments; those seen before the first data row form the
//! header.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::data::PlotData;
use crate::error::LoadError;

/// How to read a delimited text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Zero-based column holding X.
    pub x_column: usize,
    /// Zero-based column holding Y.
    pub y_column: usize,
    /// Non-comment lines to skip before looking for data, such as a row of column titles.
    pub skip_header: usize,
    /// Stop at the first blank line after data has started.
    pub break_on_blank_line: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            x_column: 0,
            y_column: 1,
            skip_header: 0,
            break_on_blank_line: true,
        }
    }
}

/// A parsed curve and the comment lines that preceded its data.
#[derive(Debug, Clone)]
pub struct LoadedCurve {
    pub data: PlotData,
    /// Header comments without the leading `#`.
    pub header: Vec<String>,
}

fn parse_numbers(line: &str) -> Vec<f64> {
    let mut numbers = Vec::new();
    for token in line
        .split([',', '\t', ' '])
        .filter(|token| !token.is_empty())
    {
        match token.parse() {
            Ok(value) => numbers.push(value),
            Err(_) => break,
        }
    }
    numbers
}

/// Parse a curve from delimited text.
///
/// Rows with a single number use the row index as X. Lines with no leading
/// number are skipped.
pub fn parse_delimited<R: BufRead>(reader: R, options: &LoadOptions) -> Result<LoadedCurve, LoadError> {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut header = Vec::new();
    let mut to_skip = options.skip_header;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let trimmed = line.trim();

        if let Some(comment) = trimmed.strip_prefix('#') {
            if xs.is_empty() {
                header.push(comment.trim().to_string());
            }
            continue;
        }
        if trimmed.is_empty() {
            if options.break_on_blank_line && !xs.is_empty() {
                break;
            }
            continue;
        }
        if to_skip > 0 {
            to_skip -= 1;
            continue;
        }

        let numbers = parse_numbers(trimmed);
        match numbers.len() {
            0 => {
                log::debug!("skipping non-numeric line {line_number}");
                continue;
            }
            1 => {
                xs.push(xs.len() as f64);
                ys.push(numbers[0]);
            }
            len => {
                let column = options.x_column.max(options.y_column);
                if column >= len {
                    return Err(LoadError::MissingColumn {
                        line: line_number,
                        column,
                    });
                }
                xs.push(numbers[options.x_column]);
                ys.push(numbers[options.y_column]);
            }
        }
    }

    if xs.is_empty() {
        return Err(LoadError::NoData);
    }
    let data = PlotData::from_vecs(xs, ys)?;
    log::debug!("parsed {} points", data.len());
    Ok(LoadedCurve { data, header })
}

/// Load a curve from a file; the file name becomes the curve name.
pub fn load_file(path: impl AsRef<Path>, options: &LoadOptions) -> Result<LoadedCurve, LoadError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut loaded = parse_delimited(BufReader::new(file), options)?;
    if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
        loaded.data.set_name(name);
    }
    log::debug!("loaded {} points from {}", loaded.data.len(), path.display());
    Ok(loaded)
}

/// Write a curve as tab-separated `x y` rows, preceded by `#` header lines.
pub fn write_delimited<W: Write>(mut writer: W, curve: &PlotData, header: &[String]) -> std::io::Result<()> {
    for line in header {
        writeln!(writer, "# {line}")?;
    }
    for point in curve.points() {
        writeln!(writer, "{}\t{}", point.x, point.y)?;
    }
    writer.flush()
}

/// Save a curve to a file; see [`write_delimited`].
pub fn save_file(path: impl AsRef<Path>, curve: &PlotData, header: &[String]) -> Result<(), LoadError> {
    let path = path.as_ref();
    let writer = BufWriter::new(File::create(path)?);
    write_delimited(writer, curve, header)?;
    log::debug!("saved {} points to {}", curve.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_mixed_delimiters_and_header() {
        let text = "# time, volts\n# run 3\n0, 1.5\n1\t2.5\n2  3.5 extra 9\n";
        let loaded = parse_delimited(Cursor::new(text), &LoadOptions::default()).expect("parse");
        assert_eq!(loaded.header, vec!["time, volts", "run 3"]);
        assert_eq!(loaded.data.xs(), &[0.0, 1.0, 2.0]);
        assert_eq!(loaded.data.ys(), &[1.5, 2.5, 3.5]);
    }

    #[test]
    fn stops_at_blank_line_when_asked() {
        let text = "\n1 2\n3 4\n\n5 6\n";
        let loaded = parse_delimited(Cursor::new(text), &LoadOptions::default()).expect("parse");
        assert_eq!(loaded.data.len(), 2);

        let options = LoadOptions {
            break_on_blank_line: false,
            ..LoadOptions::default()
        };
        let loaded = parse_delimited(Cursor::new(text), &options).expect("parse");
        assert_eq!(loaded.data.len(), 3);
    }

    #[test]
    fn single_column_uses_row_index() {
        let text = "x_title\n4\n8\n16\n";
        let options = LoadOptions {
            skip_header: 1,
            ..LoadOptions::default()
        };
        let loaded = parse_delimited(Cursor::new(text), &options).expect("parse");
        assert_eq!(loaded.data.xs(), &[0.0, 1.0, 2.0]);
        assert_eq!(loaded.data.ys(), &[4.0, 8.0, 16.0]);
    }

    #[test]
    fn reports_missing_columns_and_empty_input() {
        let options = LoadOptions {
            y_column: 3,
            ..LoadOptions::default()
        };
        let err = parse_delimited(Cursor::new("1 2 3\n"), &options).expect_err("missing column");
        assert!(matches!(err, LoadError::MissingColumn { line: 1, column: 3 }));

        let err = parse_delimited(Cursor::new("# only a comment\n"), &LoadOptions::default())
            .expect_err("no data");
        assert!(matches!(err, LoadError::NoData));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sine.dat");
        let curve = PlotData::from_vecs(vec![0.0, 0.5, 1.0], vec![0.0, 0.479425538604203, -1.0e-7])
            .expect("valid curve");
        save_file(&path, &curve, &["sine".to_string()]).expect("save");

        let loaded = load_file(&path, &LoadOptions::default()).expect("load");
        assert_eq!(loaded.header, vec!["sine"]);
        assert_eq!(loaded.data.name(), "sine");
        assert_eq!(loaded.data.xs(), curve.xs());
        assert_eq!(loaded.data.ys(), curve.ys());
    }
}
