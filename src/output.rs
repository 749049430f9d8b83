//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! ```text
//! photo.jpg → photo-400.jpg
//!     resize 400x600 jpg (31 KB)
//!
//! Batch
//! 001 a.jpg → a-small.jpg
//!     100x75 (4 KB)
//! 002 b.png → b-small.png
//!     error: Failed to decode png source: ...
//!
//! Transformed 1 of 2 images
//! ```

use crate::batch::JobReport;
use crate::engine::{Dimensions, EncodedImage, Operation};
use std::path::Path;

fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn size_label(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

pub fn format_transform_output(
    input: &Path,
    output: &Path,
    operation: Operation,
    result: &EncodedImage,
) -> Vec<String> {
    vec![
        format!("{} → {}", file_name(input), file_name(output)),
        format!(
            "{}{} {}x{} {} ({})",
            indent(1),
            operation,
            result.dimensions.width,
            result.dimensions.height,
            result.format,
            size_label(result.len())
        ),
    ]
}

pub fn print_transform_output(
    input: &Path,
    output: &Path,
    operation: Operation,
    result: &EncodedImage,
) {
    for line in format_transform_output(input, output, operation, result) {
        println!("{line}");
    }
}

pub fn format_identify_output(input: &Path, dims: Dimensions) -> Vec<String> {
    vec![format!(
        "{}: {}x{}",
        file_name(input),
        dims.width,
        dims.height
    )]
}

pub fn print_identify_output(input: &Path, dims: Dimensions) {
    for line in format_identify_output(input, dims) {
        println!("{line}");
    }
}

pub fn format_batch_output(reports: &[JobReport]) -> Vec<String> {
    let mut lines = vec!["Batch".to_string()];
    for (i, report) in reports.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            file_name(&report.input),
            file_name(&report.output)
        ));
        match (&report.error, report.dimensions, report.bytes) {
            (Some(error), _, _) => lines.push(format!("{}error: {error}", indent(1))),
            (None, Some(dims), Some(bytes)) => lines.push(format!(
                "{}{}x{} ({})",
                indent(1),
                dims.width,
                dims.height,
                size_label(bytes)
            )),
            _ => {}
        }
    }
    let ok = reports.iter().filter(|r| r.is_ok()).count();
    lines.push(String::new());
    lines.push(format!("Transformed {ok} of {} images", reports.len()));
    lines
}

pub fn print_batch_output(reports: &[JobReport]) {
    for line in format_batch_output(reports) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::OutputFormat;
    use std::path::PathBuf;

    #[test]
    fn transform_output_lines() {
        let result = EncodedImage {
            bytes: vec![0; 2048],
            format: OutputFormat::Jpeg,
            dimensions: Dimensions::new(400, 600),
        };
        let lines = format_transform_output(
            Path::new("in/photo.jpg"),
            Path::new("out/photo-400.jpg"),
            Operation::Resize,
            &result,
        );
        assert_eq!(
            lines,
            vec![
                "photo.jpg → photo-400.jpg".to_string(),
                "    resize 400x600 jpg (2 KB)".to_string(),
            ]
        );
    }

    #[test]
    fn identify_output_line() {
        let lines = format_identify_output(Path::new("a/b.png"), Dimensions::new(8, 6));
        assert_eq!(lines, vec!["b.png: 8x6".to_string()]);
    }

    #[test]
    fn size_labels() {
        assert_eq!(size_label(12), "12 B");
        assert_eq!(size_label(4096), "4 KB");
        assert_eq!(size_label(3 * 1024 * 1024 / 2), "1.5 MB");
    }

    #[test]
    fn batch_output_counts_successes() {
        let reports = vec![
            JobReport {
                input: PathBuf::from("a.jpg"),
                output: PathBuf::from("a-small.jpg"),
                dimensions: Some(Dimensions::new(100, 75)),
                bytes: Some(4096),
                error: None,
            },
            JobReport {
                input: PathBuf::from("b.png"),
                output: PathBuf::from("b-small.png"),
                dimensions: None,
                bytes: None,
                error: Some("boom".to_string()),
            },
        ];
        let lines = format_batch_output(&reports);
        assert_eq!(lines[1], "001 a.jpg → a-small.jpg");
        assert_eq!(lines[2], "    100x75 (4 KB)");
        assert_eq!(lines[3], "002 b.png → b-small.png");
        assert_eq!(lines[4], "    error: boom");
        assert_eq!(lines.last().unwrap(), "Transformed 1 of 2 images");
    }
}
