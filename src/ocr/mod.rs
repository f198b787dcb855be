//! OCR line grouping
//!
//! The external OCR service returns loose word/box detections. Detections
//! whose vertical centers lie close together are merged into one line of text.

mod client;
mod error;

pub use client::OcrClient;
pub use error::OcrError;

use serde::{Deserialize, Serialize};

/// Vertical distance within which two detections share a line.
pub const DEFAULT_LINE_THRESHOLD: f64 = 15.0;

/// One recognized text fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrDetection {
    /// Bounding polygon, normally four `[x, y]` corners clockwise from top-left
    #[serde(rename = "box")]
    pub bounding_box: Vec<[f64; 2]>,

    /// Recognized text
    pub text: String,
}

impl OcrDetection {
    /// Midpoint between the top-left and bottom-right corners' y values.
    /// Degenerate polygons fall back to the mean y of their points.
    pub fn vertical_center(&self) -> f64 {
        match self.bounding_box.as_slice() {
            [top, _, bottom, ..] => (top[1] + bottom[1]) / 2.0,
            [] => 0.0,
            points => points.iter().map(|p| p[1]).sum::<f64>() / points.len() as f64,
        }
    }

    /// Leftmost x of the polygon
    pub fn left(&self) -> f64 {
        self.bounding_box
            .iter()
            .map(|p| p[0])
            .reduce(f64::min)
            .unwrap_or(0.0)
    }
}

/// Response body of the OCR service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    /// Detections in the order the service reported them
    #[serde(default)]
    pub result: Vec<OcrDetection>,
}

/// A group of detections sharing a vertical band
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrLine {
    /// Center of the first detection that opened the line
    pub center_y: f64,

    /// Texts of the line's detections, left to right, joined by spaces
    pub text: String,
}

/// Group detections into lines.
///
/// A detection joins the first existing line (in creation order) whose center
/// is within `y_threshold` of its own; otherwise it opens a new line. Lines are
/// returned top to bottom and each line reads left to right.
pub fn group_lines(detections: &[OcrDetection], y_threshold: f64) -> Vec<OcrLine> {
    let mut buckets: Vec<(f64, Vec<&OcrDetection>)> = Vec::new();

    for detection in detections {
        let center = detection.vertical_center();
        match buckets
            .iter_mut()
            .find(|(line_y, _)| (line_y - center).abs() <= y_threshold)
        {
            Some((_, members)) => members.push(detection),
            None => buckets.push((center, vec![detection])),
        }
    }

    buckets.sort_by(|a, b| a.0.total_cmp(&b.0));
    buckets
        .into_iter()
        .map(|(center_y, mut members)| {
            members.sort_by(|a, b| a.left().total_cmp(&b.left()));
            let text = members
                .iter()
                .map(|d| d.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            OcrLine { center_y, text }
        })
        .collect()
}

/// Group an OCR service response into line texts using the default threshold
pub fn group_ocr_text(response: &OcrResponse) -> Vec<String> {
    group_lines(&response.result, DEFAULT_LINE_THRESHOLD)
        .into_iter()
        .map(|line| line.text)
        .collect()
}
