// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Top-1 detection selection and the JSON record printed by the CLI.
//!
//! Every non-crashing run prints exactly one object with two keys:
//!
//! | Outcome | Record |
//! |---------|--------|
//! | best box found | `{"label": "cat", "confidence": 0.92}` |
//! | no boxes | `{"label": "unknown", "confidence": 0.0}` |
//! | no image argument | `{"label": "error", "confidence": 0}` |
//!
//! The record uses the `", "` / `": "` separators and ASCII escaping of
//! Python's `json.dumps`, which existing consumers parse.

use std::io;

use ndarray::ArrayView1;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::ser::Formatter;

use crate::error::Result;
use crate::results::Results;

/// Label reported when the image produced no detections.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Label reported when no image path was supplied.
pub const ERROR_LABEL: &str = "error";

/// Outcome of one prediction run.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    /// The highest-confidence detection.
    Detected {
        /// Class name of the detection.
        label: String,
        /// Detection confidence in [0, 1].
        confidence: f32,
    },
    /// Inference ran but found nothing.
    Unknown,
    /// No image path was given; no model was loaded.
    MissingInput,
}

impl Prediction {
    /// Select the top detection from the first result.
    ///
    /// Ties on confidence go to the box that comes first in result order.
    #[must_use]
    pub fn from_results(results: &[Results]) -> Self {
        let Some(result) = results.first() else {
            return Self::Unknown;
        };
        let Some(boxes) = result.boxes.as_ref() else {
            return Self::Unknown;
        };

        match top_index(boxes.conf()) {
            Some(idx) => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let class_id = boxes.cls()[idx] as usize;
                Self::Detected {
                    label: result.class_name(class_id),
                    confidence: boxes.conf()[idx],
                }
            }
            None => Self::Unknown,
        }
    }

    /// The label field of the record.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Detected { label, .. } => label,
            Self::Unknown => UNKNOWN_LABEL,
            Self::MissingInput => ERROR_LABEL,
        }
    }

    /// The confidence field of the record.
    #[must_use]
    pub const fn confidence(&self) -> f32 {
        match self {
            Self::Detected { confidence, .. } => *confidence,
            Self::Unknown | Self::MissingInput => 0.0,
        }
    }

    /// Encode the record as a single JSON line (without the trailing newline).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_line(&self) -> Result<String> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PythonFormatter);
        self.serialize(&mut ser)?;
        // PythonFormatter only emits ASCII
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Serialize for Prediction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("Prediction", 2)?;
        record.serialize_field("label", self.label())?;
        match self {
            // Integer zero, not 0.0
            Self::MissingInput => record.serialize_field("confidence", &0u8)?,
            _ => record.serialize_field("confidence", &self.confidence())?,
        }
        record.end()
    }
}

/// Index of the highest confidence, first occurrence on ties.
fn top_index(conf: ArrayView1<'_, f32>) -> Option<usize> {
    conf.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (idx, &score)| match best {
            Some((_, best_score)) if score <= best_score => best,
            _ => Some((idx, score)),
        })
        .map(|(idx, _)| idx)
}

/// JSON layout of Python's `json.dumps` defaults.
struct PythonFormatter;

impl Formatter for PythonFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use ndarray::Array2;

    use super::*;
    use crate::results::{Boxes, Speed};

    fn result_with(rows: &[[f32; 6]], names: &[(usize, &str)]) -> Results {
        let names: HashMap<usize, String> =
            names.iter().map(|(id, n)| (*id, (*n).to_string())).collect();
        let mut result = Results::new((100, 100), "img.jpg".to_string(), names, Speed::default(), (640, 640));
        if !rows.is_empty() {
            let data = Array2::from_shape_vec((rows.len(), 6), rows.concat()).unwrap();
            result.boxes = Some(Boxes::new(data, (100, 100)));
        }
        result
    }

    #[test]
    fn test_single_detection() {
        let result = result_with(&[[0.0, 0.0, 10.0, 10.0, 0.92, 0.0]], &[(0, "cat")]);
        let prediction = Prediction::from_results(&[result]);

        assert_eq!(
            prediction,
            Prediction::Detected { label: "cat".to_string(), confidence: 0.92 }
        );
        assert_eq!(prediction.to_json_line().unwrap(), r#"{"label": "cat", "confidence": 0.92}"#);
    }

    #[test]
    fn test_picks_maximum_confidence() {
        let result = result_with(
            &[
                [0.0, 0.0, 10.0, 10.0, 0.40, 0.0],
                [0.0, 0.0, 10.0, 10.0, 0.81, 2.0],
                [0.0, 0.0, 10.0, 10.0, 0.55, 1.0],
            ],
            &[(0, "cat"), (1, "dog"), (2, "bird")],
        );
        let prediction = Prediction::from_results(&[result]);
        assert_eq!(prediction.label(), "bird");
        assert!((prediction.confidence() - 0.81).abs() < f32::EPSILON);
    }

    #[test]
    fn test_tie_goes_to_first_box() {
        let result = result_with(
            &[
                [0.0, 0.0, 10.0, 10.0, 0.7, 1.0],
                [0.0, 0.0, 10.0, 10.0, 0.7, 0.0],
            ],
            &[(0, "cat"), (1, "dog")],
        );
        assert_eq!(Prediction::from_results(&[result]).label(), "dog");
    }

    #[test]
    fn test_unnamed_class_uses_default_name() {
        let result = result_with(&[[0.0, 0.0, 10.0, 10.0, 0.5, 3.0]], &[(0, "cat")]);
        assert_eq!(Prediction::from_results(&[result]).label(), "class3");
    }

    #[test]
    fn test_no_detections() {
        let result = result_with(&[], &[(0, "cat")]);
        let prediction = Prediction::from_results(&[result]);
        assert_eq!(prediction, Prediction::Unknown);
        assert_eq!(
            prediction.to_json_line().unwrap(),
            r#"{"label": "unknown", "confidence": 0.0}"#
        );

        assert_eq!(Prediction::from_results(&[]), Prediction::Unknown);
    }

    #[test]
    fn test_missing_input_record() {
        assert_eq!(
            Prediction::MissingInput.to_json_line().unwrap(),
            r#"{"label": "error", "confidence": 0}"#
        );
    }

    #[test]
    fn test_non_ascii_labels_are_escaped() {
        let prediction = Prediction::Detected { label: "café 🐱".to_string(), confidence: 0.5 };
        let line = prediction.to_json_line().unwrap();
        assert_eq!(line, r#"{"label": "caf\u00e9 \ud83d\udc31", "confidence": 0.5}"#);

        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["label"], "café 🐱");
    }

    #[test]
    fn test_record_has_exactly_two_keys() {
        let line = Prediction::Detected { label: "say \"hi\"".to_string(), confidence: 0.25 }
            .to_json_line()
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        let object = parsed.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["label"], "say \"hi\"");
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_top_index_empty() {
        let data = Array2::<f32>::zeros((0, 6));
        assert_eq!(top_index(data.column(4)), None);
    }
}
