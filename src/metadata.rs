// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! ONNX model metadata parsing.
//!
//! Ultralytics exports embed their configuration as custom metadata
//! properties on the ONNX graph. Each property is a plain string; `imgsz` is
//! a list and `names` is a Python dict literal such as
//! `{0: 'cat', 1: 'dog'}`. Hand-assembled models sometimes carry the same
//! information as a YAML block instead, so both layouts are accepted.

use std::collections::HashMap;

use crate::error::{InferenceError, Result};

/// Ultralytics exporter metadata keys read from the model.
pub const METADATA_KEYS: [&str; 6] = ["description", "author", "version", "task", "imgsz", "names"];

/// Task name of detection models.
pub const DETECT_TASK: &str = "detect";

/// Metadata extracted from an Ultralytics YOLO ONNX model.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// Model description.
    pub description: String,
    /// Model author.
    pub author: String,
    /// Ultralytics version used for export.
    pub version: String,
    /// Task the model was trained for (`detect`, `segment`, ...).
    pub task: String,
    /// Input image size as (height, width).
    pub imgsz: (usize, usize),
    /// Class ID to class name mapping.
    pub names: HashMap<usize, String>,
}

impl ModelMetadata {
    /// Build metadata from the individual custom properties of an ONNX model.
    ///
    /// Keys not listed in [`METADATA_KEYS`] are ignored. An empty map yields
    /// the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `imgsz` is malformed.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self> {
        let yaml: Vec<String> = METADATA_KEYS
            .iter()
            .filter_map(|key| properties.get(*key).map(|value| format!("{key}: {value}")))
            .collect();

        if yaml.is_empty() {
            return Ok(Self::default());
        }

        Self::from_yaml_str(&yaml.join("\n"))
    }

    /// Parse metadata from a YAML-like string.
    ///
    /// # Errors
    ///
    /// Returns an error if `imgsz` contains a zero or non-numeric size.
    pub fn from_yaml_str(yaml_str: &str) -> Result<Self> {
        let mut metadata = Self::default();

        for line in yaml_str.lines() {
            // Nested entries (names block, imgsz list) are handled below
            if line.starts_with(char::is_whitespace) || line.trim_start().starts_with('-') {
                continue;
            }
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = unquote(value.trim());

            match key.trim() {
                "description" => metadata.description = value.to_string(),
                "author" => metadata.author = value.to_string(),
                "version" => metadata.version = value.to_string(),
                "task" => metadata.task = value.to_lowercase(),
                _ => {}
            }
        }

        if let Some(imgsz) = parse_imgsz(yaml_str)? {
            metadata.imgsz = imgsz;
        }
        metadata.names = parse_names(yaml_str);

        Ok(metadata)
    }

    /// Whether the model was exported for object detection.
    #[must_use]
    pub fn is_detect(&self) -> bool {
        self.task == DETECT_TASK
    }

    /// Get the number of classes in this model.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.names.len()
    }
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            author: String::new(),
            version: String::new(),
            task: DETECT_TASK.to_string(),
            imgsz: (640, 640),
            names: HashMap::new(),
        }
    }
}

fn unquote(value: &str) -> &str {
    value.trim_matches('\'').trim_matches('"')
}

/// Parse `imgsz` from either `imgsz: [640, 640]` or a YAML list block.
///
/// A single value means a square input. Sizes must be positive integers.
fn parse_imgsz(yaml_str: &str) -> Result<Option<(usize, usize)>> {
    let mut lines = yaml_str.lines().skip_while(|l| !l.trim_start().starts_with("imgsz:"));
    let Some(header) = lines.next() else {
        return Ok(None);
    };
    let inline = header.trim_start()["imgsz:".len()..].trim();

    let raw: Vec<&str> = if inline.is_empty() {
        lines
            .map(str::trim)
            .take_while(|l| l.starts_with('-'))
            .map(|l| l.trim_start_matches('-').trim())
            .collect()
    } else {
        inline
            .trim_matches(|c| c == '[' || c == ']' || c == '(' || c == ')')
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    };

    let values = raw
        .iter()
        .map(|s| match s.parse::<usize>() {
            Ok(size) if size > 0 => Ok(size),
            _ => Err(InferenceError::Metadata(format!("Invalid imgsz value: {s}"))),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(match values.as_slice() {
        [h, w, ..] => Some((*h, *w)),
        [s] => Some((*s, *s)),
        [] => None,
    })
}

/// Parse the `names` field as a Python dict literal or a YAML block.
fn parse_names(yaml_str: &str) -> HashMap<usize, String> {
    let mut lines = yaml_str.lines().skip_while(|l| !l.trim_start().starts_with("names:"));
    let Some(header) = lines.next() else {
        return HashMap::new();
    };
    let names_indent = header.len() - header.trim_start().len();
    let inline = header.trim_start()["names:".len()..].trim();

    if let Some(body) = inline.strip_prefix('{') {
        let body = body.rfind('}').map_or(body, |end| &body[..end]);
        return parse_python_dict(body);
    }

    let mut names = HashMap::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        let Some((key, value)) = trimmed.split_once(':') else {
            break;
        };
        let Ok(class_id) = key.trim().parse::<usize>() else {
            break;
        };
        // Class entries may sit at the same indent as `names:` in compact YAML
        if indent < names_indent {
            break;
        }
        names.insert(class_id, unquote(value.trim()).to_string());
    }
    names
}

/// Parse the body of a Python dict like `0: 'person', 1: "cat's toy"`.
///
/// Quoted values may contain commas and colons.
fn parse_python_dict(body: &str) -> HashMap<usize, String> {
    let mut names = HashMap::new();
    let mut chars = body.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace() || *c == ',').is_some() {}

        let key: String = chars.by_ref().take_while(|&c| c != ':').collect();
        if key.trim().is_empty() {
            break;
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let value = match chars.peek().copied() {
            Some(quote @ ('\'' | '"')) => {
                chars.next();
                chars.by_ref().take_while(|&c| c != quote).collect::<String>()
            }
            Some(_) => chars
                .by_ref()
                .take_while(|&c| c != ',')
                .collect::<String>()
                .trim()
                .to_string(),
            None => break,
        };

        if let Ok(class_id) = key.trim().parse::<usize>() {
            names.insert(class_id, value);
        }
    }

    names
}
