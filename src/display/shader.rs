// Shader presets - Multi-pass shader chain descriptions
//
// A preset is a `key = value` text file:
//
//   shaders = 2
//   shader0 = "crt-pass0.wgsl"
//   filter_linear0 = false
//   scale_type0 = source
//   scale0 = 2.0
//   shader1 = "crt-pass1.wgsl"
//   parameters = "CURVATURE;SCANLINE_WEIGHT"
//   CURVATURE = 0.5
//
// Pass paths are relative to the preset. Pass sources declare their tunable
// parameters with `#pragma parameter NAME "Description" default min max step`
// lines; values in the preset override the declared defaults.

use super::error::ShaderError;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Parameter slots available to a shader chain
pub const MAX_PARAMETERS: usize = 64;

/// How a pass's output size is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleType {
    /// Multiple of the pass input size
    #[default]
    Source,
    /// Multiple of the final viewport size
    Viewport,
    /// Fixed size in pixels
    Absolute,
}

impl ScaleType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "source" => Some(ScaleType::Source),
            "viewport" => Some(ScaleType::Viewport),
            "absolute" => Some(ScaleType::Absolute),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ScaleType::Source => "source",
            ScaleType::Viewport => "viewport",
            ScaleType::Absolute => "absolute",
        }
    }
}

/// One pass of a shader chain
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderPass {
    /// Path as written in the preset
    pub path: PathBuf,
    /// Sampler filter for this pass's input; `None` defers to the user setting
    pub filter_linear: Option<bool>,
    /// `None` when the preset does not specify a scale
    pub scale_type: Option<ScaleType>,
    pub scale: f32,
    /// WGSL source, loaded with the preset
    pub source: String,
}

impl ShaderPass {
    /// Output size for an input of `source` pixels and a `viewport`
    pub fn output_size(&self, source: (u32, u32), viewport: (u32, u32), last: bool) -> (u32, u32) {
        let scaled = |base: (u32, u32)| {
            (
                ((base.0 as f32 * self.scale).round() as u32).max(1),
                ((base.1 as f32 * self.scale).round() as u32).max(1),
            )
        };
        match self.scale_type {
            Some(ScaleType::Source) => scaled(source),
            Some(ScaleType::Viewport) => scaled(viewport),
            Some(ScaleType::Absolute) => (
                (self.scale.round() as u32).max(1),
                (self.scale.round() as u32).max(1),
            ),
            None if last => viewport,
            None => source,
        }
    }

    /// Source with preprocessor lines removed
    pub fn wgsl_body(&self) -> String {
        self.source
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A tunable shader parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderParameter {
    /// Identifier used in the preset and the shader source
    pub id: String,
    /// Human-readable label
    pub name: String,
    pub val: f32,
    pub default: f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ShaderParameter {
    /// Parse a `#pragma parameter` declaration
    fn from_pragma(line: &str) -> Option<Self> {
        let rest = line
            .trim_start()
            .trim_start_matches("//")
            .trim_start()
            .strip_prefix("#pragma parameter")?
            .trim();

        let (id, rest) = rest.split_once(char::is_whitespace)?;
        let rest = rest.trim_start().strip_prefix('"')?;
        let (name, rest) = rest.split_once('"')?;

        let numbers: Vec<f32> = rest
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        if numbers.iter().any(|n| !n.is_finite()) {
            return None;
        }
        let (default, min, max) = match numbers.as_slice() {
            [default, a, b, ..] => (*default, a.min(*b), a.max(*b)),
            _ => return None,
        };
        let default = default.clamp(min, max);
        let step = numbers.get(3).copied().unwrap_or((max - min) / 100.0);

        Some(Self {
            id: id.to_string(),
            name: name.to_string(),
            val: default,
            default,
            min,
            max,
            step,
        })
    }

    /// Set the value, clamped into range
    ///
    /// Non-finite values and bounds are ignored.
    pub fn set(&mut self, value: f32) {
        let (min, max) = (self.min.min(self.max), self.max.max(self.min));
        if value.is_finite() && min.is_finite() && max.is_finite() {
            self.val = value.clamp(min, max);
        }
    }

    pub fn reset(&mut self) {
        self.val = self.default;
    }
}

/// A parsed shader preset with its pass sources
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderPreset {
    /// Preset file the chain was loaded from
    pub path: PathBuf,
    pub passes: Vec<ShaderPass>,
    pub parameters: Vec<ShaderParameter>,
}

/// Split a `key = value` line, dropping comments and quotes
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let value = value.trim();
    let value = match value.strip_prefix('"') {
        Some(quoted) => quoted.split_once('"').map_or(quoted, |(v, _)| v),
        None => value.split_once('#').map_or(value, |(v, _)| v).trim(),
    };
    Some((key.trim(), value))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

impl ShaderPreset {
    /// Load a preset and every pass it names
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(path, &text, |pass| {
            let full = base.join(pass);
            fs::read_to_string(&full).map_err(|source| ShaderError::Io { path: full, source })
        })
    }

    /// Parse preset text, reading pass sources through `read_pass`
    pub fn parse<F>(path: &Path, text: &str, mut read_pass: F) -> Result<Self, ShaderError>
    where
        F: FnMut(&Path) -> Result<String, ShaderError>,
    {
        let values: HashMap<&str, &str> = text.lines().filter_map(parse_line).collect();
        let parse_err = |message: String| ShaderError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let count: usize = values
            .get("shaders")
            .ok_or_else(|| parse_err("missing 'shaders' count".to_string()))?
            .parse()
            .map_err(|_| parse_err("invalid 'shaders' count".to_string()))?;
        if count == 0 {
            return Err(parse_err("preset has no passes".to_string()));
        }

        let mut passes = Vec::with_capacity(count);
        for i in 0..count {
            let pass_path = PathBuf::from(
                values
                    .get(format!("shader{}", i).as_str())
                    .ok_or(ShaderError::MissingPass(i))?,
            );
            let source = read_pass(&pass_path)?;

            let get = |key: &str| values.get(format!("{}{}", key, i).as_str()).copied();
            let scale = match get("scale") {
                Some(s) => s
                    .parse()
                    .map_err(|_| parse_err(format!("invalid scale{}: {}", i, s)))?,
                None => 1.0,
            };
            let scale_type = match get("scale_type") {
                Some(s) => Some(
                    ScaleType::parse(s)
                        .ok_or_else(|| parse_err(format!("invalid scale_type{}: {}", i, s)))?,
                ),
                None => None,
            };

            passes.push(ShaderPass {
                path: pass_path,
                filter_linear: get("filter_linear").and_then(parse_bool),
                scale_type,
                scale,
                source,
            });
        }

        let mut parameters: Vec<ShaderParameter> = Vec::new();
        for pass in &passes {
            for parameter in pass.source.lines().filter_map(ShaderParameter::from_pragma) {
                if parameters.iter().any(|p| p.id == parameter.id) {
                    continue;
                }
                if parameters.len() == MAX_PARAMETERS {
                    log::warn!("Ignoring shader parameter {}: too many parameters", parameter.id);
                    continue;
                }
                parameters.push(parameter);
            }
        }

        for parameter in &mut parameters {
            if let Some(value) = values.get(parameter.id.as_str()) {
                match value.parse::<f32>() {
                    Ok(v) => parameter.set(v),
                    Err(_) => log::warn!(
                        "Invalid value for shader parameter {}: {}",
                        parameter.id,
                        value
                    ),
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            passes,
            parameters,
        })
    }

    /// Render the preset with current parameter values
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(out, "shaders = {}", self.passes.len());

        for (i, pass) in self.passes.iter().enumerate() {
            let _ = writeln!(out);
            let _ = writeln!(out, "shader{} = \"{}\"", i, pass.path.display());
            if let Some(linear) = pass.filter_linear {
                let _ = writeln!(out, "filter_linear{} = {}", i, linear);
            }
            if let Some(scale_type) = pass.scale_type {
                let _ = writeln!(out, "scale_type{} = {}", i, scale_type.name());
                let _ = writeln!(out, "scale{} = {:?}", i, pass.scale);
            }
        }

        if !self.parameters.is_empty() {
            let ids: Vec<&str> = self.parameters.iter().map(|p| p.id.as_str()).collect();
            let _ = writeln!(out);
            let _ = writeln!(out, "parameters = \"{}\"", ids.join(";"));
            for parameter in &self.parameters {
                let _ = writeln!(out, "{} = {:?}", parameter.id, parameter.val);
            }
        }
        out
    }

    /// Write the preset with current parameter values
    ///
    /// Pass paths are made absolute when saving to a different directory.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ShaderError> {
        let path = path.as_ref();
        let mut preset = self.clone();

        let from = self.path.parent().unwrap_or_else(|| Path::new("."));
        let to = path.parent().unwrap_or_else(|| Path::new("."));
        if from != to {
            for pass in &mut preset.passes {
                if pass.path.is_relative() {
                    pass.path = from.join(&pass.path);
                }
            }
        }

        fs::write(path, preset.to_text()).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved shader preset to {}", path.display());
        Ok(())
    }

    pub fn parameter(&self, id: &str) -> Option<&ShaderParameter> {
        self.parameters.iter().find(|p| p.id == id)
    }

    pub fn parameter_mut(&mut self, id: &str) -> Option<&mut ShaderParameter> {
        self.parameters.iter_mut().find(|p| p.id == id)
    }
}
