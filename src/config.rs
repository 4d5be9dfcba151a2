use crate::error::ConfigError;
use std::path::Path;

pub const DEFAULT_CACHE_CAPACITY: usize = 8;
pub const DEFAULT_PREVIEW_ITERATIONS: usize = 8;
pub const DEFAULT_PREVIEW_FRAME_LIMIT: usize = 10;
pub const DEFAULT_FRAME_RATE: f32 = 30.0;

const MAX_PREVIEW_ITERATIONS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    pub cache_capacity: usize,
    pub preview_iterations: usize,
    pub preview_frame_limit: usize,
    pub frame_rate: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            preview_iterations: DEFAULT_PREVIEW_ITERATIONS,
            preview_frame_limit: DEFAULT_PREVIEW_FRAME_LIMIT,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

impl PhysicsConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(ConfigError::Io(err.to_string())),
        };
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key_raw, value_raw)) = line.split_once('=') else {
                return Err(ConfigError::Parse {
                    line: line_no,
                    message: "expected <key>=<value>".to_string(),
                });
            };
            let key = key_raw.trim();
            let value = value_raw.trim();
            match key {
                "cache_capacity" => cfg.cache_capacity = parse_usize(value, line_no, key)?,
                "preview_iterations" => cfg.preview_iterations = parse_usize(value, line_no, key)?,
                "preview_frame_limit" => {
                    cfg.preview_frame_limit = parse_usize(value, line_no, key)?
                }
                "frame_rate" => {
                    cfg.frame_rate = value.parse::<f32>().map_err(|_| ConfigError::Parse {
                        line: line_no,
                        message: format!("{key} must be a number"),
                    })?;
                }
                _ => log::debug!("ignoring unknown config key '{key}' at line {line_no}"),
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "cache_capacity".to_string(),
                message: "must be >= 1".to_string(),
            });
        }
        if !(1..=MAX_PREVIEW_ITERATIONS).contains(&self.preview_iterations) {
            return Err(ConfigError::Invalid {
                key: "preview_iterations".to_string(),
                message: format!("must be in 1..={MAX_PREVIEW_ITERATIONS}"),
            });
        }
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "frame_rate".to_string(),
                message: "must be a positive number".to_string(),
            });
        }
        Ok(())
    }

    pub fn to_text(&self) -> String {
        format!(
            "# pixel_physics engine config v1\ncache_capacity={}\npreview_iterations={}\npreview_frame_limit={}\nframe_rate={:.3}\n",
            self.cache_capacity, self.preview_iterations, self.preview_frame_limit, self.frame_rate
        )
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, self.to_text()).map_err(|e| ConfigError::Io(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

fn parse_usize(raw: &str, line: usize, key: &str) -> Result<usize, ConfigError> {
    raw.parse::<usize>().map_err(|_| ConfigError::Parse {
        line,
        message: format!("{key} must be a non-negative integer"),
    })
}
