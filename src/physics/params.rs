use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f32),
    Flag(bool),
    Text(String),
}

impl ParamValue {
    /// Interprets a command-line style value: numbers, then booleans, then text.
    pub fn parse_lossy(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(v) = raw.parse::<f32>() {
            return Self::Number(v);
        }
        match parse_bool(raw) {
            Some(b) => Self::Flag(b),
            None => Self::Text(raw.to_string()),
        }
    }

    fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(v) if v.is_finite() => Some(*v),
            Self::Number(_) => None,
            Self::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Text(s) => s.trim().parse::<f32>().ok().filter(|v| v.is_finite()),
        }
    }

    fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            Self::Number(v) if v.is_finite() => Some(*v != 0.0),
            Self::Number(_) => None,
            Self::Text(s) => parse_bool(s),
        }
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        Self::Number(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Number(v as f32)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Number(v as f32)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Caller-supplied options, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Number { default: f32, min: f32, max: f32 },
    Integer { default: f32, min: f32, max: f32 },
    Flag { default: bool },
    Choice {
        default: &'static str,
        options: &'static [&'static str],
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

pub const fn number(name: &'static str, default: f32, min: f32, max: f32) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Number { default, min, max },
    }
}

pub const fn integer(name: &'static str, default: f32, min: f32, max: f32) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Integer { default, min, max },
    }
}

pub const fn flag(name: &'static str, default: bool) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Flag { default },
    }
}

pub const fn choice(
    name: &'static str,
    default: &'static str,
    options: &'static [&'static str],
) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Choice { default, options },
    }
}

impl ParamSpec {
    fn resolve(&self, raw: Option<&ParamValue>) -> ParamValue {
        match self.kind {
            ParamKind::Number { default, min, max } => {
                let v = raw.and_then(ParamValue::as_number).unwrap_or(default);
                ParamValue::Number(v.clamp(min, max))
            }
            ParamKind::Integer { default, min, max } => {
                let v = raw.and_then(ParamValue::as_number).unwrap_or(default);
                ParamValue::Number(v.clamp(min, max).round())
            }
            ParamKind::Flag { default } => {
                ParamValue::Flag(raw.and_then(ParamValue::as_flag).unwrap_or(default))
            }
            ParamKind::Choice { default, options } => {
                let picked = match raw {
                    Some(ParamValue::Text(s)) => {
                        let needle = s.trim().to_ascii_lowercase();
                        options.iter().copied().find(|o| *o == needle)
                    }
                    _ => None,
                };
                ParamValue::Text(picked.unwrap_or(default).to_string())
            }
        }
    }
}

/// Parameters filtered to one variant's declared names, every value present and in range.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    values: Vec<(&'static str, ParamValue)>,
}

impl ResolvedParams {
    /// Returns the resolved set together with the caller keys that were not declared.
    pub fn resolve(specs: &'static [ParamSpec], params: &ParamSet) -> (Self, Vec<String>) {
        let values = specs
            .iter()
            .map(|spec| (spec.name, spec.resolve(params.get(spec.name))))
            .collect();
        let dropped = params
            .iter()
            .filter(|(k, _)| !specs.iter().any(|s| s.name == *k))
            .map(|(k, _)| k.to_string())
            .collect();
        (Self { values }, dropped)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn num(&self, name: &str) -> f32 {
        match self.get(name) {
            Some(ParamValue::Number(v)) => *v,
            _ => 0.0,
        }
    }

    pub fn count(&self, name: &str) -> usize {
        self.num(name).max(0.0) as usize
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(ParamValue::Flag(true)))
    }

    pub fn text(&self, name: &str) -> &str {
        match self.get(name) {
            Some(ParamValue::Text(s)) => s,
            _ => "",
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
