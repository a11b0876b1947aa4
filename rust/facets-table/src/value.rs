//! Scalar cell values and column kinds.

/// A single table cell. An empty CSV cell becomes `Missing`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Display form used for group keys and diagnostics. Missing values render
    /// as `"null"` so that grouped rows always land in a named partition.
    pub fn display_key(&self) -> String {
        match self {
            Value::Number(v) => format_number(*v),
            Value::Bool(v) => v.to_string(),
            Value::Text(v) => v.clone(),
            Value::Missing => "null".to_string(),
        }
    }
}

/// The declared kind of a column, inferred from all of its non-missing cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Boolean,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Boolean => "boolean",
        }
    }
}

/// Formats a number losslessly, without a trailing `.0` for integral values.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 9_007_199_254_740_992.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
