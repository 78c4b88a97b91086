use std::fmt::Write;

/// A value handed back by the host after evaluating a program.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Plain includes evaluate to `1` when the file returns nothing, so this
    /// value carries no information for the caller.
    pub fn is_success_marker(&self) -> bool {
        matches!(self, Self::Int(1))
    }

    /// Render the value as a parsable literal.
    pub fn var_export(&self) -> String {
        let mut out = String::new();
        self.export_into(&mut out, 0);
        out
    }

    /// Render the value the way it would be printed.
    pub fn to_plain(&self) -> String {
        match self {
            Self::Null | Self::Bool(false) => String::new(),
            Self::Bool(true) => "1".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => s.clone(),
            Self::List(_) | Self::Map(_) => self.var_export(),
        }
    }

    #[cfg(feature = "serde")]
    pub fn as_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn export_into(&self, out: &mut String, indent: usize) {
        match self {
            Self::Null => out.push_str("NULL"),
            Self::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Self::Float(f) => {
                let _ = write!(out, "{f:?}");
            }
            Self::Str(s) => out.push_str(&quote(s)),
            Self::List(items) => {
                let entries = items.iter().enumerate().map(|(i, v)| (i.to_string(), v));
                export_array(out, indent, entries);
            }
            Self::Map(items) => {
                let entries = items.iter().map(|(k, v)| (quote(k), v));
                export_array(out, indent, entries);
            }
        }
    }
}

fn export_array<'a>(
    out: &mut String,
    indent: usize,
    entries: impl Iterator<Item = (String, &'a Value)>,
) {
    let pad = " ".repeat(indent);
    out.push_str("array (\n");
    for (key, value) in entries {
        let _ = write!(out, "{pad}  {key} =>");
        if matches!(value, Value::List(_) | Value::Map(_)) {
            let _ = write!(out, "\n{pad}  ");
        } else {
            out.push(' ');
        }
        value.export_into(out, indent + 2);
        out.push_str(",\n");
    }
    out.push_str(&pad);
    out.push(')');
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Decodes what the interpreter reports back. Object key order is kept.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => {
                Self::Map(entries.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Str(s) => serializer.serialize_str(s),
            Self::List(items) => serializer.collect_seq(items),
            Self::Map(items) => {
                let mut map = serializer.serialize_map(Some(items.len()))?;
                for (k, v) in items {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}
