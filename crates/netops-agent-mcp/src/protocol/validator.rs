//! JSON-RPC message validation and tool argument checking.

use serde_json::{Map, Number, Value};

use crate::types::{JsonRpcRequest, McpError, McpResult, ParamSpec, ParamType, JSONRPC_VERSION};

/// Validate that a JSON-RPC request is well-formed.
pub fn validate_request(request: &JsonRpcRequest) -> McpResult<()> {
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(McpError::InvalidRequest(format!(
            "Expected jsonrpc version \"{JSONRPC_VERSION}\", got \"{}\"",
            request.jsonrpc
        )));
    }

    if request.method.is_empty() {
        return Err(McpError::InvalidRequest(
            "Method name must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// Tool arguments after schema validation, keyed by canonical parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedArgs {
    values: Map<String, Value>,
}

impl ValidatedArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn i64(&self, name: &str) -> McpResult<i64> {
        self.get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| missing(name))
    }

    pub fn f64(&self, name: &str) -> McpResult<f64> {
        self.get(name)
            .and_then(Value::as_f64)
            .ok_or_else(|| missing(name))
    }

    pub fn str(&self, name: &str) -> McpResult<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| missing(name))
    }

    pub fn str_or<'a>(&'a self, name: &str, fallback: &'a str) -> &'a str {
        self.get(name).and_then(Value::as_str).unwrap_or(fallback)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

fn missing(name: &str) -> McpError {
    McpError::InvalidArguments {
        field: name.to_string(),
        reason: "is required".to_string(),
    }
}

/// Check raw `arguments` against a tool's parameter list.
///
/// Aliases are folded into the canonical name, defaults fill absent optional
/// parameters, and values are coerced to the declared type where the
/// conversion is lossless. Arguments the tool does not declare are ignored.
pub fn validate_arguments(params: &[ParamSpec], raw: Option<Value>) -> McpResult<ValidatedArgs> {
    let supplied = match raw {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(McpError::InvalidArguments {
                field: "arguments".to_string(),
                reason: format!("must be an object, got {}", type_name(&other)),
            });
        }
    };

    let mut values = Map::new();
    for param in params {
        let found = std::iter::once(param.name)
            .chain(param.aliases.iter().copied())
            .find_map(|key| supplied.get(key).filter(|v| !v.is_null()));

        match found {
            Some(value) => {
                let coerced = coerce(param, value)?;
                values.insert(param.name.to_string(), coerced);
            }
            None if param.required => return Err(missing(param.name)),
            None => {
                if let Some(default) = &param.default {
                    values.insert(param.name.to_string(), default.clone());
                }
            }
        }
    }

    Ok(ValidatedArgs { values })
}

fn coerce(param: &ParamSpec, value: &Value) -> McpResult<Value> {
    let coerced = match param.kind {
        ParamType::Integer => coerce_integer(value),
        ParamType::Number => coerce_number(value),
        ParamType::String => value.as_str().map(|s| Value::String(s.to_string())),
        ParamType::Boolean => match value {
            Value::Bool(b) => Some(Value::Bool(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
            _ => None,
        },
    };

    coerced.ok_or_else(|| McpError::InvalidArguments {
        field: param.name.to_string(),
        reason: format!(
            "must be {} {}, got {}",
            article(param.kind),
            param.kind.json_name(),
            type_name(value)
        ),
    })
}

fn coerce_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Value::from(i));
            }
            let f = n.as_f64()?;
            integral(f)
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(Value::from(i));
            }
            s.parse::<f64>().ok().and_then(integral)
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<Value> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= i64::MAX as f64 {
        Some(Value::from(f as i64))
    } else {
        None
    }
}

fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => n.as_f64().and_then(Number::from_f64).map(Value::Number),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

fn article(kind: ParamType) -> &'static str {
    match kind {
        ParamType::Integer => "an",
        _ => "a",
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
