// Built-in rules
//
// Each predicate takes the raw form value (and the rule parameter where it
// has one) and never fails: inputs a rule cannot interpret evaluate to false.

use crate::lookup::FieldLookup;
use crate::pattern::PatternCompiler;
use crate::rule::Rule;
use crate::table::RuleTable;
use crate::value::{
    format_number, is_nan, is_truthy, js_len, js_trim, parse_int, parse_int_auto, to_js_string,
    to_number,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#).unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-z]{2,63}(?-u:\b)([-a-zA-Z0-9@:%_+.~#?&/=]*)").unwrap()
});

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHA_DASH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

static ALPHA_NUM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "gif", "bmp", "png"];
const VIDEO_EXTENSIONS: [&str; 4] = ["m4v", "avi", "mpg", "mp4"];

/// Names of every built-in rule
pub const BUILTIN_RULES: [&str; 20] = [
    "required",
    "digits",
    "digit_between",
    "max",
    "min",
    "email",
    "array",
    "url",
    "alpha",
    "alpha_dash",
    "alpha_num",
    "accepted",
    "regex",
    "boolean",
    "numeric",
    "confirmed",
    "integer",
    "filetype",
    "image",
    "video",
];

/// Insert every built-in into `table`
pub(crate) fn install(
    table: &RuleTable,
    lookup: Arc<dyn FieldLookup>,
    patterns: Arc<PatternCompiler>,
) {
    table.insert("required", Rule::unary(required));
    table.insert("digits", Rule::binary(digits));
    table.insert("digit_between", Rule::binary(digit_between));
    table.insert("max", Rule::binary(max));
    table.insert("min", Rule::binary(min));
    table.insert("email", Rule::unary(email));
    table.insert("array", Rule::unary(array));
    table.insert("url", Rule::unary(url));
    table.insert("alpha", Rule::unary(alpha));
    table.insert("alpha_dash", Rule::unary(alpha_dash));
    table.insert("alpha_num", Rule::unary(alpha_num));
    table.insert("accepted", Rule::unary(accepted));
    table.insert(
        "regex",
        Rule::binary(move |value, param| matches_pattern(&patterns, value, param)),
    );
    table.insert("boolean", Rule::unary(boolean));
    table.insert("numeric", Rule::unary(numeric));
    table.insert(
        "confirmed",
        Rule::binary(move |value, param| confirmed(lookup.as_ref(), value, param)),
    );
    table.insert("integer", Rule::unary(integer));
    table.insert("filetype", Rule::binary(filetype));
    table.insert("image", Rule::unary(image));
    table.insert("video", Rule::unary(video));
}

// An omitted parameter compares like `undefined`: NaN, so every comparison fails.
fn param_number(param: Option<&Value>) -> f64 {
    param.map(to_number).unwrap_or(f64::NAN)
}

pub fn required(value: &Value) -> bool {
    is_truthy(value) && !js_trim(&to_js_string(value)).is_empty()
}

/// The value's string length equals the parameter exactly
pub fn digits(value: &Value, length: Option<&Value>) -> bool {
    if is_nan(value) {
        return false;
    }
    let expected = length
        .map(|p| parse_int_auto(&to_js_string(p)))
        .unwrap_or(f64::NAN);
    js_len(&to_js_string(value)) as f64 == expected
}

/// The value's string length is at most the parameter.
///
/// Despite the name there is no lower bound.
pub fn digit_between(value: &Value, max: Option<&Value>) -> bool {
    !is_nan(value) && js_len(&to_js_string(value)) as f64 <= param_number(max)
}

/// Numbers compare by value, other text by length
pub fn max(value: &Value, max: Option<&Value>) -> bool {
    if !is_nan(value) {
        return to_number(value) <= param_number(max);
    }
    match value {
        Value::String(text) => js_len(text) as f64 <= param_number(max),
        _ => false,
    }
}

/// Numbers compare by value, other text by length
pub fn min(value: &Value, min: Option<&Value>) -> bool {
    if !is_nan(value) {
        return to_number(value) >= param_number(min);
    }
    match value {
        Value::String(text) => js_len(text) as f64 >= param_number(min),
        _ => false,
    }
}

pub fn email(value: &Value) -> bool {
    EMAIL_REGEX.is_match(&to_js_string(value).to_lowercase())
}

pub fn array(value: &Value) -> bool {
    value.is_array()
}

/// Searches for an http(s) URL anywhere in the text
pub fn url(value: &Value) -> bool {
    URL_REGEX.is_match(&to_js_string(value))
}

pub fn alpha(value: &Value) -> bool {
    ALPHA_REGEX.is_match(&to_js_string(value))
}

pub fn alpha_dash(value: &Value) -> bool {
    ALPHA_DASH_REGEX.is_match(&to_js_string(value))
}

pub fn alpha_num(value: &Value) -> bool {
    ALPHA_NUM_REGEX.is_match(&to_js_string(value))
}

pub fn accepted(value: &Value) -> bool {
    match value {
        Value::String(s) => matches!(s.as_str(), "on" | "yes" | "1"),
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::Bool(b) => *b,
        _ => false,
    }
}

/// Compile the parameter as a `/body/flags` pattern and search the value.
///
/// The parameter is executed as pattern syntax. A missing or malformed
/// pattern evaluates to false.
pub fn matches_pattern(patterns: &PatternCompiler, value: &Value, pattern: Option<&Value>) -> bool {
    let Some(Value::String(pattern)) = pattern else {
        warn!("regex rule requires a string pattern, got {:?}", pattern);
        return false;
    };

    match patterns.is_match(pattern, &to_js_string(value)) {
        Ok(matched) => matched,
        Err(err) => {
            warn!("regex rule cannot use pattern {}: {}", pattern, err);
            false
        }
    }
}

pub fn boolean(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Number(n) => matches!(n.as_f64(), Some(x) if x == 0.0 || x == 1.0),
        Value::String(s) => matches!(s.as_str(), "0" | "1" | "true" | "false"),
        _ => false,
    }
}

/// Coerces to a finite number; booleans are rejected even though they coerce
pub fn numeric(value: &Value) -> bool {
    !value.is_boolean() && to_number(value).is_finite()
}

/// The value is identical to the current value of the field named by the parameter
pub fn confirmed(lookup: &dyn FieldLookup, value: &Value, field: Option<&Value>) -> bool {
    let field_id = field
        .map(to_js_string)
        .unwrap_or_else(|| "undefined".to_string());

    match lookup.field_value(&field_id) {
        Some(current) => matches!(value, Value::String(text) if *text == current),
        None => {
            error!("Input field with id #{} not found.", field_id);
            false
        }
    }
}

/// Integer parsing reproduces the value's text exactly
pub fn integer(value: &Value) -> bool {
    let text = to_js_string(value);
    format_number(parse_int(&text)) == text
}

/// Text after the last `.`; the whole name when there is none
pub fn extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(dot) => &filename[dot + 1..],
        None => filename,
    }
}

/// Extension is one of the comma-separated parameter entries (case-sensitive)
pub fn filetype(value: &Value, allowed: Option<&Value>) -> bool {
    let (Value::String(filename), Some(Value::String(allowed))) = (value, allowed) else {
        return false;
    };
    let ext = extension(filename);
    allowed.split(',').any(|candidate| candidate == ext)
}

pub fn image(value: &Value) -> bool {
    has_extension(value, &IMAGE_EXTENSIONS)
}

pub fn video(value: &Value) -> bool {
    has_extension(value, &VIDEO_EXTENSIONS)
}

fn has_extension(value: &Value, extensions: &[&str]) -> bool {
    match value {
        Value::String(filename) => {
            let ext = extension(filename).to_lowercase();
            extensions.contains(&ext.as_str())
        }
        _ => false,
    }
}
