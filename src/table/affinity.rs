//! SQLite 列亲和性转换
//!
//! 写入缓存的记录必须与从存储读回的记录一致，因此按列的声明类型
//! 预先做一次 SQLite 在落库时会做的类型转换

use crate::types::{DataValue, parse_json_string_to_data_value};

use super::ColumnType;

/// i64 可表示的浮点数边界（-2^63 到 2^63）
const I64_FLOAT_MIN: f64 = -9_223_372_036_854_775_808.0;
const I64_FLOAT_MAX: f64 = 9_223_372_036_854_775_808.0;

/// 按列类型转换单个值，结果与该值落库后再读出的值相同
pub(crate) fn normalize_value(column_type: ColumnType, value: DataValue) -> DataValue {
    // SQLite 把 NaN 存为 NULL
    if matches!(value, DataValue::Float(f) if f.is_nan()) {
        return DataValue::Null;
    }
    match column_type {
        ColumnType::Text => text_affinity(value),
        ColumnType::Json => match text_affinity(value) {
            DataValue::String(s) => parse_json_string_to_data_value(s),
            other => other,
        },
        ColumnType::Real => real_affinity(value),
        ColumnType::Integer | ColumnType::Timestamp => numeric_affinity(value),
        ColumnType::Boolean => match numeric_affinity(value) {
            DataValue::Int(i) => DataValue::Bool(i != 0),
            other => other,
        },
    }
}

/// TEXT 亲和性：数值转为文本
fn text_affinity(value: DataValue) -> DataValue {
    match value {
        DataValue::Null => DataValue::Null,
        // 布尔值以整数绑定
        DataValue::Bool(b) => DataValue::String(if b { "1" } else { "0" }.to_string()),
        DataValue::Int(i) => DataValue::String(i.to_string()),
        DataValue::Float(f) => DataValue::String(real_to_text(f)),
        DataValue::String(s) => DataValue::String(s),
        DataValue::Json(json) => DataValue::String(json.to_string()),
    }
}

/// REAL 亲和性：整数和数值文本转为浮点数
fn real_affinity(value: DataValue) -> DataValue {
    match value {
        DataValue::Bool(b) => DataValue::Float(if b { 1.0 } else { 0.0 }),
        DataValue::Int(i) => DataValue::Float(i as f64),
        DataValue::String(s) => match parse_numeric_text(&s) {
            Some(DataValue::Int(i)) => DataValue::Float(i as f64),
            Some(number) => number,
            None => DataValue::String(s),
        },
        DataValue::Json(json) => real_affinity(DataValue::String(json.to_string())),
        other => other,
    }
}

/// INTEGER / NUMERIC 亲和性：无损的浮点数转为整数，数值文本转为数值
fn numeric_affinity(value: DataValue) -> DataValue {
    match value {
        DataValue::Bool(b) => DataValue::Int(b as i64),
        DataValue::Float(f) => float_to_integer(f)
            .map(DataValue::Int)
            .unwrap_or(DataValue::Float(f)),
        DataValue::String(s) => match parse_numeric_text(&s) {
            Some(DataValue::Float(f)) => float_to_integer(f)
                .map(DataValue::Int)
                .unwrap_or(DataValue::Float(f)),
            Some(number) => number,
            None => DataValue::String(s),
        },
        DataValue::Json(json) => numeric_affinity(DataValue::String(json.to_string())),
        other => other,
    }
}

fn float_to_integer(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && (I64_FLOAT_MIN..I64_FLOAT_MAX).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

/// 识别格式正确的整数或浮点数文本，允许首尾空白
fn parse_numeric_text(s: &str) -> Option<DataValue> {
    let trimmed = s.trim();
    let well_formed = !trimmed.is_empty()
        && trimmed.bytes().any(|b| b.is_ascii_digit())
        && trimmed
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !well_formed {
        return None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(DataValue::Int(i));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(DataValue::Float)
}

/// 浮点数的 SQLite 文本形式（`%!.15g`）
///
/// 15 位有效数字，整数值保留 `.0`，指数小于 -4 或不小于 15 时使用科学计数法
fn real_to_text(f: f64) -> String {
    if f.is_infinite() {
        return if f > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }

    let scientific = format!("{:.14e}", f);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..15).contains(&exponent) {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        let decimals = (14 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, f))
    }
}

/// 去掉小数部分末尾的 0，至少保留一位小数
fn trim_fraction(s: &str) -> String {
    match s.split_once('.') {
        Some((integer, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{}.0", integer)
            } else {
                format!("{}.{}", integer, fraction)
            }
        }
        None => format!("{}.0", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_to_text_matches_sqlite_format() {
        assert_eq!(real_to_text(10.0), "10.0");
        assert_eq!(real_to_text(999.5), "999.5");
        assert_eq!(real_to_text(0.1), "0.1");
        assert_eq!(real_to_text(-2.25), "-2.25");
        assert_eq!(real_to_text(0.00001), "1.0e-05");
        assert_eq!(real_to_text(1e20), "1.0e+20");
        assert_eq!(real_to_text(123456789012345.0), "123456789012345.0");
    }

    #[test]
    fn test_real_column_widens_integers() {
        assert_eq!(normalize_value(ColumnType::Real, DataValue::Int(10)), DataValue::Float(10.0));
        assert_eq!(normalize_value(ColumnType::Real, "19.99".into()), DataValue::Float(19.99));
        assert_eq!(normalize_value(ColumnType::Real, "7".into()), DataValue::Float(7.0));
        assert_eq!(
            normalize_value(ColumnType::Real, "cheap".into()),
            DataValue::from("cheap")
        );
    }

    #[test]
    fn test_integer_column_narrows_lossless_floats() {
        assert_eq!(normalize_value(ColumnType::Integer, DataValue::Float(5.0)), DataValue::Int(5));
        assert_eq!(
            normalize_value(ColumnType::Integer, DataValue::Float(5.5)),
            DataValue::Float(5.5)
        );
        assert_eq!(normalize_value(ColumnType::Integer, " 42 ".into()), DataValue::Int(42));
        assert_eq!(normalize_value(ColumnType::Integer, "3.0".into()), DataValue::Int(3));
        assert_eq!(normalize_value(ColumnType::Integer, "inf".into()), DataValue::from("inf"));
        assert_eq!(normalize_value(ColumnType::Integer, DataValue::Bool(true)), DataValue::Int(1));
    }

    #[test]
    fn test_text_column_stringifies_numbers_and_json() {
        assert_eq!(normalize_value(ColumnType::Text, DataValue::Int(7)), DataValue::from("7"));
        assert_eq!(
            normalize_value(ColumnType::Text, DataValue::Float(10.0)),
            DataValue::from("10.0")
        );
        assert_eq!(
            normalize_value(ColumnType::Text, serde_json::json!({"year": "Senior"}).into()),
            DataValue::from(r#"{"year":"Senior"}"#)
        );
        assert_eq!(normalize_value(ColumnType::Text, DataValue::Null), DataValue::Null);
        assert_eq!(normalize_value(ColumnType::Text, DataValue::Float(f64::NAN)), DataValue::Null);
    }

    #[test]
    fn test_json_column_restores_documents() {
        assert_eq!(
            normalize_value(ColumnType::Json, r#"{"major":"Math"}"#.into()),
            DataValue::Json(serde_json::json!({"major": "Math"}))
        );
        assert_eq!(
            normalize_value(ColumnType::Json, "not json".into()),
            DataValue::from("not json")
        );
    }

    #[test]
    fn test_boolean_and_timestamp_columns() {
        assert_eq!(normalize_value(ColumnType::Boolean, DataValue::Int(0)), DataValue::Bool(false));
        assert_eq!(normalize_value(ColumnType::Boolean, "1".into()), DataValue::Bool(true));
        assert_eq!(
            normalize_value(ColumnType::Timestamp, "2025-10-19 08:00:00".into()),
            DataValue::from("2025-10-19 08:00:00")
        );
    }
}
