use serde::{Deserialize, Serialize};

/// 记录字段的标量值
///
/// 序列化为不带类型标签的普通 JSON，缓存中的条目因此与持久化存储
/// 返回的行保持同一种表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    /// 空值
    Null,
    /// 布尔值
    Bool(bool),
    /// 整数
    Int(i64),
    /// 浮点数
    Float(f64),
    /// 字符串
    String(String),
    /// 嵌套 JSON（数组或对象），落库时编码为文本
    Json(serde_json::Value),
}

impl std::fmt::Display for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Bool(b) => write!(f, "{}", b),
            DataValue::Int(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Json(json) => write!(f, "{}", json),
        }
    }
}

impl DataValue {
    /// 获取数据类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Bool(_) => "boolean",
            DataValue::Int(_) => "integer",
            DataValue::Float(_) => "float",
            DataValue::String(_) => "string",
            DataValue::Json(_) => "json",
        }
    }

    /// 判断是否为空值
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// 空值或空字符串，写入时视为"未提供"
    pub fn is_blank(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// 以整数读取（用于ID字段）
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DataValue::Int(i) => Some(*i),
            DataValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// 转换为 JSON 值
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            DataValue::Null => serde_json::Value::Null,
            DataValue::Bool(b) => serde_json::Value::Bool(*b),
            DataValue::Int(i) => serde_json::Value::Number(serde_json::Number::from(*i)),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            DataValue::String(s) => serde_json::Value::String(s.clone()),
            DataValue::Json(j) => j.clone(),
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Int(value as i64)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<serde_json::Value> for DataValue {
    fn from(value: serde_json::Value) -> Self {
        json_value_to_data_value(value)
    }
}

impl<T> From<Option<T>> for DataValue
where
    T: Into<DataValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DataValue::Null,
        }
    }
}

/// 将 serde_json::Value 转换为对应的 DataValue 类型
///
/// 标量映射到对应变体，数组和对象保留为 `DataValue::Json`
pub fn json_value_to_data_value(value: serde_json::Value) -> DataValue {
    match value {
        serde_json::Value::Null => DataValue::Null,
        serde_json::Value::Bool(b) => DataValue::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                DataValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                DataValue::Float(f)
            } else {
                DataValue::Json(serde_json::Value::Number(n))
            }
        }
        serde_json::Value::String(s) => DataValue::String(s),
        other => DataValue::Json(other),
    }
}

/// 文本列的JSON检测
///
/// 以 '[' 或 '{' 开头且能解析成功的字符串还原为 `DataValue::Json`，
/// 其余保持为字符串
pub fn parse_json_string_to_data_value(value: String) -> DataValue {
    if value.starts_with('[') || value.starts_with('{') {
        match serde_json::from_str::<serde_json::Value>(&value) {
            Ok(json_value @ (serde_json::Value::Array(_) | serde_json::Value::Object(_))) => {
                DataValue::Json(json_value)
            }
            _ => DataValue::String(value),
        }
    } else {
        DataValue::String(value)
    }
}
