use super::data_value::{DataValue, json_value_to_data_value};
use crate::error::{TierCacheError, TierCacheResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 默认的主键字段名
pub const ID_FIELD: &str = "id";

/// 表中的一行记录：字段名到标量值的映射
///
/// 字段按名称有序存放，插入语句的列顺序因此是确定的
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, DataValue>);

impl Record {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// 链式添加字段
    pub fn with<K: Into<String>, V: Into<DataValue>>(mut self, field: K, value: V) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn insert<K: Into<String>, V: Into<DataValue>>(&mut self, field: K, value: V) -> Option<DataValue> {
        self.0.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&DataValue> {
        self.0.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<DataValue> {
        self.0.remove(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// 记录的整数ID（若存在）
    pub fn id(&self) -> Option<i64> {
        self.get(ID_FIELD).and_then(DataValue::as_i64)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DataValue)> {
        self.0.iter()
    }

    /// 从 JSON 对象构造记录
    pub fn from_json(value: serde_json::Value) -> TierCacheResult<Self> {
        match value {
            serde_json::Value::Object(obj) => Ok(Self(
                obj.into_iter()
                    .map(|(k, v)| (k, json_value_to_data_value(v)))
                    .collect(),
            )),
            other => Err(TierCacheError::ValidationError {
                field: "record".to_string(),
                message: format!("记录必须是JSON对象，实际为: {}", other),
            }),
        }
    }

    /// 转换为 JSON 对象
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json_value()))
                .collect(),
        )
    }
}

impl FromIterator<(String, DataValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, DataValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Record {
    type Item = (String, DataValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, DataValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_json() {
        let record = Record::from_json(json!({
            "username": "alice",
            "email": "a@x.edu",
            "profile_data": {"major": "cs"}
        }))
        .unwrap();

        assert_eq!(record.get("username"), Some(&DataValue::String("alice".to_string())));
        assert_eq!(
            record.get("profile_data"),
            Some(&DataValue::Json(json!({"major": "cs"})))
        );
        assert_eq!(record.id(), None);
    }

    #[test]
    fn test_record_from_non_object_fails() {
        assert!(Record::from_json(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_record_serializes_as_flat_object() {
        let record = Record::new().with("id", 1).with("username", "alice");
        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(encoded, json!({"id": 1, "username": "alice"}));

        let decoded: Record = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.id(), Some(1));
    }
}
