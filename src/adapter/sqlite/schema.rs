//! SQLite建表语句生成

use crate::error::TierCacheResult;
use crate::security::IdentifierValidator;
use crate::table::TableSchema;

/// 生成 `CREATE TABLE IF NOT EXISTS` 语句，主键固定为自增 `id`
pub(crate) fn create_table_sql(
    validator: &IdentifierValidator,
    schema: &TableSchema,
) -> TierCacheResult<String> {
    let table = validator.safe_table_identifier(&schema.name)?;

    let mut columns = vec!["\"id\" INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
    for column in &schema.columns {
        let mut definition = format!(
            "{} {}",
            validator.safe_column_identifier(&column.name)?,
            column.column_type.sql_type()
        );
        if column.unique {
            definition.push_str(" UNIQUE");
        }
        if !column.nullable {
            definition.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            definition.push_str(&format!(" DEFAULT {}", default));
        }
        columns.push(definition);
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table,
        columns.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_ddl() {
        let sql = create_table_sql(&IdentifierValidator::new(), &TableSchema::users()).unwrap();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"users\""));
        assert!(sql.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("\"username\" TEXT UNIQUE NOT NULL"));
        assert!(sql.contains("\"created_at\" TIMESTAMP DEFAULT CURRENT_TIMESTAMP"));
    }
}
