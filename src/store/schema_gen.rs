use crate::schema::{ColumnType, TableSchema};

/// Generate idempotent CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let sql_type = match col.col_type {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
        };

        let pk = if col.primary_key {
            " PRIMARY KEY AUTOINCREMENT"
        } else {
            ""
        };
        let null_constraint = if !col.nullable && !col.primary_key {
            " NOT NULL"
        } else {
            ""
        };
        let unique = if col.unique { " UNIQUE" } else { "" };

        columns.push(format!(
            "    {} {}{}{}{}",
            col.name, sql_type, pk, unique, null_constraint
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for the schema's secondary indexes
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .indexes
        .iter()
        .map(|index| {
            format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
                schema.name,
                index.columns.join("_"),
                schema.name,
                index.columns.join(", ")
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MAPS, NADES};

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&NADES);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS nades"));
        assert!(sql.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("startPosition TEXT NOT NULL"));
        assert!(sql.contains("localVideoPath TEXT,"));
    }

    #[test]
    fn test_map_name_is_unique() {
        let sql = generate_create_table(&MAPS);
        assert!(sql.contains("name TEXT UNIQUE NOT NULL"));
    }

    #[test]
    fn test_generate_indexes() {
        let indexes = generate_indexes(&NADES);
        assert!(indexes
            .iter()
            .any(|i| i == "CREATE INDEX IF NOT EXISTS idx_nades_map ON nades(map)"));
        assert!(indexes.iter().any(|i| i.contains("idx_nades_nadeType")));
        assert!(generate_indexes(&MAPS).is_empty());
    }
}
