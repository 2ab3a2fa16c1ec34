//! Table descriptors for the authentication store.
//!
//! Names, uniqueness and foreign keys here are the contract shared with the
//! auth provider; [`Table::create_sql`] renders them as PostgreSQL DDL.

use std::fmt::Write;

/// Every table name is prefixed so several projects can share a database.
pub const TABLE_PREFIX: &str = "e-comm-site_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Serial,
    Integer,
    Varchar(u32),
    Jsonb,
    Timestamp { with_time_zone: bool },
}

impl ColumnType {
    fn sql(&self) -> String {
        match self {
            ColumnType::Serial => "SERIAL".into(),
            ColumnType::Integer => "INTEGER".into(),
            ColumnType::Varchar(len) => format!("VARCHAR({len})"),
            ColumnType::Jsonb => "JSONB".into(),
            ColumnType::Timestamp {
                with_time_zone: true,
            } => "TIMESTAMP WITH TIME ZONE".into(),
            ColumnType::Timestamp {
                with_time_zone: false,
            } => "TIMESTAMP".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub not_null: bool,
    pub unique: bool,
    pub primary_key: bool,
    pub default_now: bool,
    /// A `BEFORE UPDATE` trigger sets this column to `now()`; see
    /// [`Table::touch_sql`].
    pub touch_on_update: bool,
    pub references: Option<ForeignKey>,
}

impl Column {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            not_null: false,
            unique: false,
            primary_key: false,
            default_now: false,
            touch_on_update: false,
            references: None,
        }
    }

    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    pub const fn not_null(self) -> Self {
        Self {
            not_null: true,
            ..self
        }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    pub const fn default_now(self) -> Self {
        Self {
            default_now: true,
            ..self
        }
    }

    pub const fn touch_on_update(self) -> Self {
        Self {
            touch_on_update: true,
            ..self
        }
    }

    pub const fn references(self, table: &'static str, column: &'static str) -> Self {
        Self {
            references: Some(ForeignKey { table, column }),
            ..self
        }
    }

    fn sql(&self) -> String {
        let mut out = format!("\"{}\" {}", self.name, self.ty.sql());
        if self.primary_key {
            out.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            out.push_str(" NOT NULL");
        }
        if self.unique {
            out.push_str(" UNIQUE");
        }
        if self.default_now {
            out.push_str(" DEFAULT CURRENT_TIMESTAMP");
        }
        if let Some(fk) = self.references {
            let _ = write!(
                out,
                " REFERENCES \"{}\"(\"{}\")",
                qualified(fk.table),
                fk.column
            );
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    /// Unprefixed name, e.g. `user`.
    pub name: &'static str,
    pub columns: &'static [Column],
    /// Composite primary key; empty when a column carries `PRIMARY KEY`.
    pub primary_key: &'static [&'static str],
}

pub fn qualified(name: &str) -> String {
    format!("{TABLE_PREFIX}{name}")
}

impl Table {
    pub fn qualified_name(&self) -> String {
        qualified(self.name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = (&'static str, ForeignKey)> + '_ {
        self.columns
            .iter()
            .filter_map(|c| c.references.map(|fk| (c.name, fk)))
    }

    pub fn create_sql(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(Column::sql).collect();
        if !self.primary_key.is_empty() {
            let cols: Vec<String> = self.primary_key.iter().map(|c| format!("\"{c}\"")).collect();
            parts.push(format!("PRIMARY KEY ({})", cols.join(", ")));
        }
        format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\n    {}\n)",
            self.qualified_name(),
            parts.join(",\n    ")
        )
    }

    /// Trigger DDL for the table's `touch_on_update` columns, in execution
    /// order. Empty when the table has none.
    pub fn touch_sql(&self) -> Vec<String> {
        let touched: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.touch_on_update)
            .map(|c| format!("NEW.\"{}\" = now();", c.name))
            .collect();
        if touched.is_empty() {
            return Vec::new();
        }
        let table = self.qualified_name();
        let function = format!("{table}_touch");
        vec![
            format!(
                "CREATE OR REPLACE FUNCTION \"{function}\"() RETURNS trigger AS $$\n\
                 BEGIN\n    {}\n    RETURN NEW;\nEND\n$$ LANGUAGE plpgsql",
                touched.join("\n    ")
            ),
            format!("DROP TRIGGER IF EXISTS \"{function}\" ON \"{table}\""),
            format!(
                "CREATE TRIGGER \"{function}\" BEFORE UPDATE ON \"{table}\" \
                 FOR EACH ROW EXECUTE FUNCTION \"{function}\"()"
            ),
        ]
    }
}

const VARCHAR: ColumnType = ColumnType::Varchar(255);
const TIMESTAMPTZ: ColumnType = ColumnType::Timestamp {
    with_time_zone: true,
};
const TIMESTAMP: ColumnType = ColumnType::Timestamp {
    with_time_zone: false,
};

pub const USERS: Table = Table {
    name: "user",
    columns: &[
        Column::new("id", ColumnType::Serial).primary_key(),
        Column::new("username", VARCHAR).not_null().unique(),
        Column::new("name", VARCHAR),
        Column::new("email", VARCHAR).not_null().unique(),
        Column::new("image", VARCHAR),
        Column::new("cart", ColumnType::Jsonb),
        Column::new("favorites", ColumnType::Jsonb),
        Column::new("created_at", TIMESTAMPTZ).not_null().default_now(),
        Column::new("updated_at", TIMESTAMPTZ).touch_on_update(),
    ],
    primary_key: &[],
};

pub const ACCOUNTS: Table = Table {
    name: "account",
    columns: &[
        Column::new("id", ColumnType::Serial).primary_key(),
        Column::new("user_id", ColumnType::Integer)
            .not_null()
            .references("user", "id"),
        Column::new("provider", VARCHAR).not_null(),
        Column::new("provider_account_id", VARCHAR).not_null(),
        Column::new("access_token", VARCHAR),
        Column::new("refresh_token", VARCHAR),
        Column::new("expires_at", TIMESTAMP),
    ],
    primary_key: &[],
};

pub const SESSIONS: Table = Table {
    name: "session",
    columns: &[
        Column::new("id", ColumnType::Serial).primary_key(),
        Column::new("session_token", VARCHAR).not_null().unique(),
        Column::new("user_id", ColumnType::Integer)
            .not_null()
            .references("user", "id"),
        Column::new("expires", TIMESTAMP).not_null(),
    ],
    primary_key: &[],
};

pub const VERIFICATION_TOKENS: Table = Table {
    name: "verification_token",
    columns: &[
        Column::new("identifier", VARCHAR).not_null(),
        Column::new("token", VARCHAR).not_null(),
        Column::new("expires", TIMESTAMPTZ).not_null(),
    ],
    primary_key: &["identifier", "token"],
};

/// All tables, referenced tables first.
pub const TABLES: [Table; 4] = [USERS, ACCOUNTS, SESSIONS, VERIFICATION_TOKENS];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_prefixed() {
        let names: Vec<_> = TABLES.iter().map(Table::qualified_name).collect();
        assert_eq!(
            names,
            vec![
                "e-comm-site_user",
                "e-comm-site_account",
                "e-comm-site_session",
                "e-comm-site_verification_token"
            ]
        );
    }

    #[test]
    fn user_ddl_has_unique_identities() {
        let sql = USERS.create_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"e-comm-site_user\""));
        assert!(sql.contains("\"id\" SERIAL PRIMARY KEY"));
        assert!(sql.contains("\"username\" VARCHAR(255) NOT NULL UNIQUE"));
        assert!(sql.contains("\"email\" VARCHAR(255) NOT NULL UNIQUE"));
        assert!(sql.contains("\"name\" VARCHAR(255),"));
        assert!(sql.contains("\"cart\" JSONB"));
        assert!(sql.contains(
            "\"created_at\" TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP"
        ));
        assert!(sql.contains("\"updated_at\" TIMESTAMP WITH TIME ZONE\n"));
    }

    #[test]
    fn updated_at_is_touched_by_trigger() {
        let stmts = USERS.touch_sql();
        assert_eq!(stmts.len(), 3);
        assert!(stmts[0].starts_with(
            "CREATE OR REPLACE FUNCTION \"e-comm-site_user_touch\"() RETURNS trigger"
        ));
        assert!(stmts[0].contains("NEW.\"updated_at\" = now();"));
        assert!(stmts[0].contains("RETURN NEW;"));
        assert_eq!(
            stmts[1],
            "DROP TRIGGER IF EXISTS \"e-comm-site_user_touch\" ON \"e-comm-site_user\""
        );
        assert_eq!(
            stmts[2],
            "CREATE TRIGGER \"e-comm-site_user_touch\" BEFORE UPDATE ON \"e-comm-site_user\" \
             FOR EACH ROW EXECUTE FUNCTION \"e-comm-site_user_touch\"()"
        );

        for table in [ACCOUNTS, SESSIONS, VERIFICATION_TOKENS] {
            assert!(table.touch_sql().is_empty(), "{}", table.name);
        }
    }

    #[test]
    fn accounts_and_sessions_point_at_users() {
        for table in [ACCOUNTS, SESSIONS] {
            let fks: Vec<_> = table.foreign_keys().collect();
            assert_eq!(
                fks,
                vec![(
                    "user_id",
                    ForeignKey {
                        table: "user",
                        column: "id"
                    }
                )]
            );
            assert!(table
                .create_sql()
                .contains("\"user_id\" INTEGER NOT NULL REFERENCES \"e-comm-site_user\"(\"id\")"));
        }
        assert!(SESSIONS
            .create_sql()
            .contains("\"session_token\" VARCHAR(255) NOT NULL UNIQUE"));
        assert!(SESSIONS.create_sql().contains("\"expires\" TIMESTAMP NOT NULL"));
    }

    #[test]
    fn verification_token_is_standalone_with_composite_key() {
        assert_eq!(VERIFICATION_TOKENS.foreign_keys().count(), 0);
        let sql = VERIFICATION_TOKENS.create_sql();
        assert!(sql.contains("PRIMARY KEY (\"identifier\", \"token\")"));
        assert!(sql.contains("\"expires\" TIMESTAMP WITH TIME ZONE NOT NULL"));
        assert!(!sql.contains("SERIAL"));
    }

    #[test]
    fn referenced_tables_come_first() {
        for (i, table) in TABLES.iter().enumerate() {
            for (_, fk) in table.foreign_keys() {
                let target = TABLES.iter().position(|t| t.name == fk.table).unwrap();
                assert!(target < i, "{} depends on later {}", table.name, fk.table);
            }
        }
    }
}
