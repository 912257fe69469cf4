// ============================================================
// STORAGE
// ============================================================
// Dual-backend (SQLite / Postgres) persistence for batches,
// feedbacks and the kanban board. SQL is written once with `?`
// placeholders and rewritten to `$n` for Postgres.

mod batches;
mod connection;
mod feedbacks;
mod kanban;

pub use connection::{DbPool, Store};

/// Rewrite `?` placeholders to numbered `$n` placeholders.
pub(crate) fn pg_sql(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0u32;
    for ch in sql.chars() {
        if ch == '?' {
            n += 1;
            out.push('$');
            out.push_str(&n.to_string());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::pg_sql;

    #[test]
    fn test_pg_sql_numbers_placeholders() {
        assert_eq!(
            pg_sql("INSERT INTO t (a, b) VALUES (?, ?) RETURNING id"),
            "INSERT INTO t (a, b) VALUES ($1, $2) RETURNING id"
        );
        assert_eq!(pg_sql("SELECT 1"), "SELECT 1");
    }
}
