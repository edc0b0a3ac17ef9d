use rusqlite::Connection;

use crate::Db;
use crate::error::Result;

const MIGRATION_0001: &str = include_str!("../migrations/0001_init.sql");
const MIGRATION_0002: &str = include_str!("../migrations/0002_add_work_mode.sql");
const MIGRATION_0003: &str = include_str!("../migrations/0003_add_timezone_offset.sql");
const MIGRATION_0004: &str = include_str!("../migrations/0004_add_leave_day.sql");

const MIGRATIONS: &[(&str, &str)] = &[
    ("0001_init", MIGRATION_0001),
    ("0002_add_work_mode", MIGRATION_0002),
    ("0003_add_timezone_offset", MIGRATION_0003),
    ("0004_add_leave_day", MIGRATION_0004),
];

impl Db {
    pub fn migrate(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (name, sql) in MIGRATIONS {
            if *name == "0002_add_work_mode" && table_has_column(&tx, "time_entry", "work_mode")? {
                continue;
            }
            if *name == "0003_add_timezone_offset"
                && table_has_column(&tx, "users", "timezone_offset")?
            {
                continue;
            }
            tx.execute_batch(sql)?;
        }
        tx.commit()?;
        Ok(())
    }
}

pub(crate) fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
