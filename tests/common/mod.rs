use std::sync::OnceLock;

use cube_solver::Tables;

static TABLES: OnceLock<Tables> = OnceLock::new();

/// Build the full table set once per test binary.
pub fn tables() -> &'static Tables {
    TABLES.get_or_init(|| Tables::build().expect("table build is consistent"))
}
