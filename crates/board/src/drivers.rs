//! Driver catalog lookups.
//!
//! The catalog table maps (season, round, session, driver) keys to display
//! metadata. Lookups fall back from the most specific key to a bare driver
//! key, so a partial catalog still resolves names and team colors.

use std::collections::HashMap;

use pitwall_core::ParsedTable;

/// Display metadata for one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    pub name: String,
    pub team: String,
    pub color: String,
    pub portrait: String,
}

/// Keyed driver catalog built from the parsed catalog table.
#[derive(Debug, Default)]
pub struct DriverDirectory {
    entries: HashMap<String, DriverInfo>,
}

fn key(season: &str, round: &str, session: &str, driver: &str) -> String {
    format!("{season}|{round}|{session}|{driver}")
}

impl DriverDirectory {
    /// Build a directory from the parsed catalog table.
    ///
    /// Rows without a driver identifier are skipped; missing metadata
    /// columns fall back to empty strings. Blank season, round or session
    /// fields make an entry match any value in that position.
    pub fn from_table(table: &ParsedTable) -> Self {
        let Some(driver_col) = table.column("driver") else {
            if table.row_count() > 0 {
                tracing::warn!("driver catalog has no driver column; directory left empty");
            }
            return Self::default();
        };

        let season_col = table.column("season");
        let round_col = table.column("round");
        let session_col = table.column("session");
        let name_col = table.column("name");
        let team_col = table.column("team");
        let color_col = table.column("color");
        let portrait_col = table.column("portrait");

        let field =
            |row: &[String], col: Option<usize>| -> String { col.and_then(|i| row.get(i)).cloned().unwrap_or_default() };

        let mut entries = HashMap::new();
        for (idx, row) in table.rows.iter().enumerate() {
            let driver = field(row, Some(driver_col));
            if driver.is_empty() {
                tracing::warn!("skipping driver catalog row {} without driver id", idx);
                continue;
            }

            entries.insert(
                key(&field(row, season_col), &field(row, round_col), &field(row, session_col), &driver),
                DriverInfo {
                    name: field(row, name_col),
                    team: field(row, team_col),
                    color: field(row, color_col),
                    portrait: field(row, portrait_col),
                },
            );
        }

        Self { entries }
    }

    /// Look up a driver, falling back from specific to general keys.
    ///
    /// Candidates are tried in order: (season, round, session, driver),
    /// then without session, then without round, then the bare driver.
    pub fn lookup(&self, season: &str, round: &str, session: &str, driver: &str) -> Option<&DriverInfo> {
        let candidates = [
            key(season, round, session, driver),
            key(season, round, "", driver),
            key(season, "", "", driver),
            key("", "", "", driver),
        ];

        candidates.iter().find_map(|k| self.entries.get(k))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
