use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

// Table names following FROM or JOIN, optionally schema-qualified.
static TABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:FROM|JOIN)\s+(\w+(?:\.\w+)?)").expect("table pattern must compile")
});

// Names introduced by a WITH clause, to exclude CTEs from the result.
static CTE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)WITH\s+(\w+)\s+AS").expect("cte pattern must compile"));

/// Extract the table names a SQL query reads from.
///
/// Best-effort regex heuristic: it scans FROM/JOIN targets and drops names
/// introduced by a WITH clause. It will misparse nested or chained CTEs,
/// quoted identifiers and cross-database qualified names.
pub fn extract_related_tables(query: &str) -> BTreeSet<String> {
    let cte_names: BTreeSet<String> = CTE_PATTERN
        .captures_iter(query)
        .map(|capture| capture[1].to_lowercase())
        .collect();

    TABLE_PATTERN
        .captures_iter(query)
        .map(|capture| capture[1].to_lowercase())
        .filter(|name| !cte_names.contains(name))
        .collect()
}
