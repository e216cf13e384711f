use crate::domain::model::{BatchReport, Category};
use crate::utils::error::Result;

const HEADER: [&str; 6] = [
    "OrgName",
    "Website",
    "App",
    "MiniProgram",
    "UnregisteredOrgName",
    "FailedOrgName",
];

/// Writes the consolidated result table to a CSV file, one row per target
/// sorted by organization name.
///
/// `UnregisteredOrgName` is populated only when every category cell is
/// blank and the target did not fail; `FailedOrgName` exactly when the
/// target is in the failure set.
pub fn write_csv(report: &BatchReport, path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADER)?;

    let mut names: Vec<&String> = report.table.keys().collect();
    names.sort();

    for name in names {
        let outcomes = &report.table[name];
        let cells = Category::ALL.map(|category| outcomes.joined(category));
        let failed = report.failures.contains(name);
        let unregistered = cells.iter().all(|cell| cell.is_empty()) && !failed;

        writer.write_record([
            name.as_str(),
            &cells[0],
            &cells[1],
            &cells[2],
            if unregistered { name.as_str() } else { "" },
            if failed { name.as_str() } else { "" },
        ])?;
    }

    writer.flush()?;
    tracing::info!("exported {} targets to {}", report.table.len(), path);
    Ok(())
}
