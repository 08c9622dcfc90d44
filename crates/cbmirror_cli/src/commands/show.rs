//! Show command implementation.

use cbmirror_localdb::{LocalDb, MirrorConfig, RegistryKind};
use cbmirror_registry::Record;
use serde_json::Value;

/// Runs the show command.
pub fn run(
    config: &MirrorConfig,
    kind: RegistryKind,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = LocalDb::open(config)?;
    let records = db.snapshot(kind)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        _ => {
            println!("{kind}: {} entries", records.len());
            for record in &records {
                println!("  {}", summary_line(record));
            }
        }
    }

    Ok(())
}

/// Renders a record as `field=value` pairs on one line.
pub fn summary_line(record: &Record) -> String {
    record
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(field, value)| match value {
            Value::String(s) => format!("{field}={s}"),
            other => format!("{field}={other}"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
