//! Lookup command implementation.

use cbmirror_localdb::{LocalDb, MirrorConfig, RegistryKind};

/// Runs the lookup command.
pub fn run(
    config: &MirrorConfig,
    kind: RegistryKind,
    identity: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let identity = kind.parse_identity(identity)?;
    let db = LocalDb::open(config)?;
    let record = db.lookup(kind, &identity)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
