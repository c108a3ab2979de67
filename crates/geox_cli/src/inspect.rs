//! `geox inspect`: show a stored cache entry.

use geox_cache::{decode, open_cache, CacheEntry, FieldRole};
use geox_common::Fingerprint;

use crate::project::load_project;
use crate::{GlobalArgs, InspectArgs};

/// Runs the `geox inspect` command.
///
/// Returns exit code 0 when the entry exists (and, with `--secure`, its
/// secure payload matches), 1 otherwise.
pub fn run(args: &InspectArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let fingerprint: Fingerprint = args.fingerprint.trim().parse()?;
    let project = load_project(global)?;
    if !project.config.cache.enabled {
        eprintln!("error: the compute cache is disabled in this project");
        return Ok(1);
    }
    let cache = open_cache(&project.config.cache, &project.base);

    let Some(entry) = cache.inspect(&fingerprint)? else {
        eprintln!("error: no entry for {fingerprint}");
        return Ok(1);
    };

    if !global.quiet {
        print!("{}", describe(&entry));
    }

    if args.secure {
        match cache.open_secure(&entry)? {
            Some(plain) if plain == entry.payload => {
                if !global.quiet {
                    println!("secure payload: verified");
                }
            }
            Some(_) => {
                eprintln!("error: secure payload does not match the plaintext payload");
                return Ok(1);
            }
            None => {
                eprintln!("error: entry has no secure payload");
                return Ok(1);
            }
        }
    }
    Ok(0)
}

/// Renders entry metadata followed by the decoded record summary.
fn describe(entry: &CacheEntry) -> String {
    let mut out = format!(
        "fingerprint: {}\nkind:        {}\nprincipal:   {}\ncreated:     {}\nsecure:      {}\n",
        entry.fingerprint,
        entry.owner_kind,
        entry.principal,
        entry.created_at.to_rfc3339(),
        if entry.secure_payload.is_some() { "yes" } else { "no" },
    );
    match decode(&entry.payload) {
        Ok(tree) => {
            for role in [FieldRole::Input, FieldRole::Output] {
                let records: Vec<_> = tree.records.iter().filter(|r| r.role == role).collect();
                out.push_str(&format!("\n{role}s ({}):\n", records.len()));
                for record in records {
                    let value = record
                        .value()
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    out.push_str(&format!("  {} = {value}\n", record.name));
                }
            }
        }
        Err(e) => out.push_str(&format!("\npayload does not decode: {e}\n")),
    }
    out.push_str(&format!("\npayload:\n{}\n", entry.payload));
    out
}
