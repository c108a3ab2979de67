//! Shared helpers for locating and loading the project configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use geox_config::{input_comment, input_text, ProjectConfig, CONFIG_FILE_NAME};
use geox_params::InputEntry;
use tracing::debug;

use crate::GlobalArgs;

/// A loaded configuration and the directory its relative paths resolve from.
pub struct Project {
    /// Directory holding the configuration file.
    pub base: PathBuf,
    /// The parsed configuration.
    pub config: ProjectConfig,
}

/// Loads the project for this invocation.
///
/// An explicit `--config` path must exist. Otherwise `geox.toml` in the
/// current directory is used when present, and defaults when not.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    if let Some(path) = &global.config {
        let path = Path::new(path);
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let config = geox_config::load_config_from_str(&content)?;
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        return Ok(Project { base, config });
    }

    let base = std::env::current_dir()?;
    load_from_dir(base)
}

/// Loads `geox.toml` from `dir`, falling back to defaults when absent.
pub fn load_from_dir(dir: PathBuf) -> Result<Project, Box<dyn std::error::Error>> {
    let config = if dir.join(CONFIG_FILE_NAME).is_file() {
        geox_config::load_config(&dir)?
    } else {
        debug!(dir = %dir.display(), "no {CONFIG_FILE_NAME}, using defaults");
        ProjectConfig::default()
    };
    Ok(Project { base: dir, config })
}

/// Collects configured inputs and `NAME=VALUE` overrides as entries.
///
/// Overrides win over configured values of the same name and carry no
/// comment.
pub fn collect_inputs(
    config: &ProjectConfig,
    overrides: &[String],
) -> Result<BTreeMap<String, InputEntry>, String> {
    let mut inputs: BTreeMap<String, InputEntry> = config
        .inputs
        .iter()
        .filter_map(|(name, value)| {
            let entry = InputEntry::new(input_text(value)?)
                .with_comment(input_comment(value).unwrap_or_default());
            Some((name.clone(), entry))
        })
        .collect();
    for raw in overrides {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| format!("override '{raw}' is not NAME=VALUE"))?;
        inputs.insert(name.trim().to_string(), InputEntry::new(value.trim()));
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let project = load_from_dir(dir.path().to_path_buf()).unwrap();
        assert!(project.config.cache.enabled);
        assert!(project.config.inputs.is_empty());
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[cache]\nenabled = false\n\n[inputs]\n\"Plant Lifetime\" = 25\n",
        )
        .unwrap();
        let project = load_from_dir(dir.path().to_path_buf()).unwrap();
        assert!(!project.config.cache.enabled);
        let inputs = collect_inputs(&project.config, &[]).unwrap();
        assert_eq!(inputs["Plant Lifetime"], InputEntry::new("25"));
    }

    #[test]
    fn explicit_config_path_sets_base() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plant.toml");
        std::fs::write(&path, "[cache]\npath = \"store\"\n").unwrap();
        let global = GlobalArgs {
            quiet: false,
            verbose: false,
            config: Some(path.to_string_lossy().into_owned()),
        };
        let project = load_project(&global).unwrap();
        assert_eq!(project.base, dir.path());
        assert_eq!(project.config.cache.path, "store");
    }

    #[test]
    fn config_comment_reaches_entry() {
        let config = geox_config::load_config_from_str(
            "[inputs]\n\"Discount Rate\" = { value = 0.05, comment = \"lender quote\" }\n",
        )
        .unwrap();
        let inputs = collect_inputs(&config, &[]).unwrap();
        assert_eq!(
            inputs["Discount Rate"],
            InputEntry::new("0.05").with_comment("lender quote")
        );
    }

    #[test]
    fn overrides_win_and_must_have_equals() {
        let config =
            geox_config::load_config_from_str("[inputs]\n\"Discount Rate\" = 0.07\n").unwrap();
        let inputs = collect_inputs(&config, &["Discount Rate = 0.05".to_string()]).unwrap();
        assert_eq!(inputs["Discount Rate"], InputEntry::new("0.05"));
        assert!(collect_inputs(&config, &["Discount Rate".to_string()]).is_err());
    }
}
