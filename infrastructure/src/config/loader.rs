//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level file names, checked in this order
const PROJECT_FILES: [&str; 2] = ["conclave.toml", ".conclave.toml"];

/// Prefix of environment overrides; `__` separates nested keys
/// (`CONCLAVE_DISCUSSION__ITERATIONS=3`)
const ENV_PREFIX: &str = "CONCLAVE_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `CONCLAVE_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./conclave.toml` or `./.conclave.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/conclave/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let figment = Self::file_figment(
            Self::global_config_path().filter(|p| p.exists()),
            Self::project_config_path(),
            config_path.map(PathBuf::as_path),
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Defaults merged with whichever files are given, lowest priority first
    fn file_figment(
        global: Option<PathBuf>,
        project: Option<PathBuf>,
        explicit: Option<&Path>,
    ) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/conclave/config.toml if set,
    /// otherwise falls back to ~/.config/conclave/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("conclave").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        println!("  [     ] Environment: {}* (`__` separates sections)", ENV_PREFIX);

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./conclave.toml or ./.conclave.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn extract(figment: Figment) -> FileConfig {
        figment.extract().unwrap()
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.discussion.iterations, 2);
        assert_eq!(config.provider.kind, "offline");
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("conclave"));
    }

    #[test]
    fn test_later_files_override_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(
            &global,
            "[discussion]\niterations = 4\nlanguage = \"French\"\n",
        )
        .unwrap();
        fs::write(&project, "[discussion]\niterations = 3\n").unwrap();

        let config = extract(ConfigLoader::file_figment(
            Some(global),
            Some(project),
            None,
        ));

        assert_eq!(config.discussion.iterations, 3);
        // Untouched keys survive from the lower layer
        assert_eq!(config.discussion.language, "French");
        // And defaults fill the rest
        assert_eq!(config.behavior.turn_delay_ms, 1000);
    }

    #[test]
    fn test_explicit_file_has_highest_file_priority() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("project.toml");
        let explicit = dir.path().join("explicit.toml");
        fs::write(&project, "[provider]\nkind = \"command\"\n").unwrap();
        fs::write(&explicit, "[provider]\nkind = \"openai\"\n").unwrap();

        let config = extract(ConfigLoader::file_figment(
            None,
            Some(project),
            Some(&explicit),
        ));

        assert_eq!(config.provider.kind, "openai");
    }

    #[test]
    fn test_invalid_type_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[discussion]\niterations = \"many\"\n").unwrap();

        let result: Result<FileConfig, _> =
            ConfigLoader::file_figment(None, None, Some(&path)).extract();
        assert!(result.is_err());
    }
}
