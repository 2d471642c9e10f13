use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

use crate::filter::FilterRules;

/// Snapshot fetched when no URL is configured or passed on the command line.
pub const DEFAULT_URL: &str = "https://download.geofabrik.de/north-america/us/new-york-latest.osm.pbf";

/// Base name for the exported shapefiles (`<name>_<layer>.shp`).
pub const DEFAULT_OUTPUT_NAME: &str = "OpenStreetMap_Roadways";

/// External binaries the pipeline shells out to. Bare names are looked up on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub osmconvert: PathBuf,
    pub osmfilter: PathBuf,
    pub ogr2ogr: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            osmconvert: PathBuf::from("osmconvert"),
            osmfilter: PathBuf::from("osmfilter"),
            ogr2ogr: PathBuf::from("ogr2ogr"),
        }
    }
}

/// Global configuration loaded from `~/.config/osmprep/config.toml`.
///
/// A file on disk may be partial; it is merged over [`PrepConfig::xdg_default`]
/// and only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepConfig {
    /// URL of the `.osm.pbf` snapshot.
    pub url: String,
    /// Verify the server's TLS certificate and host name.
    pub verify_tls: bool,
    /// Date-stamped download directories are created under this root.
    pub download_root: PathBuf,
    /// Date-stamped working directories for `.o5m` and filtered files.
    pub extract_root: PathBuf,
    /// Preferred root for exported shapefiles (e.g. a mounted share).
    pub output_root: PathBuf,
    /// Used instead of `output_root` when that is not an existing directory.
    pub fallback_output_root: PathBuf,
    /// Shapefile base name.
    pub output_name: String,
    /// Scratch file handed to osmfilter via `-t=`. Shared by every run.
    pub scratch_file: PathBuf,
    /// Directory receiving one `run_log_*.log` per invocation.
    pub log_dir: PathBuf,
    pub tools: ToolPaths,
    pub filter: FilterRules,
}

impl PrepConfig {
    /// Defaults with data directories under `data_home` and logs/scratch under `state_home`.
    pub fn rooted_at(data_home: &Path, state_home: &Path) -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            verify_tls: true,
            download_root: data_home.join("osm_downloads"),
            extract_root: data_home.join("extract"),
            output_root: data_home.join("OpenStreetMap_Data"),
            fallback_output_root: data_home.join("OpenStreetMap_Data"),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            scratch_file: state_home.join("osmfilter_tempfile"),
            log_dir: state_home.join("logs"),
            tools: ToolPaths::default(),
            filter: FilterRules::default(),
        }
    }

    /// Defaults rooted at the XDG data and state homes for the `osmprep` prefix.
    pub fn xdg_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("osmprep")?;
        Ok(Self::rooted_at(
            &xdg_dirs.get_data_home(),
            &xdg_dirs.get_state_home(),
        ))
    }
}

/// Configuration together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: PrepConfig,
    pub path: PathBuf,
    /// True when `load_or_init` just wrote a default file at `path`.
    pub created: bool,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("osmprep")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<LoadedConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PrepConfig::xdg_default()?;
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        return Ok(LoadedConfig {
            config: default_cfg,
            path,
            created: true,
        });
    }

    load_from_path(&path)
}

/// Load configuration from an explicit file. Missing fields take the XDG defaults.
pub fn load_from_path(path: &Path) -> Result<LoadedConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let config = parse_over(PrepConfig::xdg_default()?, &data)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(LoadedConfig {
        config,
        path: path.to_path_buf(),
        created: false,
    })
}

/// Parses `data` as TOML and overlays it on `defaults`, table by table.
pub fn parse_over(defaults: PrepConfig, data: &str) -> Result<PrepConfig> {
    let overlay: Table = data.parse()?;
    let mut merged = match Value::try_from(defaults)? {
        Value::Table(table) => table,
        other => anyhow::bail!("config serialized to {} instead of a table", other.type_str()),
    };
    merge_tables(&mut merged, overlay);
    Ok(Value::Table(merged).try_into()?)
}

fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match value {
            Value::Table(inner) if matches!(base.get(&key), Some(Value::Table(_))) => {
                if let Some(Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, inner);
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = PrepConfig::rooted_at(Path::new("/data"), Path::new("/state"));
        assert_eq!(cfg.url, DEFAULT_URL);
        assert!(cfg.verify_tls);
        assert_eq!(cfg.download_root, Path::new("/data/osm_downloads"));
        assert_eq!(cfg.extract_root, Path::new("/data/extract"));
        assert_eq!(cfg.scratch_file, Path::new("/state/osmfilter_tempfile"));
        assert_eq!(cfg.log_dir, Path::new("/state/logs"));
        assert_eq!(cfg.output_name, "OpenStreetMap_Roadways");
        assert_eq!(cfg.tools.ogr2ogr, Path::new("ogr2ogr"));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = PrepConfig::rooted_at(Path::new("/data"), Path::new("/state"));
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: PrepConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml = r#"
            url = "https://example.com/region.osm.pbf"
            verify_tls = false
            output_root = "/mnt/gis/roads"

            [tools]
            osmconvert = "/opt/osm/osmconvert64"
        "#;
        let defaults = PrepConfig::rooted_at(Path::new("/data"), Path::new("/state"));
        let cfg = parse_over(defaults, toml).unwrap();
        assert_eq!(cfg.url, "https://example.com/region.osm.pbf");
        assert!(!cfg.verify_tls);
        assert_eq!(cfg.output_root, Path::new("/mnt/gis/roads"));
        assert_eq!(cfg.tools.osmconvert, Path::new("/opt/osm/osmconvert64"));
        assert_eq!(cfg.tools.osmfilter, Path::new("osmfilter"));
        assert_eq!(cfg.filter, FilterRules::default());
        assert_eq!(cfg.output_name, DEFAULT_OUTPUT_NAME);
        assert_eq!(cfg.download_root, Path::new("/data/osm_downloads"));
        assert_eq!(cfg.fallback_output_root, Path::new("/data/OpenStreetMap_Data"));
        assert_eq!(cfg.scratch_file, Path::new("/state/osmfilter_tempfile"));
    }

    #[test]
    fn empty_toml_is_the_defaults() {
        let defaults = PrepConfig::rooted_at(Path::new("/data"), Path::new("/state"));
        assert_eq!(parse_over(defaults.clone(), "").unwrap(), defaults);
    }

    #[test]
    fn custom_filter_rules() {
        let toml = r#"
            [filter]
            keep = "highway=motorway"
            drop = ["highway=service", "access=no"]
        "#;
        let defaults = PrepConfig::rooted_at(Path::new("/data"), Path::new("/state"));
        let cfg = parse_over(defaults, toml).unwrap();
        assert_eq!(cfg.filter.keep, "highway=motorway");
        assert_eq!(cfg.filter.drop, vec!["highway=service", "access=no"]);
    }

    #[test]
    fn load_from_path_fills_missing_fields_from_xdg_homes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "output_name = \"Roads\"\n").unwrap();
        let loaded = load_from_path(&path).unwrap();
        let xdg = PrepConfig::xdg_default().unwrap();
        assert_eq!(loaded.path, path);
        assert!(!loaded.created);
        assert_eq!(loaded.config.output_name, "Roads");
        assert_eq!(loaded.config.download_root, xdg.download_root);
        assert_eq!(loaded.config.extract_root, xdg.extract_root);
        assert_eq!(loaded.config.scratch_file, xdg.scratch_file);
        assert_eq!(loaded.config.log_dir, xdg.log_dir);
        assert_ne!(loaded.config.download_root, Path::new("./osm_downloads"));
        assert!(loaded.config.download_root.is_absolute());
    }

    #[test]
    fn load_from_path_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "verify_tls = \"maybe\"\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing config"));
    }
}
