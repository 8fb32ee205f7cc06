//! `key=value` parameter files and their resolution into run settings.

use std::f64::consts::FRAC_PI_4;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One configuration layer. Unset keys fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub input_path: Option<String>,
    pub particle_file_name: Option<String>,
    pub pair_file_name: Option<String>,
    pub pair_wall_name: Option<String>,
    pub output_path: Option<String>,
    pub output_file_name: Option<String>,
    pub alpha: Option<f64>,
    pub start: Option<usize>,
    pub last: Option<usize>,
    pub step: Option<usize>,
    pub particle_file_ext: Option<String>,
    pub pair_wall_ext: Option<String>,
}

impl ConfigFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses `key=value` lines. Blank lines and `#` comments are skipped,
    /// unknown keys are ignored with a warning.
    pub fn parse(text: &str) -> Result<Self> {
        let mut config = Self::default();
        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                bail!("line {line_no}: expected key=value, found `{line}`");
            };
            let (key, value) = (key.trim(), value.trim().to_string());

            let number = |value: &str| -> Result<usize> {
                value
                    .parse()
                    .with_context(|| format!("line {line_no}: `{key}` expects an integer"))
            };
            match key {
                "inputPath" | "path" => config.input_path = Some(value),
                "particleFile_name" => config.particle_file_name = Some(value),
                "pairFile_name" => config.pair_file_name = Some(value),
                "pairWall_name" => config.pair_wall_name = Some(value),
                "outputPath" => config.output_path = Some(value),
                "outputFile_name" => config.output_file_name = Some(value),
                "particleFile_ext" => config.particle_file_ext = Some(value),
                "pairWall_ext" => config.pair_wall_ext = Some(value),
                "alpha" => {
                    config.alpha = Some(value.parse().with_context(|| {
                        format!("line {line_no}: `alpha` expects a number in radians")
                    })?)
                }
                "start" => config.start = Some(number(&value)?),
                "last" => config.last = Some(number(&value)?),
                "step" => config.step = Some(number(&value)?),
                other => warn!(line = line_no, key = other, "ignoring unknown config key"),
            }
        }
        Ok(config)
    }

    /// `self` with every key set in `overrides` replaced.
    pub fn merged(self, overrides: ConfigFile) -> Self {
        Self {
            input_path: overrides.input_path.or(self.input_path),
            particle_file_name: overrides.particle_file_name.or(self.particle_file_name),
            pair_file_name: overrides.pair_file_name.or(self.pair_file_name),
            pair_wall_name: overrides.pair_wall_name.or(self.pair_wall_name),
            output_path: overrides.output_path.or(self.output_path),
            output_file_name: overrides.output_file_name.or(self.output_file_name),
            alpha: overrides.alpha.or(self.alpha),
            start: overrides.start.or(self.start),
            last: overrides.last.or(self.last),
            step: overrides.step.or(self.step),
            particle_file_ext: overrides.particle_file_ext.or(self.particle_file_ext),
            pair_wall_ext: overrides.pair_wall_ext.or(self.pair_wall_ext),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha.unwrap_or(FRAC_PI_4)
    }

    pub fn input_dir(&self) -> PathBuf {
        PathBuf::from(self.input_path.as_deref().unwrap_or("."))
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(self.output_path.as_deref().unwrap_or("."))
    }

    pub fn require<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str> {
        match value.as_deref() {
            Some(v) if !v.is_empty() => Ok(v),
            _ => bail!("missing `{key}`: set it in the config file or on the command line"),
        }
    }

    /// Wall dump name, treating an empty value as "no wall file".
    pub fn wall_name(&self) -> Option<&str> {
        self.pair_wall_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// `base` with `suffix` appended to its last component.
pub fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# single snapshot
inputPath=../liggghtsResult/post/
particleFile_name=compress4000.liggghts
pairFile_name=pair4000.txt
pairWall_name=
outputPath=out/
outputFile_name=forceChains
alpha=0.785398
";

    #[test]
    fn parses_known_keys() {
        let config = ConfigFile::parse(SAMPLE).expect("parse");
        assert_eq!(config.input_path.as_deref(), Some("../liggghtsResult/post/"));
        assert_eq!(config.pair_file_name.as_deref(), Some("pair4000.txt"));
        assert_eq!(config.wall_name(), None);
        assert!((config.alpha() - 0.785398).abs() < 1e-12);
        assert_eq!(config.start, None);
    }

    #[test]
    fn batch_keys_and_path_alias() {
        let text = "path=post/\nstart=0\nlast=4000\nstep=500\nparticleFile_ext=.liggghts\n";
        let config = ConfigFile::parse(text).expect("parse");
        assert_eq!(config.input_dir(), PathBuf::from("post/"));
        assert_eq!((config.start, config.last, config.step), (Some(0), Some(4000), Some(500)));
        assert_eq!(config.particle_file_ext.as_deref(), Some(".liggghts"));
    }

    #[test]
    fn flags_override_file_values() {
        let file = ConfigFile::parse(SAMPLE).expect("parse");
        let flags = ConfigFile {
            alpha: Some(0.5),
            output_file_name: Some("custom".to_string()),
            ..ConfigFile::default()
        };
        let merged = file.merged(flags);
        assert_eq!(merged.alpha, Some(0.5));
        assert_eq!(merged.output_file_name.as_deref(), Some("custom"));
        assert_eq!(merged.pair_file_name.as_deref(), Some("pair4000.txt"));
    }

    #[test]
    fn malformed_lines_are_errors() {
        assert!(ConfigFile::parse("alpha\n").is_err());
        assert!(ConfigFile::parse("alpha=wide\n").is_err());
        assert!(ConfigFile::parse("step=-1\n").is_err());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = ConfigFile::parse("colour=blue\nalpha=0.3\n").expect("parse");
        assert_eq!(config.alpha, Some(0.3));
    }

    #[test]
    fn missing_required_key_is_reported() {
        let err = ConfigFile::require(&None, "pairFile_name").expect_err("missing");
        assert!(err.to_string().contains("pairFile_name"));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("input_parameters.txt");
        fs::write(&path, SAMPLE).expect("write config");
        let config = ConfigFile::load(&path).expect("load");
        assert_eq!(config.output_file_name.as_deref(), Some("forceChains"));
        assert!(ConfigFile::load(dir.path().join("absent.txt")).is_err());
    }

    #[test]
    fn suffix_extends_file_name() {
        assert_eq!(with_suffix(Path::new("out/chains"), ".csv"), PathBuf::from("out/chains.csv"));
    }
}
