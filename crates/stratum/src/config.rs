//! # World Configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is a
//! valid config:
//!
//! ```toml
//! [generation]
//! seed = 42
//! chunk_size = [32, 32, 32]
//! group_size = [2, 2, 2]
//! group_counts = [2, 2, 2]
//! iso_level = 0.0
//! threshold = [-1.0, 0.0]
//!
//! [meshing]
//! weld_seams = false
//! parallel = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use stratum_core::IVec3;
use stratum_meshing::MergeStrategy;
use stratum_procedural::{NoiseThreshold, WorldSeed};

use crate::error::{StratumError, StratumResult};

/// Terrain and scheduling parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Noise seed. TOML integers are signed, so values above `i64::MAX`
    /// cannot be written in a config file.
    pub seed: u64,
    /// Voxels per chunk along each axis.
    pub chunk_size: [usize; 3],
    /// Chunks per group along each axis.
    pub group_size: [usize; 3],
    /// Groups in the initial work queue along each axis.
    pub group_counts: [usize; 3],
    /// Surface threshold of the level set.
    pub iso_level: f32,
    /// Noise band that becomes solid, `[lower, upper]`.
    pub threshold: NoiseThreshold,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            chunk_size: [32, 32, 32],
            group_size: [2, 2, 2],
            group_counts: [2, 2, 2],
            iso_level: 0.0,
            threshold: NoiseThreshold::default(),
        }
    }
}

impl GenerationConfig {
    /// Noise seed.
    #[must_use]
    pub const fn world_seed(&self) -> WorldSeed {
        WorldSeed::new(self.seed)
    }

    /// Chunk offset of the first queued group: `-floor(count / 2)` per
    /// axis, which centers the initial groups on the origin.
    #[must_use]
    pub fn base_offset(&self) -> IVec3 {
        let axis = |count: usize| -((count / 2) as i32);
        IVec3::new(
            axis(self.group_counts[0]),
            axis(self.group_counts[1]),
            axis(self.group_counts[2]),
        )
    }
}

/// Mesh assembly options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeshingConfig {
    /// Weld seam vertices and smooth normals when merging a group.
    pub weld_seams: bool,
    /// Generate and extract chunks on the rayon pool.
    pub parallel: bool,
}

impl Default for MeshingConfig {
    fn default() -> Self {
        Self {
            weld_seams: false,
            parallel: true,
        }
    }
}

impl MeshingConfig {
    /// Merge strategy selected by `weld_seams`.
    #[must_use]
    pub const fn merge_strategy(&self) -> MergeStrategy {
        if self.weld_seams {
            MergeStrategy::Welded
        } else {
            MergeStrategy::Flat
        }
    }
}

/// Complete configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Terrain and scheduling.
    pub generation: GenerationConfig,
    /// Mesh assembly.
    pub meshing: MeshingConfig,
}

impl WorldConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`StratumError::ConfigParse`] for malformed TOML or unknown keys,
    /// [`StratumError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> StratumResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the config as a TOML document.
    ///
    /// # Errors
    ///
    /// [`StratumError::ConfigSerialize`] if a value has no TOML form.
    pub fn to_toml_string(&self) -> StratumResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`StratumError::Io`] when the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> StratumResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded world config");
        Self::from_toml_str(&source)
    }

    /// Checks every value against its allowed range.
    ///
    /// # Errors
    ///
    /// [`StratumError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> StratumResult<()> {
        let generation = &self.generation;
        validate_chunk_layout(generation.chunk_size, generation.group_size)?;
        if generation.group_counts.contains(&0) {
            return Err(StratumError::InvalidConfig(format!(
                "group_counts must be at least 1 on every axis, got {:?}",
                generation.group_counts
            )));
        }
        if !generation.iso_level.is_finite() {
            return Err(StratumError::InvalidConfig(format!(
                "iso_level must be finite, got {}",
                generation.iso_level
            )));
        }
        if !generation.threshold.is_valid() {
            return Err(StratumError::InvalidConfig(format!(
                "threshold must be finite with lower < upper, got [{}, {}]",
                generation.threshold.lower, generation.threshold.upper
            )));
        }
        Ok(())
    }
}

/// Checks a chunk size and per-group chunk count.
///
/// A chunk needs two voxels per axis to hold one marching-cubes cell.
pub(crate) fn validate_chunk_layout(chunk_size: [usize; 3], num_chunks: [usize; 3]) -> StratumResult<()> {
    if chunk_size.iter().any(|&s| s < 2) {
        return Err(StratumError::InvalidConfig(format!(
            "chunk_size must be at least 2 on every axis, got {chunk_size:?}"
        )));
    }
    if num_chunks.contains(&0) {
        return Err(StratumError::InvalidConfig(format!(
            "chunk count must be at least 1 on every axis, got {num_chunks:?}"
        )));
    }
    let voxels = chunk_size
        .iter()
        .try_fold(1_usize, |acc, &s| i32::try_from(s).ok().and(acc.checked_mul(s)));
    if voxels.is_none() {
        return Err(StratumError::InvalidConfig(format!(
            "chunk_size {chunk_size:?} holds too many voxels"
        )));
    }
    if num_chunks.iter().try_fold(1_usize, |acc, &n| acc.checked_mul(n)).is_none() {
        return Err(StratumError::InvalidConfig(format!(
            "chunk count {num_chunks:?} overflows"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = WorldConfig::from_toml_str("").unwrap();
        assert_eq!(config, WorldConfig::default());
        assert_eq!(config.generation.chunk_size, [32, 32, 32]);
        assert_eq!(config.meshing.merge_strategy(), MergeStrategy::Flat);
    }

    #[test]
    fn test_partial_document() {
        let config = WorldConfig::from_toml_str(
            r#"
            [generation]
            seed = 7
            chunk_size = [16, 16, 16]
            threshold = [-0.8, 0.1]

            [meshing]
            weld_seams = true
            "#,
        )
        .unwrap();

        assert_eq!(config.generation.seed, 7);
        assert_eq!(config.generation.chunk_size, [16, 16, 16]);
        assert_eq!(config.generation.group_size, [2, 2, 2]);
        assert_eq!(config.generation.threshold, NoiseThreshold::new(-0.8, 0.1));
        assert_eq!(config.meshing.merge_strategy(), MergeStrategy::Welded);
        assert!(config.meshing.parallel);
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let err = WorldConfig::from_toml_str("[generation]\nsead = 1\n").unwrap_err();
        assert!(matches!(err, StratumError::ConfigParse(_)), "got {err}");
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            "[generation]\nchunk_size = [1, 32, 32]\n",
            "[generation]\ngroup_size = [2, 0, 2]\n",
            "[generation]\ngroup_counts = [0, 2, 2]\n",
            "[generation]\nthreshold = [0.0, -1.0]\n",
            "[generation]\niso_level = nan\n",
        ];
        for case in cases {
            let err = WorldConfig::from_toml_str(case).unwrap_err();
            assert!(matches!(err, StratumError::InvalidConfig(_)), "{case:?} gave {err}");
        }
    }

    #[test]
    fn test_oversized_layout() {
        let huge = usize::MAX / 2;
        assert!(matches!(
            validate_chunk_layout([huge, huge, 2], [1, 1, 1]),
            Err(StratumError::InvalidConfig(_))
        ));
        assert!(matches!(
            validate_chunk_layout([4, 4, 4], [huge, 3, 1]),
            Err(StratumError::InvalidConfig(_))
        ));
        assert!(validate_chunk_layout([4, 4, 4], [3, 3, 1]).is_ok());
    }

    #[test]
    fn test_base_offset() {
        let mut generation = GenerationConfig::default();
        assert_eq!(generation.base_offset(), IVec3::new(-1, -1, -1));

        generation.group_counts = [1, 3, 4];
        assert_eq!(generation.base_offset(), IVec3::new(0, -1, -2));
    }

    #[test]
    fn test_rendered_config_parses_back() {
        let mut config = WorldConfig::default();
        config.generation.threshold = NoiseThreshold::new(-0.5, 0.25);
        config.meshing.weld_seams = true;

        let rendered = config.to_toml_string().unwrap();
        assert_eq!(WorldConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = WorldConfig::load("/nonexistent/stratum.toml").unwrap_err();
        assert!(matches!(err, StratumError::Io(_)));
    }
}
