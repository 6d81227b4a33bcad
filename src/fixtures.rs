use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geometry::BoundingBox;
use crate::session::Designer;

// ── Records ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub located_by: Option<String>,
}

impl Fixture {
    pub fn is_located(&self) -> bool {
        self.bounding_box.is_some()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct FixtureFile {
    fixtures: Vec<Fixture>,
}

/// `photo.jpg` -> `photo.jpg.fixtures`
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension(format!(
        "{}.fixtures",
        image_path
            .extension()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("")
    ))
}

// ── Book ────────────────────────────────────────────────────────────────────

/// Fixtures catalogued on a single slide, persisted beside the slide image.
#[derive(Clone, Debug)]
pub struct FixtureBook {
    image_path: PathBuf,
    fixtures: Vec<Fixture>,
}

impl FixtureBook {
    pub fn empty(image_path: PathBuf) -> Self {
        Self {
            image_path,
            fixtures: Vec::new(),
        }
    }

    pub fn load(image_path: &Path) -> Result<Self> {
        let path = sidecar_path(image_path);
        if !path.exists() {
            log::debug!("No fixture file at {}", path.display());
            return Ok(Self::empty(image_path.to_path_buf()));
        }
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: FixtureFile = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        log::info!(
            "Loaded {} fixtures from {}",
            file.fixtures.len(),
            path.display()
        );
        Ok(Self {
            image_path: image_path.to_path_buf(),
            fixtures: file.fixtures,
        })
    }

    pub fn save(&self) -> Result<()> {
        let path = sidecar_path(&self.image_path);
        let file = FixtureFile {
            fixtures: self.fixtures.clone(),
        };
        let data = serde_json::to_string_pretty(&file)?;
        std::fs::write(&path, data)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("Saved {} fixtures to {}", self.fixtures.len(), path.display());
        Ok(())
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn get(&self, index: usize) -> Option<&Fixture> {
        self.fixtures.get(index)
    }

    pub fn add(&mut self, name: &str, space: Option<&str>) -> Result<usize> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Fixture name must not be empty");
        }
        let space = space.map(str::trim).filter(|s| !s.is_empty());
        self.fixtures.push(Fixture {
            name: name.to_string(),
            space: space.map(str::to_string),
            bounding_box: None,
            located_by: None,
        });
        Ok(self.fixtures.len() - 1)
    }

    pub fn remove(&mut self, index: usize) -> Result<Fixture> {
        if index >= self.fixtures.len() {
            bail!("No fixture at index {}", index);
        }
        Ok(self.fixtures.remove(index))
    }

    pub fn set_bounding_box(
        &mut self,
        index: usize,
        bbox: BoundingBox,
        designer: &Designer,
    ) -> Result<()> {
        let fixture = self
            .fixtures
            .get_mut(index)
            .with_context(|| format!("No fixture at index {}", index))?;
        fixture.bounding_box = Some(bbox);
        fixture.located_by = Some(designer.name().to_string());
        Ok(())
    }

    pub fn clear_bounding_box(&mut self, index: usize) -> Result<()> {
        let fixture = self
            .fixtures
            .get_mut(index)
            .with_context(|| format!("No fixture at index {}", index))?;
        fixture.bounding_box = None;
        fixture.located_by = None;
        Ok(())
    }

    pub fn located(&self) -> impl Iterator<Item = (&Fixture, BoundingBox)> {
        self.fixtures
            .iter()
            .filter_map(|f| f.bounding_box.map(|bbox| (f, bbox)))
    }
}
