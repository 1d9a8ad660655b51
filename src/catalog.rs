use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

static SAMPLE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/sample");

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Files carrying this prefix are deepfakes; everything else is real.
pub const DEEPFAKE_PREFIX: &str = "1_";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Label {
    Real,
    Deepfake,
}

impl Label {
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.starts_with(DEEPFAKE_PREFIX) {
            Label::Deepfake
        } else {
            Label::Real
        }
    }

    /// Parse a manifest label: numeric class ids (`0`/`1`) or names.
    fn parse(file: &str, value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "0" | "real" => Ok(Label::Real),
            "1" | "deepfake" => Ok(Label::Deepfake),
            _ => Err(Error::UnknownLabel {
                file: file.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// One image presented to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: usize,
    pub url: String,
    pub label: Label,
}

impl Item {
    /// Last path segment of the locator, for display.
    pub fn file_name(&self) -> &str {
        self.url
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.url.as_str())
    }
}

#[derive(Deserialize)]
struct ManifestEntry {
    url: String,
    label: Label,
}

#[derive(Deserialize)]
struct CsvRow {
    file_name: String,
    label: String,
}

/// The full, already labeled set of images a session draws from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Label)>,
        S: Into<String>,
    {
        let items = entries
            .into_iter()
            .enumerate()
            .map(|(id, (url, label))| Item {
                id,
                url: url.into(),
                label,
            })
            .collect();

        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// (real, deepfake) counts
    pub fn label_counts(&self) -> (usize, usize) {
        let counts = self.items.iter().map(|i| i.label).counts();
        (
            counts.get(&Label::Real).copied().unwrap_or(0),
            counts.get(&Label::Deepfake).copied().unwrap_or(0),
        )
    }

    /// The manifest bundled into the binary.
    pub fn sample() -> Result<Self> {
        let manifest = SAMPLE_DIR
            .get_file("manifest.json")
            .and_then(|f| f.contents_utf8())
            .unwrap_or("[]");

        Self::from_json_str(manifest)
    }

    /// Load from a directory of images, a `.csv` manifest or a `.json` manifest.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::EmptyPath);
        }

        let catalog = if path.is_dir() {
            Self::from_dir(path)?
        } else if has_extension(path, &["csv"]) {
            Self::from_csv(path)?
        } else {
            let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            Self::from_json_str(&raw)?
        };

        let (real, deepfake) = catalog.label_counts();
        tracing::info!(path = %path.display(), real, deepfake, "catalog loaded");

        Ok(catalog)
    }

    /// Every image file directly inside `dir`, labeled by file name.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::io(dir, e))?.path();
            if path.is_file() && has_extension(&path, IMAGE_EXTENSIONS) {
                paths.push(path);
            }
        }
        paths.sort();

        Ok(Self::new(paths.into_iter().map(|path| {
            let label = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(Label::from_file_name)
                .unwrap_or(Label::Real);
            (path.display().to_string(), label)
        })))
    }

    /// A `file_name,label` manifest. Relative file names resolve against the
    /// manifest's own directory.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let csv_error = |source| Error::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let mut entries = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(csv_error)?;
            let label = Label::parse(&row.file_name, &row.label)?;
            entries.push((resolve_locator(&base, &row.file_name), label));
        }

        Ok(Self::new(entries))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let entries: Vec<ManifestEntry> = serde_json::from_str(raw)?;
        Ok(Self::new(entries.into_iter().map(|e| (e.url, e.label))))
    }

    /// Draw a uniformly random ordered subset of at most `limit` items.
    /// Ids are reassigned to queue positions.
    pub fn draw<R: Rng + ?Sized>(&self, limit: usize, rng: &mut R) -> Vec<Item> {
        let mut pool = self.items.clone();
        let (picked, _) = pool.partial_shuffle(rng, limit);

        picked
            .iter()
            .cloned()
            .enumerate()
            .map(|(id, item)| Item { id, ..item })
            .collect()
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

fn resolve_locator(base: &Path, file_name: &str) -> String {
    let candidate = PathBuf::from(file_name);
    if file_name.contains("://") || candidate.is_absolute() {
        file_name.to_string()
    } else {
        base.join(candidate).display().to_string()
    }
}
