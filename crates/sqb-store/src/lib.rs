//! Checkpoint store: one JSON document holding the last processed block and
//! the three dense per-square arrays.
//!
//! The on-disk layout is fixed for downstream consumers: square id *n*
//! occupies index *n−1*, every array is exactly 10,000 entries, and the
//! per-square records are positional tuples. The tuples exist only here:
//! [`load`][CheckpointStore::load] converts them to named records on the
//! way in and [`save`][CheckpointStore::save] converts back on the way out.
//!
//! `save` writes the whole document to a temporary file in the same
//! directory and renames it over the previous checkpoint, so the batch's
//! derived state and the new block pointer become durable together or not
//! at all. A failed save leaves the old checkpoint intact and the run is
//! retried in full from it.

use serde::{Deserialize, Serialize};
use sqb_reconcile::SquareTable;
use sqb_schemas::{Personalization, PixelData, UnderlayPersonalization, NUM_SQUARES};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Durable progress marker: everything up to and including this block has
/// been reconciled and published.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    pub last_processed_block: u64,
}

/// Checkpoint read/write failure.
#[derive(Debug)]
pub enum CheckpointError {
    Io { path: PathBuf, source: io::Error },
    /// The file exists but does not match the expected layout. The operator
    /// restores a good checkpoint or accepts a genesis restart.
    Malformed { path: PathBuf, detail: String },
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointError::Io { path, source } => {
                write!(f, "checkpoint io failed: {}: {source}", path.display())
            }
            CheckpointError::Malformed { path, detail } => {
                write!(f, "checkpoint malformed: {}: {detail}", path.display())
            }
        }
    }
}

impl std::error::Error for CheckpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckpointError::Io { source, .. } => Some(source),
            CheckpointError::Malformed { .. } => None,
        }
    }
}

// Storage-boundary shapes. [version, title, href, updatedBlock] and
// [title, href, rgbDataHex].
type PersonalizationTuple = (u64, String, String, u64);
type UnderlayTuple = (String, String, String);

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckpointFile {
    last_processed_block: u64,
    square_personalizations: Vec<Option<PersonalizationTuple>>,
    underlay_personalizations: Vec<Option<UnderlayTuple>>,
    underlay_visibility: Vec<bool>,
}

/// Single-writer, single-process checkpoint file.
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the checkpoint, or the genesis default (contract deployment
    /// block, empty tables) when no file exists yet.
    pub fn load(&self, genesis_block: u64) -> Result<(Checkpoint, SquareTable), CheckpointError> {
        if !self.path.exists() {
            return Ok((
                Checkpoint { last_processed_block: genesis_block },
                SquareTable::new(),
            ));
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| CheckpointError::Io {
            path: self.path.clone(),
            source,
        })?;
        let file: CheckpointFile =
            serde_json::from_str(&raw).map_err(|e| self.malformed(e.to_string()))?;
        self.decode(file)
    }

    /// Atomically replace the checkpoint with the run's final state.
    pub fn save(&self, checkpoint: Checkpoint, table: &SquareTable) -> Result<(), CheckpointError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| CheckpointError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string(&encode(checkpoint, table))
            .map_err(|e| self.malformed(format!("serialize failed: {e}")))?;

        // Same-directory temp file so the rename is atomic on one filesystem.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| CheckpointError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| CheckpointError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    fn decode(&self, file: CheckpointFile) -> Result<(Checkpoint, SquareTable), CheckpointError> {
        for (name, len) in [
            ("squarePersonalizations", file.square_personalizations.len()),
            ("underlayPersonalizations", file.underlay_personalizations.len()),
            ("underlayVisibility", file.underlay_visibility.len()),
        ] {
            if len != NUM_SQUARES {
                return Err(self.malformed(format!(
                    "{name} has {len} entries, expected {NUM_SQUARES}"
                )));
            }
        }

        let personalizations = file
            .square_personalizations
            .into_iter()
            .map(|slot| {
                slot.map(|(version, title, href, updated_block)| Personalization {
                    version,
                    title,
                    href,
                    updated_block,
                })
            })
            .collect();

        let mut underlays = Vec::with_capacity(NUM_SQUARES);
        for (index, slot) in file.underlay_personalizations.into_iter().enumerate() {
            match slot {
                None => underlays.push(None),
                Some((title, href, rgb_hex)) => {
                    let pixel_data = PixelData::from_hex(&rgb_hex).map_err(|e| {
                        self.malformed(format!("underlay entry {}: {e}", index + 1))
                    })?;
                    underlays.push(Some(UnderlayPersonalization { title, href, pixel_data }));
                }
            }
        }

        let table = SquareTable::from_parts(personalizations, underlays, file.underlay_visibility)
            .map_err(|e| self.malformed(e.to_string()))?;
        Ok((
            Checkpoint { last_processed_block: file.last_processed_block },
            table,
        ))
    }

    fn malformed(&self, detail: String) -> CheckpointError {
        CheckpointError::Malformed { path: self.path.clone(), detail }
    }
}

fn encode(checkpoint: Checkpoint, table: &SquareTable) -> CheckpointFile {
    let (personalizations, underlays, visibility) = table.parts();
    CheckpointFile {
        last_processed_block: checkpoint.last_processed_block,
        square_personalizations: personalizations
            .iter()
            .map(|slot| {
                slot.as_ref().map(|p| {
                    (p.version, p.title.clone(), p.href.clone(), p.updated_block)
                })
            })
            .collect(),
        underlay_personalizations: underlays
            .iter()
            .map(|slot| {
                slot.as_ref()
                    .map(|u| (u.title.clone(), u.href.clone(), u.pixel_data.to_hex()))
            })
            .collect(),
        underlay_visibility: visibility.to_vec(),
    }
}
