// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::Size;
use crate::style::Palette;

/// Engine settings. Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Distance between neighbouring sibling relations.
    pub sibling_gap: f64,
    /// Candidate bend points closer than this to an already placed one are rejected.
    pub sibling_min_distance: f64,
    /// How far a relation being drawn stops short of the pointer.
    pub pointer_offset: f64,
    pub default_node_size: Size,
    /// Radius of the ring new nodes are placed on by "add related nodes".
    pub related_ring_radius: f64,
    /// Maximum number of undo entries; `0` keeps everything.
    pub history_limit: usize,
    pub luminance_threshold: f64,
    pub palette: Palette,
    pub backend: BackendConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            sibling_gap: 120.0,
            sibling_min_distance: 10.0,
            pointer_offset: 10.0,
            default_node_size: Size::new(160.0, 60.0),
            related_ring_radius: 260.0,
            history_limit: 100,
            luminance_threshold: 128.0,
            palette: Palette::default(),
            backend: BackendConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api".to_owned(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl EditorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
