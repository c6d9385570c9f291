// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::SerializedDiagram;
use crate::backend::Backend;
use crate::model::DiagramId;

/// Sends diagrams to the backend without blocking the caller.
///
/// Every save is an independent task, so saves issued in quick succession may land in any
/// order; the backend keeps whichever arrives last.
#[derive(Clone)]
pub struct DiagramSaver {
    backend: Arc<dyn Backend>,
    diagram_id: DiagramId,
}

impl DiagramSaver {
    pub fn new(backend: Arc<dyn Backend>, diagram_id: DiagramId) -> Self {
        Self {
            backend,
            diagram_id,
        }
    }

    pub fn diagram_id(&self) -> &DiagramId {
        &self.diagram_id
    }

    /// Spawns the save on the current tokio runtime. Failures are logged, never returned.
    pub fn save(&self, diagram: SerializedDiagram) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        let diagram_id = self.diagram_id.clone();
        tokio::spawn(async move {
            match backend.put_diagram(&diagram_id, &diagram).await {
                Ok(()) => debug!(diagram = %diagram_id, "diagram saved"),
                Err(err) => warn!(diagram = %diagram_id, error = %err, "failed to save diagram"),
            }
        })
    }
}

impl std::fmt::Debug for DiagramSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramSaver")
            .field("diagram_id", &self.diagram_id)
            .finish_non_exhaustive()
    }
}
