// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{Backend, BackendError, NodeRecord};
use crate::config::BackendConfig;
use crate::model::{BackendRelation, DiagramId, RecordId};
use crate::store::SerializedDiagram;

/// JSON-over-HTTP backend.
///
/// Routes, relative to `base_url`:
/// `GET nodes/{uuid}/relations`, `GET nodes/{uuid}`, `PUT diagrams/{id}`.
/// Ids are percent-encoded as single path segments.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let invalid = |reason: String| BackendError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason,
        };
        let base_url = Url::parse(&config.base_url).map_err(|err| invalid(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("not a hierarchical url".to_owned()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!("galene/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BackendError::Client)?;
        Ok(Self {
            client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.to_string()
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, BackendError> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| BackendError::Request {
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                url,
                status: status.as_u16(),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|source| BackendError::Decode { url, source })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn relations_of(&self, uuid: &RecordId) -> Result<Vec<BackendRelation>, BackendError> {
        self.get_json(self.url(&["nodes", uuid.as_str(), "relations"]))
            .await
    }

    async fn node(&self, uuid: &RecordId) -> Result<NodeRecord, BackendError> {
        let url = self.url(&["nodes", uuid.as_str()]);
        match self.get_json(url).await {
            Err(BackendError::Status { status: 404, .. }) => {
                Err(BackendError::NotFound(uuid.clone()))
            }
            other => other,
        }
    }

    async fn put_diagram(
        &self,
        id: &DiagramId,
        diagram: &SerializedDiagram,
    ) -> Result<(), BackendError> {
        let url = self.url(&["diagrams", id.as_str()]);
        debug!(%url, nodes = diagram.nodes.len(), relations = diagram.relations.len(), "PUT");
        let response = self
            .client
            .put(&url)
            .json(diagram)
            .send()
            .await
            .map_err(|source| BackendError::Request {
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                url,
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
