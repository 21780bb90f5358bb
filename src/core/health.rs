//! Health report shared by the `/health` route and the dashboard

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reachability of one datastore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Up,
    Down,
}

impl StoreStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, StoreStatus::Up)
    }
}

impl From<bool> for StoreStatus {
    fn from(reachable: bool) -> Self {
        if reachable {
            StoreStatus::Up
        } else {
            StoreStatus::Down
        }
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreStatus::Up => write!(f, "up"),
            StoreStatus::Down => write!(f, "down"),
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub document_store: StoreStatus,
    pub graph_store: StoreStatus,
}

impl HealthReport {
    pub fn new(document_reachable: bool, graph_reachable: bool) -> Self {
        Self {
            document_store: document_reachable.into(),
            graph_store: graph_reachable.into(),
        }
    }

    pub fn all_up(&self) -> bool {
        self.document_store.is_up() && self.graph_store.is_up()
    }
}
