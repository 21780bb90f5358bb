//! Named dashboard operations and the HTTP requests they map to

use crate::client::ClientError;
use crate::core::{RelationshipInput, TestRecordInput};
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Operation names accepted by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OperationKind {
    Health,
    InsertDocument,
    FetchDocument,
    RecentDocuments,
    CreateNode,
    FetchNode,
    CreateRelationship,
    Relationships,
}

impl OperationKind {
    pub const ALL: [OperationKind; 8] = [
        OperationKind::Health,
        OperationKind::InsertDocument,
        OperationKind::FetchDocument,
        OperationKind::RecentDocuments,
        OperationKind::CreateNode,
        OperationKind::FetchNode,
        OperationKind::CreateRelationship,
        OperationKind::Relationships,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Health => "health",
            OperationKind::InsertDocument => "insert-document",
            OperationKind::FetchDocument => "fetch-document",
            OperationKind::RecentDocuments => "recent-documents",
            OperationKind::CreateNode => "create-node",
            OperationKind::FetchNode => "fetch-node",
            OperationKind::CreateRelationship => "create-relationship",
            OperationKind::Relationships => "relationships",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ClientError::UnknownOperation(s.to_string()))
    }
}

/// Loose arguments collected from a command line or form
#[derive(Debug, Clone, Default)]
pub struct OperationArgs {
    pub id: Option<String>,
    pub name: Option<String>,
    pub value: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub relationship: Option<String>,
    pub limit: Option<usize>,
}

/// A fully specified dashboard operation
#[derive(Debug, Clone)]
pub enum Operation {
    Health,
    InsertDocument(TestRecordInput),
    FetchDocument { id: Option<String> },
    RecentDocuments { limit: Option<usize> },
    CreateNode(TestRecordInput),
    FetchNode { id: Option<String> },
    CreateRelationship(RelationshipInput),
    Relationships { limit: Option<usize> },
}

impl Operation {
    /// Assemble an operation from its name and loose arguments
    pub fn from_parts(kind: OperationKind, args: OperationArgs) -> Result<Self, ClientError> {
        let missing = |argument: &str| ClientError::MissingArgument {
            operation: kind.to_string(),
            argument: argument.to_string(),
        };

        let record_input = |args: OperationArgs| -> Result<TestRecordInput, ClientError> {
            let value = args.value.ok_or_else(|| missing("value"))?;
            let mut input = TestRecordInput::new(value);
            input.name = args.name;
            Ok(input)
        };

        Ok(match kind {
            OperationKind::Health => Operation::Health,
            OperationKind::InsertDocument => Operation::InsertDocument(record_input(args)?),
            OperationKind::FetchDocument => Operation::FetchDocument { id: args.id },
            OperationKind::RecentDocuments => Operation::RecentDocuments { limit: args.limit },
            OperationKind::CreateNode => Operation::CreateNode(record_input(args)?),
            OperationKind::FetchNode => Operation::FetchNode { id: args.id },
            OperationKind::CreateRelationship => {
                let from = args.from.ok_or_else(|| missing("from"))?;
                let to = args.to.ok_or_else(|| missing("to"))?;
                let mut input = RelationshipInput::new(from, to);
                if let Some(relationship) = args.relationship {
                    input = input.with_relationship(relationship);
                }
                Operation::CreateRelationship(input)
            }
            OperationKind::Relationships => Operation::Relationships { limit: args.limit },
        })
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Health => OperationKind::Health,
            Operation::InsertDocument(_) => OperationKind::InsertDocument,
            Operation::FetchDocument { .. } => OperationKind::FetchDocument,
            Operation::RecentDocuments { .. } => OperationKind::RecentDocuments,
            Operation::CreateNode(_) => OperationKind::CreateNode,
            Operation::FetchNode { .. } => OperationKind::FetchNode,
            Operation::CreateRelationship(_) => OperationKind::CreateRelationship,
            Operation::Relationships { .. } => OperationKind::Relationships,
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Operation::InsertDocument(_)
            | Operation::CreateNode(_)
            | Operation::CreateRelationship(_) => Method::POST,
            _ => Method::GET,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Operation::Health => "/health",
            Operation::InsertDocument(_) | Operation::FetchDocument { .. } => "/test/mongo",
            Operation::RecentDocuments { .. } => "/test/mongo/recent",
            Operation::CreateNode(_) | Operation::FetchNode { .. } => "/test/neo4j",
            Operation::CreateRelationship(_) => "/test/neo4j/relationship",
            Operation::Relationships { .. } => "/test/neo4j/relationships",
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Operation::FetchDocument { id: Some(id) } | Operation::FetchNode { id: Some(id) } => {
                vec![("id", id.clone())]
            }
            Operation::RecentDocuments { limit: Some(limit) }
            | Operation::Relationships { limit: Some(limit) } => {
                vec![("limit", limit.to_string())]
            }
            _ => Vec::new(),
        }
    }

    pub fn body(&self) -> Result<Option<Value>, ClientError> {
        let body = match self {
            Operation::InsertDocument(input) | Operation::CreateNode(input) => {
                serde_json::to_value(input)
            }
            Operation::CreateRelationship(input) => serde_json::to_value(input),
            _ => return Ok(None),
        };
        body.map(Some)
            .map_err(|e| ClientError::Encode(e.to_string()))
    }
}
