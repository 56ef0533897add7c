//! Hierarchy Validator
//!
//! Read-only walk over a stored subtree that checks two invariants:
//!
//! - **Uniqueness**: no id is reached twice (shared children, cycles)
//! - **Type consistency**: every child has type `parent.node_type.next()`
//!
//! The walk state lives entirely inside one `validate` call. Nothing carries over
//! between calls, so validating the same network twice gives the same answer and
//! concurrent validations cannot see each other's ids.

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::db::NodeStore;
use crate::models::{NodeRecord, NodeType};
use crate::services::error::NodeServiceError;

/// A single invariant violation found during validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Violation {
    /// `id` was reached more than once from the root
    #[serde(rename_all = "camelCase")]
    DuplicateId { id: String },

    /// A child's type is not the successor of its parent's type
    #[serde(rename_all = "camelCase")]
    TypeMismatch {
        parent_id: String,
        child_id: String,
        expected: NodeType,
        actual: NodeType,
    },
}

/// Outcome of validating one subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub root_id: String,
    /// Distinct nodes reached, root included
    pub visited: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            visited: 0,
            violations: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn has_duplicate_ids(&self) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v, Violation::DuplicateId { .. }))
    }

    pub fn has_type_mismatches(&self) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v, Violation::TypeMismatch { .. }))
    }
}

/// Checks id uniqueness and type ordering of stored subtrees
#[derive(Clone)]
pub struct HierarchyValidator {
    store: Arc<dyn NodeStore>,
}

impl HierarchyValidator {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }

    /// Validate the subtree rooted at `id`.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if `id` is not stored; store failures are propagated.
    pub async fn validate(&self, id: &str) -> Result<ValidationReport, NodeServiceError> {
        let root = self
            .store
            .get_node(id)
            .await?
            .ok_or_else(|| NodeServiceError::node_not_found(id))?;

        let mut report = ValidationReport::new(id);
        let mut seen = HashSet::new();
        seen.insert(root.id.clone());
        report.visited = 1;

        self.walk(root, &mut seen, &mut report).await?;

        if report.is_valid() {
            tracing::debug!(node_id = %id, visited = report.visited, "Hierarchy is valid");
        } else {
            tracing::info!(
                node_id = %id,
                violations = report.violations.len(),
                "Validation failed"
            );
        }

        Ok(report)
    }

    fn walk<'a>(
        &'a self,
        parent: NodeRecord,
        seen: &'a mut HashSet<String>,
        report: &'a mut ValidationReport,
    ) -> BoxFuture<'a, Result<(), NodeServiceError>> {
        async move {
            let expected = parent.node_type.next();

            for child_id in &parent.child_ids {
                let Some(child) = self.store.get_node(child_id).await? else {
                    tracing::warn!(
                        parent_id = %parent.id,
                        child_id = %child_id,
                        "Skipping dangling child reference"
                    );
                    continue;
                };

                if child.node_type != expected {
                    tracing::info!(
                        child_id = %child.id,
                        expected = %expected,
                        actual = %child.node_type,
                        "Hierarchy in child node is not valid"
                    );
                    report.violations.push(Violation::TypeMismatch {
                        parent_id: parent.id.clone(),
                        child_id: child.id.clone(),
                        expected,
                        actual: child.node_type,
                    });
                }

                if !seen.insert(child.id.clone()) {
                    tracing::info!(node_id = %child.id, "Id is not unique");
                    report
                        .violations
                        .push(Violation::DuplicateId { id: child.id });
                    continue;
                }

                report.visited += 1;
                self.walk(child, &mut *seen, &mut *report).await?;
            }

            Ok(())
        }
        .boxed()
    }
}
