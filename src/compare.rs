//! Shipped byte-level comparator.
//!
//! The real structural comparer is an external collaborator behind the
//! [`PayloadComparator`](crate::traits::PayloadComparator) trait; this default
//! implementation only checks byte equality and therefore cannot honor path
//! exceptions, which it reports via a warning.

use crate::error::{FlowRegressError, Result};
use crate::traits::PayloadComparator;
use crate::types::CompareVerdict;
use std::path::Path;
use tracing::warn;

/// Exact-bytes comparator used when no structural comparer is plugged in.
#[derive(Debug, Clone, Default)]
pub struct ByteComparator;

impl ByteComparator {
    pub fn new() -> Self {
        Self
    }
}

impl PayloadComparator for ByteComparator {
    fn compare(
        &self,
        source: &Path,
        target: &Path,
        xpath_exceptions: &[String],
    ) -> Result<CompareVerdict> {
        if !xpath_exceptions.is_empty() {
            warn!(
                exceptions = xpath_exceptions.len(),
                "byte comparator cannot honor path exceptions; plug in a structural comparer"
            );
        }

        let source_bytes = std::fs::read(source).map_err(|e| {
            FlowRegressError::comparison_failed(format!(
                "cannot read source payload {}: {}",
                source.display(),
                e
            ))
        })?;
        let target_bytes = std::fs::read(target).map_err(|e| {
            FlowRegressError::comparison_failed(format!(
                "cannot read target payload {}: {}",
                target.display(),
                e
            ))
        })?;

        if source_bytes == target_bytes {
            return Ok(CompareVerdict::Identical);
        }

        let difference = if source_bytes.len() != target_bytes.len() {
            format!(
                "payload sizes differ: source {} byte(s), target {} byte(s)",
                source_bytes.len(),
                target_bytes.len()
            )
        } else {
            let offset = source_bytes
                .iter()
                .zip(target_bytes.iter())
                .position(|(a, b)| a != b)
                .unwrap_or(0);
            format!("payloads differ from byte offset {}", offset)
        };

        Ok(CompareVerdict::Different {
            differences: vec![difference],
        })
    }
}
