//! JSON export of the symbol annotations.
//!
//! Types are exported by their canonical name so that the output does not
//! depend on the order in which types were registered.

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::const_value::{ConstPayload, ConstValue};
use crate::legacy_bridge::SymbolAnnotations;
use crate::type_model::TypeId;
use crate::type_registry::TypeRegistry;

/// Errors that can occur during annotation export.
#[derive(Debug, Error)]
pub enum AnnotationExportError {
    #[error("Serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Type {0} is not in the registry")]
    UnknownType(TypeId),
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationExportOptions {
    /// Pretty-print the JSON output
    pub pretty_print: bool,
}

#[derive(Debug, Default)]
pub struct AnnotationExporter {
    options: AnnotationExportOptions,
}

impl AnnotationExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: AnnotationExportOptions) -> Self {
        Self { options }
    }

    /// Export the annotations to a JSON string.
    pub fn export(
        &self,
        registry: &TypeRegistry,
        annotations: &[SymbolAnnotations],
    ) -> Result<String, AnnotationExportError> {
        let document = ExportedDocument::new(registry, annotations)?;
        if self.options.pretty_print {
            serde_json::to_string_pretty(&document).map_err(AnnotationExportError::from)
        } else {
            serde_json::to_string(&document).map_err(AnnotationExportError::from)
        }
    }

    /// Export the annotations to a writer.
    pub fn export_to_writer<W: Write>(
        &self,
        registry: &TypeRegistry,
        annotations: &[SymbolAnnotations],
        writer: W,
    ) -> Result<(), AnnotationExportError> {
        let document = ExportedDocument::new(registry, annotations)?;
        if self.options.pretty_print {
            serde_json::to_writer_pretty(writer, &document).map_err(AnnotationExportError::from)
        } else {
            serde_json::to_writer(writer, &document).map_err(AnnotationExportError::from)
        }
    }
}

#[derive(Debug, Serialize)]
struct ExportedDocument<'r> {
    symbols: Vec<ExportedSymbol<'r>>,
}

impl<'r> ExportedDocument<'r> {
    fn new(
        registry: &'r TypeRegistry,
        annotations: &[SymbolAnnotations],
    ) -> Result<Self, AnnotationExportError> {
        let symbols = annotations
            .iter()
            .map(|annotation| ExportedSymbol::new(registry, annotation))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { symbols })
    }
}

#[derive(Debug, Serialize)]
struct ExportedSymbol<'r> {
    #[serde(rename = "type")]
    datatype: Option<&'r str>,
    candidates: Vec<&'r str>,
    #[serde(rename = "const")]
    const_value: ExportedConst<'r>,
}

impl<'r> ExportedSymbol<'r> {
    fn new(
        registry: &'r TypeRegistry,
        annotation: &SymbolAnnotations,
    ) -> Result<Self, AnnotationExportError> {
        let name_of = |id: TypeId| {
            registry
                .name_of(id)
                .ok_or(AnnotationExportError::UnknownType(id))
        };

        Ok(Self {
            datatype: annotation.datatype_modern.map(name_of).transpose()?,
            candidates: annotation
                .candidate_types
                .iter()
                .map(|id| name_of(*id))
                .collect::<Result<Vec<_>, _>>()?,
            const_value: match &annotation.const_value_modern {
                ConstValue::Unknown => ExportedConst::Unknown,
                ConstValue::Overflow => ExportedConst::Overflow,
                ConstValue::Value { payload, type_id } => ExportedConst::Value {
                    value: ExportedPayload::from(payload),
                    type_name: name_of(*type_id)?,
                },
            },
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum ExportedConst<'r> {
    Unknown,
    Value {
        value: ExportedPayload,
        #[serde(rename = "type")]
        type_name: &'r str,
    },
    Overflow,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ExportedPayload {
    Int(i64),
    UInt(u64),
    Real(f64),
    Bool(bool),
    Text(String),
}

impl From<&ConstPayload> for ExportedPayload {
    fn from(payload: &ConstPayload) -> Self {
        match payload {
            ConstPayload::Int(value) => ExportedPayload::Int(*value),
            ConstPayload::UInt(value) => ExportedPayload::UInt(*value),
            ConstPayload::Real(value) => ExportedPayload::Real(*value),
            ConstPayload::Bool(value) => ExportedPayload::Bool(*value),
            ConstPayload::String(value) => ExportedPayload::Text(value.clone()),
            ConstPayload::Duration(_) => ExportedPayload::Text(payload.to_string()),
        }
    }
}
