//! Translates the annotations of the legacy semantic pass into registry
//! types.
//!
//! Translation is a pure function of the legacy symbol: running it twice
//! on the same symbol produces equal annotations.
use log::{debug, trace};
use plctype_dsl::diagnostic::{Category, Diagnostic, Severity};
use plctype_problems::Problem;

use crate::const_value::{ConstPayload, ConstValue};
use crate::internal_error;
use crate::legacy::{LegacyConstValue, LegacyDatatype, LegacyNode, LegacySymbol};
use crate::options::AnalyzerOptions;
use crate::reporter::{ErrorReporter, InternalCompilerError};
use crate::type_inferrer::TypeInferrer;
use crate::type_model::{Type, TypeId};
use crate::type_registry::{TypeRef, TypeRegistry};

/// The typing core's annotations for one symbol.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymbolAnnotations {
    /// The resolved type. Absent only when the type of a literal could not
    /// be inferred, in which case a diagnostic was reported.
    pub datatype_modern: Option<TypeId>,
    /// Candidates that remain plausible for the resolved type. Contains
    /// `datatype_modern` whenever it is present.
    pub candidate_types: Vec<TypeId>,
    pub const_value_modern: ConstValue,
}

pub struct LegacyBridge<'r> {
    registry: &'r TypeRegistry,
    options: AnalyzerOptions,
}

impl<'r> LegacyBridge<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_options(registry, AnalyzerOptions::default())
    }

    pub fn with_options(registry: &'r TypeRegistry, options: AnalyzerOptions) -> Self {
        Self { registry, options }
    }

    pub fn populate(
        &self,
        symbol: &LegacySymbol,
        reporter: &mut ErrorReporter,
    ) -> Result<SymbolAnnotations, InternalCompilerError> {
        let resolved = match &symbol.datatype {
            Some(datatype) => match self.map_datatype(datatype) {
                Some(ty) => Some(ty),
                None => internal_error!(
                    reporter,
                    "{} (datatype={})",
                    Problem::LegacyTypeNotMapped.message(),
                    datatype
                ),
            },
            None => match self.infer_literal_type(&symbol.node) {
                Ok(ty) => Some(ty),
                Err(diagnostic) if diagnostic.category == Category::Internal => {
                    internal_error!(reporter, "{}", diagnostic.description())
                }
                Err(diagnostic) => {
                    reporter.report(diagnostic.with_location(symbol.location.clone()));
                    None
                }
            },
        };

        let mut candidates = Vec::with_capacity(symbol.candidate_datatypes.len());
        for candidate in &symbol.candidate_datatypes {
            match self.map_datatype(candidate) {
                Some(ty) => candidates.push(ty),
                None => internal_error!(
                    reporter,
                    "{} (candidate={})",
                    Problem::LegacyTypeNotMapped.message(),
                    candidate
                ),
            }
        }

        let candidate_types = match resolved {
            Some(resolved) => filter_candidates(resolved, &candidates)
                .iter()
                .map(|ty| ty.id())
                .collect(),
            None => vec![],
        };

        let annotations = SymbolAnnotations {
            datatype_modern: resolved.map(|ty| ty.id()),
            candidate_types,
            const_value_modern: translate_const_value(&symbol.const_value, resolved),
        };
        trace!("Populated {:?} from {:?}", annotations, symbol);
        Ok(annotations)
    }

    /// Returns the type of the literal that the node holds.
    ///
    /// A node that is not a literal has no type to infer; that is an
    /// internal error since the legacy pass types every other node.
    pub fn infer_literal_type(&self, node: &LegacyNode) -> Result<TypeRef<'r>, Diagnostic> {
        match node {
            LegacyNode::Literal(text) => {
                TypeInferrer::with_options(self.registry, self.options).infer_text(text)
            }
            LegacyNode::Identifier(_) | LegacyNode::Expression => Err(Diagnostic::problem(
                Problem::LegacyDatatypeMissing,
                Category::Internal,
            )
            .with_severity(Severity::Fatal)
            .with_context("node", &format!("{:?}", node))),
        }
    }

    fn map_datatype(&self, datatype: &LegacyDatatype) -> Option<TypeRef<'r>> {
        let found = match datatype {
            LegacyDatatype::Elementary(legacy) => legacy
                .canonical_name()
                .and_then(|name| self.registry.find_type(name)),
            LegacyDatatype::Derived(name) => self.registry.find_type(name.name.original()),
        };
        if found.is_none() {
            debug!("Legacy datatype {} has no corresponding type", datatype);
        }
        found
    }
}

/// Populates the typing core's annotations for the symbol from the legacy
/// annotations.
pub fn populate_modern_annotations(
    symbol: &LegacySymbol,
    registry: &TypeRegistry,
    reporter: &mut ErrorReporter,
) -> Result<SymbolAnnotations, InternalCompilerError> {
    LegacyBridge::new(registry).populate(symbol, reporter)
}

/// Returns the type of a literal node that the legacy pass did not type.
pub fn infer_legacy_literal_type<'r>(
    node: &LegacyNode,
    registry: &'r TypeRegistry,
) -> Result<TypeRef<'r>, Diagnostic> {
    LegacyBridge::new(registry).infer_literal_type(node)
}

/// Keeps the candidates on the same widening chain as the resolved type.
///
/// A candidate is kept when it is the resolved type or is assignable to or
/// from it. Order is preserved and duplicates are dropped. The resolved
/// type is appended when it is not already a candidate.
pub fn filter_candidates<'r>(resolved: TypeRef<'r>, candidates: &[TypeRef<'r>]) -> Vec<TypeRef<'r>> {
    let mut kept: Vec<TypeRef<'r>> = Vec::with_capacity(candidates.len() + 1);
    for candidate in candidates {
        let related = *candidate == resolved
            || candidate.is_assignable_to(&resolved)
            || resolved.is_assignable_to(candidate);
        if related && !kept.contains(candidate) {
            kept.push(*candidate);
        }
    }
    if !kept.contains(&resolved) {
        kept.push(resolved);
    }
    kept
}

/// Translates the legacy constant without recomputing it.
///
/// Any overflowed slot makes the constant an overflow. Otherwise the slot
/// that matches the kind of the resolved type is used, falling back to the
/// first valid slot.
fn translate_const_value(value: &LegacyConstValue, resolved: Option<TypeRef<'_>>) -> ConstValue {
    if value.is_overflow() {
        return ConstValue::Overflow;
    }
    let Some(ty) = resolved else {
        return ConstValue::Unknown;
    };

    let int64 = value.int64.valid().map(ConstPayload::Int);
    let uint64 = value.uint64.valid().map(ConstPayload::UInt);
    let real64 = value.real64.valid().map(ConstPayload::Real);
    let boolean = value.bool.valid().map(ConstPayload::Bool);

    let preferred = match ty.ty() {
        Type::Integer { .. } if ty.ty().is_signed_integer() => int64.clone(),
        Type::Integer { .. } | Type::BitString { .. } => uint64.clone(),
        Type::Real { .. } => real64.clone(),
        Type::Bool => boolean.clone(),
        _ => None,
    };

    preferred
        .or(int64)
        .or(uint64)
        .or(real64)
        .or(boolean)
        .map_or(ConstValue::Unknown, |payload| {
            ConstValue::value(payload, ty.id())
        })
}
