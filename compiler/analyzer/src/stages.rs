//! The typing core as individual stages (to enable testing).

use std::collections::{HashMap, HashSet};

use log::debug;
use petgraph::{
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
};
use plctype_dsl::{
    common::{DataTypeDeclarationKind, TypeName},
    core::Id,
    diagnostic::{Category, Diagnostic},
};
use plctype_problems::Problem;

use crate::internal_error;
use crate::legacy::LegacySymbol;
use crate::legacy_bridge::{LegacyBridge, SymbolAnnotations};
use crate::options::AnalyzerOptions;
use crate::reporter::{ErrorReporter, InternalCompilerError};
use crate::type_model::{StructField, Type, TypeId};
use crate::type_registry::TypeRegistry;

/// The result of analyzing one compilation unit.
#[derive(Debug)]
pub struct Analysis {
    pub registry: TypeRegistry,
    /// Annotations in the same order as the analyzed symbols.
    pub annotations: Vec<SymbolAnnotations>,
}

/// Analyze registers the declared types and then annotates every symbol.
///
/// Ordinary problems are reported to the reporter and analysis continues.
/// Returns `Err(InternalCompilerError)` if a compiler invariant does not
/// hold.
pub fn analyze(
    declarations: &[DataTypeDeclarationKind],
    symbols: &[LegacySymbol],
    options: AnalyzerOptions,
    reporter: &mut ErrorReporter,
) -> Result<Analysis, InternalCompilerError> {
    let mut registry = TypeRegistry::new();
    register_type_declarations(declarations, &mut registry, reporter)?;

    let annotations = annotate_symbols_with_options(symbols, &registry, options, reporter)?;

    debug!(
        "Analyzed {} declarations and {} symbols",
        declarations.len(),
        annotations.len()
    );
    Ok(Analysis {
        registry,
        annotations,
    })
}

/// Registers the user-defined types.
///
/// Declarations are registered after the declarations they refer to. A
/// declaration that refers to an undeclared type is reported and skipped.
/// Nothing is registered if an internal error occurs.
pub fn register_type_declarations(
    declarations: &[DataTypeDeclarationKind],
    registry: &mut TypeRegistry,
    reporter: &mut ErrorReporter,
) -> Result<(), InternalCompilerError> {
    let mut transaction = registry.transaction();

    for index in declaration_order(declarations) {
        let declaration = &declarations[index];
        let name = &declaration.type_name().name;

        let declared = match declared_type(declaration, &transaction) {
            Ok(declared) => declared,
            Err(diagnostic) => {
                reporter.report(diagnostic);
                continue;
            }
        };

        let registered = match declared {
            Declared::Alias(target) => transaction
                .register_alias(name, target)
                .map(|_| target),
            Declared::New(ty) => transaction.register_type(name, ty),
        };

        match registered {
            Ok(id) => {
                let resolved = transaction.find_type(name.original()).map(|ty| ty.id());
                if resolved != Some(id) {
                    internal_error!(
                        reporter,
                        "type {} resolves to {:?} after registering {}",
                        name,
                        resolved,
                        id
                    );
                }
            }
            Err(diagnostic) => reporter.report(diagnostic),
        }
    }

    transaction.commit();
    Ok(())
}

/// Populates the annotations of every symbol with the default options,
/// stopping at the first internal error.
pub fn annotate_symbols(
    symbols: &[LegacySymbol],
    registry: &TypeRegistry,
    reporter: &mut ErrorReporter,
) -> Result<Vec<SymbolAnnotations>, InternalCompilerError> {
    annotate_symbols_with_options(symbols, registry, AnalyzerOptions::default(), reporter)
}

/// Populates the annotations of every symbol, stopping at the first
/// internal error.
pub fn annotate_symbols_with_options(
    symbols: &[LegacySymbol],
    registry: &TypeRegistry,
    options: AnalyzerOptions,
    reporter: &mut ErrorReporter,
) -> Result<Vec<SymbolAnnotations>, InternalCompilerError> {
    let bridge = LegacyBridge::with_options(registry, options);
    let mut annotations = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        annotations.push(bridge.populate(symbol, reporter)?);
    }
    debug!("Annotated {} symbols", annotations.len());
    Ok(annotations)
}

enum Declared {
    Alias(TypeId),
    New(Type),
}

fn declared_type(
    declaration: &DataTypeDeclarationKind,
    registry: &TypeRegistry,
) -> Result<Declared, Diagnostic> {
    match declaration {
        DataTypeDeclarationKind::Simple(decl) => {
            resolve(registry, &decl.type_name, &decl.base_type_name).map(Declared::Alias)
        }
        DataTypeDeclarationKind::Enumeration(decl) => {
            if let Some(duplicate) = first_duplicate(&decl.values) {
                return Err(Diagnostic::problem(
                    Problem::EnumerationValueDuplicated,
                    Category::Semantic,
                )
                .with_context_id("declaration", &decl.type_name.name)
                .with_context_id("value", duplicate));
            }
            Ok(Declared::New(Type::Enumeration {
                values: decl.values.clone(),
            }))
        }
        DataTypeDeclarationKind::Structure(decl) => {
            let names: Vec<Id> = decl.elements.iter().map(|e| e.name.clone()).collect();
            if let Some(duplicate) = first_duplicate(&names) {
                return Err(Diagnostic::problem(
                    Problem::StructElementNameDuplicated,
                    Category::Semantic,
                )
                .with_context_id("declaration", &decl.type_name.name)
                .with_context_id("element", duplicate));
            }
            let fields = decl
                .elements
                .iter()
                .map(|element| {
                    resolve(registry, &decl.type_name, &element.type_name).map(|field_type| {
                        StructField {
                            name: element.name.clone(),
                            field_type,
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Declared::New(Type::Struct { fields }))
        }
    }
}

fn resolve(
    registry: &TypeRegistry,
    declaration: &TypeName,
    referenced: &TypeName,
) -> Result<TypeId, Diagnostic> {
    registry
        .find_type(referenced.name.original())
        .map(|ty| ty.id())
        .ok_or_else(|| {
            Diagnostic::problem(Problem::ParentTypeNotDeclared, Category::Semantic)
                .with_context_id("declaration", &declaration.name)
                .with_context_id("type", &referenced.name)
        })
}

fn first_duplicate(ids: &[Id]) -> Option<&Id> {
    let mut seen = HashSet::new();
    ids.iter().find(|id| !seen.insert(*id))
}

fn referenced_types(declaration: &DataTypeDeclarationKind) -> Vec<&TypeName> {
    match declaration {
        DataTypeDeclarationKind::Simple(decl) => vec![&decl.base_type_name],
        DataTypeDeclarationKind::Enumeration(_) => vec![],
        DataTypeDeclarationKind::Structure(decl) => {
            decl.elements.iter().map(|e| &e.type_name).collect()
        }
    }
}

/// Orders the declarations so that each comes after the declarations it
/// refers to. Repeated names keep their source order. Declarations that
/// refer to each other in a cycle keep their source order among themselves
/// and the rest of the declarations are still ordered.
fn declaration_order(declarations: &[DataTypeDeclarationKind]) -> Vec<usize> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..declarations.len())
        .map(|index| graph.add_node(index))
        .collect();

    let mut by_name: HashMap<&Id, NodeIndex> = HashMap::new();
    for (declaration, node) in declarations.iter().zip(&nodes) {
        let name = &declaration.type_name().name;
        match by_name.get(name) {
            Some(first) => {
                graph.add_edge(*first, *node, ());
            }
            None => {
                by_name.insert(name, *node);
            }
        }
    }

    for (declaration, node) in declarations.iter().zip(&nodes) {
        for referenced in referenced_types(declaration) {
            if let Some(parent) = by_name.get(&referenced.name) {
                graph.add_edge(*parent, *node, ());
            }
        }
    }

    // Components come out in reverse topological order.
    let mut order = Vec::with_capacity(declarations.len());
    for component in tarjan_scc(&graph).into_iter().rev() {
        let mut indices: Vec<usize> = component.into_iter().map(|node| graph[node]).collect();
        indices.sort_unstable();
        if indices.len() > 1 {
            debug!("Declarations {:?} form a cycle, keeping source order", indices);
        }
        order.extend(indices);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::const_value::{ConstPayload, ConstValue};
    use crate::legacy::{
        LegacyConstSlot, LegacyConstValue, LegacyDatatype, LegacyNode, DINT_TYPE_NAME,
        INT_TYPE_NAME, TOD_TYPE_NAME,
    };
    use plctype_dsl::common::{
        EnumerationDeclaration, SimpleDeclaration, StructureDeclaration,
        StructureElementDeclaration,
    };

    fn alias(name: &str, base: &str) -> DataTypeDeclarationKind {
        DataTypeDeclarationKind::Simple(SimpleDeclaration {
            type_name: TypeName::from(name),
            base_type_name: TypeName::from(base),
        })
    }

    fn enumeration(name: &str, values: &[&str]) -> DataTypeDeclarationKind {
        DataTypeDeclarationKind::Enumeration(EnumerationDeclaration {
            type_name: TypeName::from(name),
            values: values.iter().map(|v| Id::from(v)).collect(),
        })
    }

    fn structure(name: &str, elements: &[(&str, &str)]) -> DataTypeDeclarationKind {
        DataTypeDeclarationKind::Structure(StructureDeclaration {
            type_name: TypeName::from(name),
            elements: elements
                .iter()
                .map(|(name, ty)| StructureElementDeclaration {
                    name: Id::from(name),
                    type_name: TypeName::from(ty),
                })
                .collect(),
        })
    }

    #[test]
    fn register_type_declarations_when_valid_then_all_registered() {
        let mut registry = TypeRegistry::new();
        let mut reporter = ErrorReporter::new();
        let declarations = vec![
            alias("Counter", "DINT"),
            enumeration("Level", &["Low", "High"]),
            structure("Point", &[("x", "REAL"), ("y", "Counter")]),
        ];

        register_type_declarations(&declarations, &mut registry, &mut reporter).unwrap();

        assert!(!reporter.has_errors());
        assert_eq!(registry.get_dint(), registry.find_type("COUNTER").unwrap());
        assert!(registry.find_type("level").unwrap().ty().is_enumeration());
        let point = registry.find_type("Point").unwrap();
        let y = point.ty().field(&Id::from("Y")).unwrap();
        assert_eq!(registry.get_dint().id(), y.field_type);
    }

    #[test]
    fn register_type_declarations_when_forward_reference_then_registered() {
        let mut registry = TypeRegistry::new();
        let mut reporter = ErrorReporter::new();
        let declarations = vec![
            structure("Line", &[("start", "Point"), ("finish", "Point")]),
            structure("Point", &[("x", "INT")]),
        ];

        register_type_declarations(&declarations, &mut registry, &mut reporter).unwrap();

        assert!(!reporter.has_errors());
        assert!(registry.find_type("Line").is_some());
    }

    #[test]
    fn register_type_declarations_when_cycle_then_other_declarations_still_ordered() {
        let mut registry = TypeRegistry::new();
        let mut reporter = ErrorReporter::new();
        let declarations = vec![
            structure("Line", &[("start", "Point")]),
            structure("Point", &[("x", "INT")]),
            alias("A", "B"),
            alias("B", "A"),
        ];

        register_type_declarations(&declarations, &mut registry, &mut reporter).unwrap();

        assert!(registry.find_type("Line").is_some());
        assert!(registry.find_type("Point").is_some());
        assert!(registry.find_type("A").is_none());
        assert!(registry.find_type("B").is_none());
        assert_eq!(2, reporter.error_count());
        assert!(reporter
            .diagnostics()
            .iter()
            .all(|d| d.code == Problem::ParentTypeNotDeclared.code()));
    }

    #[test]
    fn declaration_order_when_cycle_then_cycle_members_in_source_order() {
        let declarations = vec![
            alias("A", "B"),
            structure("Line", &[("start", "Point")]),
            alias("B", "A"),
            structure("Point", &[("x", "INT")]),
        ];

        let order = declaration_order(&declarations);

        let position = |index: usize| order.iter().position(|i| *i == index).unwrap();
        assert_eq!(4, order.len());
        assert!(position(3) < position(1));
        assert!(position(0) < position(2));
    }

    #[test]
    fn register_type_declarations_when_parent_undeclared_then_skipped() {
        let mut registry = TypeRegistry::new();
        let mut reporter = ErrorReporter::new();
        let declarations = vec![alias("Speed", "Velocity"), alias("Counter", "INT")];

        register_type_declarations(&declarations, &mut registry, &mut reporter).unwrap();

        assert_eq!(1, reporter.error_count());
        assert_eq!(
            Problem::ParentTypeNotDeclared.code(),
            reporter.diagnostics()[0].code
        );
        assert!(registry.find_type("Speed").is_none());
        assert!(registry.find_type("Counter").is_some());
    }

    #[test]
    fn register_type_declarations_when_duplicate_name_then_first_kept() {
        let mut registry = TypeRegistry::new();
        let mut reporter = ErrorReporter::new();
        let declarations = vec![alias("Counter", "INT"), alias("COUNTER", "DINT")];

        register_type_declarations(&declarations, &mut registry, &mut reporter).unwrap();

        assert_eq!(1, reporter.error_count());
        assert_eq!(
            Problem::TypeDeclNameDuplicated.code(),
            reporter.diagnostics()[0].code
        );
        assert_eq!(registry.get_int(), registry.find_type("counter").unwrap());
    }

    #[test]
    fn register_type_declarations_when_elementary_name_then_error() {
        let mut registry = TypeRegistry::new();
        let mut reporter = ErrorReporter::new();

        register_type_declarations(&[enumeration("Int", &["A"])], &mut registry, &mut reporter)
            .unwrap();

        assert_eq!(
            Problem::ElementaryTypeRedefinition.code(),
            reporter.diagnostics()[0].code
        );
        assert!(registry.find_type("INT").unwrap().ty().is_integer());
    }

    #[test]
    fn register_type_declarations_when_enum_value_repeated_then_error() {
        let mut registry = TypeRegistry::new();
        let mut reporter = ErrorReporter::new();

        register_type_declarations(
            &[enumeration("Level", &["Low", "LOW"])],
            &mut registry,
            &mut reporter,
        )
        .unwrap();

        assert_eq!(
            Problem::EnumerationValueDuplicated.code(),
            reporter.diagnostics()[0].code
        );
        assert!(registry.find_type("Level").is_none());
    }

    #[test]
    fn register_type_declarations_when_struct_element_repeated_then_error() {
        let mut registry = TypeRegistry::new();
        let mut reporter = ErrorReporter::new();

        register_type_declarations(
            &[structure("Point", &[("x", "INT"), ("X", "REAL")])],
            &mut registry,
            &mut reporter,
        )
        .unwrap();

        assert_eq!(
            Problem::StructElementNameDuplicated.code(),
            reporter.diagnostics()[0].code
        );
    }

    #[test]
    fn register_type_declarations_when_self_reference_then_parent_not_declared() {
        let mut registry = TypeRegistry::new();
        let mut reporter = ErrorReporter::new();

        register_type_declarations(
            &[structure("Node", &[("next", "Node")])],
            &mut registry,
            &mut reporter,
        )
        .unwrap();

        assert_eq!(
            Problem::ParentTypeNotDeclared.code(),
            reporter.diagnostics()[0].code
        );
    }

    #[test]
    fn annotate_symbols_then_annotation_per_symbol() {
        let registry = TypeRegistry::new();
        let mut reporter = ErrorReporter::new();
        let symbols = vec![
            LegacySymbol::literal("42"),
            LegacySymbol::new(LegacyNode::Expression)
                .with_datatype(LegacyDatatype::Elementary(&DINT_TYPE_NAME))
                .with_const_value(LegacyConstValue {
                    int64: LegacyConstSlot::Valid(100_000),
                    ..Default::default()
                }),
        ];

        let annotations = annotate_symbols(&symbols, &registry, &mut reporter).unwrap();

        assert_eq!(2, annotations.len());
        assert_eq!(Some(registry.get_int().id()), annotations[0].datatype_modern);
        assert_eq!(
            ConstValue::value(ConstPayload::Int(100_000), registry.get_dint().id()),
            annotations[1].const_value_modern
        );
    }

    #[test]
    fn annotate_symbols_when_internal_error_then_stops() {
        let registry = TypeRegistry::new();
        let mut reporter = ErrorReporter::new();
        let symbols = vec![
            LegacySymbol::new(LegacyNode::Expression)
                .with_datatype(LegacyDatatype::Elementary(&TOD_TYPE_NAME)),
            LegacySymbol::literal("USINT#300"),
        ];

        assert!(annotate_symbols(&symbols, &registry, &mut reporter).is_err());
        assert_eq!(1, reporter.diagnostics().len());
        assert!(reporter.has_fatal());
    }

    #[test]
    fn annotate_symbols_with_options_when_relaxed_precision_then_real() {
        let registry = TypeRegistry::new();
        let mut reporter = ErrorReporter::new();
        let symbols = vec![LegacySymbol::literal("3.141592653589793")];

        let strict = annotate_symbols(&symbols, &registry, &mut reporter).unwrap();
        let relaxed = annotate_symbols_with_options(
            &symbols,
            &registry,
            AnalyzerOptions::default().with_strict_real_precision(false),
            &mut reporter,
        )
        .unwrap();

        assert_eq!(Some(registry.get_lreal().id()), strict[0].datatype_modern);
        assert_eq!(Some(registry.get_real().id()), relaxed[0].datatype_modern);
    }

    #[test]
    fn analyze_when_derived_symbol_then_uses_declared_type() {
        let mut reporter = ErrorReporter::new();
        let declarations = vec![alias("Counter", "INT")];
        let symbols = vec![LegacySymbol::new(LegacyNode::Identifier(Id::from("count")))
            .with_datatype(LegacyDatatype::Derived(TypeName::from("Counter")))
            .with_candidate(LegacyDatatype::Elementary(&INT_TYPE_NAME))];

        let analysis = analyze(
            &declarations,
            &symbols,
            AnalyzerOptions::default(),
            &mut reporter,
        )
        .unwrap();

        let int = analysis.registry.get_int().id();
        assert_eq!(Some(int), analysis.annotations[0].datatype_modern);
        assert_eq!(vec![int], analysis.annotations[0].candidate_types);
    }

    #[test]
    fn analyze_when_relaxed_precision_then_bridge_uses_it() {
        let mut reporter = ErrorReporter::new();
        let options = AnalyzerOptions::default().with_strict_real_precision(false);

        let analysis = analyze(
            &[],
            &[LegacySymbol::literal("3.141592653589793")],
            options,
            &mut reporter,
        )
        .unwrap();

        assert_eq!(
            Some(analysis.registry.get_real().id()),
            analysis.annotations[0].datatype_modern
        );
    }
}
