//! Name conflicts between declarations of one member body

use crate::context::ScopeContext;
use crate::error::{DiagnosticSink, ScopeDiagnostic};
use crate::scope::{Scope, ScopeKind};
use ks_intern::Name;
use ks_span::FileSpan;
use ks_symbols::{SymbolId, SymbolKind};
use tracing::debug;

/// What one node says about a proposed declaration
enum Step {
    Report(ScopeDiagnostic),
    Continue,
    Stop,
}

/// The declaration being checked
struct Candidate {
    symbol: SymbolId,
    name: Name,
    kind: SymbolKind,
    at: FileSpan,
}

impl Candidate {
    fn is_type_parameter(&self) -> bool {
        self.kind == SymbolKind::TypeParameter
    }
}

impl Scope {
    /// Check that `candidate`, declared in this node, does not clash with
    /// another declaration of this node or of an enclosing node of the same
    /// member. Conflicts go to `sink`; returns true if one was reported.
    pub fn ensure_single_definition(
        &self,
        ctx: ScopeContext<'_>,
        candidate: SymbolId,
        sink: &mut impl DiagnosticSink,
    ) -> bool {
        let declared = ctx.symbols.symbol(candidate);
        let candidate = Candidate {
            symbol: candidate,
            name: declared.name,
            kind: declared.kind,
            at: ctx.span_of(candidate),
        };

        let mut own = true;
        let mut in_own_query = true;
        for scope in self.chain() {
            let step = match scope.kind() {
                ScopeKind::Adjusted => continue,
                ScopeKind::Query { variables, .. } => {
                    let existing = variables
                        .get(candidate.name)
                        .map(|variable| variable.symbol)
                        .filter(|&existing| existing != candidate.symbol);
                    let step = match existing {
                        Some(existing) => Step::Report(range_variable_clash(
                            &candidate,
                            existing,
                            in_own_query,
                        )),
                        None => Step::Continue,
                    };
                    in_own_query = false;
                    step
                }
                _ => node_step(ctx, scope, &candidate, own),
            };
            own = false;

            match step {
                Step::Report(diagnostic) => {
                    debug!(
                        code = %diagnostic.code_str(),
                        scope = scope.kind().label(),
                        "declaration conflict"
                    );
                    sink.report(diagnostic);
                    return true;
                }
                Step::Continue => {}
                Step::Stop => return false,
            }
        }
        false
    }
}

/// Whether `local` hides a parameter of its own member or of an enclosing
/// function, walking outwards from `outer`, the node around its declaring node.
///
/// The first enclosing declaration of the name decides; a local named like an
/// enclosing local keeps its own declaration.
pub(crate) fn overrides_parameter(ctx: ScopeContext<'_>, outer: &Scope, local: SymbolId) -> bool {
    let symbols = ctx.symbols;
    if symbols.kind(local) != SymbolKind::Local {
        return false;
    }
    let name = symbols.name(local);
    for scope in outer.chain() {
        let kind = scope.kind();
        if kind.is_container() {
            return false;
        }
        if !(kind.is_local_scope() || kind.is_function_boundary()) {
            continue;
        }
        if let Some(&existing) = scope.declared_namespace(ctx).values(name).first() {
            return symbols.kind(existing) == SymbolKind::Parameter;
        }
        let crosses_function = matches!(
            kind,
            ScopeKind::Lambda { .. } | ScopeKind::LocalFunction { .. }
        );
        if matches!(kind, ScopeKind::Parameters { .. })
            || (crosses_function && ctx.config.allow_nested_function_shadowing)
        {
            return false;
        }
    }
    false
}

/// What one node of the chain says about `candidate`
fn node_step(
    ctx: ScopeContext<'_>,
    scope: &Scope,
    candidate: &Candidate,
    own: bool,
) -> Step {
    match *scope.kind() {
        ScopeKind::Root
        | ScopeKind::Imports { .. }
        | ScopeKind::Namespace { .. }
        | ScopeKind::Type { .. } => Step::Stop,
        ScopeKind::PrimaryConstructor { .. }
        | ScopeKind::ClassTypeParameters { .. }
        | ScopeKind::CrefTypeParameters { .. }
        | ScopeKind::Adjusted
        | ScopeKind::Query { .. } => Step::Continue,
        ScopeKind::MethodTypeParameters { method } => {
            match type_parameter_clash(ctx, ctx.symbols.type_parameters_of(method), candidate) {
                Some(diagnostic) => Step::Report(diagnostic),
                None => Step::Continue,
            }
        }
        ScopeKind::Parameters { member, .. } => {
            if let Some(diagnostic) =
                type_parameter_clash(ctx, ctx.symbols.type_parameters_of(member), candidate)
            {
                return Step::Report(diagnostic);
            }
            match local_clash(ctx, scope, candidate, own) {
                Some(diagnostic) => Step::Report(diagnostic),
                // Locals never conflict across a member boundary.
                None => Step::Stop,
            }
        }
        ScopeKind::Lambda { .. } | ScopeKind::LocalFunction { .. } => {
            match local_clash(ctx, scope, candidate, own) {
                Some(diagnostic) => Step::Report(diagnostic),
                None if ctx.config.allow_nested_function_shadowing => Step::Stop,
                None => Step::Continue,
            }
        }
        ScopeKind::Block { .. }
        | ScopeKind::Embedded { .. }
        | ScopeKind::Loop { .. }
        | ScopeKind::Resource { .. }
        | ScopeKind::Catch { .. }
        | ScopeKind::Switch { .. }
        | ScopeKind::SwitchSection { .. }
        | ScopeKind::SwitchArm { .. } => match local_clash(ctx, scope, candidate, own) {
            Some(diagnostic) => Step::Report(diagnostic),
            None => Step::Continue,
        },
    }
}

/// A local, parameter or local function named like a type parameter
fn type_parameter_clash(
    ctx: ScopeContext<'_>,
    type_parameters: &[SymbolId],
    candidate: &Candidate,
) -> Option<ScopeDiagnostic> {
    if candidate.is_type_parameter() {
        return None;
    }
    let type_parameter = type_parameters
        .iter()
        .copied()
        .find(|&existing| ctx.symbols.name(existing) == candidate.name)?;
    Some(ScopeDiagnostic::LocalSameNameAsTypeParameter {
        name: candidate.name,
        type_parameter,
        at: candidate.at,
    })
}

/// Conflicts with the locals, parameters and labels a node declares.
///
/// Within the node being defined into only the first declaration of a name
/// is authoritative, so the earliest one never reports against later ones.
fn local_clash(
    ctx: ScopeContext<'_>,
    scope: &Scope,
    candidate: &Candidate,
    own: bool,
) -> Option<ScopeDiagnostic> {
    let declared = scope.declared_namespace(ctx);
    let is_label = candidate.kind == SymbolKind::Label;
    let same_name = if is_label {
        declared.labels(candidate.name)
    } else {
        declared.values(candidate.name)
    };
    let existing = if own {
        same_name.first().copied()
    } else {
        same_name.iter().copied().find(|&existing| existing != candidate.symbol)
    }
    .filter(|&existing| existing != candidate.symbol)?;

    if !is_label {
        return value_clash(ctx, candidate, existing, own);
    }
    Some(if own {
        ScopeDiagnostic::DuplicateLabel {
            name: candidate.name,
            at: candidate.at,
        }
    } else {
        ScopeDiagnostic::LabelShadowed {
            name: candidate.name,
            at: candidate.at,
        }
    })
}

fn value_clash(
    ctx: ScopeContext<'_>,
    candidate: &Candidate,
    existing: SymbolId,
    own: bool,
) -> Option<ScopeDiagnostic> {
    let name = candidate.name;
    let at = candidate.at;
    if ctx.symbols.kind(existing) == SymbolKind::TypeParameter {
        // Type parameters may repeat outer type parameter names.
        return (!candidate.is_type_parameter()).then_some(
            ScopeDiagnostic::LocalSameNameAsTypeParameter {
                name,
                type_parameter: existing,
                at,
            },
        );
    }
    Some(if candidate.kind == SymbolKind::RangeVariable {
        ScopeDiagnostic::RangeVariableConflict { name, existing, at }
    } else if own {
        ScopeDiagnostic::LocalDuplicate { name, existing, at }
    } else {
        ScopeDiagnostic::LocalIllegallyOverrides { name, existing, at }
    })
}

/// A name already visible as a range variable
fn range_variable_clash(
    candidate: &Candidate,
    existing: SymbolId,
    same_query: bool,
) -> ScopeDiagnostic {
    let name = candidate.name;
    let at = candidate.at;
    match candidate.kind {
        SymbolKind::RangeVariable if same_query => {
            ScopeDiagnostic::DuplicateRangeVariable { name, at }
        }
        SymbolKind::RangeVariable => ScopeDiagnostic::RangeVariableConflict { name, existing, at },
        _ => ScopeDiagnostic::LocalIllegallyOverrides { name, existing, at },
    }
}
