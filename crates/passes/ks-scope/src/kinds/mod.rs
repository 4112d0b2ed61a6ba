//! Lookup and enumeration in the declarations of a single node

pub(crate) mod container;
pub(crate) mod imports;
mod locals;
mod query;

use crate::collector::LookupSymbolsInfo;
use crate::context::ScopeContext;
use crate::result::LookupResult;
use crate::scope::{Scope, ScopeKind};
use crate::viability::LookupRequest;
use ks_intern::Name;

pub use imports::validate_imports;

impl Scope {
    /// Add the symbols named `name` that this node itself declares to
    /// `result`. Outer nodes are never consulted.
    pub fn lookup_own_namespace(
        &self,
        ctx: ScopeContext<'_>,
        result: &mut LookupResult,
        name: Name,
        request: &LookupRequest,
    ) {
        match self.kind() {
            ScopeKind::Root | ScopeKind::Adjusted => {}
            ScopeKind::Imports { .. } => {
                imports::lookup(ctx, self.import_namespace(ctx), result, name, request);
            }
            ScopeKind::Namespace { namespace, .. } => {
                container::lookup_in_namespace(ctx, self, *namespace, result, name, request);
            }
            ScopeKind::Type { ty } => container::lookup_in_type(ctx, *ty, result, name, request),
            ScopeKind::Query { variables, .. } => {
                query::lookup(ctx, variables, result, name, request);
            }
            kind => locals::lookup(
                ctx,
                kind,
                self.declared_namespace(ctx),
                result,
                name,
                request,
            ),
        }
    }

    /// Add every name this node itself declares that passes the request's
    /// filters to `info`
    pub fn enumerate_own_namespace(
        &self,
        ctx: ScopeContext<'_>,
        info: &mut LookupSymbolsInfo,
        request: &LookupRequest,
    ) {
        match self.kind() {
            ScopeKind::Root | ScopeKind::Adjusted => {}
            ScopeKind::Imports { .. } => {
                imports::enumerate(ctx, self.import_namespace(ctx), info, request);
            }
            ScopeKind::Namespace { namespace, .. } => {
                container::enumerate_namespace(ctx, *namespace, info, request);
            }
            ScopeKind::Type { ty } => container::enumerate_type(ctx, *ty, info, request),
            ScopeKind::Query { variables, .. } => query::enumerate(ctx, variables, info, request),
            kind => locals::enumerate(ctx, kind, self.declared_namespace(ctx), info, request),
        }
    }
}
