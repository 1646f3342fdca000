//! # Indexing Validator
//!
//! Binds every element access in a method body and reports why binding fails:
//! - The receiver is neither an inline array nor a span
//! - The argument list is not exactly one unnamed, unmodified argument
//! - The argument is not `int`, `Index`, `Range` or `dynamic`
//! - A constant index falls outside the inline array
//! - A well-known member needed to lower the access is missing

use fixbuf_compiler_diagnostics::Diagnostic;

use crate::access::bind_access;
use crate::context::SemanticContext;
use crate::expr::ExprId;
use crate::method::MethodBody;
use crate::validation::Validator;
use crate::visitor::{walk_expr, Usage, Visitor};

/// Validator for inline array and span element accesses
///
/// # Examples of errors this catches:
///
/// ```text
/// x.F[0, 1]        // wrong number of indices
/// x.F["0"]         // argument of type 'string'
/// x.F[index: 0]    // named argument
/// x.F[ref i]       // argument modifier
/// x.F[10]          // constant index outside a Buffer10
/// ```
pub struct IndexingValidator;

impl Validator for IndexingValidator {
    fn validate(&self, ctx: &SemanticContext<'_>) -> Vec<Diagnostic> {
        let mut collector = AccessCollector {
            ctx,
            diagnostics: Vec::new(),
        };
        collector.visit_body();
        collector.diagnostics
    }

    fn name(&self) -> &'static str {
        "IndexingValidator"
    }
}

struct AccessCollector<'c, 'a> {
    ctx: &'c SemanticContext<'a>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Visitor<'a> for AccessCollector<'_, 'a> {
    fn body(&self) -> &'a MethodBody {
        self.ctx.method
    }

    fn visit_expr(&mut self, expr: ExprId, usage: Usage) {
        if self.ctx.expr(expr).is_element_access() {
            if let Err(errors) = bind_access(self.ctx, expr) {
                self.diagnostics.extend(errors);
            }
        }
        walk_expr(self, expr, usage);
    }
}
