/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Hand the request's AuthCtx (anonymous or authenticated) to handlers
 * - axum wiring lives in core, the type itself in types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor: any route, anonymous callers included
 * - PrincipalExtractor: protected routes, 401 for anonymous callers
 */

mod core;
mod types;

pub use core::{AuthCtxExtractor, PrincipalExtractor};
pub use types::AuthCtx;
