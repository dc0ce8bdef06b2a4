/*
 * Responsibility
 * - Public surface of the middleware layer (re-export)
 * - auth::access (bearer -> principal), cors, http (transport concerns)
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
