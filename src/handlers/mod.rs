// Handlers are grouped by access tier:
// public (no token), protected (bearer token resolved by `require_identity`)
// and diagnostics (demo triggers, only mounted when enabled).

pub mod diagnostics;
pub mod protected;
pub mod public;
