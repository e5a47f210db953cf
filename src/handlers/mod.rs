// ---------------------------------------------------------------------------
// handlers/ — REST facade and health
// ---------------------------------------------------------------------------

// Sub-modules are pub(crate) so utoipa __path_* types are accessible from lib.rs OpenApi derive.
pub(crate) mod gemini;
pub(crate) mod system;

pub use gemini::{analyze, chat, generate, list_models};
pub use system::health;

// ── utoipa __path_* re-exports ───────────────────────────────────────────────
// The #[utoipa::path] attribute macro generates private structs like __path_health.
// The OpenApi derive in lib.rs expects them at `handlers::__path_health`.
pub use gemini::{__path_analyze, __path_chat, __path_generate, __path_list_models};
pub use system::__path_health;
