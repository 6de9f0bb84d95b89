// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::{append_csv_log, format_history, install_config, normalize_target, resolve_signatures};
