pub mod collector;
pub mod cookie;
pub mod error;
pub mod host;
pub mod markup;
pub mod result;
pub mod tls;

pub use collector::{Collector, HttpCollector};
pub use cookie::CookieRecord;
pub use error::ScanError;
pub use markup::LinkRecord;
pub use result::Collection;
pub use tls::TlsProbe;

pub const USER_AGENT: &str =
    "Mozilla/5.0 (compatible; privscan/0.1; +https://github.com/trapdoorsec/privscan)";
