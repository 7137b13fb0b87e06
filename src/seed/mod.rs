pub mod policy;
pub mod session;

pub use policy::{AbortOnError, ErrorPolicy, SilentSkip, SkipErrors};
pub use session::{ImportReport, ImportSession};
