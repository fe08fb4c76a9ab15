pub mod icons;
pub mod output;
pub mod progress;
pub mod progress_message;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{banner, caution, done, failed, field, graph_counts, muted, package, section};
pub use progress::ProgressManager;
pub use progress_message::{ProgressMessage, ProgressPhase};
pub use table::{failures_table, TableBuilder};
pub use theme::{theme, Theme};
