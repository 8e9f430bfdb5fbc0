pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{empty, error, header, info, item_added, item_deleted, item_updated, success, warn};
pub use table::{item_detail_table, items_table};
pub use theme::{theme, Theme};
