mod locale;
mod model_config;
mod record;
mod slug_history;

pub use locale::*;
pub use model_config::*;
pub use record::*;
pub use slug_history::*;
