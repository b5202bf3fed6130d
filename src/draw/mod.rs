pub mod codec;
pub mod history;
pub mod input;
pub mod messages;
pub mod model;
pub mod render;
pub mod save;
pub mod session;
pub mod settings;
pub mod settings_store;
pub mod stroke;
pub mod surface;

pub use messages::{Notification, NotificationKind};
pub use session::DrawSession;
pub use settings::DrawSettings;
