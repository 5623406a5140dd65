mod app;
mod dialogs;
mod image;

pub use app::GuiApp;

pub const APP_TITLE: &str = env!("CARGO_PKG_NAME");
