pub mod color;
pub mod cover;
pub mod detail;
pub mod root;

pub use color::{Color, ColorPickerSheet};
pub use cover::{CoverPhase, HttpImageLoader, ImageLoader};
pub use detail::{BookDetail, StatusControl};
pub use root::RootScreen;
