//! Screen color picking for Wayland desktops.
//!
//! [`Picker`] walks an ordered chain of backends (the desktop portal, the
//! compositor's own picker, then grim + slurp) and hands back the first
//! [`ColorSample`] one of them produces. History persistence and color naming
//! live alongside but are never touched by the picking path.

pub mod capture;
pub mod clipboard;
pub mod color;
pub mod command;
pub mod compositor;
pub mod config;
pub mod env;
pub mod error;
pub mod history;
pub mod names;
pub mod picker;
pub mod portal;

pub use color::{ColorSample, PortalColor};
pub use config::{BackendChoice, Config};
pub use error::{BackendError, ColorParseError, NoColorPicked};
pub use picker::{Backend, Picker};
