//! Display surface for ember.
//!
//! The display never touches registry state. It subscribes to the snapshots
//! the registry publishes and turns each one into a [`Frame`] with the pure
//! [`render`] function; [`Display`] writes frames to the terminal. Other
//! output sharing the terminal goes through a [`DisplayHandle`] so it is printed
//! above the live panel instead of being drawn over.

pub mod display;
pub mod render;

pub use display::{Display, DisplayConfig, DisplayHandle, DisplayMode, DisplayWriter};
pub use render::{Frame, RenderOptions, live_panel, render};
