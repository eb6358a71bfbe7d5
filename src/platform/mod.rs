pub mod winit;

use std::any::Any;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use self::winit::{WinitWindow, WinitWindowProvider};

/// Requested show-state for a new window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowState {
    Normal,
    FullScreen,
    Maximized,
    Minimized,
    BorderlessFullScreen,
    Hidden,
}

/// Everything a window provider needs to construct a native window. Input
/// only; nothing retains it after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowCreationInfo {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub state: WindowState,
}

impl Default for WindowCreationInfo {
    fn default() -> Self {
        Self {
            x: 100,
            y: 100,
            width: 1280,
            height: 720,
            title: "holo".to_string(),
            state: WindowState::Normal,
        }
    }
}

/// A live native window. Mutable position/size/title/state, an existence
/// flag, and an event pump; the rest of the native surface stays behind
/// `as_any` for the provider that knows the concrete type.
pub trait PlatformWindow {
    fn position(&self) -> (i32, i32);
    fn set_position(&mut self, x: i32, y: i32);

    fn size(&self) -> (u32, u32);
    fn set_size(&mut self, width: u32, height: u32);

    fn title(&self) -> String;
    fn set_title(&mut self, title: &str);

    fn state(&self) -> WindowState;
    fn set_state(&mut self, state: WindowState);

    /// False once the native window is gone or has been asked to close.
    fn exists(&self) -> bool;

    /// Drains pending native events. Events for sibling windows of the same
    /// provider are routed, not dropped.
    fn pump_events(&mut self);

    fn as_any(&self) -> &dyn Any;
}

/// Constructs native windows from a [`WindowCreationInfo`].
pub trait WindowProvider {
    fn create_window(&self, info: &WindowCreationInfo) -> Result<Box<dyn PlatformWindow>>;
}
