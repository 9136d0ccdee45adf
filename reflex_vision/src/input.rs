//! Outgoing input: the one place that talks to the OS input queue.
//!
//! All actions the engine takes are key presses (plus a mouse click offered
//! to template-driven collaborators), synthesized through `enigo`. Failures
//! surface as `ActionError` and are recoverable; whether a failed send
//! counts as "done" is the caller's decision, not this module's.

use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use std::thread;
use std::time::Duration;
use thiserror::Error;

pub use enigo::Key;

/// Sent when the target marker enters the boundary zone.
pub const TRIGGER_KEY: Key = Key::Space;
/// The periodic keep-alive interaction key.
pub const KEEP_ALIVE_KEY: Key = Key::Unicode('e');
/// Hotbar slot holding the consumable resource.
pub const RESOURCE_KEY: Key = Key::Unicode('0');

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("input backend unavailable: {0}")]
    Backend(#[from] enigo::NewConError),
    #[error("input injection failed: {0}")]
    Send(#[from] enigo::InputError),
}

/// Owned handle to the input-simulation backend.
pub struct InputDriver {
    enigo: Enigo,
}

impl InputDriver {
    pub fn new() -> Result<Self, ActionError> {
        Ok(Self {
            enigo: Enigo::new(&Settings::default())?,
        })
    }

    /// A single immediate press-and-release.
    pub fn tap(&mut self, key: Key) -> Result<(), ActionError> {
        self.enigo.key(key, Direction::Click)?;
        Ok(())
    }

    /// An explicit down / sleep / up pair, for inputs the game only registers
    /// when held for a minimum duration.
    pub fn hold(&mut self, key: Key, duration: Duration) -> Result<(), ActionError> {
        self.enigo.key(key, Direction::Press)?;
        thread::sleep(duration);
        self.enigo.key(key, Direction::Release)?;
        Ok(())
    }

    /// Left-clicks at an absolute screen position.
    pub fn click_at(&mut self, x: i32, y: i32) -> Result<(), ActionError> {
        self.enigo.move_mouse(x, y, Coordinate::Abs)?;
        self.enigo.button(Button::Left, Direction::Click)?;
        Ok(())
    }
}
