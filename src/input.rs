use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Cursor travel, in pixels, beyond which a press-release is a drag rather than a click.
pub const CLICK_SLOP: f32 = 4.0;

/// Tracks input state for keyboard and mouse.
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_buttons_released: HashSet<MouseButton>,
    mouse_position: Vec2,
    mouse_delta: Vec2,
    scroll_delta: Vec2,
    /// Cursor travel since the left button went down.
    drag_distance: f32,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_pressed: HashSet::new(),
            mouse_buttons_down: HashSet::new(),
            mouse_buttons_released: HashSet::new(),
            mouse_position: Vec2::ZERO,
            mouse_delta: Vec2::ZERO,
            scroll_delta: Vec2::ZERO,
            drag_distance: 0.0,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the end of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_buttons_released.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if !self.keys_down.contains(&key) {
                                self.keys_pressed.insert(key);
                            }
                            self.keys_down.insert(key);
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&key);
                        }
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.press(*button),
                ElementState::Released => self.release(*button),
            },
            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = Vec2::new(position.x as f32, position.y as f32);
                self.cursor_to(new_pos);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let d = match delta {
                    winit::event::MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y),
                    winit::event::MouseScrollDelta::PixelDelta(pos) => {
                        Vec2::new(pos.x as f32, pos.y as f32) / 120.0
                    }
                };
                self.scroll_delta += d;
            }
            WindowEvent::Focused(false) => {
                self.keys_down.clear();
                self.mouse_buttons_down.clear();
            }
            _ => {}
        }
    }

    fn press(&mut self, button: MouseButton) {
        if !self.mouse_buttons_down.contains(&button) {
            if button == MouseButton::Left {
                self.drag_distance = 0.0;
            }
        }
        self.mouse_buttons_down.insert(button);
    }

    fn release(&mut self, button: MouseButton) {
        self.mouse_buttons_down.remove(&button);
        self.mouse_buttons_released.insert(button);
    }

    fn cursor_to(&mut self, new_pos: Vec2) {
        let delta = new_pos - self.mouse_position;
        self.mouse_delta += delta;
        self.mouse_position = new_pos;
        if self.mouse_buttons_down.contains(&MouseButton::Left) {
            self.drag_distance += delta.length();
        }
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the mouse button is currently held down.
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    /// Cursor position of a left click completed this frame.
    ///
    /// A press-release pair counts as a click only when the cursor moved
    /// less than [`CLICK_SLOP`] pixels in between, so orbit drags never pick.
    pub fn left_click(&self) -> Option<Vec2> {
        (self.mouse_buttons_released.contains(&MouseButton::Left)
            && self.drag_distance < CLICK_SLOP)
            .then_some(self.mouse_position)
    }

    /// Mouse movement delta this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Scroll wheel delta this frame (in "lines").
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }
}

#[cfg(test)]
impl Input {
    pub(crate) fn press_mouse(&mut self, button: MouseButton) {
        self.press(button);
    }

    pub(crate) fn release_mouse(&mut self, button: MouseButton) {
        self.release(button);
    }

    pub(crate) fn move_mouse(&mut self, delta: Vec2) {
        self.cursor_to(self.mouse_position + delta);
    }

    pub(crate) fn set_mouse_position(&mut self, position: Vec2) {
        self.mouse_position = position;
    }

    pub(crate) fn scroll(&mut self, delta: Vec2) {
        self.scroll_delta += delta;
    }

    pub(crate) fn press_key(&mut self, key: KeyCode) {
        self.keys_pressed.insert(key);
        self.keys_down.insert(key);
    }
}
