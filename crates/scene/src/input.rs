use glam::Vec2;

/// Movement keys the scene understands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl Key {
    pub const ALL: [Key; 6] = [
        Self::Forward,
        Self::Backward,
        Self::Left,
        Self::Right,
        Self::Up,
        Self::Down,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Input polled once at the start of a frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct InputState {
    keys: u8,
    /// Mouse movement since the previous frame, in pixels
    pub mouse_delta: Vec2,
}

impl InputState {
    #[must_use]
    pub fn with_key(mut self, key: Key) -> Self {
        self.set_key(key, true);
        self
    }

    pub fn set_key(&mut self, key: Key, down: bool) {
        if down {
            self.keys |= key.bit();
        } else {
            self.keys &= !key.bit();
        }
    }

    #[must_use]
    pub fn is_down(&self, key: Key) -> bool {
        self.keys & key.bit() != 0
    }

    /// Held keys as `(right, up, forward)` axes, each in `[-1, 1]`.
    #[must_use]
    pub fn movement_axes(&self) -> glam::Vec3 {
        let axis = |positive: Key, negative: Key| {
            f32::from(u8::from(self.is_down(positive))) - f32::from(u8::from(self.is_down(negative)))
        };
        glam::Vec3::new(
            axis(Key::Right, Key::Left),
            axis(Key::Up, Key::Down),
            axis(Key::Forward, Key::Backward),
        )
    }
}

/// Anything that can report the device state for the coming frame.
pub trait InputSource {
    fn poll(&mut self) -> InputState;
}

/// A source that never reports any input.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self) -> InputState {
        InputState::default()
    }
}
