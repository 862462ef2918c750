//! Highlight colors for symbol dependency arrows.

use crate::constants::UNASSIGNED_ARROW_COLOR;
use crate::types::Theme;
use std::collections::VecDeque;

/// Colors handed out on light backgrounds.
pub const LIGHT_PALETTE: [u32; 42] = [
    0xa280cc, 0x375fc2, 0xca7137, 0xc27498, 0x9ec2a4, 0xbcb1c8, 0xb47d65, 0x782525, 0x111e1e,
    0xbe87a0, 0xa793ae, 0xc8c9c6, 0x91abbe, 0xacbac4, 0xcc9d9d, 0xc78e8e, 0xbe909c, 0x66b10f,
    0x99ba68, 0x00cc00, 0xa9a2b6, 0xa790a5, 0xa698a3, 0xaca3b3, 0xbcb1b9, 0xc7c9cc, 0xc0c4cc,
    0x83ab4b, 0x86b680, 0x897b86, 0x786774, 0x99becb, 0xcc9e80, 0x002a49, 0xcccb8a, 0xccc572,
    0x6c6c5f, 0x9a8e80, 0xcc6640, 0xc29657, 0x769e5b, 0x0066b5,
];

/// Colors handed out on dark backgrounds.
pub const DARK_PALETTE: [u32; 42] = [
    0xd9b3ff, 0x6b93ff, 0xffa96c, 0xffacd2, 0xdcffe4, 0xeadbf6, 0xffb695, 0xb93939, 0x1d3939,
    0xeea9c6, 0xe7d0f1, 0xfafbf8, 0xcde8ff, 0xd7e9f5, 0xffc4c4, 0xf9b1b1, 0xffcbd9, 0x9fff18,
    0xd8ff9a, 0x00ff00, 0xece4fc, 0xe9cce6, 0xe8d6e4, 0xf0e3f8, 0xecdde7, 0xf9fbff, 0xf0f5ff,
    0xbcee76, 0xc0ffb8, 0xc3b2c0, 0xae98aa, 0xc0eeff, 0xffd1c0, 0x004872, 0xfffdad, 0xfff68f,
    0x9e9e8e, 0xd8c8b7, 0xff7f50, 0xf3bb6c, 0xaadc89, 0x009aff,
];

/// Neutral color of same-file arrows for a theme.
pub fn neutral_color(theme: Theme) -> u32 {
    match theme {
        Theme::Dark => 0xffffff,
        Theme::Light => 0x000000,
    }
}

/// Rotating color buffers, one per theme.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    light: VecDeque<u32>,
    dark: VecDeque<u32>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            light: LIGHT_PALETTE.iter().copied().collect(),
            dark: DARK_PALETTE.iter().copied().collect(),
        }
    }
}

impl ColorPalette {
    /// Creates both buffers in their initial order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the color at the back of the theme's buffer and rotates it to the front.
    pub fn next_color(&mut self, theme: Theme) -> u32 {
        let buffer = match theme {
            Theme::Light => &mut self.light,
            Theme::Dark => &mut self.dark,
        };
        match buffer.pop_back() {
            Some(color) => {
                buffer.push_front(color);
                color
            }
            None => UNASSIGNED_ARROW_COLOR,
        }
    }
}
