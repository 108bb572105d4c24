//! Pixel rendering of the board for visible mode

use crate::game::{GameState, Position};

const BACKGROUND: [u8; 3] = [0, 0, 0];
const SNAKE_OUTER: [u8; 3] = [0, 0, 255];
const SNAKE_INNER: [u8; 3] = [0, 100, 255];
const HEAD: [u8; 3] = [255, 255, 255];
const FOOD: [u8; 3] = [200, 0, 0];

/// RGB frame of the board, row-major, 3 bytes per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    block_size: usize,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    /// Allocate a black frame sized for the given grid
    pub fn new(grid_width: usize, grid_height: usize, block_size: usize) -> Self {
        let width = grid_width * block_size;
        let height = grid_height * block_size;
        Self {
            width,
            height,
            block_size,
            pixels: vec![0; width * height * 3],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGB bytes
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Color of a single pixel
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * self.width + x) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// Redraw the whole frame from a game state
    pub fn draw(&mut self, state: &GameState) {
        for chunk in self.pixels.chunks_exact_mut(3) {
            chunk.copy_from_slice(&BACKGROUND);
        }

        for &segment in state.snake.body_segments() {
            self.fill_cell(segment, 0, SNAKE_OUTER);
            self.fill_cell(segment, self.block_size / 5, SNAKE_INNER);
        }

        self.fill_cell(state.snake.head(), 0, HEAD);
        self.fill_cell(state.food, 0, FOOD);
    }

    /// Fill one grid cell, shrunk by `inset` pixels on every side
    fn fill_cell(&mut self, cell: Position, inset: usize, color: [u8; 3]) {
        if cell.x < 0 || cell.y < 0 {
            return;
        }
        let (cx, cy) = (cell.x as usize, cell.y as usize);
        let left = cx * self.block_size + inset;
        let top = cy * self.block_size + inset;
        let right = ((cx + 1) * self.block_size).saturating_sub(inset).min(self.width);
        let bottom = ((cy + 1) * self.block_size).saturating_sub(inset).min(self.height);

        for y in top..bottom {
            for x in left..right {
                let idx = (y * self.width + x) * 3;
                self.pixels[idx..idx + 3].copy_from_slice(&color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Snake};

    fn sample_state() -> GameState {
        let snake = Snake::new(Position::new(2, 1), Direction::Right, 3);
        GameState::new(snake, Position::new(4, 3), 5, 4)
    }

    #[test]
    fn test_frame_dimensions() {
        let frame = FrameBuffer::new(5, 4, 10);
        assert_eq!(frame.width(), 50);
        assert_eq!(frame.height(), 40);
        assert_eq!(frame.pixels().len(), 50 * 40 * 3);
    }

    #[test]
    fn test_draw_colors_cells() {
        let mut frame = FrameBuffer::new(5, 4, 10);
        frame.draw(&sample_state());

        // Head cell (2,1)
        assert_eq!(frame.pixel(25, 15), HEAD);
        // Food cell (4,3)
        assert_eq!(frame.pixel(45, 35), FOOD);
        // Body cell (1,1): border and inner colors
        assert_eq!(frame.pixel(10, 10), SNAKE_OUTER);
        assert_eq!(frame.pixel(15, 15), SNAKE_INNER);
        // Empty cell (0,3)
        assert_eq!(frame.pixel(5, 35), BACKGROUND);
    }

    #[test]
    fn test_redraw_clears_previous_frame() {
        let mut frame = FrameBuffer::new(5, 4, 10);
        let mut state = sample_state();
        frame.draw(&state);

        state.food = Position::new(0, 0);
        frame.draw(&state);

        assert_eq!(frame.pixel(45, 35), BACKGROUND);
        assert_eq!(frame.pixel(5, 5), FOOD);
    }
}
