//! Layout module - static maze geometry
//!
//! A layout is a rectangular text grid:
//!
//! - `#` is a wall
//! - `.` or a space is a free cell
//! - a digit `0`-`9` is a free cell holding the start position of that bot
//!
//! Bot digits must be contiguous from `0`. Cells outside the grid count as
//! walls, so a bot can never leave the layout.

use thiserror::Error;

use crate::types::{BotIndex, Position};

/// Small two-team maze with four bots, used by the binaries when no layout
/// file is given.
pub const DEFAULT_LAYOUT: &str = "\
##################
#0.#.....#......1#
#..#..#..#..##...#
#.....#.....#....#
#2..#...##..#...3#
##################";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout is empty")]
    Empty,
    #[error("row {row} has width {found}, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unexpected character {ch:?} at ({x}, {y})")]
    InvalidChar { ch: char, x: usize, y: usize },
    #[error("bot {0} appears more than once")]
    DuplicateBot(BotIndex),
    #[error("bot {0} is missing (bot digits must be contiguous from 0)")]
    MissingBot(BotIndex),
    #[error("layout has no bots")]
    NoBots,
    #[error("a board needs at least one team")]
    NoTeams,
    #[error("layout is {width}x{height}, at most {max} cells per side are supported")]
    TooLarge {
        width: usize,
        height: usize,
        max: usize,
    },
    #[error("bot {bot} at ({x}, {y}) is not on a free cell")]
    BadStart { bot: BotIndex, x: i16, y: i16 },
}

/// Largest supported width or height, so every cell has an `i16` coordinate.
pub const MAX_DIMENSION: usize = i16::MAX as usize;

/// Parsed maze: walls plus bot start positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    width: u16,
    height: u16,
    /// Row-major wall flags (y * width + x)
    walls: Vec<bool>,
    starts: Vec<Position>,
}

impl Layout {
    /// Parse a layout from its text form
    ///
    /// Leading/trailing blank lines are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridmatch_core::Layout;
    /// use gridmatch_types::Position;
    ///
    /// let layout = Layout::parse("#####\n#0.1#\n#####").unwrap();
    /// assert_eq!(layout.width(), 5);
    /// assert_eq!(layout.height(), 3);
    /// assert_eq!(layout.starts(), &[Position::new(1, 1), Position::new(3, 1)]);
    /// assert!(layout.is_wall(Position::new(0, 0)));
    /// ```
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let mut rows: Vec<&str> = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .skip_while(|l| l.trim().is_empty())
            .collect();
        while rows.last().is_some_and(|l| l.trim().is_empty()) {
            rows.pop();
        }

        let mut found: [Option<Position>; 10] = [None; 10];
        let (width, height, walls) = parse_grid(&rows, |ch, pos| {
            let bot = (ch as u8 - b'0') as usize;
            if found[bot].is_some() {
                return Err(LayoutError::DuplicateBot(bot));
            }
            found[bot] = Some(pos);
            Ok(())
        })?;

        let Some(count) = found.iter().rposition(Option::is_some).map(|i| i + 1) else {
            return Err(LayoutError::NoBots);
        };
        let mut starts = Vec::with_capacity(count);
        for (bot, pos) in found.iter().take(count).enumerate() {
            match pos {
                Some(p) => starts.push(*p),
                None => return Err(LayoutError::MissingBot(bot)),
            }
        }

        Ok(Self {
            width,
            height,
            walls,
            starts,
        })
    }

    /// Rebuild a layout from wall rows (as produced by [`Layout::wall_rows`])
    /// and explicit start positions.
    ///
    /// Every start must be a free cell inside the grid.
    pub fn from_wall_rows<S: AsRef<str>>(
        rows: &[S],
        starts: Vec<Position>,
    ) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = rows.iter().map(AsRef::as_ref).collect();
        let (width, height, walls) = parse_grid(&rows, |ch, pos| {
            Err(LayoutError::InvalidChar {
                ch,
                x: pos.x as usize,
                y: pos.y as usize,
            })
        })?;
        if starts.is_empty() {
            return Err(LayoutError::NoBots);
        }
        let layout = Self {
            width,
            height,
            walls,
            starts,
        };
        if let Some((bot, pos)) = layout
            .starts
            .iter()
            .enumerate()
            .find(|(_, pos)| layout.is_wall(**pos))
        {
            return Err(LayoutError::BadStart {
                bot,
                x: pos.x,
                y: pos.y,
            });
        }
        Ok(layout)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Start positions indexed by bot.
    pub fn starts(&self) -> &[Position] {
        &self.starts
    }

    #[inline(always)]
    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width as i16 || pos.y >= self.height as i16 {
            return None;
        }
        Some(pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Out-of-bounds positions are walls.
    pub fn is_wall(&self, pos: Position) -> bool {
        self.index(pos).map(|i| self.walls[i]).unwrap_or(true)
    }

    /// Render rows with `#` for walls and `.` for free cells (no bots).
    pub fn wall_rows(&self) -> Vec<String> {
        self.walls
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|w| if *w { '#' } else { '.' }).collect())
            .collect()
    }
}

/// Parse wall geometry into `(width, height, walls)`; bot digits are handed
/// to `on_bot`.
fn parse_grid<F>(rows: &[&str], mut on_bot: F) -> Result<(u16, u16, Vec<bool>), LayoutError>
where
    F: FnMut(char, Position) -> Result<(), LayoutError>,
{
    let Some(first) = rows.first() else {
        return Err(LayoutError::Empty);
    };
    let width = first.chars().count();
    if width == 0 {
        return Err(LayoutError::Empty);
    }
    if width > MAX_DIMENSION || rows.len() > MAX_DIMENSION {
        return Err(LayoutError::TooLarge {
            width,
            height: rows.len(),
            max: MAX_DIMENSION,
        });
    }

    let mut walls = Vec::with_capacity(width * rows.len());
    for (y, row) in rows.iter().enumerate() {
        let row_width = row.chars().count();
        if row_width != width {
            return Err(LayoutError::Ragged {
                row: y,
                expected: width,
                found: row_width,
            });
        }
        for (x, ch) in row.chars().enumerate() {
            match ch {
                '#' => walls.push(true),
                '.' | ' ' => walls.push(false),
                '0'..='9' => {
                    on_bot(ch, Position::new(x as i16, y as i16))?;
                    walls.push(false);
                }
                _ => return Err(LayoutError::InvalidChar { ch, x, y }),
            }
        }
    }
    Ok((width as u16, rows.len() as u16, walls))
}
