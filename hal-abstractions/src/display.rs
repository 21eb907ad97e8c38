//! Character display trait

/// Display bus errors
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// Bus transfer (I2C/SPI) failed
    Bus,
    /// Cursor position outside the panel
    OutOfBounds,
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus => write!(f, "Display bus error"),
            Self::OutOfBounds => write!(f, "Cursor out of bounds"),
        }
    }
}

impl core::error::Error for DisplayError {}

/// Row/column character LCD (HD44780 class)
///
/// `hide_cursor`, `backlight_on` and `clear` are one-time setup calls; the
/// steady-state contract is `move_to` + `write_text`.
pub trait CharacterDisplay {
    fn hide_cursor(&mut self) -> Result<(), DisplayError>;

    fn backlight_on(&mut self) -> Result<(), DisplayError>;

    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Move the cursor to zero-based `col`, `row`
    fn move_to(&mut self, col: u8, row: u8) -> Result<(), DisplayError>;

    /// Write ASCII text at the cursor, advancing it
    fn write_text(&mut self, text: &str) -> Result<(), DisplayError>;
}
