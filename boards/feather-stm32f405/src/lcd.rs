//! HD44780 character LCD behind a PCF8574 I2C backpack
//!
//! The expander drives the panel in 4-bit mode. Backpack wiring:
//!
//! | PCF8574 | P0 | P1 | P2 | P3        | P4-P7  |
//! |---------|----|----|----|-----------|--------|
//! | HD44780 | RS | RW | E  | backlight | D4-D7  |

use clock_hal::{CharacterDisplay, DisplayError};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Usual address of a PCF8574 backpack with A0-A2 pulled high
pub const DEFAULT_ADDRESS: u8 = 0x27;

const NUM_ROWS: u8 = 2;
const NUM_COLS: u8 = 16;

const RS: u8 = 0x01;
const ENABLE: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x04;
const CMD_DISPLAY_CONTROL: u8 = 0x08;
const CMD_FUNCTION_SET: u8 = 0x20;
const CMD_SET_DDRAM: u8 = 0x80;

const ENTRY_INCREMENT: u8 = 0x02;
const DISPLAY_ON: u8 = 0x04;
const CURSOR_ON: u8 = 0x02;
const BLINK_ON: u8 = 0x01;
const FUNCTION_2_LINES: u8 = 0x08;

/// DDRAM address of each row's first column
const ROW_OFFSETS: [u8; NUM_ROWS as usize] = [0x00, 0x40];

pub struct Hd44780<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    backlight: bool,
    display_control: u8,
}

impl<I: I2c, D: DelayNs> Hd44780<I, D> {
    /// Run the 4-bit initialization sequence and blank the panel
    pub fn new(i2c: I, delay: D, address: u8) -> Result<Self, DisplayError> {
        let mut lcd = Self {
            i2c,
            delay,
            address,
            backlight: false,
            display_control: DISPLAY_ON | CURSOR_ON | BLINK_ON,
        };

        // Power-on wait, then force 8-bit mode three times before 4-bit
        lcd.delay.delay_ms(50);
        lcd.expander_write(0)?;
        for wait_us in [4_500, 4_500, 150] {
            lcd.pulse(0x30)?;
            lcd.delay.delay_us(wait_us);
        }
        lcd.pulse(0x20)?;

        lcd.command(CMD_FUNCTION_SET | FUNCTION_2_LINES)?;
        lcd.command(CMD_DISPLAY_CONTROL | lcd.display_control)?;
        lcd.clear()?;
        lcd.command(CMD_ENTRY_MODE | ENTRY_INCREMENT)?;
        Ok(lcd)
    }

    fn expander_write(&mut self, bits: u8) -> Result<(), DisplayError> {
        let backlight = if self.backlight { BACKLIGHT } else { 0 };
        self.i2c
            .write(self.address, &[bits | backlight])
            .map_err(|_| DisplayError::Bus)
    }

    /// Latch the upper nibble of `bits` on a falling E edge
    fn pulse(&mut self, bits: u8) -> Result<(), DisplayError> {
        self.expander_write(bits | ENABLE)?;
        self.delay.delay_us(1);
        self.expander_write(bits & !ENABLE)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn send(&mut self, value: u8, mode: u8) -> Result<(), DisplayError> {
        self.pulse((value & 0xF0) | mode)?;
        self.pulse((value << 4) | mode)
    }

    fn command(&mut self, value: u8) -> Result<(), DisplayError> {
        self.send(value, 0)
    }
}

impl<I: I2c, D: DelayNs> CharacterDisplay for Hd44780<I, D> {
    fn hide_cursor(&mut self) -> Result<(), DisplayError> {
        self.display_control &= !(CURSOR_ON | BLINK_ON);
        self.command(CMD_DISPLAY_CONTROL | self.display_control)
    }

    fn backlight_on(&mut self) -> Result<(), DisplayError> {
        self.backlight = true;
        self.expander_write(0)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    fn move_to(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        if col >= NUM_COLS || row >= NUM_ROWS {
            return Err(DisplayError::OutOfBounds);
        }
        self.command(CMD_SET_DDRAM | (ROW_OFFSETS[usize::from(row)] + col))
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        for byte in text.bytes() {
            let glyph = if byte.is_ascii() { byte } else { b'?' };
            self.send(glyph, RS)?;
        }
        Ok(())
    }
}
