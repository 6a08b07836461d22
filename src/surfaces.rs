//! External collaborator contracts.
//!
//! The turtle/canvas back-end and the terminal are named-contract-only
//! collaborators: the evaluator only ever talks to them through these two
//! traits. Neither trait's default implementation renders or displays
//! anything — [`NullTurtle`] and [`StdioTerminal`] are the minimal
//! concrete backends a headless CLI interpreter needs, grounded on the
//! teacher's `terminal_words::{unix,windows}` split (one trait, swappable
//! backend) without needing a platform `cfg`, since there is no real
//! display here to split on.

use std::io::{self, Read, Write};

/// `(r, g, b)`, each `0.0..=1.0`.
pub type Rgb = (f64, f64, f64);

/// The abstract turtle/canvas surface. The evaluator forwards
/// commands and queries; the surface owns its own coordinate math.
pub trait TurtleSurface {
    fn forward(&mut self, distance: f64);
    fn rotate(&mut self, angle_degrees: f64);
    fn set_xy(&mut self, x: f64, y: f64);
    fn set_heading(&mut self, heading_degrees: f64);
    fn home(&mut self);
    fn pen_up(&mut self);
    fn pen_down(&mut self);
    fn set_pen_color(&mut self, rgb: Rgb);
    fn set_pen_size(&mut self, size: f64);
    fn begin_fill(&mut self, color: Rgb);
    fn end_fill(&mut self);
    fn draw_arc(&mut self, angle_degrees: f64, radius: f64);
    fn draw_label(&mut self, text: &str);
    fn clear_canvas(&mut self);
    fn set_bounds(&mut self, x: f64, y: f64);

    fn position(&self) -> (f64, f64);
    fn heading(&self) -> f64;
    fn is_pen_down(&self) -> bool;
    fn pen_color(&self) -> Rgb;
    fn pen_size(&self) -> f64;
    fn get_bounds(&self) -> (f64, f64);
    fn is_pen_size_valid(&self, size: f64) -> bool {
        size > 0.0
    }
}

/// Headless turtle: tracks state precisely enough to answer every query
/// primitive (`POS`, `HEADING`, `PENDOWN?`,...) but draws nothing. Used
/// whenever no real display back-end is attached, i.e. always in this CLI.
pub struct NullTurtle {
    x: f64,
    y: f64,
    heading: f64,
    pen_down: bool,
    pen_color: Rgb,
    pen_size: f64,
    bounds: (f64, f64),
}

impl Default for NullTurtle {
    fn default() -> Self {
        NullTurtle {
            x: 0.0,
            y: 0.0,
            heading: 0.0,
            pen_down: true,
            pen_color: (0.0, 0.0, 0.0),
            pen_size: 1.0,
            bounds: (150.0, 150.0),
        }
    }
}

impl TurtleSurface for NullTurtle {
    fn forward(&mut self, distance: f64) {
        let radians = self.heading.to_radians();
        self.x += distance * radians.sin();
        self.y += distance * radians.cos();
    }

    fn rotate(&mut self, angle_degrees: f64) {
        self.heading = (self.heading + angle_degrees).rem_euclid(360.0);
    }

    fn set_xy(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    fn set_heading(&mut self, heading_degrees: f64) {
        self.heading = heading_degrees.rem_euclid(360.0);
    }

    fn home(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.heading = 0.0;
    }

    fn pen_up(&mut self) {
        self.pen_down = false;
    }

    fn pen_down(&mut self) {
        self.pen_down = true;
    }

    fn set_pen_color(&mut self, rgb: Rgb) {
        self.pen_color = rgb;
    }

    fn set_pen_size(&mut self, size: f64) {
        self.pen_size = size;
    }

    fn begin_fill(&mut self, _color: Rgb) {}

    fn end_fill(&mut self) {}

    fn draw_arc(&mut self, _angle_degrees: f64, _radius: f64) {}

    fn draw_label(&mut self, _text: &str) {}

    fn clear_canvas(&mut self) {}

    fn set_bounds(&mut self, x: f64, y: f64) {
        self.bounds = (x, y);
    }

    fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn heading(&self) -> f64 {
        self.heading
    }

    fn is_pen_down(&self) -> bool {
        self.pen_down
    }

    fn pen_color(&self) -> Rgb {
        self.pen_color
    }

    fn pen_size(&self) -> f64 {
        self.pen_size
    }

    fn get_bounds(&self) -> (f64, f64) {
        self.bounds
    }
}

/// The console contract. Only the slice
/// the native primitive catalogue actually drives is implemented; the rest
/// (font/color getters, mouse/button queries) are named-contract stubs for
/// a GUI collaborator this crate does not provide.
pub trait TerminalSurface {
    fn print_to_console(&mut self, text: &str) -> io::Result<()>;
    fn read_char(&mut self) -> io::Result<Option<char>>;
    fn set_dribble(&mut self, path: Option<&str>) -> io::Result<()>;
    fn is_dribbling(&self) -> bool;
}

/// Stdio-backed terminal. `DRIBBLE` appends every [`Self::print_to_console`]
/// call to the named file in addition to stdout, matching
/// "Persisted state".
pub struct StdioTerminal {
    dribble: Option<std::fs::File>,
    dribble_path: Option<String>,
}

impl Default for StdioTerminal {
    fn default() -> Self {
        StdioTerminal { dribble: None, dribble_path: None }
    }
}

impl TerminalSurface for StdioTerminal {
    fn print_to_console(&mut self, text: &str) -> io::Result<()> {
        print!("{}", text);
        io::stdout().flush()?;
        if let Some(file) = &mut self.dribble {
            file.write_all(text.as_bytes())?;
        }
        Ok(())
    }

    fn read_char(&mut self) -> io::Result<Option<char>> {
        let mut byte = [0u8; 1];
        let n = io::stdin().read(&mut byte)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(byte[0] as char))
    }

    fn set_dribble(&mut self, path: Option<&str>) -> io::Result<()> {
        match path {
            Some(p) => {
                self.dribble = Some(std::fs::OpenOptions::new().create(true).append(true).open(p)?);
                self.dribble_path = Some(p.to_string());
            }
            None => {
                self.dribble = None;
                self.dribble_path = None;
            }
        }
        Ok(())
    }

    fn is_dribbling(&self) -> bool {
        self.dribble.is_some()
    }
}
