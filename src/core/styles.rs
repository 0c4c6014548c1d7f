//! Style roles for terminal output
//!
//! Each logical role maps to an optional `colored::Color`. Nothing is coloured
//! unless the caller passes `enabled = true`, so there is no global state.
//!
//! ```
//! use wim::core::styles::StyleRole;
//! assert_eq!(StyleRole::Header.paint("Plugin", false), "Plugin");
//! assert!(StyleRole::Header.paint("Plugin", true).starts_with("\x1b[33m"));
//! ```

use clap::builder::styling::AnsiColor;
use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Header  => Some(Color::Yellow),
    Key     => Some(Color::BrightGreen),
    Version => Some(Color::Cyan),
    Method  => Some(Color::Blue),
    Path    => None,
    Missing => Some(Color::BrightBlack),
    Error   => Some(Color::BrightRed),
}

impl StyleRole {
    pub fn ansi_code(self) -> Option<&'static str> {
        self.color().and_then(ansi_code)
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.ansi_code() {
            Some(code) if enabled => format!("\x1b[{}m{}\x1b[0m", code, text),
            _ => text.to_string(),
        }
    }

    /// Foreground colour as a prettytable style spec, e.g. `"Fy"`
    pub fn prettytable_spec(self) -> Option<&'static str> {
        Some(match self.color()? {
            Color::Red => "Fr",
            Color::Green => "Fg",
            Color::Yellow => "Fy",
            Color::Blue => "Fb",
            Color::Cyan => "Fc",
            Color::BrightBlack => "FK",
            Color::BrightRed => "FR",
            Color::BrightGreen => "FG",
            _ => return None,
        })
    }
}

fn ansi_code(color: Color) -> Option<&'static str> {
    Some(match color {
        Color::Red => "31",
        Color::Green => "32",
        Color::Yellow => "33",
        Color::Blue => "34",
        Color::Cyan => "36",
        Color::BrightBlack => "90",
        Color::BrightRed => "91",
        Color::BrightGreen => "92",
        _ => return None,
    })
}

fn clap_color(color: Color) -> Option<AnsiColor> {
    Some(match color {
        Color::Red => AnsiColor::Red,
        Color::Green => AnsiColor::Green,
        Color::Yellow => AnsiColor::Yellow,
        Color::Blue => AnsiColor::Blue,
        Color::Cyan => AnsiColor::Cyan,
        Color::BrightBlack => AnsiColor::BrightBlack,
        Color::BrightRed => AnsiColor::BrightRed,
        Color::BrightGreen => AnsiColor::BrightGreen,
        _ => return None,
    })
}

/// clap help styles built from the same roles
pub fn help_styles(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(col) = role.color().and_then(clap_color) {
            s = s.fg_color(Some(ClapColor::Ansi(col)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .usage(style(StyleRole::Header, true))
        .literal(style(StyleRole::Key, false))
        .placeholder(style(StyleRole::Version, false))
        .error(style(StyleRole::Error, true))
}
