//! ANSI emphasis codes, switchable as a unit.
//!
//! A disabled palette returns empty strings for every code, so rendered text
//! differs from the colored version only by the missing escape sequences.
use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

macro_rules! codes {
    ($($name:ident => $code:literal),* $(,)?) => {
        $(
            pub fn $name(&self) -> &'static str {
                if self.enabled { $code } else { "" }
            }
        )*
    };
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Color only for an interactive stdout, and never when disabled by flag or `NO_COLOR`.
    pub fn detect(no_color_flag: bool) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
        if no_color_flag || no_color_env || !std::io::stdout().is_terminal() {
            return Self::plain();
        }
        Self::new(true)
    }

    codes! {
        red => "\x1b[0;31m",
        green => "\x1b[0;32m",
        yellow => "\x1b[0;33m",
        blue => "\x1b[0;34m",
        magenta => "\x1b[0;35m",
        cyan => "\x1b[0;36m",
        white => "\x1b[0;37m",
        bold => "\x1b[1m",
        dim => "\x1b[2m",
        italic => "\x1b[3m",
        reset => "\x1b[0m",
    }
}

/// Remove SGR escape sequences; used to compare colored and plain renders.
#[cfg(test)]
pub fn strip_ansi(text: &str) -> String {
    let pattern = regex::Regex::new(r"\x1b\[[0-9;]*m").expect("valid ansi regex");
    pattern.replace_all(text, "").into_owned()
}
