use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for the pipeline's terminal output
#[derive(Debug, Clone)]
pub struct Theme {
    /// Banners and section titles
    pub title: Style,
    /// Field labels in `label: value` lines
    pub label: Style,
    /// Package names
    pub package: Style,
    /// Stage completed
    pub ok: Style,
    /// Stage failed
    pub failure: Style,
    /// Skipped packages, recoverable problems
    pub caution: Style,
    /// Counts in summaries
    pub count: Style,
}

impl Theme {
    pub fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::for_terminal(console::Term::stdout().is_term(), no_color)
    }

    /// Colors only on a terminal, and never when `NO_COLOR` is set
    pub fn for_terminal(is_term: bool, no_color: bool) -> Self {
        if is_term && !no_color {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().bright_black(),
            package: Style::new().blue(),
            ok: Style::new().green().bold(),
            failure: Style::new().red().bold(),
            caution: Style::new().yellow(),
            count: Style::new().magenta().bold(),
        }
    }

    pub fn plain() -> Self {
        Self {
            title: Style::new(),
            label: Style::new(),
            package: Style::new(),
            ok: Style::new(),
            failure: Style::new(),
            caution: Style::new(),
            count: Style::new(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_no_color_renders_plain() {
        let theme = Theme::for_terminal(true, true);
        assert_eq!("flask".style(theme.package.clone()).to_string(), "flask");

        let piped = Theme::for_terminal(false, false);
        assert_eq!("3".style(piped.count.clone()).to_string(), "3");
    }
}
