use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;

use crate::config::MAX_DEFAULT_JOBS;
use crate::encoding::DEFAULT_LYRICS_ENCODING;
use crate::matcher::{DEFAULT_AUDIO_EXTENSIONS, DEFAULT_COVER_EXTENSIONS, DEFAULT_LYRICS_EXTENSIONS};

fn fg(color: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(color)))
}

pub fn get_styles() -> Styles {
    Styles::styled()
        .usage(fg(AnsiColor::Yellow).bold())
        .header(fg(AnsiColor::Yellow).bold().underline())
        .literal(fg(AnsiColor::Magenta).bold())
        .placeholder(fg(AnsiColor::BrightBlack).italic())
        .valid(fg(AnsiColor::Green))
        .invalid(fg(AnsiColor::Red).bold())
        .error(fg(AnsiColor::Red).bold())
}

/// Help footer describing how files are matched.
pub fn after_help() -> String {
    format!(
        "Matching:\n  \
         Audio files ({}) are paired with lyrics ({}) and covers ({})\n  \
         by file name, ignoring case and extension.\n  \
         Lyrics are read as {} unless --encoding says otherwise.\n  \
         Up to {} files are processed at once unless --jobs says otherwise.\n\n\
         Set LOG_LEVEL=debug for more detail.",
        DEFAULT_AUDIO_EXTENSIONS.join(", "),
        DEFAULT_LYRICS_EXTENSIONS.join(", "),
        DEFAULT_COVER_EXTENSIONS.join(", "),
        DEFAULT_LYRICS_ENCODING,
        MAX_DEFAULT_JOBS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_help_lists_defaults() {
        let help = after_help();
        assert!(help.contains("mp3, flac, m4a"));
        assert!(help.contains("(lrc)"));
        assert!(help.contains("jpg, jpeg, png, bmp, gif, webp"));
        assert!(help.contains("read as gb2312"));
        assert!(help.contains("Up to 4 files"));
    }

    #[test]
    fn test_styles_use_own_palette() {
        let styles = get_styles();
        assert_eq!(
            styles.get_header().get_fg_color(),
            Some(Color::Ansi(AnsiColor::Yellow))
        );
        assert_eq!(
            styles.get_literal().get_fg_color(),
            Some(Color::Ansi(AnsiColor::Magenta))
        );
    }
}
