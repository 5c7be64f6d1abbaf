use ratatui::style::Color;
use soubitui::{rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, Theme};

// Color parsing depends on NO_COLOR, so clear it before constructing
// a parser
fn parser() -> ColorParser {
    std::env::remove_var("NO_COLOR");
    ColorParser::new()
}

#[test]
fn test_parse_default_palette() {
    let parser = parser();

    // every color string the default config uses
    assert_eq!(parser.parse("cyan").unwrap(), Color::Cyan);
    assert_eq!(parser.parse("yellow").unwrap(), Color::Yellow);
    assert_eq!(parser.parse("red").unwrap(), Color::Red);
    assert_eq!(parser.parse("black").unwrap(), Color::Black);
    assert_eq!(parser.parse("white").unwrap(), Color::White);
    assert_eq!(parser.parse("dark_gray").unwrap(), Color::Indexed(8));
    assert_eq!(parser.parse("indexed(236)").unwrap(), Color::Indexed(236));
    assert_eq!(parser.parse("reversed").unwrap(), Color::Reset);
}

#[test]
fn test_parse_aliases_and_case() {
    let parser = parser();

    assert_eq!(parser.parse("CYAN").unwrap(), Color::Cyan);
    assert_eq!(parser.parse(" yellow ").unwrap(), Color::Yellow);
    assert_eq!(parser.parse("bright_yellow").unwrap(), Color::Indexed(11));
    assert_eq!(parser.parse("bright yellow").unwrap(), Color::Indexed(11));
    assert_eq!(parser.parse("grey").unwrap(), Color::Indexed(8));
    assert_eq!(parser.parse("light_gray").unwrap(), Color::Indexed(7));
    assert_eq!(parser.parse("Indexed(100)").unwrap(), Color::Indexed(100));
    assert_eq!(parser.parse("reset").unwrap(), Color::Reset);
}

#[test]
fn test_parse_hex() {
    let parser = parser();

    // the concrete Color depends on terminal capability, so only the
    // parse outcome is asserted
    assert!(parser.parse("#8be9fd").is_ok());
    assert!(parser.parse("#FF0000").is_ok());

    assert!(parser.parse("#ff00").is_err()); // too short
    assert!(parser.parse("#ff00000").is_err()); // too long
    assert!(parser.parse("ff0000").is_err()); // missing #
    assert!(parser.parse("#gggggg").is_err()); // not hex
}

#[test]
fn test_parse_rejects_bad_input() {
    let parser = parser();

    let err = parser.parse("sparkly").unwrap_err();
    assert!(err.to_string().contains("Unknown color"));

    assert!(parser.parse("indexed(999)").is_err());
    assert!(parser.parse("indexed(abc)").is_err());
    assert!(parser.parse("indexed()").is_err());
}

#[test]
#[ignore] // mutates the process environment, unsafe alongside parallel tests
fn test_no_color_disables_everything() {
    let original = std::env::var("NO_COLOR").ok();
    std::env::set_var("NO_COLOR", "1");

    let parser = ColorParser::new();
    assert_eq!(parser.parse("cyan").unwrap(), Color::Reset);
    assert_eq!(parser.parse("#8be9fd").unwrap(), Color::Reset);

    match original {
        Some(val) => std::env::set_var("NO_COLOR", val),
        None => std::env::remove_var("NO_COLOR"),
    }
}

#[test]
fn test_rgb_downgrade_paths() {
    // 256-color cube and grayscale ramp endpoints
    assert_eq!(rgb_to_256_color(0, 0, 0), 16);
    assert_eq!(rgb_to_256_color(255, 255, 255), 231);
    assert!(rgb_to_256_color(128, 128, 128) >= 232);
    assert!((16..=231).contains(&rgb_to_256_color(139, 233, 253)));

    // basic ANSI fallback
    assert_eq!(rgb_to_basic_ansi(0, 255, 255), Color::Cyan);
    assert_eq!(rgb_to_basic_ansi(255, 255, 0), Color::Yellow);
    assert_eq!(rgb_to_basic_ansi(30, 30, 30), Color::Black);
    assert_eq!(rgb_to_basic_ansi(200, 200, 200), Color::White);
}

#[test]
fn test_theme_resolves_configured_names() {
    std::env::remove_var("NO_COLOR");
    let theme = Theme::from_config(&AppConfig::default().theme).unwrap();

    assert_eq!(theme.get("panel_border"), Color::Cyan);
    assert_eq!(theme.get("sort_indicator"), Color::Yellow);
    assert_eq!(theme.get("table_header_bg"), Color::Indexed(236));
    // names outside the palette fall back to Reset
    assert_eq!(theme.get("no_such_name"), Color::Reset);
}

#[test]
fn test_theme_with_customized_palette() {
    std::env::remove_var("NO_COLOR");
    let mut config = AppConfig::default();
    config.theme.colors.primary = "#8be9fd".to_string();
    config.theme.colors.sort_indicator = "bright_yellow".to_string();

    let theme = Theme::from_config(&config.theme).unwrap();
    assert_eq!(theme.get("sort_indicator"), Color::Indexed(11));

    config.theme.colors.panel_border = "sparkly".to_string();
    let err = Theme::from_config(&config.theme).unwrap_err();
    assert!(err.to_string().contains("Unknown color name"));
}
