//! Binary that emits command-line options markdown to stdout.
//!
//! Used to refresh the options section of the README.

fn main() {
    print!("{}", soubitui_cli::render_options_markdown());
}
