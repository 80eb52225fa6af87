//! rnkit CLI UI primitives.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use rnkit_engine::generate::{ProjectIndex, Report};

/// Terminal palette
pub mod colors {
    use console::Color;

    pub const CYAN: Color = Color::Color256(45);       // React cyan
    pub const MAGENTA: Color = Color::Color256(201);   // Hot magenta
    pub const VIOLET: Color = Color::Color256(135);    // Soft violet
    pub const GREEN: Color = Color::Color256(82);      // Neon green
    pub const YELLOW: Color = Color::Color256(220);    // Warning
    pub const DIM: Color = Color::Color256(240);       // Dim gray
}

pub mod symbols {
    pub const DIAMOND: &str = "\u{25C6}";          // ◆
    pub const DIAMOND_OUTLINE: &str = "\u{25C7}";  // ◇
    pub const TARGET_FILLED: &str = "\u{25C9}";    // ◉
    pub const TRIANGLE: &str = "\u{25B8}";         // ▸
    pub const PLUS: &str = "+";
    pub const TILDE: &str = "~";
    pub const DOT: &str = "\u{00B7}";              // ·
}

/// HSL to RGB conversion for gradients
fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

/// Gradient across text (cyan -> violet)
pub fn gradient_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    let len = chars.len() as f32;
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if c.is_whitespace() {
                c.to_string()
            } else {
                let hue = 190.0 + (i as f32 / len * 80.0);
                let (r, g, b) = hsl_to_rgb(hue, 1.0, 0.6);
                format!("\x1b[38;2;{};{};{}m{}\x1b[0m", r, g, b, c)
            }
        })
        .collect()
}

/// Title shown above the interactive menu
pub fn title(version: &str) -> String {
    format!("{} {}", gradient_text("rnkit"), style(version).dim())
}

pub fn success(msg: &str) {
    println!(
        "  {} {}",
        style(symbols::TARGET_FILLED).fg(colors::GREEN),
        msg
    );
}

pub fn error(msg: &str) {
    eprintln!(
        "  {} {}",
        style(symbols::DIAMOND).fg(colors::MAGENTA),
        style(msg).fg(colors::MAGENTA)
    );
}

pub fn warning(msg: &str) {
    eprintln!(
        "  {} {}",
        style(symbols::DIAMOND_OUTLINE).fg(colors::YELLOW),
        style(msg).fg(colors::YELLOW)
    );
}

pub fn info(msg: &str) {
    println!(
        "  {} {}",
        style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN),
        msg
    );
}

pub fn dim(msg: &str) {
    println!("  {}", style(msg).fg(colors::DIM));
}

/// Spinner shown while the external formatter runs
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("\u{25CE}\u{25C9}\u{25CE}\u{25C9}") // ◎◉◎◉
        .template("  {spinner:.cyan} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// One written file: `+` created, `~` modified.
pub fn file_line(path: &Path, created: bool) {
    let (marker, color) = if created {
        (symbols::PLUS, colors::GREEN)
    } else {
        (symbols::TILDE, colors::VIOLET)
    };
    println!(
        "    {} {}",
        style(marker).fg(color).bold(),
        style(path.display()).fg(colors::CYAN)
    );
}

/// Summary of one generator run.
pub fn report(report: &Report) {
    if report.is_empty() {
        info(&format!("{}: nothing to change", report.generator));
        return;
    }
    success(&format!(
        "{} {} {} created {} {} modified",
        style(report.generator).bold(),
        symbols::DOT,
        report.created.len(),
        symbols::DOT,
        report.modified.len()
    ));
    for path in &report.created {
        file_line(path, true);
    }
    for path in &report.modified {
        file_line(path, false);
    }
}

fn tree_dir(name: &str, count: usize) {
    println!(
        "  {} {} {}",
        style(symbols::TRIANGLE).fg(colors::CYAN),
        style(name).fg(colors::CYAN).bold(),
        style(format!("({count})")).dim()
    );
}

fn tree_item(name: &str, description: &str, is_last: bool) {
    let connector = if is_last {
        "\u{2570}\u{2500}\u{2500}" // ╰──
    } else {
        "\u{251C}\u{2500}\u{2500}" // ├──
    };
    println!(
        "    {}  {}   {}",
        style(connector).fg(colors::DIM),
        style(name).fg(colors::CYAN),
        style(description).dim()
    );
}

fn tree<T>(name: &str, items: &[T], describe: impl Fn(&T) -> (String, String)) {
    tree_dir(name, items.len());
    for (i, item) in items.iter().enumerate() {
        let (label, description) = describe(item);
        tree_item(&label, &description, i + 1 == items.len());
    }
}

/// Everything the generators can target.
pub fn index(index: &ProjectIndex) {
    tree("views", &index.views, |v| {
        let kind = v.kind.map(|k| k.label()).unwrap_or("unknown");
        (v.name.clone(), format!("{} {} {}", v.location.label(), symbols::DOT, kind))
    });
    tree("reducers", &index.reducers, |r| {
        (r.key.clone(), format!("{} fields", r.fields.len()))
    });
    tree("thunks", &index.thunks, |t| (t.name.clone(), t.path.display().to_string()));
    tree("navigators", &index.navigators, |n| {
        (n.name.clone(), format!("{} {} {}", n.kind.label(), symbols::DOT, n.path.display()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsl_to_rgb() {
        let (r, g, b) = hsl_to_rgb(180.0, 1.0, 0.5);
        assert_eq!(r, 0);
        assert!(g > 200);
        assert!(b > 200);
    }

    #[test]
    fn test_gradient_text_empty() {
        assert_eq!(gradient_text(""), "");
    }

    #[test]
    fn test_gradient_keeps_whitespace() {
        let text = gradient_text("a b");
        assert!(text.contains(" "));
        assert_eq!(text.matches("\x1b[0m").count(), 2);
    }
}
