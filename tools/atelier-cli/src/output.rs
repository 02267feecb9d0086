//! Output formatting for the CLI.

use atelier_commerce::Money;
use console::style;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Money rendered for a table cell; discounts shown negative and green.
pub fn money_cell(amount: Money, negative: bool) -> String {
    if negative && amount.is_positive() {
        style(format!("-{}", amount.display())).green().to_string()
    } else {
        amount.display()
    }
}

/// A coloured marker for presets and applied coupons.
pub fn active_badge(active: bool) -> String {
    if active {
        style("active").green().to_string()
    } else {
        String::new()
    }
}

/// Draw a fixed-width progress bar, e.g. `[#####>----] 50%`, coloured like
/// the interactive bars (`cyan/blue`, `#>-`).
pub fn progress_bar(percent: u8, width: usize) -> String {
    let (done, rest) = progress_track(percent, width);
    format!("[{}{}] {}%", style(done).cyan(), style(rest).blue(), percent)
}

fn progress_track(percent: u8, width: usize) -> (String, String) {
    let filled = (usize::from(percent.min(100)) * width) / 100;
    let rest = match width - filled {
        0 => String::new(),
        n => format!(">{}", "-".repeat(n - 1)),
    };
    ("#".repeat(filled), rest)
}
