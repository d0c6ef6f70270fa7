use std::io::Write;

const CLEAR_LINE: &str = "\x1b[2K\r";

/// Text drawn for batch `number` of `total`.
pub fn progress_line(number: usize, total: usize) -> String {
    let progress = if total == 0 { 100.0 } else { number as f64 / total as f64 * 100.0 };
    format!("{CLEAR_LINE}[INFO] Epoch Progress : {progress:.2}%")
}

/// Redraws the progress line on stderr; the line is wiped after the last batch.
pub fn display_progress(number: usize, total: usize) {
    let mut stderr = std::io::stderr().lock();
    let _ = write!(stderr, "{}", progress_line(number, total));
    if number + 1 >= total {
        let _ = write!(stderr, "{CLEAR_LINE}");
    }
    let _ = stderr.flush();
}
