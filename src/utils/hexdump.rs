//! Hex dump rendering for request dumps
//!
//! Output follows the familiar `hexdump -C` layout: offset, two groups of eight hex bytes and an
//! ASCII gutter where non-printable bytes show as `.`.

const BYTES_PER_LINE: usize = 16;

/// Render `bytes` as an indented hex dump, one line per 16 bytes.
///
/// Returns an empty string for empty input. Lines are joined with `\n` and carry no trailing
/// newline so the block can be appended to a log message.
pub fn render(bytes: &[u8], indent: &str) -> String {
    bytes
        .chunks(BYTES_PER_LINE)
        .enumerate()
        .map(|(line, chunk)| render_line(line * BYTES_PER_LINE, chunk, indent))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_line(offset: usize, chunk: &[u8], indent: &str) -> String {
    let encoded = hex::encode(chunk);
    let mut columns = String::with_capacity(BYTES_PER_LINE * 3 + 1);
    for (i, pair) in encoded.as_bytes().chunks(2).enumerate() {
        if i == BYTES_PER_LINE / 2 {
            columns.push(' ');
        }
        columns.push_str(std::str::from_utf8(pair).unwrap_or("??"));
        columns.push(' ');
    }

    let ascii: String = chunk
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        })
        .collect();

    format!(
        "{indent}{offset:08x}  {columns:<width$} |{ascii}|",
        width = BYTES_PER_LINE * 3 + 1
    )
}
