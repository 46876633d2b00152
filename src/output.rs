//! Terminal rendering of search results

use crate::entry::{Entry, SearchResult};
use std::io;
use std::path::Path;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print a result to stdout.
///
/// Colors are used only when `color` is set and stdout supports them.
pub fn print_search_result(result: &SearchResult, color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_search_result(&mut stdout, result)?;
    Ok(())
}

/// Render `result`: a header per file with entries, one line per entry, and
/// `Nothing found` if no file had any.
///
/// Returns whether anything was found.
pub fn write_search_result<W: WriteColor>(out: &mut W, result: &SearchResult) -> io::Result<bool> {
    let mut found_something = false;

    for (path, entries) in result {
        if entries.is_empty() {
            continue;
        }
        found_something = true;

        print_file_header(out, path)?;
        for entry in entries {
            print_entry_line(out, entry)?;
            if let Some(source) = &entry.source_text {
                print_source(out, source)?;
            }
        }
    }

    if !found_something {
        writeln!(out, "Nothing found")?;
    }
    out.flush()?;

    Ok(found_something)
}

fn print_file_header<W: WriteColor>(out: &mut W, path: &Path) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "{}", path.display())?;
    out.reset()?;
    writeln!(out)
}

/// Print an entry line with the matched part of the name highlighted
fn print_entry_line<W: WriteColor>(out: &mut W, entry: &Entry) -> io::Result<()> {
    write!(out, "\t{} [{}:{}]: ", entry.kind, entry.line, entry.col)?;

    let (before, matched, after) = entry.highlight_parts();
    write!(out, "{}", before)?;
    if !matched.is_empty() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        write!(out, "{}", matched)?;
        out.reset()?;
    }
    writeln!(out, "{}", after)
}

fn print_source<W: WriteColor>(out: &mut W, source: &str) -> io::Result<()> {
    for line in source.lines() {
        writeln!(out, "\t\t{}", line)?;
    }
    Ok(())
}
