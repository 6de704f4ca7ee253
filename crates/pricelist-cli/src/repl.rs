//! Interactive editing session over stdin
//!
//! Row numbers typed by the operator are 1-based; the session is 0-based.

use crate::ExportFormat;
use pricelist_core::export::write_artifact;
use pricelist_core::{FieldValue, PriceListService, Session};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const HELP: &str = "\
Commands:
  show                         list rows
  headers                      list working headers
  add                          insert a blank row at the top
  set <row> <field> <value>    edit one field (row numbers start at 1)
  delete <row>                 remove a row; later rows move up
  clear                        remove all rows (asks first)
  paste                        read brand,model,type,dp,mrp lines until a lone '.'
  extract <file>               replace rows with rows extracted from a document
  export <csv|json|canonical> [dir]
                               write a timestamped export file
  preview                      show the normalized rows that would be imported
  submit                       import all rows; clears them on success
  raw                          show the text of the last extracted document
  status                       show the last status message
  help                         show this help
  quit                         leave the session";

/// One parsed operator command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Show,
    Headers,
    Add,
    Set {
        index: usize,
        field: String,
        value: String,
    },
    Delete {
        index: usize,
    },
    Clear,
    Paste,
    Extract {
        path: PathBuf,
    },
    Export {
        format: ExportFormat,
        dir: PathBuf,
    },
    Preview,
    Submit,
    Raw,
    Status,
    Help,
    Quit,
}

/// Parse one input line; `Ok(None)` for a blank line
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "show" | "ls" => Command::Show,
        "headers" => Command::Headers,
        "add" => Command::Add,
        "set" => {
            let mut parts = rest.splitn(3, char::is_whitespace);
            let row = parts.next().unwrap_or("");
            let field = parts.next().unwrap_or("");
            if field.is_empty() {
                return Err("usage: set <row> <field> <value>".to_string());
            }
            Command::Set {
                index: parse_row(row)?,
                field: field.to_string(),
                value: parts.next().unwrap_or("").trim().to_string(),
            }
        }
        "delete" | "rm" => Command::Delete {
            index: parse_row(rest)?,
        },
        "clear" => Command::Clear,
        "paste" => Command::Paste,
        "extract" => {
            if rest.is_empty() {
                return Err("usage: extract <file>".to_string());
            }
            Command::Extract {
                path: PathBuf::from(rest),
            }
        }
        "export" => {
            let mut parts = rest.split_whitespace();
            let format = match parts.next().map(|f| f.to_lowercase()).as_deref() {
                Some("csv") => ExportFormat::Csv,
                Some("json") => ExportFormat::Json,
                Some("canonical") => ExportFormat::Canonical,
                _ => return Err("usage: export <csv|json|canonical> [dir]".to_string()),
            };
            Command::Export {
                format,
                dir: PathBuf::from(parts.next().unwrap_or(".")),
            }
        }
        "preview" => Command::Preview,
        "submit" | "import" => Command::Submit,
        "raw" => Command::Raw,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{}', type 'help'", other)),
    };

    Ok(Some(command))
}

fn parse_row(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("row numbers start at 1".to_string()),
        Ok(n) => Ok(n - 1),
        Err(_) => Err(format!("invalid row number '{}'", s.trim())),
    }
}

/// Read commands from `input` until `quit` or end of input
pub fn run<R, W, S>(session: &mut Session, service: &S, input: R, out: &mut W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    S: PriceListService + ?Sized,
{
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "Error: {}", message)?;
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Paste => {
                let mut text = String::new();
                for line in lines.by_ref() {
                    let line = line?;
                    if line.trim() == "." {
                        break;
                    }
                    text.push_str(&line);
                    text.push('\n');
                }
                session.ingest_paste(&text);
                writeln!(out, "{}", session.status())?;
            }
            Command::Clear if !session.is_empty() => {
                write!(out, "Clear all {} rows? (y/N): ", session.len())?;
                out.flush()?;

                let answer = match lines.next() {
                    Some(line) => line?,
                    None => String::new(),
                };
                let answer = answer.trim();
                if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
                    execute(session, service, Command::Clear, out)?;
                } else {
                    writeln!(out, "Clear cancelled")?;
                }
            }
            command => execute(session, service, command, out)?,
        }
    }

    Ok(())
}

fn execute<W, S>(session: &mut Session, service: &S, command: Command, out: &mut W) -> io::Result<()>
where
    W: Write,
    S: PriceListService + ?Sized,
{
    match command {
        Command::Show => print_rows(session, out)?,
        Command::Headers => writeln!(out, "{}", session.headers().join(", "))?,
        Command::Add => {
            session.add_row();
            writeln!(out, "{}", session.status())?;
        }
        Command::Set {
            index,
            field,
            value,
        } => {
            if session.set_field(index, &field, FieldValue::parse(&value)) {
                writeln!(out, "Row {} updated", index + 1)?;
            } else {
                writeln!(out, "Error: no row {}", index + 1)?;
            }
        }
        Command::Delete { index } => match session.delete_row(index) {
            Some(_) => writeln!(out, "Row {} deleted ({} left)", index + 1, session.len())?,
            None => writeln!(out, "Error: no row {}", index + 1)?,
        },
        Command::Clear => {
            session.clear();
            writeln!(out, "All rows cleared")?;
        }
        Command::Extract { path } => match fs::read(&path) {
            Ok(bytes) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload.pdf".to_string());
                // Failures are reported through the status message
                let _ = session.extract(service, &name, bytes);
                writeln!(out, "{}", session.status())?;
            }
            Err(e) => writeln!(out, "Error: cannot read '{}': {}", path.display(), e)?,
        },
        Command::Export { format, dir } => {
            let written = format
                .encode(session)
                .and_then(|content| write_artifact(&dir, format.artifact_kind(), &content));
            match written {
                Ok(path) => writeln!(out, "Exported {} rows to {}", session.len(), path.display())?,
                Err(e) => writeln!(out, "Error: {}", e)?,
            }
        }
        Command::Preview => {
            for (i, record) in session.payload().iter().enumerate() {
                writeln!(out, "{}\t{}", i + 1, record.values().join("\t"))?;
            }
        }
        Command::Submit => {
            let _ = session.submit(service);
            writeln!(out, "{}", session.status())?;
        }
        Command::Raw => writeln!(out, "{}", session.raw_text())?,
        Command::Status => writeln!(out, "{}", session.status())?,
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Paste | Command::Quit => {}
    }

    Ok(())
}

fn print_rows<W: Write>(session: &Session, out: &mut W) -> io::Result<()> {
    let headers = session.headers();
    writeln!(out, "#\t{}", headers.join("\t"))?;
    writeln!(out, "{}", "-".repeat((headers.len() + 1) * 12))?;

    for (i, row) in session.rows().iter().enumerate() {
        let values: Vec<String> = headers
            .iter()
            .map(|h| row.get(h).map(|v| v.to_string_value()).unwrap_or_default())
            .collect();
        writeln!(out, "{}\t{}", i + 1, values.join("\t"))?;
    }

    writeln!(out, "({} rows)", session.len())
}
