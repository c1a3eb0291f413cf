//! canvasdoc CLI - search, lay out and convert editor documents

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use canvasdoc::render::RecordingSurface;
use canvasdoc::{load_elements, Editor, EditorOptions, Element, MatchLocation};

#[derive(Parser)]
#[command(name = "canvasdoc")]
#[command(version)]
#[command(about = "Search, lay out and convert canvas editor documents", long_about = None)]
struct Cli {
    /// Editor options as a JSON file
    #[arg(long, global = true, value_name = "FILE", env = "CANVASDOC_OPTIONS")]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find every occurrence of a query
    Search {
        /// Element list JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Text to search for (case-sensitive)
        #[arg(value_name = "QUERY")]
        query: String,

        /// Output matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute the position list
    Layout {
        /// Element list JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Draw search highlights of one page and print the draw commands
    Highlight {
        /// Element list JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Text to search for (case-sensitive)
        #[arg(value_name = "QUERY")]
        query: String,

        /// Page number (0-indexed)
        #[arg(short, long, default_value = "0")]
        page: usize,

        /// Number of navigation steps before drawing
        #[arg(long, default_value = "0")]
        navigate: usize,
    },

    /// Convert elements to clipboard HTML and text
    Copy {
        /// Element list JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Element range (e.g., "0-4"), whole list if not specified
        #[arg(long)]
        range: Option<String>,

        /// Print the plain text flavor instead of HTML
        #[arg(long)]
        text: bool,
    },

    /// Convert clipboard HTML to an element list
    Paste {
        /// HTML file
        #[arg(value_name = "HTML")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show document information
    Info {
        /// Element list JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = load_options(cli.options.as_deref()).and_then(|options| match cli.command {
        Commands::Search { input, query, json } => cmd_search(&input, &query, json, options),
        Commands::Layout {
            input,
            output,
            compact,
        } => cmd_layout(&input, output.as_deref(), compact, options),
        Commands::Highlight {
            input,
            query,
            page,
            navigate,
        } => cmd_highlight(&input, &query, page, navigate, options),
        Commands::Copy { input, range, text } => {
            cmd_copy(&input, range.as_deref(), text, options)
        }
        Commands::Paste { input, output } => cmd_paste(&input, output.as_deref(), options),
        Commands::Info { input } => cmd_info(&input, options),
    });

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_options(path: Option<&Path>) -> Result<EditorOptions, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(EditorOptions::from_json(&json)?)
        }
        None => Ok(EditorOptions::default()),
    }
}

fn open_editor(input: &Path, options: EditorOptions) -> Result<Editor, Box<dyn std::error::Error>> {
    let elements = load_elements(input)?;
    log::info!("loaded {} elements from {}", elements.len(), input.display());
    Ok(Editor::with_elements(options, elements))
}

fn parse_range(value: &str, len: usize) -> Result<Range<usize>, String> {
    let (start, end) = match value.split_once('-') {
        Some((start, end)) => (start.trim(), end.trim()),
        None => (value.trim(), value.trim()),
    };
    let start: usize = start
        .parse()
        .map_err(|_| format!("Invalid range start: {}", start))?;
    let end: usize = if end.is_empty() {
        len.saturating_sub(1)
    } else {
        end.parse().map_err(|_| format!("Invalid range end: {}", end))?
    };
    if start > end {
        return Err(format!("Range start {} is after end {}", start, end));
    }
    Ok(start..end + 1)
}

fn cmd_search(
    input: &Path,
    query: &str,
    json: bool,
    options: EditorOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = open_editor(input, options)?;
    let count = editor.search(query);

    if json {
        println!("{}", serde_json::to_string_pretty(editor.search_matches())?);
        return Ok(());
    }

    let engine = editor.search_engine();
    println!(
        "{} {} for {} ({} units)",
        engine.group_count().to_string().cyan().bold(),
        "matches".bold(),
        format!("\"{}\"", query).yellow(),
        count
    );

    for (n, id) in engine.group_ids().iter().enumerate() {
        let mut units = engine.group(*id);
        let Some(first) = units.next() else {
            continue;
        };
        let where_ = match &first.location {
            MatchLocation::Page { index } => format!("page unit {}", index),
            MatchLocation::Table {
                table_index,
                row_index,
                cell_index,
                index,
                ..
            } => format!(
                "table {} row {} cell {} unit {}",
                table_index, row_index, cell_index, index
            ),
        };
        let connector = if n + 1 == engine.group_count() {
            "└─"
        } else {
            "├─"
        };
        println!("  {} {}", connector.dimmed(), where_);
    }

    Ok(())
}

fn cmd_layout(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    options: EditorOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = open_editor(input, options)?;
    let positions = editor.layout();

    let json = if compact {
        serde_json::to_string(positions)?
    } else {
        serde_json::to_string_pretty(positions)?
    };

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_highlight(
    input: &Path,
    query: &str,
    page: usize,
    navigate: usize,
    options: EditorOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = open_editor(input, options)?;
    editor.search(query);
    for _ in 0..navigate {
        editor.search_navigate_next();
    }

    let mut surface = RecordingSurface::new();
    let drawn = editor.render_search(&mut surface, page);
    log::info!("drew {} highlight rects on page {}", drawn, page);

    println!("{}", serde_json::to_string_pretty(surface.commands())?);
    Ok(())
}

fn cmd_copy(
    input: &Path,
    range: Option<&str>,
    text: bool,
    options: EditorOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let editor = open_editor(input, options)?;
    let len = editor.elements().len();
    let range = match range {
        Some(r) => parse_range(r, len)?,
        None => 0..len,
    };

    match editor.copy(range)? {
        Some(payload) if text => println!("{}", payload.text),
        Some(payload) => println!("{}", payload.html),
        None => eprintln!("{}", "Nothing to copy".yellow()),
    }

    Ok(())
}

fn cmd_paste(
    input: &Path,
    output: Option<&Path>,
    options: EditorOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let html = fs::read_to_string(input)?;
    let mut editor = Editor::new(options);
    let count = editor.paste_html(0, &html)?;
    log::info!("pasted {} elements", count);

    let json = editor.to_json()?;
    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path, options: EditorOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = open_editor(input, options)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Elements".bold(), editor.elements().len());
    println!("{}: {}", "Pages".bold(), editor.page_count());
    println!("{}: {}", "Positions".bold(), editor.positions().len());

    let tables: Vec<&Element> = editor.elements().iter().filter(|e| e.is_table()).collect();
    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Tables".bold(), tables.len());
    for (n, table) in tables.iter().filter_map(|e| e.as_table()).enumerate() {
        println!(
            "  {} {}x{}{}",
            format!("#{}", n + 1).dimmed(),
            table.row_count(),
            table.column_count(),
            if table.has_merged_cells() {
                " (merged cells)"
            } else {
                ""
            }
        );
    }

    Ok(())
}
