use polars::prelude::{AnyValue, DataFrame};
use schedule_tree::{
    CalendarDuration, Forest, ImportConfig, OrphanPolicy, Outline, Placement, PlacedRecord,
    load_config_from_json, load_forest_from_csv, load_forest_from_json, parse_instant,
    save_config_to_json, save_forest_to_csv, save_forest_to_json,
};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "SCHEDULE_TREE_CONFIG";

fn cell_text(av: &AnyValue<'_>) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        rows.push(
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect(),
        );
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &rows {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_row = |out: &mut String, values: &[String]| {
        out.push('|');
        for (ci, s) in values.iter().enumerate() {
            out.push(' ');
            out.push_str(s);
            out.push_str(&" ".repeat(widths[ci].saturating_sub(s.chars().count())));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, col_names.as_slice());
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row.as_slice());
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  load <csv|json> <path>             Build the task forest from a file\n  show                               Show the outline table with durations\n  tree                               Show the forest as an indented tree\n  orphans                            List records whose parent was not found\n  duration <start> <finish>          Calendar duration (e.g. 2023-01-31T23:59:59)\n  save <json|csv> <path>             Write the current forest to disk\n  config show                        Show import settings\n  config set <json_path>             Load import settings from JSON file\n  config save <json_path>            Save import settings to JSON file\n  config delimiter <char|tab>        Set the field delimiter\n  config policy <promote|warn|reject>\n                                     Set how orphaned records are handled\n  quit|exit                          Exit"
    );
}

fn print_config(config: &ImportConfig) {
    println!("Delimiter          : {:?}", config.delimiter);
    println!("Line separator     : {:?}", config.line_separator);
    println!("Orphan policy      : {}", config.orphan_policy);
}

fn print_outline(forest: &Forest) {
    match Outline::from_forest(forest).to_dataframe() {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error building outline: {}", e),
    }
}

fn print_tree(forest: &Forest) {
    for (level, node) in forest.walk() {
        let name = node.data().get("Name").unwrap_or("");
        println!("{}{} {}", "  ".repeat(level), node.id(), name);
    }
}

fn print_orphans(placements: &[PlacedRecord]) {
    let mut any = false;
    for placed in placements {
        if let Placement::Orphaned { parent_id } = &placed.placement {
            println!("  {} (missing parent {})", placed.id, parent_id);
            any = true;
        }
    }
    if !any {
        println!("No orphaned records.");
    }
}

fn parse_delimiter(input: &str) -> Option<char> {
    if input.eq_ignore_ascii_case("tab") {
        return Some('\t');
    }
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn initial_config() -> ImportConfig {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => match load_config_from_json(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Ignoring {CONFIG_ENV}={path}: {e}");
                ImportConfig::default()
            }
        },
        Err(_) => ImportConfig::default(),
    }
}

fn main() {
    init_tracing();
    let mut config = initial_config();
    let mut forest = Forest::default();
    let mut placements: Vec<PlacedRecord> = Vec::new();

    println!("Schedule Tree (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "load" => match (parts.next(), parts.next()) {
                (Some("csv"), Some(path)) => match load_forest_from_csv(path, &config) {
                    Ok(build) => {
                        forest = build.forest;
                        placements = build.placements;
                        println!(
                            "Loaded {} tasks ({} roots) from {}.",
                            forest.len(),
                            forest.roots().len(),
                            path
                        );
                        let orphans = placements
                            .iter()
                            .filter(|p| matches!(p.placement, Placement::Orphaned { .. }))
                            .count();
                        if orphans > 0 {
                            println!("{orphans} record(s) promoted to root; see 'orphans'.");
                        }
                    }
                    Err(e) => println!("Error loading forest: {}", e),
                },
                (Some("json"), Some(path)) => match load_forest_from_json(path) {
                    Ok(loaded) => {
                        forest = loaded;
                        placements.clear();
                        println!(
                            "Loaded {} tasks ({} roots) from {}.",
                            forest.len(),
                            forest.roots().len(),
                            path
                        );
                    }
                    Err(e) => println!("Error loading forest: {}", e),
                },
                _ => println!("Usage: load <csv|json> <path>"),
            },
            "show" => print_outline(&forest),
            "tree" => print_tree(&forest),
            "orphans" => print_orphans(&placements),
            "duration" => match (parts.next(), parts.next()) {
                (Some(start_s), Some(finish_s)) => {
                    match (parse_instant(start_s), parse_instant(finish_s)) {
                        (Ok(start), Ok(finish)) => {
                            match CalendarDuration::checked_between(&start, &finish) {
                                Ok(duration) => println!("{}", duration),
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        (Err(e), _) | (_, Err(e)) => println!("Error: {}", e),
                    }
                }
                _ => println!("Usage: duration <start> <finish>"),
            },
            "save" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => match save_forest_to_json(&forest, path) {
                    Ok(_) => println!("Forest saved to {}.", path),
                    Err(e) => println!("Error saving forest: {}", e),
                },
                (Some("csv"), Some(path)) => match save_forest_to_csv(&forest, path, &config) {
                    Ok(_) => println!("Forest saved to {}.", path),
                    Err(e) => println!("Error saving forest: {}", e),
                },
                _ => println!("Usage: save <json|csv> <path>"),
            },
            "config" => match parts.next() {
                Some("show") | None => print_config(&config),
                Some("set") => match parts.next() {
                    Some(path) => match load_config_from_json(path) {
                        Ok(loaded) => {
                            config = loaded;
                            println!("Config loaded from {}.", path);
                            print_config(&config);
                        }
                        Err(e) => println!("Error loading config: {}", e),
                    },
                    None => println!("Usage: config set <json_path>"),
                },
                Some("save") => match parts.next() {
                    Some(path) => match save_config_to_json(&config, path) {
                        Ok(_) => println!("Config saved to {}.", path),
                        Err(e) => println!("Error saving config: {}", e),
                    },
                    None => println!("Usage: config save <json_path>"),
                },
                Some("delimiter") => match parts.next().and_then(parse_delimiter) {
                    Some(delimiter) => {
                        let candidate = ImportConfig {
                            delimiter,
                            ..config.clone()
                        };
                        match candidate.validate() {
                            Ok(()) => {
                                config = candidate;
                                println!("Delimiter set to {:?}.", delimiter);
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    None => println!("Usage: config delimiter <char|tab>"),
                },
                Some("policy") => match parts.next().map(str::parse::<OrphanPolicy>) {
                    Some(Ok(policy)) => {
                        config.orphan_policy = policy;
                        println!("Orphan policy set to {}.", policy);
                    }
                    Some(Err(e)) => println!("Error: {}", e),
                    None => println!("Usage: config policy <promote|warn|reject>"),
                },
                Some(other) => {
                    println!("Unknown config command '{}'.", other);
                    println!("Usage: config show|set <json_path>|save <json_path>|delimiter <c>|policy <p>");
                }
            },
            other => {
                println!("Unknown command '{}'. Type 'help'.", other);
            }
        }
    }
}
