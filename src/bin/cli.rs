use clap::{Parser, Subcommand};
use linkshelf_lib::models::CategoryNode;
use linkshelf_lib::{categorize_with_summary, CategorizeRequest, Taxonomy};
use std::fs;
use std::io::{Read as _, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "linkshelf-cli")]
#[command(version, about = "Bookmark categorization CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Taxonomy file (JSON); built-in table if omitted
    #[arg(long, global = true, env = "LINKSHELF_TAXONOMY")]
    taxonomy: Option<PathBuf>,

    /// Detailed logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Categorize a `{bookmarks, metadataByUrl}` JSON snapshot
    Categorize {
        /// Input file, or `-` for stdin
        input: String,
        /// Write the result here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Show where bookmarks would land, as an indented tree with counts
    Summary {
        /// Input file, or `-` for stdin
        input: String,
    },
    /// Print the active taxonomy as JSON
    Taxonomy,
}

fn init_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn read_request(input: &str) -> Result<CategorizeRequest, String> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        buf
    } else {
        fs::read_to_string(input).map_err(|e| format!("Failed to read {}: {}", input, e))?
    };
    serde_json::from_str(&text).map_err(|e| format!("Invalid input JSON: {}", e))
}

fn write_output(output: Option<&Path>, text: &str) -> Result<(), String> {
    match output {
        Some(path) => fs::write(path, text).map_err(|e| format!("Failed to write {}: {}", path.display(), e)),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", text).map_err(|e| format!("Failed to write stdout: {}", e))
        }
    }
}

fn print_node(name: &str, node: &CategoryNode, depth: usize) {
    println!("{}{} ({})", "  ".repeat(depth), name, node.total_items());
    for (child_name, child) in &node.children {
        print_node(child_name, child, depth + 1);
    }
}

fn run_cli(cli: Cli) -> Result<(), String> {
    let taxonomy = Taxonomy::load(cli.taxonomy.as_deref()).map_err(|e| e.to_string())?;
    debug!("[CLI] Taxonomy with {} categories", taxonomy.len());

    match cli.command {
        Commands::Categorize { input, output, pretty } => {
            let request = read_request(&input)?;
            let (response, _) = categorize_with_summary(&taxonomy, &request);
            let text = if pretty {
                serde_json::to_string_pretty(&response)
            } else {
                serde_json::to_string(&response)
            }
            .map_err(|e| e.to_string())?;
            write_output(output.as_deref(), &text)
        }
        Commands::Summary { input } => {
            let request = read_request(&input)?;
            let (response, summary) = categorize_with_summary(&taxonomy, &request);
            for (name, node) in &response.categories {
                print_node(name, node, 0);
            }
            println!();
            println!(
                "{} bookmarks: {} classified, {} PDFs, {} in {} clusters, {} uncategorized",
                summary.total,
                summary.classified,
                summary.pdfs,
                summary.clustered,
                summary.clusters,
                summary.uncategorized
            );
            Ok(())
        }
        Commands::Taxonomy => {
            let text = serde_json::to_string_pretty(&taxonomy).map_err(|e| e.to_string())?;
            write_output(None, &text)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run_cli(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "bookmarks": [
            {"id": 0, "title": "", "url": "https://github.com/x"},
            {"id": 1, "title": "Lemon recipe", "url": "https://abc.io/1"},
            {"id": 2, "title": "Garlic recipe", "url": "https://def.io/2"}
        ],
        "metadataByUrl": {}
    }"#;

    fn snapshot_file(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", text).unwrap();
        file
    }

    #[test]
    fn test_categorize_parses_input_and_defaults() {
        let cli = Cli::try_parse_from(["linkshelf-cli", "categorize", "bookmarks.json"])
            .expect("should parse with only INPUT");
        assert!(!cli.verbose);
        match cli.command {
            Commands::Categorize { input, output, pretty } => {
                assert_eq!(input, "bookmarks.json");
                assert!(output.is_none());
                assert!(!pretty);
            }
            _ => panic!("expected Categorize"),
        }
    }

    #[test]
    fn test_categorize_pretty_and_output() {
        let cli = Cli::try_parse_from([
            "linkshelf-cli", "categorize", "in.json", "--pretty", "-o", "out.json",
        ])
        .expect("should parse --pretty and -o");
        match cli.command {
            Commands::Categorize { output, pretty, .. } => {
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert!(pretty);
            }
            _ => panic!("expected Categorize"),
        }
    }

    #[test]
    fn test_categorize_long_output_flag() {
        let cli = Cli::try_parse_from([
            "linkshelf-cli", "categorize", "in.json", "--output", "tree.json",
        ])
        .expect("should parse --output");
        match cli.command {
            Commands::Categorize { output, .. } => assert_eq!(output, Some(PathBuf::from("tree.json"))),
            _ => panic!("expected Categorize"),
        }
    }

    #[test]
    fn test_dash_is_accepted_as_input() {
        let cli = Cli::try_parse_from(["linkshelf-cli", "categorize", "-"])
            .expect("should accept - as INPUT");
        match cli.command {
            Commands::Categorize { input, .. } => assert_eq!(input, "-"),
            _ => panic!("expected Categorize"),
        }

        let cli = Cli::try_parse_from(["linkshelf-cli", "summary", "-"]).unwrap();
        match cli.command {
            Commands::Summary { input } => assert_eq!(input, "-"),
            _ => panic!("expected Summary"),
        }
    }

    #[test]
    fn test_categorize_requires_input() {
        assert!(Cli::try_parse_from(["linkshelf-cli", "categorize"]).is_err());
        assert!(Cli::try_parse_from(["linkshelf-cli", "summary"]).is_err());
    }

    #[test]
    fn test_summary_parses() {
        let cli = Cli::try_parse_from(["linkshelf-cli", "summary", "snapshot.json"]).unwrap();
        match cli.command {
            Commands::Summary { input } => assert_eq!(input, "snapshot.json"),
            _ => panic!("expected Summary"),
        }
    }

    #[test]
    fn test_taxonomy_command_parses() {
        let cli = Cli::try_parse_from(["linkshelf-cli", "taxonomy"]).unwrap();
        assert!(matches!(cli.command, Commands::Taxonomy));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "linkshelf-cli", "categorize", "in.json", "--taxonomy", "tax.json", "-v",
        ])
        .expect("global flags should be accepted after the subcommand");
        assert_eq!(cli.taxonomy, Some(PathBuf::from("tax.json")));
        assert!(cli.verbose);

        let cli = Cli::try_parse_from(["linkshelf-cli", "taxonomy", "--taxonomy", "tax.json"]).unwrap();
        assert_eq!(cli.taxonomy, Some(PathBuf::from("tax.json")));
        assert!(matches!(cli.command, Commands::Taxonomy));
    }

    #[test]
    fn test_global_flags_before_subcommand() {
        let cli = Cli::try_parse_from([
            "linkshelf-cli", "--verbose", "--taxonomy", "tax.json", "summary", "in.json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.taxonomy, Some(PathBuf::from("tax.json")));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["linkshelf-cli", "organize", "in.json"]).is_err());
    }

    #[test]
    fn test_read_request_from_file() {
        let file = snapshot_file(SNAPSHOT);
        let request = read_request(file.path().to_str().unwrap()).unwrap();
        assert_eq!(request.bookmarks.len(), 3);
        assert!(request.metadata_by_url.is_empty());
    }

    #[test]
    fn test_read_request_rejects_bad_json() {
        let file = snapshot_file("{\"bookmarks\": [");
        let err = read_request(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.starts_with("Invalid input JSON"), "got: {}", err);
    }

    #[test]
    fn test_read_request_missing_file() {
        let err = read_request("/nonexistent/bookmarks.json").unwrap_err();
        assert!(err.starts_with("Failed to read"), "got: {}", err);
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        write_output(Some(path.as_path()), r#"{"categories":{}}"#).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(json["categories"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_write_output_to_missing_dir_fails() {
        let err = write_output(Some(Path::new("/nonexistent/dir/tree.json")), "{}").unwrap_err();
        assert!(err.starts_with("Failed to write"), "got: {}", err);
    }

    #[test]
    fn test_categorize_command_writes_tree() {
        let input = snapshot_file(SNAPSHOT);
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tree.json");

        let cli = Cli::try_parse_from([
            "linkshelf-cli",
            "categorize",
            input.path().to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--pretty",
        ])
        .unwrap();
        run_cli(cli).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.contains('\n'), "pretty output should span lines");
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        let categories = json["categories"].as_object().unwrap();
        let keys: Vec<&str> = categories.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Development", "Recipe"]);
        assert_eq!(json["categories"]["Development"]["items"][0]["id"], 0);
        assert_eq!(json["categories"]["Recipe"]["items"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_categorize_command_with_custom_taxonomy() {
        let input = snapshot_file(SNAPSHOT);
        let taxonomy = snapshot_file(r#"[{"name": "Cooking", "keywords": ["recipe"]}]"#);
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tree.json");

        let cli = Cli::try_parse_from([
            "linkshelf-cli",
            "categorize",
            input.path().to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--taxonomy",
            taxonomy.path().to_str().unwrap(),
        ])
        .unwrap();
        run_cli(cli).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["categories"]["Cooking"]["items"].as_array().unwrap().len(), 2);
        assert_eq!(json["categories"]["Uncategorized"]["items"][0]["id"], 0);
    }

    #[test]
    fn test_run_cli_reports_bad_taxonomy() {
        let taxonomy = snapshot_file(r#"[{"name": "PDFs"}]"#);
        let cli = Cli::try_parse_from([
            "linkshelf-cli", "taxonomy", "--taxonomy", taxonomy.path().to_str().unwrap(),
        ])
        .unwrap();
        assert!(run_cli(cli).is_err());
    }
}
