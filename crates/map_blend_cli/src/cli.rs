//! Command-line interface implementation

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use map_blend::{load_blends, load_rules, BmpBlender};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::export::RenderOutput;
use crate::project::ProjectConfig;

/// Generate tile layers from painted terrain bitmaps
#[derive(Parser)]
#[command(name = "map-blend")]
#[command(version)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every pass over a project and write the tile layers as JSON
    Render {
        /// Project file (TOML)
        project: PathBuf,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse a rule file and a blend file and report what they define
    Check {
        #[arg(long)]
        rules: PathBuf,

        #[arg(long)]
        blends: PathBuf,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Render { project, output } => run_render(&project, output.as_deref()),
        Commands::Check { rules, blends } => run_check(&rules, &blends),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_render(project_path: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let project = ProjectConfig::load(project_path)?;
    let map = project.build_map()?;

    let mut blender = BmpBlender::new(project.settings.clone());
    blender.read(&project.rules, &project.blends)?;
    blender.recreate(&map);

    let missing = blender.missing_tilesets();
    if !missing.is_empty() {
        warn!(
            "{} tilesets referenced by the rules are not loaded: {:?}",
            missing.len(),
            missing
        );
    }

    let rendered = RenderOutput::from_blender(&blender, map.width(), map.height());
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &rendered)?;
            writer.flush().map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            info!(
                "wrote {} layers to {}",
                rendered.layers.len(),
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &rendered)?;
            let _ = writeln!(writer);
        }
    }
    Ok(())
}

fn run_check(rules_path: &Path, blends_path: &Path) -> Result<(), CliError> {
    let rules = load_rules(rules_path)?;
    let blends = load_blends(blends_path)?;

    println!("{}: {} rules", rules_path.display(), rules.len());
    for layer in rules.layer_names() {
        let count = rules
            .rules()
            .iter()
            .filter(|rule| &rule.target_layer == layer)
            .count();
        println!("  {layer}: {count}");
    }
    println!("{}: {} blends", blends_path.display(), blends.len());
    for layer in blends.layer_names() {
        println!("  {layer}: {}", blends.blends_for_layer(layer).count());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_render_with_output() {
        let cli = Cli::try_parse_from(["map-blend", "render", "map.toml", "-o", "out.json", "-v"])
            .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Render { project, output } => {
                assert_eq!(project, PathBuf::from("map.toml"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            Commands::Check { .. } => panic!("expected render"),
        }
    }

    #[test]
    fn check_requires_both_tables() {
        assert!(Cli::try_parse_from(["map-blend", "check", "--rules", "Rules.txt"]).is_err());
    }

    #[test]
    fn render_writes_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut main = image::RgbImage::new(2, 1);
        main.put_pixel(0, 0, image::Rgb([0, 255, 0]));
        main.save(dir.path().join("main.png")).unwrap();
        image::RgbImage::new(2, 1)
            .save(dir.path().join("veg.png"))
            .unwrap();
        std::fs::write(dir.path().join("Rules.txt"), "0,0,255,0,grass_0,0_Floor\n").unwrap();
        std::fs::write(dir.path().join("Blends.txt"), "").unwrap();
        std::fs::write(
            dir.path().join("map.toml"),
            r#"
rules = "Rules.txt"
blends = "Blends.txt"
main = { path = "main.png" }
vegetation = { path = "veg.png" }

[[tileset]]
name = "grass"
columns = 1
rows = 1
"#,
        )
        .unwrap();
        let out = dir.path().join("out.json");

        run_render(&dir.path().join("map.toml"), Some(&out)).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["width"], 2);
        assert_eq!(json["layers"][0]["name"], "0_Floor");
        assert_eq!(json["layers"][0]["rows"][0][0], "grass_0");
        assert_eq!(json["layers"][0]["resolved"], 1);
    }

    #[test]
    fn check_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let rules = dir.path().join("Rules.txt");
        let blends = dir.path().join("Blends.txt");
        std::fs::write(&rules, "0,0,255\n").unwrap();
        std::fs::write(&blends, "").unwrap();

        let err = run_check(&rules, &blends).unwrap_err();
        assert!(matches!(err, CliError::Load(_)));
        assert_eq!(err.exit_code(), crate::error::EXIT_INVALID_INPUT);
    }
}
