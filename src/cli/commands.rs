//! Command dispatch: each subcommand loads a source and runs the engine on it

use std::io::{self, Read};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::{
    ApplicationError, DataSource, DatasetSource, FileSystemSource, Flow, InputEvent, IoResultExt,
    Session,
};
use crate::cli::args::{AreaArgs, Cli, Commands, ConfigCommands, SourceArgs, SourceKind};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{expand_path, global_config_path, Settings};
use crate::domain::{hit_test, layout, NodeFactory, Palette, Point, TreeNodeRef, WeightedTree};
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            completion(*shell);
            Ok(())
        }
        Commands::Config { command } => config_command(cli, command),
        Commands::Tree { source } => {
            let settings = load_settings(cli)?;
            tree(&settings, source)
        }
        Commands::Layout { source, area } => {
            let settings = load_settings(cli)?.with_area(area)?;
            print_layout(&settings, source)
        }
        Commands::Hit { source, x, y, area } => {
            let settings = load_settings(cli)?.with_area(area)?;
            hit(&settings, source, Point::new(*x, *y))
        }
        Commands::Replay {
            source,
            script,
            area,
        } => {
            let settings = load_settings(cli)?.with_area(area)?;
            replay(&settings, source, script.as_deref())
        }
    }
}

fn completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.seed.is_some() {
        settings.seed = cli.seed;
    }
    debug!(?settings, "settings loaded");
    Ok(settings)
}

impl Settings {
    /// Apply command-line display overrides.
    fn with_area(mut self, area: &AreaArgs) -> CliResult<Self> {
        if let Some(width) = area.width {
            self.width = width;
        }
        if let Some(height) = area.height {
            self.height = height;
        }
        self.validate()
            .map_err(|e| CliError::InvalidArgs(e.to_string()))?;
        Ok(self)
    }
}

/// Open the source and build its tree; returns the tree and its separator.
#[instrument(level = "debug", skip(settings))]
fn load_tree(settings: &Settings, args: &SourceArgs) -> CliResult<(TreeNodeRef, String)> {
    let path = expand_path(&args.source);
    let source: Box<dyn DataSource> = match args.kind {
        SourceKind::Fs => Box::new(FileSystemSource::new(path)),
        SourceKind::Dataset => Box::new(DatasetSource::load(&path, &settings.dataset_separator)?),
    };
    let mut factory = NodeFactory::new(Palette::from_seed(settings.seed));
    let tree = source.build(&mut factory)?;
    Ok((tree, source.separator().to_string()))
}

#[instrument(level = "debug", skip(settings))]
fn tree(settings: &Settings, source: &SourceArgs) -> CliResult<()> {
    let (tree, _) = load_tree(settings, source)?;
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn print_layout(settings: &Settings, source: &SourceArgs) -> CliResult<()> {
    let (tree, _) = load_tree(settings, source)?;
    let area = settings.treemap_area();
    let tiles = layout(&tree, area);

    output::header(&format!(
        "{} tiles in {} (total weight {})",
        tiles.len(),
        area,
        tree.borrow().weight()
    ));
    for (rect, color) in &tiles {
        output::info(&format!("{rect} {color}"));
    }
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn hit(settings: &Settings, source: &SourceArgs, point: Point) -> CliResult<()> {
    let (tree, separator) = load_tree(settings, source)?;
    let Some(leaf) = hit_test(&tree, settings.treemap_area(), point) else {
        output::warning(&format!("no leaf at ({}, {})", point.x, point.y));
        return Ok(());
    };

    let size = leaf.borrow().weight();
    let status = tree.path_from(Some(&leaf), size, &separator);
    if status.is_empty() {
        output::info(&format!("{} ({size})", leaf.borrow().name()));
    } else {
        output::info(&status);
    }
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn replay(settings: &Settings, source: &SourceArgs, script: Option<&Path>) -> CliResult<()> {
    let text = match script {
        Some(path) => {
            let path = expand_path(path);
            std::fs::read_to_string(&path).with_path_context("read script", &path)?
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| ApplicationError::OperationFailed {
                    context: "read script from stdin".to_string(),
                    source: Box::new(e),
                })?;
            text
        }
    };
    let events = InputEvent::parse_script(&text)?;

    let (tree, separator) = load_tree(settings, source)?;
    let mut session = Session::new(tree, separator, settings.treemap_area(), settings.resize_step);

    for event in events {
        let flow = session.handle(event);
        let weight = session.tree().borrow().weight();
        output::action(&format!("{:<16}", event.to_string()), &format!("[{weight}] {}", session.status()));
        if flow == Flow::Quit {
            break;
        }
    }

    let frame = session.frame();
    output::header(&format!("{} tiles visible", frame.tiles.len()));
    Ok(())
}

fn config_command(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory on this system"),
        },
    }
    Ok(())
}
