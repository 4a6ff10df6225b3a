//! Command execution
//!
//! One-shot edit commands load the file, apply a single engine operation and
//! write the result back. `session` keeps one engine alive across many edits.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::EditEngine;
use crate::cli::args::{Cli, Commands, ConfigCommands, FileArg, StyleArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::{to_termtree, RenderOptions, TerminalRenderer};
use crate::cli::session::Session;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{sample_record, NodeId, NodeRecord};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::persistence::{default_path, to_json};

/// Execute the CLI command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| CliError::Usage(e.to_string()))?;
        return Ok(());
    };

    // Completion needs no settings
    if let Commands::Completion { shell } = command {
        return cmd_completion(*shell);
    }

    let dir = working_dir(cli)?;
    let container = ServiceContainer::new(Settings::load(Some(dir.as_path()))?);

    match command {
        Commands::New { file, label, force } => cmd_new(&container, file, label.as_deref(), *force),
        Commands::Sample { file, force } => cmd_sample(&container, file, *force),
        Commands::Show { file, ids, json } => cmd_show(&container, file, *ids, *json),
        Commands::AddChild {
            file,
            parent,
            label,
            style,
        } => cmd_add_child(&container, file, parent, label, style),
        Commands::AddSibling {
            file,
            node,
            label,
            style,
        } => cmd_add_sibling(&container, file, node, label, style),
        Commands::Delete { file, node } => {
            edit_file(&container, file, None, |engine| {
                engine.delete_node(&NodeId::from(node.as_str()))?;
                Ok(())
            })
        }
        Commands::Rename { file, node, label } => {
            let id = NodeId::from(node.as_str());
            edit_file(&container, file, Some(&id), |engine| {
                engine.rename_node(&id, label)?;
                Ok(())
            })
        }
        Commands::Recolor { file, node, color } => {
            let id = NodeId::from(node.as_str());
            edit_file(&container, file, Some(&id), |engine| {
                engine.recolor_node(&id, color.clone())?;
                Ok(())
            })
        }
        Commands::FontSize { file, node, size } => {
            let id = NodeId::from(node.as_str());
            edit_file(&container, file, Some(&id), |engine| {
                engine.set_font_size(&id, *size)?;
                Ok(())
            })
        }
        Commands::Stats { file } => cmd_stats(&container, file),
        Commands::Session { file } => cmd_session(&container, file),
        Commands::Config { command } => cmd_config(&container, &dir, command),
        Commands::Completion { shell } => cmd_completion(*shell),
    }
}

fn working_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| CliError::Usage(format!("cannot determine current directory: {}", e))),
    }
}

/// Explicit `--file`, else `<data_dir>/mindmap_<today>.json`.
fn resolve_path(container: &ServiceContainer, file: &FileArg) -> PathBuf {
    file.file
        .clone()
        .unwrap_or_else(|| default_path(&container.settings.data_dir))
}

fn render_options(container: &ServiceContainer, show_ids: bool) -> RenderOptions {
    RenderOptions {
        show_ids,
        display: container.settings.display.clone(),
    }
}

/// Engine holding the tree stored at `path`, marked as saved.
fn open_engine(container: &ServiceContainer, path: &Path) -> CliResult<EditEngine> {
    let value = container.store().read_value(path)?;
    let record = NodeRecord::from_value(value)?;
    let mut engine = EditEngine::from_record(container.engine_options(), record)?;
    engine.mark_saved();
    Ok(engine)
}

fn save_engine(container: &ServiceContainer, path: &Path, engine: &mut EditEngine) -> CliResult<()> {
    container.store().save(path, engine.tree())?;
    engine.mark_saved();
    Ok(())
}

fn print_tree(container: &ServiceContainer, engine: &EditEngine, highlight: Option<&NodeId>) {
    let options = render_options(container, true);
    output::info(&to_termtree(engine.tree(), highlight, &options));
}

/// Load, apply `edit`, save, print.
fn edit_file(
    container: &ServiceContainer,
    file: &FileArg,
    highlight: Option<&NodeId>,
    edit: impl FnOnce(&mut EditEngine) -> CliResult<()>,
) -> CliResult<()> {
    let path = resolve_path(container, file);
    let mut engine = open_engine(container, &path)?;
    edit(&mut engine)?;
    save_engine(container, &path, &mut engine)?;
    output::success(&format!("updated {}", path.display()));
    print_tree(container, &engine, highlight);
    Ok(())
}

fn refuse_overwrite(container: &ServiceContainer, path: &Path, force: bool) -> CliResult<()> {
    if !force && container.store().exists(path) {
        return Err(CliError::Exists(path.to_path_buf()));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_new(container: &ServiceContainer, file: &FileArg, label: Option<&str>, force: bool) -> CliResult<()> {
    let path = resolve_path(container, file);
    refuse_overwrite(container, &path, force)?;

    let mut engine = container.engine();
    if label.is_some() {
        engine.new_map(label);
    }
    save_engine(container, &path, &mut engine)?;
    output::success(&format!("created {}", path.display()));
    print_tree(container, &engine, None);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_sample(container: &ServiceContainer, file: &FileArg, force: bool) -> CliResult<()> {
    let path = resolve_path(container, file);
    refuse_overwrite(container, &path, force)?;

    let mut engine = EditEngine::from_record(container.engine_options(), sample_record())?;
    save_engine(container, &path, &mut engine)?;
    output::success(&format!("wrote sample to {}", path.display()));
    print_tree(container, &engine, None);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_show(container: &ServiceContainer, file: &FileArg, ids: bool, json: bool) -> CliResult<()> {
    let path = resolve_path(container, file);
    let engine = open_engine(container, &path)?;
    if json {
        output::info(&to_json(engine.tree())?);
    } else {
        output::info(&to_termtree(engine.tree(), None, &render_options(container, ids)));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_add_child(
    container: &ServiceContainer,
    file: &FileArg,
    parent: &str,
    label: &str,
    style: &StyleArgs,
) -> CliResult<()> {
    let path = resolve_path(container, file);
    let mut engine = open_engine(container, &path)?;
    let id = engine.add_child(
        &NodeId::from(parent),
        label,
        style.color.clone(),
        style.font_size,
    )?;
    save_engine(container, &path, &mut engine)?;
    output::action("created", &id);
    print_tree(container, &engine, Some(&id));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_add_sibling(
    container: &ServiceContainer,
    file: &FileArg,
    node: &str,
    label: &str,
    style: &StyleArgs,
) -> CliResult<()> {
    let path = resolve_path(container, file);
    let mut engine = open_engine(container, &path)?;
    let id = engine.add_sibling(
        &NodeId::from(node),
        label,
        style.color.clone(),
        style.font_size,
    )?;
    save_engine(container, &path, &mut engine)?;
    output::action("created", &id);
    print_tree(container, &engine, Some(&id));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_stats(container: &ServiceContainer, file: &FileArg) -> CliResult<()> {
    let path = resolve_path(container, file);
    let engine = open_engine(container, &path)?;
    let tree = engine.tree();

    output::header(&path.display());
    output::detail(&format!("nodes:  {}", tree.node_count()));
    output::detail(&format!("depth:  {}", tree.depth()));
    let leaves = tree.leaf_ids();
    output::detail(&format!("leaves: {}", leaves.len()));
    for id in &leaves {
        if let Some(node) = tree.find_by_id(id) {
            output::detail(&format!("  {} [{}]", node.data.label, id));
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_session(container: &ServiceContainer, file: &FileArg) -> CliResult<()> {
    let path = resolve_path(container, file);
    let store = container.store();
    let engine = if store.exists(&path) {
        open_engine(container, &path)?
    } else {
        output::warning(&format!("{} does not exist yet, starting a new map", path.display()));
        container.engine()
    };
    debug!("session on {}", path.display());

    let renderer = TerminalRenderer::new(render_options(container, true));
    let engine = engine.with_renderer(Box::new(renderer));
    let mut session = Session::new(engine, store, path, render_options(container, true));
    session.run(io::stdin().lock())
}

fn cmd_config(container: &ServiceContainer, dir: &Path, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let mark = |p: &Path| if p.exists() { "exists" } else { "not found" };
            match global_config_path() {
                Some(global) => output::detail(&format!("global: {} ({})", global.display(), mark(global.as_path()))),
                None => output::detail("global: unavailable (no home directory)"),
            }
            let local = local_config_path(dir);
            output::detail(&format!("local:  {} ({})", local.display(), mark(local.as_path())));
        }
    }
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
