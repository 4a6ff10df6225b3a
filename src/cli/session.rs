//! Interactive editing session.
//!
//! Reads one command per line and turns it into engine intents. Node commands
//! act on the current selection, mirroring click-then-edit in a graphical
//! editor. Failed commands are reported and the session keeps going.

use std::io::BufRead;
use std::path::PathBuf;

use tracing::{debug, instrument};

use crate::application::{EditEngine, Intent, Outcome};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::{to_termtree, RenderOptions};
use crate::domain::NodeId;
use crate::infrastructure::{InfraError, MindMapStore};

const HELP: &str = "\
select <id>      select a node
child [label]    add a child under the selection and select it
sibling [label]  add a sibling next to the selection
delete           delete the selection and its subtree
rename <label>   rename the selection
color [value]    set the selection's color, or clear it
size <n>         set the selection's font size
undo | redo      step through history
new [label]      start over with a lone root
load <path>      replace the map with a file's content
save [path]      write the map (default: the session file)
show             print the map
quit | quit!     leave (quit! discards unsaved changes)";

/// One parsed session line.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Edit(Intent),
    NewMap(Option<String>),
    Load(PathBuf),
    Save(Option<PathBuf>),
    Show,
    Help,
    Quit { force: bool },
}

/// Whether the session continues after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parses `line`; blank lines yield `None`.
pub fn parse_command(line: &str, selected: Option<&NodeId>) -> CliResult<Option<SessionCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());
    let target = || {
        selected
            .cloned()
            .ok_or_else(|| CliError::Usage("no node selected, use 'select <id>'".into()))
    };

    let command = match word {
        "select" => SessionCommand::Edit(Intent::Select(NodeId::from(required(arg, "select <id>")?))),
        "child" => SessionCommand::Edit(Intent::AddChild {
            parent: target()?,
            label: rest.to_string(),
            color: None,
            font_size: None,
        }),
        "sibling" => SessionCommand::Edit(Intent::AddSibling {
            node: target()?,
            label: rest.to_string(),
            color: None,
            font_size: None,
        }),
        "delete" => SessionCommand::Edit(Intent::Delete(target()?)),
        "rename" => SessionCommand::Edit(Intent::Rename {
            node: target()?,
            text: rest.to_string(),
        }),
        "color" => SessionCommand::Edit(Intent::Recolor {
            node: target()?,
            color: arg,
        }),
        "size" => {
            let raw = required(arg, "size <n>")?;
            let size = raw
                .parse()
                .map_err(|_| CliError::InvalidArgs(format!("not a font size: {}", raw)))?;
            SessionCommand::Edit(Intent::SetFontSize {
                node: target()?,
                size,
            })
        }
        "undo" => SessionCommand::Edit(Intent::Undo),
        "redo" => SessionCommand::Edit(Intent::Redo),
        "new" => SessionCommand::NewMap(arg),
        "load" => SessionCommand::Load(PathBuf::from(required(arg, "load <path>")?)),
        "save" => SessionCommand::Save(arg.map(PathBuf::from)),
        "show" => SessionCommand::Show,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit { force: false },
        "quit!" => SessionCommand::Quit { force: true },
        other => return Err(CliError::Usage(format!("unknown command '{}', try 'help'", other))),
    };
    Ok(Some(command))
}

fn required(arg: Option<String>, usage: &str) -> CliResult<String> {
    arg.ok_or_else(|| CliError::Usage(format!("usage: {}", usage)))
}

/// Engine plus the file it is saved to.
pub struct Session {
    engine: EditEngine,
    store: MindMapStore,
    path: PathBuf,
    render: RenderOptions,
}

impl Session {
    pub fn new(engine: EditEngine, store: MindMapStore, path: PathBuf, render: RenderOptions) -> Self {
        Self {
            engine,
            store,
            path,
            render,
        }
    }

    pub fn engine(&self) -> &EditEngine {
        &self.engine
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Reads commands until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead) -> CliResult<()> {
        output::info(&format!("editing {} (type 'help' for commands)", self.path.display()));
        output::prompt("jphmind>");
        for line in input.lines() {
            let line = line.map_err(|e| InfraError::io("read command", e))?;
            match self.execute(&line) {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e) => output::error(&e),
            }
            output::prompt("jphmind>");
        }
        if self.engine.has_unsaved_changes() {
            output::warning("input closed with unsaved changes");
        }
        Ok(())
    }

    /// Runs one line.
    #[instrument(level = "debug", skip(self))]
    pub fn execute(&mut self, line: &str) -> CliResult<Flow> {
        let Some(command) = parse_command(line, self.engine.selected())? else {
            return Ok(Flow::Continue);
        };
        debug!("session command: {:?}", command);

        match command {
            SessionCommand::Edit(intent) => match self.engine.dispatch(intent)? {
                Outcome::Created(id) => output::action("created", &id),
                Outcome::Applied => {}
                Outcome::Unchanged => output::detail("nothing to do"),
            },
            SessionCommand::NewMap(label) => {
                self.engine.new_map(label.as_deref());
            }
            SessionCommand::Load(path) => {
                let value = self.store.read_value(&path)?;
                self.engine.dispatch(Intent::Load(value))?;
                self.engine.mark_saved();
                output::action("loaded", &path.display());
                self.path = path;
            }
            SessionCommand::Save(path) => {
                if let Some(path) = path {
                    self.path = path;
                }
                self.store.save(&self.path, self.engine.tree())?;
                self.engine.mark_saved();
                output::success(&format!("saved {}", self.path.display()));
            }
            SessionCommand::Show => {
                output::info(&to_termtree(
                    self.engine.tree(),
                    self.engine.selected(),
                    &self.render,
                ));
            }
            SessionCommand::Help => output::info(HELP),
            SessionCommand::Quit { force } => {
                if !force && self.engine.has_unsaved_changes() {
                    output::warning("unsaved changes, 'save' first or 'quit!' to discard");
                    return Ok(Flow::Continue);
                }
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank_line_is_noop() {
        assert_eq!(parse_command("   ", None).unwrap(), None);
    }

    #[test]
    fn test_parse_node_commands_target_selection() {
        let selected = NodeId::from("node_4");
        let cmd = parse_command("rename  Big   idea ", Some(&selected)).unwrap();
        assert_eq!(
            cmd,
            Some(SessionCommand::Edit(Intent::Rename {
                node: selected,
                text: "Big   idea".into(),
            }))
        );
    }

    #[test]
    fn test_parse_node_command_without_selection_fails() {
        let err = parse_command("delete", None).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[test]
    fn test_parse_color_without_value_clears() {
        let selected = NodeId::from("node_0");
        let cmd = parse_command("color", Some(&selected)).unwrap();
        assert_eq!(
            cmd,
            Some(SessionCommand::Edit(Intent::Recolor {
                node: selected,
                color: None,
            }))
        );
    }

    #[test]
    fn test_parse_rejects_bad_size_and_unknown_words() {
        let selected = NodeId::from("node_0");
        assert!(matches!(
            parse_command("size big", Some(&selected)),
            Err(CliError::InvalidArgs(_))
        ));
        assert!(matches!(parse_command("frobnicate", None), Err(CliError::Usage(_))));
    }

    #[test]
    fn test_parse_quit_variants() {
        assert_eq!(
            parse_command("quit!", None).unwrap(),
            Some(SessionCommand::Quit { force: true })
        );
        assert_eq!(
            parse_command("exit", None).unwrap(),
            Some(SessionCommand::Quit { force: false })
        );
    }
}
