use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::{TreeMenu, TreeViewConvert};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{identity::interior_url, NodeKey, Selection};
use crate::infrastructure::source_for;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Show {
            data,
            toggle,
            select,
            level,
            id,
            json,
        }) => {
            let initial = level
                .as_ref()
                .map(|level| Selection::new(level.clone(), id.clone()));
            _show(cli.config.as_deref(), data, initial, toggle, select.as_ref(), *json)
        }
        Some(Commands::Urls { data }) => _urls(cli.config.as_deref(), data),
        Some(Commands::Config { command }) => _config(cli.config.as_deref(), command),
        Some(Commands::Completion { shell }) => _completion(*shell),
        None => Err(CliError::Usage(
            "no command given, see `treemenu --help`".into(),
        )),
    }
}

fn load_menu(config: Option<&Path>, data: &Path, initial: Option<Selection>) -> CliResult<TreeMenu> {
    let settings = Settings::load(config)?;
    let source = source_for(data);
    debug!("loading tree data from {}", source.origin());
    let document = source.load()?;

    let initial = initial.unwrap_or_default();
    Ok(TreeMenu::with_selection(document, initial, settings.menu()))
}

#[instrument(skip(config))]
fn _show(
    config: Option<&Path>,
    data: &PathBuf,
    initial: Option<Selection>,
    toggles: &[NodeKey],
    select: Option<&NodeKey>,
    json: bool,
) -> CliResult<()> {
    let mut menu = load_menu(config, data, initial)?;

    for key in toggles {
        let expanded = menu.toggle_expansion(key)?;
        debug!("toggled {}: expanded={}", key, expanded);
    }
    if let Some(key) = select {
        let handle = menu.select_node(key)?;
        debug!("selected {} at {}", key, handle);
    }

    // one-shot render: nothing consumes incremental changes
    debug!("discarding {} change events", menu.take_changes().len());
    let view = menu.view()?;
    if json {
        let text = serde_json::to_string_pretty(&view)
            .map_err(|e| CliError::Usage(format!("cannot serialize view: {e}")))?;
        output::info(&text);
    } else {
        output::tree(&view.to_tree_string().to_string());
    }
    Ok(())
}

#[instrument(skip(config))]
fn _urls(config: Option<&Path>, data: &PathBuf) -> CliResult<()> {
    let menu = load_menu(config, data, None)?;
    let root = menu.view()?;
    output::info(&format!("{}\t{}", root.url, root.label));

    let label = &menu.settings().label;
    for (depth, record) in menu.document().walk().into_iter().skip(1) {
        output::info(&format!(
            "{}{}\t{}",
            "  ".repeat(depth.saturating_sub(1)),
            interior_url(record),
            label.apply(&record.title)
        ));
    }
    Ok(())
}

#[instrument(skip(config))]
fn _config(config: Option<&Path>, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(config)?;
            output::header("# effective configuration");
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                if !path.exists() {
                    output::warning(&format!("{} does not exist yet", path.display()));
                }
                output::info(&path.display());
            }
            None => output::warning("no home directory, global config disabled"),
        },
    }
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
