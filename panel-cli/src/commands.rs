use crate::output::{format_list, format_prompt};
use anyhow::{anyhow, Context};
use clap::Subcommand;
use panel_core::import::ImportFile;
use panel_core::parser::parse_tags;
use panel_core::prompt::Prompt;
use panel_core::storage::KeyValueStore;
use panel_core::store::PromptStore;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone)]
pub enum PromptCommands {
    /// Save a new prompt
    Add {
        #[arg(short = 't', long)]
        title: String,
        #[arg(short = 'c', long)]
        content: String,
        /// Comma-separated tags, e.g. "writing, #email"
        #[arg(short = 'g', long, default_value = "")]
        tags: String,
    },
    /// Change the title, content or tags of a prompt
    Edit {
        id: String,
        #[arg(short = 't', long)]
        title: Option<String>,
        #[arg(short = 'c', long)]
        content: Option<String>,
        #[arg(short = 'g', long)]
        tags: Option<String>,
    },
    /// List prompts, optionally filtered by a search term
    List {
        #[arg(short = 's', long)]
        search: Option<String>,
    },
    Show {
        id: String,
        /// Copy the content to the clipboard
        #[arg(short = 'c', long)]
        copy: bool,
    },
    Delete {
        id: String,
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Set the order of the prompts; prompts left out are removed
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Do not ask for confirmation when prompts would be removed
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Move a prompt to a position (starting at 0)
    Move {
        id: String,
        position: usize,
    },
    /// Write all prompts to prompts_export.json
    Export {
        #[arg(short = 'o', long, default_value = ".")]
        out: PathBuf,
    },
    /// Merge prompts from an exported JSON file
    Import {
        file: PathBuf,
    },
}

/// Trims a form value and rejects it when nothing is left.
pub fn required(field: &str, value: &str) -> anyhow::Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(anyhow!("{} cannot be empty", field));
    }
    Ok(value.to_string())
}

/// Asks a yes/no question, defaulting to no.
pub fn confirm(input: &mut impl BufRead, out: &mut impl Write, question: &str) -> io::Result<bool> {
    write!(out, "{} [y/N] ", question)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub async fn execute<S: KeyValueStore>(
    cmd: PromptCommands,
    store: &mut PromptStore<S>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match cmd {
        PromptCommands::Add { title, content, tags } => {
            let prompt = Prompt::new(
                required("Title", &title)?,
                required("Content", &content)?,
                parse_tags(&tags),
            );
            let id = prompt.id.clone();
            store.create(prompt).context("Could not save the prompt")?;
            writeln!(out, "Prompt saved! ({})", id)?;
        }
        PromptCommands::Edit { id, title, content, tags } => {
            let current = store
                .get(&id)
                .ok_or_else(|| anyhow!("Prompt not found: {}", id))?;
            let edited = Prompt {
                id: current.id,
                title: match title {
                    Some(title) => required("Title", &title)?,
                    None => current.title,
                },
                content: match content {
                    Some(content) => required("Content", &content)?,
                    None => current.content,
                },
                tags: tags.map(|t| parse_tags(&t)).unwrap_or(current.tags),
            };
            store.update(edited).context("Could not update the prompt")?;
            writeln!(out, "Prompt updated!")?;
        }
        PromptCommands::List { search } => {
            let prompts = store.load();
            let term = search.unwrap_or_default();
            let (positions, matching): (Vec<usize>, Vec<&Prompt>) = prompts
                .iter()
                .enumerate()
                .filter(|(_, prompt)| prompt.matches(&term))
                .unzip();
            writeln!(out, "{}", format_list(&matching, &positions, prompts.len()))?;
        }
        PromptCommands::Show { id, copy } => {
            let prompt = store
                .get(&id)
                .ok_or_else(|| anyhow!("Prompt not found: {}", id))?;
            writeln!(out, "{}", format_prompt(&prompt))?;
            if copy {
                let mut clipboard = arboard::Clipboard::new().context("Clipboard unavailable")?;
                clipboard
                    .set_text(prompt.content)
                    .context("Failed to copy prompt")?;
                writeln!(out, "\nPrompt copied to clipboard!")?;
            }
        }
        PromptCommands::Delete { id, yes } => {
            let Some(prompt) = store.get(&id) else {
                writeln!(out, "No prompt with id {}.", id)?;
                return Ok(());
            };
            let question = format!("Delete prompt \"{}\"?", prompt.title);
            if !yes && !confirm(input, out, &question)? {
                writeln!(out, "Nothing deleted.")?;
                return Ok(());
            }

            store.delete(&id).context("Could not delete the prompt")?;
            writeln!(out, "Prompt deleted.")?;
        }
        PromptCommands::Reorder { ids, yes } => {
            let current = store.load();
            let dropped = current
                .iter()
                .filter(|p| !ids.contains(&p.id))
                .count();
            if dropped > 0 && !yes {
                let question = format!("{} prompt(s) not listed will be removed. Continue?", dropped);
                if !confirm(input, out, &question)? {
                    writeln!(out, "Order unchanged.")?;
                    return Ok(());
                }
            }

            store.reorder(&ids).context("Could not reorder prompts")?;
            writeln!(out, "Prompt order updated!")?;
            if dropped > 0 {
                writeln!(out, "{} prompt(s) not listed were removed.", dropped)?;
            }
        }
        PromptCommands::Move { id, position } => {
            let prompts = store
                .move_prompt(&id, position)
                .context("Could not reorder prompts")?;
            match prompts.iter().position(|p| p.id == id) {
                Some(index) => writeln!(out, "Prompt moved to position {}.", index)?,
                None => writeln!(out, "No prompt with id {}.", id)?,
            }
        }
        PromptCommands::Export { out: dir } => match store.export()? {
            Some(export) => {
                let path = export
                    .write_to(&dir)
                    .with_context(|| format!("Could not write export to {}", dir.display()))?;
                writeln!(out, "Data exported to {}!", path.display())?;
            }
            None => writeln!(out, "There are no prompts to export!")?,
        },
        PromptCommands::Import { file } => {
            let imported = store
                .import_file(Some(&ImportFile::new(file)))
                .await
                .context("Error importing data")?;
            writeln!(
                out,
                "Data imported! {} added, {} replaced, {} prompts in total.",
                imported.added,
                imported.replaced,
                imported.prompts.len()
            )?;
            if imported.skipped > 0 {
                writeln!(out, "{} malformed record(s) were skipped.", imported.skipped)?;
            }
        }
    }

    Ok(())
}
