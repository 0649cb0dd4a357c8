use panel_core::prompt::Prompt;
use std::fmt::Write;

pub fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{}", tag))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line per prompt, numbered by its position in the whole collection.
///
/// `total` is the size of the unfiltered collection, used to tell an empty
/// collection apart from a search with no hits.
pub fn format_list(prompts: &[&Prompt], positions: &[usize], total: usize) -> String {
    if prompts.is_empty() {
        return if total == 0 {
            "No prompts saved yet. Add one with `panel add`!".to_string()
        } else {
            "No prompt matches your search.".to_string()
        };
    }

    let mut out = String::new();
    for (prompt, position) in prompts.iter().zip(positions) {
        let _ = write!(out, "{:>3}. {}  [{}]", position, prompt.title, prompt.id);
        if !prompt.tags.is_empty() {
            let _ = write!(out, "  {}", format_tags(&prompt.tags));
        }
        out.push('\n');
    }
    out.pop();
    out
}

pub fn format_prompt(prompt: &Prompt) -> String {
    let mut out = format!("{}\nid: {}\n", prompt.title, prompt.id);
    if !prompt.tags.is_empty() {
        let _ = writeln!(out, "tags: {}", format_tags(&prompt.tags));
    }
    out.push('\n');
    out.push_str(&prompt.content);
    out
}
