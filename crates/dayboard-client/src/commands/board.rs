//! Checklist and quick-access commands.

use dayboard_core::{ChecklistItem, CollectionKind, QuickLink};

use super::{print_json, short_id};
use crate::board::Board;
use crate::cli::{ChecklistAction, LinkAction};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::store::JsonFileStore;

fn open(config: &ClientConfig) -> Board<JsonFileStore> {
    Board::new(JsonFileStore::new(config.data_dir()))
}

/// Runs a checklist action against `kind`.
pub fn checklist(
    config: &ClientConfig,
    kind: CollectionKind,
    action: &ChecklistAction,
    json: bool,
) -> ClientResult<()> {
    let board = open(config);
    match action {
        ChecklistAction::List => {
            let items = board.items(kind)?;
            if json {
                return print_json(&items);
            }
            println!("{}", kind.title());
            if items.is_empty() {
                println!("  (empty)");
            }
            for item in &items {
                println!("{}", render_item(item));
            }
        }
        ChecklistAction::Add { text } => match board.add_item(kind, &text.join(" "))? {
            Some(item) if json => print_json(&item)?,
            Some(item) => println!("added {}", render_item(&item).trim_start()),
            None => println!("nothing to add"),
        },
        ChecklistAction::Toggle { id } => {
            let item = board.toggle_item(kind, id)?;
            if json {
                return print_json(&item);
            }
            println!("{}", render_item(&item));
        }
        ChecklistAction::Delete { id } => {
            let item = board.delete_item(kind, id)?;
            if json {
                return print_json(&item);
            }
            println!("deleted \"{}\"", item.text);
        }
    }
    Ok(())
}

/// Runs a quick-access action.
pub fn links(config: &ClientConfig, action: &LinkAction, json: bool) -> ClientResult<()> {
    let board = open(config);
    match action {
        LinkAction::List => {
            let links = board.links()?;
            if json {
                return print_json(&links);
            }
            println!("{}", CollectionKind::QuickAccess.title());
            if links.is_empty() {
                println!("  (empty)");
            }
            for link in &links {
                println!("{}", render_link(link));
            }
        }
        LinkAction::Add { name, url } => match board.add_link(name, url)? {
            Some(link) if json => print_json(&link)?,
            Some(link) => println!("added {}", render_link(&link).trim_start()),
            None => println!("nothing to add: name and url are required"),
        },
        LinkAction::Delete { id } => {
            let link = board.delete_link(id)?;
            if json {
                return print_json(&link);
            }
            println!("deleted \"{}\"", link.name);
        }
    }
    Ok(())
}

fn render_item(item: &ChecklistItem) -> String {
    let mark = if item.completed { 'x' } else { ' ' };
    format!("  {} [{}] {}", short_id(&item.id), mark, item.text)
}

fn render_link(link: &QuickLink) -> String {
    format!("  {} {}  {}", short_id(&link.id), link.name, link.url)
}
