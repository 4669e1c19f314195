//! Item type lookup by user-facing name.

use crate::catalog::ItemType;

/// Looks up an item type by name or alias, case-insensitively.
pub fn lookup_item_type(value: &str) -> Option<ItemType> {
    match value.trim().to_ascii_lowercase().as_str() {
        "text" | "txt" | "note" | "notes" | "snippet" | "snippets" | "plain" => {
            Some(ItemType::Text)
        }
        "code" | "source" | "script" | "scripts" | "command" | "commands" | "cmd" | "shell" => {
            Some(ItemType::Code)
        }
        "url" | "urls" | "link" | "links" | "web" | "http" | "https" => Some(ItemType::Url),
        "path" | "paths" | "file" | "files" | "dir" | "folder" | "folders" | "directory" => {
            Some(ItemType::Path)
        }
        _ => None,
    }
}

/// Looks up every name in `values`, skipping the ones that are not item types.
pub fn lookup_item_types<'a, I>(values: I) -> Vec<ItemType>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut types = Vec::new();
    for value in values {
        match lookup_item_type(value) {
            Some(kind) if !types.contains(&kind) => types.push(kind),
            Some(_) => {}
            None => log::debug!("ignoring unknown item type filter {value:?}"),
        }
    }
    types
}
