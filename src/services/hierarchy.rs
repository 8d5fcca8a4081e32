//! Folder hierarchy helpers
//!
//! Pure functions over the self-referential folder forest: depth
//! reporting, descendant expansion, and the parent-first ordering used
//! when uploading folders (the remote table has a foreign key from a
//! folder to its parent).

use crate::config::MAX_FOLDER_DEPTH;
use crate::store::Folder;
use std::collections::{HashMap, HashSet};

/// Nesting depth of a folder: 0 for a root, 1 for a child of a root, and
/// so on, capped at [`MAX_FOLDER_DEPTH`]. The cap truncates reporting for
/// over-deep or cyclic parent chains instead of failing.
pub fn depth(folder: &Folder, all: &[Folder]) -> usize {
    let by_id: HashMap<&str, &Folder> = all.iter().map(|f| (f.id.as_str(), f)).collect();

    let mut depth = 0;
    let mut parent = folder.parent_folder_id.as_deref();
    while let Some(parent_id) = parent {
        if depth >= MAX_FOLDER_DEPTH {
            break;
        }
        depth += 1;
        parent = by_id
            .get(parent_id)
            .and_then(|f| f.parent_folder_id.as_deref());
    }

    depth
}

/// Ids of every folder below `folder_id`, computed breadth-first.
/// The start id itself is not included. The visited set doubles as a
/// cycle guard: a folder is expanded at most once, so the walk
/// terminates even on cyclic input.
pub fn descendants(folder_id: &str, all: &[Folder]) -> HashSet<String> {
    let mut result: HashSet<String> = HashSet::new();
    let mut frontier: HashSet<&str> = HashSet::from([folder_id]);

    while !frontier.is_empty() {
        let mut next: HashSet<&str> = HashSet::new();
        for folder in all {
            if let Some(parent) = folder.parent_folder_id.as_deref() {
                if frontier.contains(parent)
                    && folder.id != folder_id
                    && !result.contains(&folder.id)
                {
                    result.insert(folder.id.clone());
                    next.insert(folder.id.as_str());
                }
            }
        }
        frontier = next;
    }

    result
}

/// Order folders so that every folder appears after its parent, when the
/// parent is present in the input. Folders with no dependency relation
/// keep their original relative order.
pub fn topological_order(folders: &[Folder]) -> Vec<Folder> {
    let by_id: HashMap<&str, &Folder> = folders.iter().map(|f| (f.id.as_str(), f)).collect();

    let mut ordered: Vec<Folder> = Vec::with_capacity(folders.len());
    let mut visited: HashSet<&str> = HashSet::new();

    fn emit<'a>(
        folder: &'a Folder,
        by_id: &HashMap<&'a str, &'a Folder>,
        visited: &mut HashSet<&'a str>,
        ordered: &mut Vec<Folder>,
    ) {
        if !visited.insert(folder.id.as_str()) {
            return;
        }
        if let Some(parent) = folder
            .parent_folder_id
            .as_deref()
            .and_then(|p| by_id.get(p).copied())
        {
            emit(parent, by_id, visited, ordered);
        }
        ordered.push((*folder).clone());
    }

    for folder in folders {
        emit(folder, &by_id, &mut visited, &mut ordered);
    }

    ordered
}
