//! Folder tree building and path resolution.

use std::collections::HashMap;

use uuid::Uuid;

use mycloud_core::result::AppResult;
use mycloud_database::FolderRepository;
use mycloud_entity::file::{File, FileSummary};
use mycloud_entity::folder::{Folder, FolderWithFiles};

/// Parent-to-children index over one owner's folders and files.
#[derive(Debug, Default)]
pub(crate) struct ChildrenIndex<'a> {
    folders: HashMap<Option<Uuid>, Vec<&'a Folder>>,
    files: HashMap<Option<Uuid>, Vec<&'a File>>,
}

impl<'a> ChildrenIndex<'a> {
    pub(crate) fn new(folders: &'a [Folder], files: &'a [File]) -> Self {
        let mut index = Self::default();
        for folder in folders {
            index.folders.entry(folder.parent_id).or_default().push(folder);
        }
        for file in files {
            index.files.entry(file.folder_id).or_default().push(file);
        }
        index
    }

    pub(crate) fn child_folders(&self, parent_id: Option<Uuid>) -> &[&'a Folder] {
        self.folders.get(&parent_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn files_in(&self, folder_id: Option<Uuid>) -> &[&'a File] {
        self.files.get(&folder_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Folder ids of the subtree rooted at `root`, children before parents.
    pub(crate) fn post_order(&self, root: Uuid) -> Vec<Uuid> {
        let mut order = Vec::new();
        self.visit(root, &mut order);
        order
    }

    fn visit(&self, folder_id: Uuid, order: &mut Vec<Uuid>) {
        for child in self.child_folders(Some(folder_id)) {
            self.visit(child.id, order);
        }
        order.push(folder_id);
    }

    /// Build the display tree for `folder`, whose own path is `path`.
    pub(crate) fn build(&self, folder: &Folder, path: &str, base_url: &str) -> FolderWithFiles {
        let files = self
            .files_in(Some(folder.id))
            .iter()
            .map(|file| FileSummary::from_file(file, path, base_url))
            .collect();

        let children = self
            .child_folders(Some(folder.id))
            .iter()
            .map(|child| self.build(child, &format!("{path}/{}", child.name), base_url))
            .collect();

        FolderWithFiles {
            id: folder.id,
            name: folder.name.clone(),
            path: path.to_string(),
            parent_id: folder.parent_id,
            files,
            children,
        }
    }
}

/// Join folder names into an absolute path: `["A", "B"]` gives `/A/B`.
pub fn join_path<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names.into_iter().fold(String::new(), |mut path, name| {
        path.push('/');
        path.push_str(name);
        path
    })
}

/// Path of a folder scope: `""` for the root scope, `/A/B` otherwise.
pub(crate) async fn path_of(
    folder_repo: &dyn FolderRepository,
    folder_id: Option<Uuid>,
) -> AppResult<String> {
    let Some(folder_id) = folder_id else {
        return Ok(String::new());
    };
    let chain = folder_repo.find_ancestors(folder_id).await?;
    Ok(join_path(chain.iter().map(|f| f.name.as_str())))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn folder(name: &str, parent_id: Option<Uuid>) -> Folder {
        Folder {
            id: Uuid::new_v4(),
            name: name.into(),
            owner_id: Uuid::nil(),
            parent_id,
            created_at: Utc::now(),
        }
    }

    fn file(name: &str, folder_id: Option<Uuid>) -> File {
        File {
            id: Uuid::new_v4(),
            original_name: name.into(),
            storage_path: format!("users/x/{name}"),
            owner_id: Uuid::nil(),
            folder_id,
            size: 1,
            upload_date: Utc::now(),
            last_download_date: None,
            comment: None,
            public_link: None,
        }
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(Vec::<&str>::new()), "");
        assert_eq!(join_path(["Docs"]), "/Docs");
        assert_eq!(join_path(["Docs", "Reports"]), "/Docs/Reports");
    }

    #[test]
    fn test_post_order_children_first() {
        let a = folder("A", None);
        let b = folder("B", Some(a.id));
        let c = folder("C", Some(b.id));
        let d = folder("D", Some(a.id));
        let folders = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        let index = ChildrenIndex::new(&folders, &[]);

        let order = index.post_order(a.id);
        assert_eq!(order.len(), 4);
        assert_eq!(order.last(), Some(&a.id));
        let pos = |id| order.iter().position(|x| *x == id).unwrap();
        assert!(pos(c.id) < pos(b.id));
    }

    #[test]
    fn test_build_tree_paths() {
        let docs = folder("Docs", None);
        let reports = folder("Reports", Some(docs.id));
        let folders = vec![docs.clone(), reports.clone()];
        let files = vec![file("a.txt", Some(docs.id)), file("q1.pdf", Some(reports.id))];
        let index = ChildrenIndex::new(&folders, &files);

        let tree = index.build(&docs, "/Docs", "http://host");
        assert_eq!(tree.total_files(), 2);
        assert_eq!(tree.total_folders(), 1);
        assert_eq!(tree.files[0].full_path, "/Docs/a.txt");
        assert_eq!(tree.children[0].path, "/Docs/Reports");
        assert_eq!(tree.children[0].files[0].full_path, "/Docs/Reports/q1.pdf");
    }
}
