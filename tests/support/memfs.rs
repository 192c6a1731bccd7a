//! An in-memory reference [`FileSystem`] implementation supporting full
//! read/write/rename/delete, used to drive this crate's own integration
//! tests.
//!
//! Single `Mutex`-guarded table keyed by normalized path (`"\"`-rooted,
//! no trailing separator except the root itself), rather than a separate
//! inode table with parent/child links — this crate's `FileSystem` trait is
//! entirely path- and context-keyed, so there is no separate inode number to
//! maintain.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use fsphost::{
    CleanupFlags, Completion, CreateOptions, CreateOutcome, DesiredAccess, ExtendedAttribute, FileAttributes, FileContext,
    FileInfo, FileSizeOperation, FileSystem, FileTime, SecurityDescriptor, SecurityInformation, ShareMode, Status, VolumeInfo,
};

#[derive(Clone)]
enum NodeData {
    File(Vec<u8>),
    Directory,
}

#[derive(Clone)]
struct Node {
    data: NodeData,
    info: FileInfo,
    security: SecurityDescriptor,
    ea: Vec<ExtendedAttribute>,
    reparse: Option<Vec<u8>>,
}

struct State {
    nodes: HashMap<String, Node>,
    /// Context -> path, so operations keyed only by context (everything but
    /// `create`/`rename`) can find their node.
    open: HashMap<FileContext, String>,
    next_index: u64,
}

/// A complete in-memory file system, usable both as a real [`FileSystem`] for
/// integration tests and as documentation of how a minimal implementation of
/// the trait looks end to end.
pub struct MemFs {
    state: Mutex<State>,
    next_context: AtomicU64,
}

impl Default for MemFs {
    fn default() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            "\\".to_string(),
            Node {
                data: NodeData::Directory,
                info: FileInfo {
                    file_attributes: FileAttributes::DIRECTORY,
                    ..FileInfo::default()
                },
                security: default_security(),
                ea: Vec::new(),
                reparse: None,
            },
        );
        MemFs {
            state: Mutex::new(State { nodes, open: HashMap::new(), next_index: 1 }),
            next_context: AtomicU64::new(1),
        }
    }
}

fn default_security() -> SecurityDescriptor {
    fsphost::build_security_descriptor(fsphost::PosixIdentity { uid: 0, gid: 0, mode: 0o755 })
}

fn normalize(path: &str) -> String {
    if path.is_empty() || path == "\\" {
        return "\\".to_string();
    }
    let trimmed = path.trim_end_matches('\\');
    if trimmed.is_empty() {
        "\\".to_string()
    } else if trimmed.starts_with('\\') {
        trimmed.to_string()
    } else {
        format!("\\{trimmed}")
    }
}

fn parent_of(path: &str) -> Option<String> {
    if path == "\\" {
        return None;
    }
    match path.rfind('\\') {
        Some(0) => Some("\\".to_string()),
        Some(idx) => Some(path[..idx].to_string()),
        None => Some("\\".to_string()),
    }
}

impl MemFs {
    fn allocate_context(&self, state: &mut State, path: &str) -> FileContext {
        let context = self.next_context.fetch_add(1, Ordering::Relaxed);
        state.open.insert(context, path.to_string());
        context
    }

    fn path_for(&self, state: &State, context: FileContext) -> Result<String, Status> {
        state.open.get(&context).cloned().ok_or(Status::INVALID_PARAMETER)
    }
}

impl FileSystem for MemFs {
    fn create(
        &self,
        path: &str,
        _desired_access: DesiredAccess,
        file_attributes: FileAttributes,
        _share_mode: ShareMode,
        create_options: CreateOptions,
        security_descriptor: Option<&SecurityDescriptor>,
    ) -> Result<CreateOutcome, Status> {
        let path = normalize(path);
        let mut state = self.state.lock().unwrap();

        if let Some(node) = state.nodes.get(&path).cloned() {
            let context = self.allocate_context(&mut state, &path);
            return Ok(CreateOutcome::Opened { context, info: node.info });
        }

        let parent = parent_of(&path).ok_or(Status::OBJECT_NAME_NOT_FOUND)?;
        if !state.nodes.contains_key(&parent) {
            return Err(Status::OBJECT_PATH_NOT_FOUND);
        }

        let is_directory = create_options.contains(CreateOptions::DIRECTORY_FILE);
        let mut info = FileInfo {
            file_attributes: if is_directory { FileAttributes::DIRECTORY } else { file_attributes },
            creation_time: FileTime::from_system_time(std::time::SystemTime::now()),
            ..FileInfo::default()
        };
        info.last_access_time = info.creation_time;
        info.last_write_time = info.creation_time;
        info.change_time = info.creation_time;
        info.index_number = state.next_index;
        state.next_index += 1;

        let node = Node {
            data: if is_directory { NodeData::Directory } else { NodeData::File(Vec::new()) },
            info,
            security: security_descriptor.cloned().unwrap_or_else(default_security),
            ea: Vec::new(),
            reparse: None,
        };
        state.nodes.insert(path.clone(), node);
        let context = self.allocate_context(&mut state, &path);
        Ok(CreateOutcome::Opened { context, info })
    }

    fn overwrite(&self, context: FileContext, file_attributes: FileAttributes, _supersede: bool, allocation_size: u64) -> Result<FileInfo, Status> {
        let mut state = self.state.lock().unwrap();
        let path = self.path_for(&state, context)?;
        let node = state.nodes.get_mut(&path).ok_or(Status::NO_SUCH_FILE)?;
        node.data = NodeData::File(Vec::new());
        node.info.file_attributes = file_attributes;
        node.info.file_size = 0;
        node.info.allocation_size = allocation_size;
        node.info.last_write_time = FileTime::from_system_time(std::time::SystemTime::now());
        Ok(node.info)
    }

    fn cleanup(&self, context: FileContext, path: &str, flags: CleanupFlags) {
        if !flags.delete {
            return;
        }
        let mut state = self.state.lock().unwrap();
        let path = if path.is_empty() {
            match self.path_for(&state, context) {
                Ok(path) => path,
                Err(_) => return,
            }
        } else {
            normalize(path)
        };
        state.nodes.remove(&path);
    }

    fn close(&self, context: FileContext) {
        let mut state = self.state.lock().unwrap();
        state.open.remove(&context);
    }

    fn read(&self, context: FileContext, offset: u64, length: u32) -> Completion<Vec<u8>> {
        let state = self.state.lock().unwrap();
        let path = match self.path_for(&state, context) {
            Ok(path) => path,
            Err(status) => return Completion::Done(Err(status)),
        };
        let node = match state.nodes.get(&path) {
            Some(node) => node,
            None => return Completion::Done(Err(Status::NO_SUCH_FILE)),
        };
        let data = match &node.data {
            NodeData::File(data) => data,
            NodeData::Directory => return Completion::Done(Err(Status::FILE_IS_A_DIRECTORY)),
        };
        let offset = offset as usize;
        if offset >= data.len() {
            return Completion::Done(Ok(Vec::new()));
        }
        let end = (offset + length as usize).min(data.len());
        Completion::Done(Ok(data[offset..end].to_vec()))
    }

    fn write(&self, context: FileContext, offset: u64, data: &[u8], write_to_end_of_file: bool, _constrained_io: bool) -> Completion<(u32, FileInfo)> {
        let mut state = self.state.lock().unwrap();
        let path = match self.path_for(&state, context) {
            Ok(path) => path,
            Err(status) => return Completion::Done(Err(status)),
        };
        let node = match state.nodes.get_mut(&path) {
            Some(node) => node,
            None => return Completion::Done(Err(Status::NO_SUCH_FILE)),
        };
        let buffer = match &mut node.data {
            NodeData::File(buffer) => buffer,
            NodeData::Directory => return Completion::Done(Err(Status::FILE_IS_A_DIRECTORY)),
        };
        let offset = if write_to_end_of_file { buffer.len() } else { offset as usize };
        if buffer.len() < offset + data.len() {
            buffer.resize(offset + data.len(), 0);
        }
        buffer[offset..offset + data.len()].copy_from_slice(data);
        node.info.file_size = buffer.len() as u64;
        node.info.recompute_allocation_size(512);
        node.info.last_write_time = FileTime::from_system_time(std::time::SystemTime::now());
        Completion::Done(Ok((data.len() as u32, node.info)))
    }

    fn flush(&self, _context: Option<FileContext>) -> Result<(), Status> {
        Ok(())
    }

    fn get_file_info(&self, context: FileContext) -> Result<FileInfo, Status> {
        let state = self.state.lock().unwrap();
        let path = self.path_for(&state, context)?;
        state.nodes.get(&path).map(|node| node.info).ok_or(Status::NO_SUCH_FILE)
    }

    fn set_basic_info(
        &self,
        context: FileContext,
        file_attributes: Option<FileAttributes>,
        creation_time: Option<FileTime>,
        last_access_time: Option<FileTime>,
        last_write_time: Option<FileTime>,
        change_time: Option<FileTime>,
    ) -> Result<FileInfo, Status> {
        let mut state = self.state.lock().unwrap();
        let path = self.path_for(&state, context)?;
        let node = state.nodes.get_mut(&path).ok_or(Status::NO_SUCH_FILE)?;
        if let Some(attrs) = file_attributes {
            node.info.file_attributes = attrs;
        }
        if let Some(t) = creation_time {
            node.info.creation_time = t;
        }
        if let Some(t) = last_access_time {
            node.info.last_access_time = t;
        }
        if let Some(t) = last_write_time {
            node.info.last_write_time = t;
        }
        if let Some(t) = change_time {
            node.info.change_time = t;
        }
        Ok(node.info)
    }

    fn set_file_size(&self, context: FileContext, size: u64, operation: FileSizeOperation) -> Result<FileInfo, Status> {
        let mut state = self.state.lock().unwrap();
        let path = self.path_for(&state, context)?;
        let node = state.nodes.get_mut(&path).ok_or(Status::NO_SUCH_FILE)?;
        let buffer = match &mut node.data {
            NodeData::File(buffer) => buffer,
            NodeData::Directory => return Err(Status::FILE_IS_A_DIRECTORY),
        };
        match operation {
            FileSizeOperation::EndOfFile => {
                buffer.resize(size as usize, 0);
                node.info.file_size = size;
                node.info.recompute_allocation_size(512);
            }
            FileSizeOperation::AllocationSize => {
                node.info.allocation_size = size;
                if node.info.file_size > size {
                    buffer.resize(size as usize, 0);
                    node.info.file_size = size;
                }
            }
        }
        Ok(node.info)
    }

    fn can_delete(&self, context: FileContext) -> Result<(), Status> {
        let state = self.state.lock().unwrap();
        let path = self.path_for(&state, context)?;
        if path == "\\" {
            return Err(Status::ACCESS_DENIED);
        }
        if let NodeData::Directory = state.nodes.get(&path).ok_or(Status::NO_SUCH_FILE)?.data {
            let has_children = state.nodes.keys().any(|other| other != &path && parent_of(other).as_deref() == Some(&path));
            if has_children {
                return Err(Status::DIRECTORY_NOT_EMPTY);
            }
        }
        Ok(())
    }

    fn set_delete(&self, _context: FileContext, _delete_pending: bool) -> Result<(), Status> {
        Ok(())
    }

    fn rename(&self, context: FileContext, new_path: &str, replace_if_exists: bool, _posix_semantics: bool) -> Result<(), Status> {
        let new_path = normalize(new_path);
        let mut state = self.state.lock().unwrap();
        let old_path = self.path_for(&state, context)?;
        if old_path == new_path {
            return Ok(());
        }
        if state.nodes.contains_key(&new_path) {
            if !replace_if_exists {
                return Err(Status::OBJECT_NAME_COLLISION);
            }
            state.nodes.remove(&new_path);
        }
        let node = state.nodes.remove(&old_path).ok_or(Status::NO_SUCH_FILE)?;
        let children: Vec<String> = state.nodes.keys().filter(|p| p.starts_with(&format!("{old_path}\\"))).cloned().collect();
        for child in children {
            if let Some(node) = state.nodes.remove(&child) {
                let rest = &child[old_path.len()..];
                state.nodes.insert(format!("{new_path}{rest}"), node);
            }
        }
        state.nodes.insert(new_path.clone(), node);
        if let Some(open_path) = state.open.get_mut(&context) {
            *open_path = new_path;
        }
        Ok(())
    }

    fn get_security(&self, context: FileContext) -> Result<SecurityDescriptor, Status> {
        let state = self.state.lock().unwrap();
        let path = self.path_for(&state, context)?;
        state.nodes.get(&path).map(|node| node.security.clone()).ok_or(Status::NO_SUCH_FILE)
    }

    fn set_security(&self, context: FileContext, what_to_modify: SecurityInformation, template: &SecurityDescriptor) -> Result<(), Status> {
        let mut state = self.state.lock().unwrap();
        let path = self.path_for(&state, context)?;
        let node = state.nodes.get_mut(&path).ok_or(Status::NO_SUCH_FILE)?;
        fsphost::edit(&mut node.security, what_to_modify, template);
        Ok(())
    }

    fn read_directory(&self, context: FileContext, pattern: Option<&str>) -> Completion<Vec<(String, FileInfo)>> {
        let state = self.state.lock().unwrap();
        let path = match self.path_for(&state, context) {
            Ok(path) => path,
            Err(status) => return Completion::Done(Err(status)),
        };
        if !matches!(state.nodes.get(&path).map(|n| &n.data), Some(NodeData::Directory)) {
            return Completion::Done(Err(Status::NOT_A_DIRECTORY));
        }
        let prefix = if path == "\\" { "\\".to_string() } else { format!("{path}\\") };
        let mut entries: Vec<(String, FileInfo)> = state
            .nodes
            .iter()
            .filter_map(|(candidate, node)| {
                let rest = candidate.strip_prefix(&prefix)?;
                if rest.is_empty() || rest.contains('\\') {
                    return None;
                }
                if let Some(pattern) = pattern {
                    if pattern != "*" && rest != pattern {
                        return None;
                    }
                }
                Some((rest.to_string(), node.info))
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Completion::Done(Ok(entries))
    }

    fn get_stream_info(&self, _context: FileContext) -> Result<Vec<(String, u64)>, Status> {
        Ok(Vec::new())
    }

    fn get_ea(&self, context: FileContext) -> Result<Vec<ExtendedAttribute>, Status> {
        let state = self.state.lock().unwrap();
        let path = self.path_for(&state, context)?;
        state.nodes.get(&path).map(|node| node.ea.clone()).ok_or(Status::NO_SUCH_FILE)
    }

    fn set_ea(&self, context: FileContext, entries: &[ExtendedAttribute]) -> Result<FileInfo, Status> {
        let mut state = self.state.lock().unwrap();
        let path = self.path_for(&state, context)?;
        let node = state.nodes.get_mut(&path).ok_or(Status::NO_SUCH_FILE)?;
        node.ea = entries.to_vec();
        node.info.ea_size = entries.iter().map(|e| e.packed_size() as u32).sum();
        Ok(node.info)
    }

    fn get_reparse_point(&self, context: FileContext) -> Result<Vec<u8>, Status> {
        let state = self.state.lock().unwrap();
        let path = self.path_for(&state, context)?;
        state.nodes.get(&path).and_then(|node| node.reparse.clone()).ok_or(Status::NO_SUCH_FILE)
    }

    fn set_reparse_point(&self, context: FileContext, reparse_data: &[u8]) -> Result<(), Status> {
        let mut state = self.state.lock().unwrap();
        let path = self.path_for(&state, context)?;
        let node = state.nodes.get_mut(&path).ok_or(Status::NO_SUCH_FILE)?;
        node.reparse = Some(reparse_data.to_vec());
        node.info.file_attributes |= FileAttributes::REPARSE_POINT;
        Ok(())
    }

    fn delete_reparse_point(&self, context: FileContext) -> Result<(), Status> {
        let mut state = self.state.lock().unwrap();
        let path = self.path_for(&state, context)?;
        let node = state.nodes.get_mut(&path).ok_or(Status::NO_SUCH_FILE)?;
        node.reparse = None;
        node.info.file_attributes.remove(FileAttributes::REPARSE_POINT);
        Ok(())
    }

    fn get_volume_info(&self) -> Result<VolumeInfo, Status> {
        let state = self.state.lock().unwrap();
        let used: u64 = state
            .nodes
            .values()
            .map(|node| match &node.data {
                NodeData::File(data) => data.len() as u64,
                NodeData::Directory => 0,
            })
            .sum();
        Ok(VolumeInfo { total_size: 1 << 30, free_size: (1 << 30) - used, volume_label: "MEMFS".to_string() })
    }

    fn set_volume_label(&self, _label: &str) -> Result<VolumeInfo, Status> {
        self.get_volume_info()
    }
}
