//! Volume-wide configuration and volume-info query/set.
//!
//! `VolumeParams` is built through [`VolumeParamsBuilder`]: setters validate
//! and clamp rather than exposing public mutable fields, returning
//! `Err(clamped)` when the caller's request had to be adjusted.

use std::time::Duration;

const MIN_SECTOR_SIZE: u16 = 512;
const MAX_SECTOR_SIZE: u16 = 4096;
const MIN_THREAD_COUNT: u32 = 1;
const MAX_THREAD_COUNT: u32 = 256;
const MAX_COMPONENT_LENGTH: u16 = 255;
const MAX_VOLUME_LABEL_LENGTH: usize = 32;

/// Per-volume parameters the file system chooses at mount time.
///
/// Construct with [`VolumeParamsBuilder`]; there is no public constructor that
/// bypasses validation.
#[derive(Clone, Debug)]
pub struct VolumeParams {
    sector_size: u16,
    sectors_per_allocation_unit: u16,
    max_component_length: u16,
    thread_count: u32,
    case_sensitive_search: bool,
    case_preserved_names: bool,
    unicode_on_disk: bool,
    persistent_acls: bool,
    reparse_points: bool,
    named_streams: bool,
    read_only_volume: bool,
    post_cleanup_when_modified_only: bool,
    pass_query_directory_pattern: bool,
    flush_and_purge_on_cleanup: bool,
    device_control_timeout: Duration,
    prefix: Option<String>,
    file_system_name: String,
}

impl VolumeParams {
    pub fn sector_size(&self) -> u16 {
        self.sector_size
    }

    pub fn sectors_per_allocation_unit(&self) -> u16 {
        self.sectors_per_allocation_unit
    }

    pub fn allocation_unit(&self) -> u64 {
        self.sector_size as u64 * self.sectors_per_allocation_unit as u64
    }

    pub fn max_component_length(&self) -> u16 {
        self.max_component_length
    }

    pub fn thread_count(&self) -> u32 {
        self.thread_count
    }

    pub fn case_sensitive_search(&self) -> bool {
        self.case_sensitive_search
    }

    pub fn case_preserved_names(&self) -> bool {
        self.case_preserved_names
    }

    pub fn unicode_on_disk(&self) -> bool {
        self.unicode_on_disk
    }

    pub fn persistent_acls(&self) -> bool {
        self.persistent_acls
    }

    pub fn reparse_points(&self) -> bool {
        self.reparse_points
    }

    pub fn named_streams(&self) -> bool {
        self.named_streams
    }

    pub fn read_only_volume(&self) -> bool {
        self.read_only_volume
    }

    pub fn post_cleanup_when_modified_only(&self) -> bool {
        self.post_cleanup_when_modified_only
    }

    pub fn pass_query_directory_pattern(&self) -> bool {
        self.pass_query_directory_pattern
    }

    pub fn flush_and_purge_on_cleanup(&self) -> bool {
        self.flush_and_purge_on_cleanup
    }

    pub fn device_control_timeout(&self) -> Duration {
        self.device_control_timeout
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn file_system_name(&self) -> &str {
        &self.file_system_name
    }
}

/// Builder for [`VolumeParams`]. Each setter either accepts the value or
/// clamps it to the nearest valid value and returns `Err` with the clamped
/// result.
#[derive(Clone, Debug)]
pub struct VolumeParamsBuilder {
    sector_size: u16,
    sectors_per_allocation_unit: u16,
    max_component_length: u16,
    thread_count: u32,
    case_sensitive_search: bool,
    case_preserved_names: bool,
    unicode_on_disk: bool,
    persistent_acls: bool,
    reparse_points: bool,
    named_streams: bool,
    read_only_volume: bool,
    post_cleanup_when_modified_only: bool,
    pass_query_directory_pattern: bool,
    flush_and_purge_on_cleanup: bool,
    device_control_timeout: Duration,
    prefix: Option<String>,
    file_system_name: String,
}

impl Default for VolumeParamsBuilder {
    fn default() -> Self {
        VolumeParamsBuilder {
            sector_size: MIN_SECTOR_SIZE,
            sectors_per_allocation_unit: 1,
            max_component_length: MAX_COMPONENT_LENGTH,
            thread_count: 2,
            case_sensitive_search: false,
            case_preserved_names: true,
            unicode_on_disk: true,
            persistent_acls: false,
            reparse_points: false,
            named_streams: false,
            read_only_volume: false,
            post_cleanup_when_modified_only: false,
            pass_query_directory_pattern: false,
            flush_and_purge_on_cleanup: false,
            device_control_timeout: Duration::from_secs(30),
            prefix: None,
            file_system_name: String::from("FSPHOST"),
        }
    }
}

impl VolumeParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sector size, clamped to `[512, 4096]` and rounded down to the
    /// nearest power of two.
    pub fn sector_size(&mut self, value: u16) -> Result<&mut Self, u16> {
        let clamped = value.clamp(MIN_SECTOR_SIZE, MAX_SECTOR_SIZE).next_power_of_two();
        self.sector_size = clamped;
        if clamped == value {
            Ok(self)
        } else {
            Err(clamped)
        }
    }

    pub fn sectors_per_allocation_unit(&mut self, value: u16) -> &mut Self {
        self.sectors_per_allocation_unit = value.max(1);
        self
    }

    /// Sets the maximum path component length, clamped to `[1, 255]`.
    pub fn max_component_length(&mut self, value: u16) -> Result<&mut Self, u16> {
        let clamped = value.clamp(1, MAX_COMPONENT_LENGTH);
        self.max_component_length = clamped;
        if clamped == value {
            Ok(self)
        } else {
            Err(clamped)
        }
    }

    /// Sets the dispatcher's fixed worker-thread count, clamped to
    /// `[1, 256]`.
    pub fn thread_count(&mut self, value: u32) -> Result<&mut Self, u32> {
        let clamped = value.clamp(MIN_THREAD_COUNT, MAX_THREAD_COUNT);
        self.thread_count = clamped;
        if clamped == value {
            Ok(self)
        } else {
            Err(clamped)
        }
    }

    pub fn case_sensitive_search(&mut self, value: bool) -> &mut Self {
        self.case_sensitive_search = value;
        self
    }

    pub fn case_preserved_names(&mut self, value: bool) -> &mut Self {
        self.case_preserved_names = value;
        self
    }

    pub fn unicode_on_disk(&mut self, value: bool) -> &mut Self {
        self.unicode_on_disk = value;
        self
    }

    pub fn persistent_acls(&mut self, value: bool) -> &mut Self {
        self.persistent_acls = value;
        self
    }

    pub fn reparse_points(&mut self, value: bool) -> &mut Self {
        self.reparse_points = value;
        self
    }

    pub fn named_streams(&mut self, value: bool) -> &mut Self {
        self.named_streams = value;
        self
    }

    pub fn read_only_volume(&mut self, value: bool) -> &mut Self {
        self.read_only_volume = value;
        self
    }

    pub fn post_cleanup_when_modified_only(&mut self, value: bool) -> &mut Self {
        self.post_cleanup_when_modified_only = value;
        self
    }

    pub fn pass_query_directory_pattern(&mut self, value: bool) -> &mut Self {
        self.pass_query_directory_pattern = value;
        self
    }

    pub fn flush_and_purge_on_cleanup(&mut self, value: bool) -> &mut Self {
        self.flush_and_purge_on_cleanup = value;
        self
    }

    pub fn device_control_timeout(&mut self, value: Duration) -> &mut Self {
        self.device_control_timeout = value;
        self
    }

    /// Sets the network volume prefix (`\\server\share` form). Validation of
    /// the exact shape happens in `transport::device`, not here.
    pub fn prefix(&mut self, value: impl Into<String>) -> &mut Self {
        self.prefix = Some(value.into());
        self
    }

    /// Sets the file system name reported to `GetVolumeInfo`, truncated to 32
    /// UTF-16 code units if longer.
    pub fn file_system_name(&mut self, value: impl Into<String>) -> &mut Self {
        let mut value = value.into();
        if value.encode_utf16().count() > MAX_VOLUME_LABEL_LENGTH {
            value = value
                .encode_utf16()
                .take(MAX_VOLUME_LABEL_LENGTH)
                .collect::<Vec<u16>>()
                .iter()
                .map(|&c| char::from_u32(c as u32).unwrap_or('?'))
                .collect();
        }
        self.file_system_name = value;
        self
    }

    pub fn build(&self) -> VolumeParams {
        VolumeParams {
            sector_size: self.sector_size,
            sectors_per_allocation_unit: self.sectors_per_allocation_unit,
            max_component_length: self.max_component_length,
            thread_count: self.thread_count,
            case_sensitive_search: self.case_sensitive_search,
            case_preserved_names: self.case_preserved_names,
            unicode_on_disk: self.unicode_on_disk,
            persistent_acls: self.persistent_acls,
            reparse_points: self.reparse_points,
            named_streams: self.named_streams,
            read_only_volume: self.read_only_volume,
            post_cleanup_when_modified_only: self.post_cleanup_when_modified_only,
            pass_query_directory_pattern: self.pass_query_directory_pattern,
            flush_and_purge_on_cleanup: self.flush_and_purge_on_cleanup,
            device_control_timeout: self.device_control_timeout,
            prefix: self.prefix.clone(),
            file_system_name: self.file_system_name.clone(),
        }
    }
}

/// Answer to `GetVolumeInfo`/input to `SetVolumeLabel`.
#[derive(Clone, Debug, Default)]
pub struct VolumeInfo {
    pub total_size: u64,
    pub free_size: u64,
    pub volume_label: String,
}
