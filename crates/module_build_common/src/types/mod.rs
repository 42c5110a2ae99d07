pub mod manifest;
pub mod module_id;
pub mod module_info;
pub mod output_asset;
pub mod raw_idx;
pub mod rendered_chunk;
pub mod resolved_id;
pub mod watcher_event;
