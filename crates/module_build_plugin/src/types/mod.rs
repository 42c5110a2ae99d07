pub mod hook_generate_bundle_args;
pub mod hook_load;
pub mod hook_resolve_id;
pub mod hook_transform;
pub mod transform_result;
