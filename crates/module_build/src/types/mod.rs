pub mod bundle_output;
pub mod module;
pub mod module_loader_msg;

use std::sync::Arc;

use module_build_common::{ModuleIdx, NormalizedInputOptions};
use oxc_index::IndexVec;

use self::module::Module;

pub type IndexModules = IndexVec<ModuleIdx, Module>;
pub type SharedOptions = Arc<NormalizedInputOptions>;
