use crate::ModuleId;

#[derive(Debug, Clone)]
pub struct RenderedModule {
  pub id: ModuleId,
  /// Length in bytes of the module's code inside the chunk.
  pub rendered_length: usize,
}

#[derive(Debug, Clone)]
pub struct RenderedChunk {
  pub filename: String,
  pub facade_module_id: ModuleId,
  /// In execution order.
  pub modules: Vec<RenderedModule>,
  pub exports: Vec<String>,
}
