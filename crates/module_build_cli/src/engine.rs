use module_build::{
  Bundle, Bundler, BuildResult, InputOptions, OutputOptions, SharedPlugin, WatchOptions, Watcher,
  WatcherEvent,
};

/// What the orchestrator needs from a bundler.
pub trait Engine {
  type Bundle: WritableBundle;
  type Events: EventStream;

  async fn build(&self, input: InputOptions, plugins: Vec<SharedPlugin>) -> BuildResult<Self::Bundle>;

  fn watch(&self, options: WatchOptions) -> BuildResult<Self::Events>;
}

pub trait WritableBundle {
  async fn write_output(&self, output: &OutputOptions) -> BuildResult<()>;
}

pub trait EventStream {
  /// `None` once the session is over.
  async fn next_event(&mut self) -> Option<WatcherEvent>;
}

/// The `module_build` engine.
pub struct BundlerEngine;

impl Engine for BundlerEngine {
  type Bundle = Bundle;
  type Events = Watcher;

  async fn build(&self, input: InputOptions, plugins: Vec<SharedPlugin>) -> BuildResult<Bundle> {
    Bundler::with_plugins(input, plugins)?.build().await
  }

  fn watch(&self, options: WatchOptions) -> BuildResult<Watcher> {
    module_build::watch(options)
  }
}

impl WritableBundle for Bundle {
  async fn write_output(&self, output: &OutputOptions) -> BuildResult<()> {
    let output = self.write(output).await?;
    log::debug!("wrote {} files", output.assets.len());
    Ok(())
  }
}

impl EventStream for Watcher {
  async fn next_event(&mut self) -> Option<WatcherEvent> {
    self.recv().await
  }
}
