use std::{
  path::{Path, PathBuf},
  process::ExitCode,
  sync::Arc,
  time::Duration,
};

use ansi_term::Colour;
use module_build::{
  BuildError, BuildResult, InputOptions, Manifest, OutputFormat, OutputOptions, SharedPlugin,
  WatchOptions, WatcherOptions,
};
use module_build_plugins::{
  AutoExternalPlugin, CommonJsPlugin, DeleteOptions, DeletePlugin, ESTarget, NodeResolveOptions,
  NodeResolvePlugin, SizesOptions, SizesPlugin, TypeScriptOptions, TypeScriptPlugin,
};

use crate::{
  args::Commands,
  console::Console,
  engine::{Engine, EventStream, WritableBundle},
  progress::ProgressPlugin,
};

const EXTENSIONS: [&str; 6] = [".ts", ".js", ".jsx", ".es6", ".es", ".mjs"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Success,
  Failure,
}

impl From<Status> for ExitCode {
  fn from(status: Status) -> Self {
    match status {
      Status::Success => ExitCode::SUCCESS,
      Status::Failure => ExitCode::FAILURE,
    }
  }
}

/// Reads the manifest, assembles the build configuration and drives the engine.
pub struct Orchestrator<E> {
  engine: E,
  cwd: PathBuf,
  console: Console,
}

impl<E: Engine> Orchestrator<E> {
  pub fn new(engine: E, cwd: PathBuf, console: Console) -> Self {
    Self { engine, cwd, console }
  }

  pub async fn run(&self, flags: &Commands) -> Status {
    let watch = flags.watch.then(watcher_options);
    self.banner(watch.is_some());

    let manifest = match Manifest::read_from_dir(&self.cwd) {
      Ok(manifest) => manifest,
      Err(error) => {
        self.console.line(&format!("module-build:{} {error:#}", Colour::Red.paint("ERROR")));
        return Status::Failure;
      }
    };

    let input = self.input_options(&manifest);
    let plugins = plugins(&manifest);
    let output = output_options(&manifest);

    match watch {
      None => match self.build_and_write(input, plugins, &output).await {
        Ok(()) => Status::Success,
        Err(error) => self.report(&error),
      },
      Some(watch) => {
        let on_event = Some(self.console.on_event());
        self.watch(WatchOptions { input, plugins, output, watch, on_event }).await
      }
    }
  }

  fn banner(&self, watch: bool) {
    let mode = if watch { Colour::Blue.paint("watch mode").to_string() } else { String::new() };
    self.console.line(&format!("module-build:{mode}"));
    self.console.line(&self.cwd.display().to_string());
  }

  fn input_options(&self, manifest: &Manifest) -> InputOptions {
    InputOptions {
      input: Some(manifest.source.clone()),
      cwd: Some(self.cwd.clone()),
      external: Some(manifest.external.clone()),
      treeshake: Some(false),
      on_log: Some(self.console.on_log()),
    }
  }

  async fn build_and_write(
    &self,
    input: InputOptions,
    plugins: Vec<SharedPlugin>,
    output: &OutputOptions,
  ) -> BuildResult<()> {
    let bundle = self.engine.build(input, plugins).await?;
    bundle.write_output(output).await
  }

  /// Runs until the session ends. Lifecycle lines are printed by the `on_event` sink; build
  /// errors are events, not failures.
  async fn watch(&self, options: WatchOptions) -> Status {
    let mut events = match self.engine.watch(options) {
      Ok(events) => events,
      Err(error) => return self.report(&error),
    };

    while let Some(event) = events.next_event().await {
      log::trace!("watch event {} received", event.code());
    }
    Status::Success
  }

  fn report(&self, error: &BuildError) -> Status {
    for message in error.messages() {
      self.console.line(&format!("{} {message}", Colour::Red.paint("Error:")));
    }
    Status::Failure
  }
}

fn watcher_options() -> WatcherOptions {
  WatcherOptions {
    build_delay: Duration::ZERO,
    clear_screen: false,
    include: vec!["src/**".to_string()],
    ..WatcherOptions::default()
  }
}

fn output_options(manifest: &Manifest) -> OutputOptions {
  OutputOptions {
    file: Some(manifest.module.clone()),
    format: Some(OutputFormat::Esm),
    sourcemap: Some(true),
  }
}

/// The processing steps, in the order they run.
fn plugins(manifest: &Manifest) -> Vec<SharedPlugin> {
  vec![
    Arc::new(DeletePlugin::new(DeleteOptions {
      targets: delete_targets(manifest),
      run_once: true,
    })),
    Arc::new(ProgressPlugin),
    Arc::new(AutoExternalPlugin),
    Arc::new(CommonJsPlugin),
    Arc::new(TypeScriptPlugin::new(TypeScriptOptions {
      declaration: true,
      declaration_map: true,
      strict: true,
      no_unused_locals: true,
      no_unused_parameters: true,
      no_implicit_returns: true,
      isolated_modules: true,
      target: ESTarget::EsNext,
      source_map: true,
      root_dir: PathBuf::from("src"),
    })),
    Arc::new(NodeResolvePlugin::new(NodeResolveOptions {
      extensions: EXTENSIONS.map(String::from).to_vec(),
      prefer_builtins: false,
    })),
    Arc::new(SizesPlugin::new(SizesOptions { details: true })),
  ]
}

/// Everything inside the output directory. Nothing when the bundle goes to the package root.
fn delete_targets(manifest: &Manifest) -> Vec<String> {
  let dir = manifest.output_dir();
  let dir = dir.strip_prefix(".").unwrap_or(&dir);
  if dir.as_os_str().is_empty() {
    return vec![];
  }
  vec![format!("{}/*", slash(dir))]
}

fn slash(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
  use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
  };

  use ansi_term::Colour;
  use module_build::{
    BuildError, BuildResult, InputOptions, LogLevel, Manifest, OutputFormat, OutputOptions,
    SharedPlugin, WatchOptions, WatcherEvent, WatcherOptions,
  };

  use super::{delete_targets, Orchestrator, Status};
  use crate::{
    args::Commands,
    console::Captured,
    engine::{Engine, EventStream, WritableBundle},
  };

  #[derive(Default)]
  struct Calls {
    inputs: Vec<InputOptions>,
    plugins: Vec<Vec<String>>,
    outputs: Vec<OutputOptions>,
    watches: Vec<WatcherOptions>,
  }

  #[derive(Default)]
  struct FakeEngine {
    fail_with: Option<&'static str>,
    events: Vec<WatcherEvent>,
    calls: Arc<Mutex<Calls>>,
  }

  impl FakeEngine {
    fn record(&self, input: InputOptions, plugins: &[SharedPlugin]) {
      let mut calls = self.calls.lock().unwrap();
      calls.inputs.push(input);
      calls.plugins.push(plugins.iter().map(|plugin| plugin.name().into_owned()).collect());
    }
  }

  struct FakeBundle(Arc<Mutex<Calls>>);

  struct FakeEvents(VecDeque<WatcherEvent>);

  impl Engine for FakeEngine {
    type Bundle = FakeBundle;
    type Events = FakeEvents;

    async fn build(
      &self,
      input: InputOptions,
      plugins: Vec<SharedPlugin>,
    ) -> BuildResult<FakeBundle> {
      self.record(input, &plugins);
      match self.fail_with {
        Some(message) => Err(BuildError::from(anyhow::anyhow!(message))),
        None => Ok(FakeBundle(Arc::clone(&self.calls))),
      }
    }

    fn watch(&self, options: WatchOptions) -> BuildResult<FakeEvents> {
      let on_log = options.input.on_log.clone().unwrap();
      let on_event = options.on_event.clone().unwrap();
      for event in &self.events {
        on_event.call(event);
        if matches!(event, WatcherEvent::BundleStart { .. }) {
          on_log.call(LogLevel::Info, "index.ts: parsed");
        }
      }
      self.record(options.input, &options.plugins);
      let mut calls = self.calls.lock().unwrap();
      calls.outputs.push(options.output);
      calls.watches.push(options.watch);
      Ok(FakeEvents(self.events.clone().into()))
    }
  }

  impl WritableBundle for FakeBundle {
    async fn write_output(&self, output: &OutputOptions) -> BuildResult<()> {
      self.0.lock().unwrap().outputs.push(output.clone());
      Ok(())
    }
  }

  impl EventStream for FakeEvents {
    async fn next_event(&mut self) -> Option<WatcherEvent> {
      self.0.pop_front()
    }
  }

  fn package(manifest: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("package.json"), manifest).unwrap();
    dir
  }

  const MANIFEST: &str =
    r#"{ "source": "src/index.ts", "module": "dist/index.js", "external": ["left-pad"] }"#;

  async fn run(engine: FakeEngine, cwd: &Path, watch: bool) -> (Status, Captured) {
    let captured = Captured::default();
    let orchestrator = Orchestrator::new(engine, cwd.to_path_buf(), captured.console());
    let status = orchestrator.run(&Commands { watch }).await;
    (status, captured)
  }

  #[tokio::test]
  async fn one_shot_builds_then_writes() {
    let dir = package(MANIFEST);
    let engine = FakeEngine::default();
    let calls = Arc::clone(&engine.calls);

    let (status, captured) = run(engine, dir.path(), false).await;
    assert_eq!(status, Status::Success);

    let calls = calls.lock().unwrap();
    let input = &calls.inputs[0];
    assert_eq!(input.input.as_deref(), Some("src/index.ts"));
    assert_eq!(input.cwd.as_deref(), Some(dir.path()));
    assert_eq!(input.external, Some(vec!["left-pad".to_string()]));
    assert_eq!(input.treeshake, Some(false));
    assert_eq!(
      calls.plugins[0],
      [
        "delete",
        "progress",
        "auto-external",
        "commonjs",
        "typescript",
        "node-resolve",
        "sizes"
      ]
    );

    let output = &calls.outputs[0];
    assert_eq!(output.file.as_deref(), Some("dist/index.js"));
    assert_eq!(output.format, Some(OutputFormat::Esm));
    assert_eq!(output.sourcemap, Some(true));
    assert!(calls.watches.is_empty());

    input.on_log.as_ref().unwrap().call(LogLevel::Info, "index.ts: parsed");
    assert_eq!(
      captured.lines(),
      vec![
        "module-build:".to_string(),
        dir.path().display().to_string(),
        "index.ts: parsed".to_string()
      ]
    );
  }

  #[tokio::test]
  async fn build_errors_fail_without_writing() {
    let dir = package(MANIFEST);
    let engine =
      FakeEngine { fail_with: Some("Could not resolve \"./missing\""), ..FakeEngine::default() };
    let calls = Arc::clone(&engine.calls);

    let (status, captured) = run(engine, dir.path(), false).await;
    assert_eq!(status, Status::Failure);
    assert!(calls.lock().unwrap().outputs.is_empty());
    assert_eq!(
      captured.lines().last().unwrap(),
      &format!("{} Could not resolve \"./missing\"", Colour::Red.paint("Error:"))
    );
  }

  #[tokio::test]
  async fn invalid_manifest_is_fatal() {
    let dir = package(r#"{ "module": "dist/index.js" }"#);
    let engine = FakeEngine::default();
    let calls = Arc::clone(&engine.calls);

    let (status, captured) = run(engine, dir.path(), false).await;
    assert_eq!(status, Status::Failure);
    assert!(calls.lock().unwrap().inputs.is_empty());

    let lines = captured.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[2].starts_with(&format!("module-build:{}", Colour::Red.paint("ERROR"))));
    assert!(lines[2].contains("source"));
  }

  #[tokio::test]
  async fn watch_logs_lifecycle_signals() {
    let dir = package(MANIFEST);
    let bundle = ("src/index.ts".to_string(), PathBuf::from("dist/index.js"));
    let engine = FakeEngine {
      events: vec![
        WatcherEvent::Start,
        WatcherEvent::BundleStart { input: bundle.0.clone(), output: bundle.1.clone() },
        WatcherEvent::BundleEnd {
          input: bundle.0.clone(),
          output: bundle.1.clone(),
          duration: Duration::from_millis(5),
        },
        WatcherEvent::End,
        WatcherEvent::Restart,
        WatcherEvent::Start,
        WatcherEvent::Error(Arc::new(BuildError::from(anyhow::anyhow!("boom")))),
        WatcherEvent::End,
        WatcherEvent::Close,
      ],
      ..FakeEngine::default()
    };
    let calls = Arc::clone(&engine.calls);

    let (status, captured) = run(engine, dir.path(), true).await;
    assert_eq!(status, Status::Success);

    let calls = calls.lock().unwrap();
    let watch = &calls.watches[0];
    assert_eq!(watch.build_delay, Duration::ZERO);
    assert!(!watch.clear_screen);
    assert_eq!(watch.include, vec!["src/**".to_string()]);
    assert_eq!(calls.outputs[0].file.as_deref(), Some("dist/index.js"));
    assert_eq!(calls.plugins[0].len(), 7);

    let green = |code: &str| format!("watch:{}", Colour::Green.paint(code));
    let cyan = |code: &str| format!("module-build:{}", Colour::Cyan.paint(code));
    assert_eq!(
      captured.lines(),
      vec![
        format!("module-build:{}", Colour::Blue.paint("watch mode")),
        dir.path().display().to_string(),
        green("START"),
        green("BUNDLE_START"),
        "index.ts: parsed".to_string(),
        cyan("BUNDLE_END"),
        cyan("END"),
        green("START"),
        format!("module-build:{}", Colour::Red.paint("ERROR")),
        cyan("END"),
      ]
    );
  }

  #[test]
  fn deletes_inside_the_output_directory_only() {
    let targets = |module: &str| {
      delete_targets(&Manifest {
        source: "src/index.ts".to_string(),
        module: module.to_string(),
        external: vec![],
      })
    };
    assert_eq!(targets("dist/index.js"), vec!["dist/*".to_string()]);
    assert_eq!(targets("./lib/esm/index.js"), vec!["lib/esm/*".to_string()]);
    assert!(targets("index.js").is_empty());
  }
}
