mod watch_filter;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::{Duration, Instant},
};

use indexmap::IndexMap;
use module_build_common::{
  InputOptions, ModuleId, OnEvent, OutputOptions, WatchChangeKind, WatcherEvent, WatcherOptions,
};
use module_build_error::BuildResult;
use module_build_plugin::SharedPlugin;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::{
  sync::{mpsc, oneshot},
  task::JoinHandle,
};

use self::watch_filter::WatchFilter;
use crate::{bundler::Bundler, utils::normalize_options::normalize_output_options};

pub struct WatchOptions {
  pub input: InputOptions,
  /// Shared by every pass, so plugin state survives rebuilds.
  pub plugins: Vec<SharedPlugin>,
  pub output: OutputOptions,
  pub watch: WatcherOptions,
  /// Called on the watch task before an event is queued for `Watcher::recv`.
  pub on_event: Option<OnEvent>,
}

/// Handle to a running watch session.
pub struct Watcher {
  rx: mpsc::UnboundedReceiver<WatcherEvent>,
  close_tx: Option<oneshot::Sender<()>>,
  task: Option<JoinHandle<()>>,
}

impl Watcher {
  /// The next event, or `None` once the session is over and every event was received.
  pub async fn recv(&mut self) -> Option<WatcherEvent> {
    self.rx.recv().await
  }

  /// Stops watching after the current pass. `Close` is the last event the session emits.
  pub async fn close(&mut self) {
    if let Some(close_tx) = self.close_tx.take() {
      let _ = close_tx.send(());
    }
    if let Some(task) = self.task.take() {
      if let Err(error) = task.await {
        log::error!("Watch task failed: {error}");
      }
    }
  }
}

type FsEvent = notify::Result<Event>;

/// Editors and the file system report one save as several events. A batch is closed only after
/// this long without a new one, even when no build delay is configured.
const SETTLE_WINDOW: Duration = Duration::from_millis(50);

/// Builds once, then rebuilds whenever a watched file under `cwd` changes. Build errors are
/// reported as events and never end the session.
pub fn watch(options: WatchOptions) -> BuildResult<Watcher> {
  let WatchOptions { input, plugins, output, watch, on_event } = options;
  let bundler = Bundler::with_plugins(input, plugins)?;
  let output_dir = normalize_output_options(&output, &bundler.options.cwd)?.dir;
  let filter = WatchFilter::new(&bundler.options.cwd, &watch, &output_dir);

  let (fs_tx, fs_rx) = mpsc::unbounded_channel::<FsEvent>();
  let mut fs_watcher = notify::recommended_watcher(move |event: FsEvent| {
    let _ = fs_tx.send(event);
  })
  .map_err(anyhow::Error::from)?;
  fs_watcher.watch(&bundler.options.cwd, RecursiveMode::Recursive).map_err(anyhow::Error::from)?;

  let (tx, rx) = mpsc::unbounded_channel();
  let (close_tx, close_rx) = oneshot::channel();

  let task = WatchTask {
    bundler,
    output,
    build_delay: watch.build_delay,
    filter,
    fs_rx,
    tx,
    on_event,
    _fs_watcher: fs_watcher,
  };
  let task = tokio::spawn(task.run(close_rx));

  Ok(Watcher { rx, close_tx: Some(close_tx), task: Some(task) })
}

struct WatchTask {
  bundler: Bundler,
  output: OutputOptions,
  build_delay: Duration,
  filter: WatchFilter,
  fs_rx: mpsc::UnboundedReceiver<FsEvent>,
  tx: mpsc::UnboundedSender<WatcherEvent>,
  on_event: Option<OnEvent>,
  _fs_watcher: RecommendedWatcher,
}

impl WatchTask {
  async fn run(mut self, mut close_rx: oneshot::Receiver<()>) {
    loop {
      self.run_pass().await;

      let changes = tokio::select! {
        _ = &mut close_rx => break,
        changes = self.next_changes() => changes,
      };
      let Some(changes) = changes else { break };

      for (path, kind) in changes {
        let id = path.to_string_lossy();
        if let Err(error) = self.bundler.plugin_driver.watch_change(&id, kind) {
          log::error!("{error}");
        }
        self.emit(WatcherEvent::Change { id: ModuleId::new(id.as_ref()), kind });
      }
      self.emit(WatcherEvent::Restart);
    }

    self.emit(WatcherEvent::Close);
  }

  async fn run_pass(&mut self) {
    let input = self.bundler.options.input.clone();
    let output = PathBuf::from(self.output.file.clone().unwrap_or_default());

    self.emit(WatcherEvent::Start);
    self.emit(WatcherEvent::BundleStart { input: input.clone(), output: output.clone() });

    let start = Instant::now();
    match self.build_and_write().await {
      Ok(()) => {
        self.emit(WatcherEvent::BundleEnd { input, output, duration: start.elapsed() });
      }
      Err(error) => {
        for message in error.messages() {
          log::error!("{message}");
        }
        self.emit(WatcherEvent::Error(Arc::new(error)));
      }
    }

    self.emit(WatcherEvent::End);
  }

  async fn build_and_write(&mut self) -> BuildResult<()> {
    let bundle = self.bundler.build().await?;
    let output = bundle.write(&self.output).await?;

    let output_dir = normalize_output_options(&self.output, &self.bundler.options.cwd)?.dir;
    self.filter.set_written(output.assets.iter().map(|asset| output_dir.join(asset.filename())));
    Ok(())
  }

  /// Waits for the first relevant change, then collects more until the build delay (at least
  /// [`SETTLE_WINDOW`]) passes without one. `None` when the file-system watcher stopped.
  async fn next_changes(&mut self) -> Option<IndexMap<PathBuf, WatchChangeKind>> {
    let mut changes = IndexMap::new();

    while changes.is_empty() {
      let event = self.fs_rx.recv().await?;
      collect(&self.filter, event, &mut changes);
    }

    let window = self.build_delay.max(SETTLE_WINDOW);
    let filter = &self.filter;
    drain_until_quiet(&mut self.fs_rx, window, |event| collect(filter, event, &mut changes)).await;

    Some(changes)
  }

  fn emit(&self, event: WatcherEvent) {
    log::debug!("watch event {}", event.code());
    if let Some(on_event) = &self.on_event {
      on_event.call(&event);
    }
    // The session outlives a dropped `Watcher`; its events are simply discarded then.
    let _ = self.tx.send(event);
  }
}

async fn drain_until_quiet(
  fs_rx: &mut mpsc::UnboundedReceiver<FsEvent>,
  window: Duration,
  mut f: impl FnMut(FsEvent),
) {
  while let Ok(Some(event)) = tokio::time::timeout(window, fs_rx.recv()).await {
    f(event);
  }
}

fn collect(
  filter: &WatchFilter,
  event: FsEvent,
  changes: &mut IndexMap<PathBuf, WatchChangeKind>,
) {
  let event = match event {
    Ok(event) => event,
    Err(error) => {
      log::warn!("File watcher error: {error}");
      return;
    }
  };
  let Some(kind) = change_kind(&event.kind) else { return };

  for path in event.paths.iter().filter(|path| filter.matches(path)) {
    record_change(changes, path, kind);
  }
}

fn change_kind(kind: &EventKind) -> Option<WatchChangeKind> {
  match kind {
    EventKind::Create(_) => Some(WatchChangeKind::Create),
    EventKind::Modify(_) => Some(WatchChangeKind::Update),
    EventKind::Remove(_) => Some(WatchChangeKind::Delete),
    _ => None,
  }
}

/// A file created and then modified within one batch is still a creation.
fn record_change(
  changes: &mut IndexMap<PathBuf, WatchChangeKind>,
  path: &Path,
  kind: WatchChangeKind,
) {
  match changes.get_mut(path) {
    Some(previous) if *previous == WatchChangeKind::Create && kind == WatchChangeKind::Update => {}
    Some(previous) => *previous = kind,
    None => {
      changes.insert(path.to_path_buf(), kind);
    }
  }
}

#[test]
fn batches_merge_changes_per_file() {
  let mut changes = IndexMap::new();
  record_change(&mut changes, Path::new("/p/a.ts"), WatchChangeKind::Create);
  record_change(&mut changes, Path::new("/p/a.ts"), WatchChangeKind::Update);
  record_change(&mut changes, Path::new("/p/b.ts"), WatchChangeKind::Update);
  record_change(&mut changes, Path::new("/p/b.ts"), WatchChangeKind::Delete);

  assert_eq!(
    changes.into_iter().collect::<Vec<_>>(),
    vec![
      (PathBuf::from("/p/a.ts"), WatchChangeKind::Create),
      (PathBuf::from("/p/b.ts"), WatchChangeKind::Delete),
    ]
  );
}

#[tokio::test]
async fn a_save_right_after_creation_is_one_change() {
  use notify::event::{CreateKind, ModifyKind};

  let path = PathBuf::from("/p/src/new.ts");
  let (tx, mut rx) = mpsc::unbounded_channel::<FsEvent>();
  tx.send(Ok(Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone()))).unwrap();
  let late = tx.clone();
  let modified = path.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(5)).await;
    late.send(Ok(Event::new(EventKind::Modify(ModifyKind::Any)).add_path(modified))).unwrap();
  });

  let mut changes = IndexMap::new();
  let mut record = |event: FsEvent| {
    let event = event.unwrap();
    let kind = change_kind(&event.kind).unwrap();
    for path in &event.paths {
      record_change(&mut changes, path, kind);
    }
  };
  record(rx.recv().await.unwrap());
  drain_until_quiet(&mut rx, Duration::ZERO.max(SETTLE_WINDOW), &mut record).await;

  assert_eq!(changes.into_iter().collect::<Vec<_>>(), vec![(path, WatchChangeKind::Create)]);
}
