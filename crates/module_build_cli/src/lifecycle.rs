use std::io::{self, Write};

use ansi_term::Colour;
use module_build::WatcherEvent;

/// The console line for a watcher event. Changes, restarts and closing print nothing.
pub fn line(event: &WatcherEvent) -> Option<String> {
  let (prefix, code) = match event {
    WatcherEvent::Start | WatcherEvent::BundleStart { .. } => ("watch:", Colour::Green),
    WatcherEvent::BundleEnd { .. } | WatcherEvent::End => ("module-build:", Colour::Cyan),
    WatcherEvent::Error(_) => ("module-build:", Colour::Red),
    WatcherEvent::Change { .. } | WatcherEvent::Restart | WatcherEvent::Close => return None,
  };
  Some(format!("{prefix}{}", code.paint(event.code())))
}

pub fn log_event(out: &mut dyn Write, event: &WatcherEvent) -> io::Result<()> {
  match line(event) {
    Some(line) => writeln!(out, "{line}"),
    None => Ok(()),
  }
}
