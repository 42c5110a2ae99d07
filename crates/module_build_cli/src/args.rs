use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(
  name = "module-build",
  version,
  about = "Bundles the package in the current directory into a single ES module with declarations and source maps.",
  long_about = None,
  after_help = "Reads `source`, `module` and `external` from ./package.json."
)]
pub struct Commands {
  /// Watch files in bundle and rebuild on changes.
  #[clap(long)]
  pub watch: bool,
}

#[test]
fn parses_watch_flag() {
  assert!(!Commands::parse_from(["module-build"]).watch);
  assert!(Commands::parse_from(["module-build", "--watch"]).watch);
  assert!(Commands::try_parse_from(["module-build", "--minify"]).is_err());
}
