use clap::{CommandFactory, Parser};
use live_filters_common::config::Config;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "live-filters", about = "Live camera filters selectable from the terminal")]
pub struct Args {
    /// Index of the filter selected at startup (see --list)
    #[arg(short = 'i', long = "index", value_name = "N")]
    pub index: Option<usize>,

    /// Camera device index
    #[arg(short = 'd', long, value_name = "ID", conflicts_with = "file")]
    pub device: Option<i32>,

    /// Video file to play in a loop instead of a camera
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Hide the original camera stream and only show the processed stream
    #[arg(short = 'H', long)]
    pub hide_original: bool,

    /// Print the available filters and exit
    #[arg(short = 'l', long)]
    pub list: bool,

    /// TOML configuration file; built-in defaults are used without one
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the command-line flags as a markdown table and exit
    #[arg(long)]
    pub flags_table: bool,
}

impl Args {
    /// Command-line values win over the config file.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(index) = self.index {
            config.filters.start_index = index;
        }
        if let Some(device) = self.device {
            config.capture.device = device;
            config.capture.file = None;
        }
        if let Some(file) = &self.file {
            config.capture.file = Some(file.clone());
        }
        if self.hide_original {
            config.display.hide_original = true;
        }
    }
}

/// Markdown table of every flag, for pasting into a README.
pub fn flags_table() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut table = String::new();
    let _ = writeln!(table, "| flag | name | description | default |");
    let _ = writeln!(table, "| :---: | :--- | :--- | :--- |");
    for arg in cmd.get_arguments() {
        let flag = arg
            .get_short()
            .map(|c| format!("`-{c}`"))
            .unwrap_or_default();
        let name = arg
            .get_long()
            .map(|l| format!("`--{l}`"))
            .unwrap_or_default();
        let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
        let default = match arg.get_default_values() {
            [] => "None".to_string(),
            values => values
                .iter()
                .map(|v| v.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(", "),
        };
        let _ = writeln!(table, "| {flag} | {name} | {help} | `{default}` |");
    }
    table
}
