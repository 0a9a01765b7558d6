use clap::Parser;
use log::LevelFilter;
use pixelfont::pipeline::Pipeline;
use pixelfont_config::settings::Setting;
use pixelfont_config::ConfigStore;
use prettytable::{Attr, Cell, Row, Table};
use simple_logger::SimpleLogger;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name = "pixelfont", version = "0.1.0", about = "Converts a TrueType font into a pixelated variant")]
struct Cli {
    /// Json file with setting overrides, e.g. { "glyphs.pixel_size": "u:4" }
    #[clap(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Font to pixelate (font.input)
    #[clap(short = 'i', long = "input")]
    input: Option<String>,

    /// Font to generate (font.output)
    #[clap(short = 'o', long = "output")]
    output: Option<String>,

    /// Enable debug logging
    #[clap(short = 'd', long = "debug")]
    debug: bool,

    /// List all settings with their current values and exit
    #[clap(long = "list-settings")]
    list_settings: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new().with_level(level).init()?;

    let mut store = ConfigStore::new()?;
    if let Some(path) = &args.config {
        store.load_file(path)?;
    }
    if let Some(input) = args.input {
        store.set("font.input", Setting::String(input));
    }
    if let Some(output) = args.output {
        store.set("font.output", Setting::String(output));
    }

    if args.list_settings {
        render_table(&store);
        return Ok(());
    }

    let mut pipeline = Pipeline::from_config(store.pipeline_config()?)?;
    let report = pipeline.run()?;

    println!("Pixelated font saved to {}", report.output.display());
    Ok(())
}

fn render_table(store: &ConfigStore) {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(vec![
        Cell::new("Key").with_style(Attr::Bold),
        Cell::new("Value").with_style(Attr::Bold),
        Cell::new("Default").with_style(Attr::Bold),
        Cell::new("Description").with_style(Attr::Bold),
    ]));

    for key in store.keys() {
        let Some(info) = store.get_info(key) else {
            continue;
        };
        let value = store.get(key).map(|s| format!("{s}")).unwrap_or_default();

        table.add_row(Row::new(vec![
            Cell::new(key),
            Cell::new(&value),
            Cell::new(&format!("{}", info.default)),
            Cell::new(&info.description),
        ]));
    }

    table.printstd();
}
