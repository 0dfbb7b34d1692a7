use autopreload_lib::parser::css_sheet;
use autopreload_lib::{
    FileFetcher, ImageHandle, PreloadConfig, PreloadError, Preloader, PropertyLookup, StyleDocument,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "autopreload")]
#[command(about = "List and preload images used by :hover/:active/:focus/:checked CSS rules")]
struct Args {
    /// Stylesheets to scan, in document order.
    #[arg(required = true)]
    css_files: Vec<PathBuf>,

    /// URL the stylesheets are served from, e.g. `https://example.com/css/`.
    /// Defaults to each file's own file:// URL.
    #[arg(long)]
    base_url: Option<String>,

    /// YAML file with selectors/images/files to add or ignore.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long = "add-selector")]
    add_selectors: Vec<String>,

    #[arg(long = "ignore-selector")]
    ignore_selectors: Vec<String>,

    #[arg(long = "add-image")]
    add_images: Vec<String>,

    #[arg(long = "ignore-image")]
    ignore_images: Vec<String>,

    #[arg(long = "ignore-file")]
    ignore_files: Vec<String>,

    /// Scan every property for url(...) values instead of background-image only.
    #[arg(long)]
    enumerate: bool,

    /// Load the found file:// sources from disk and wait for them.
    #[arg(long)]
    preload: bool,

    /// How long --preload waits for every image.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

fn main() {
    env_logger::init();

    // parse the args given in terminal
    let args: Args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), PreloadError> {
    let mut config = match &args.config {
        Some(path) => PreloadConfig::load(path)?,
        None => PreloadConfig::default(),
    };
    if args.enumerate {
        config.lookup = PropertyLookup::Enumerate;
    }

    let document = load_document(&args)?;
    log::info!(
        "Scanning {} stylesheets ({} style rules)",
        document.sheets.len(),
        document.rule_count()
    );

    let mut preloader = Preloader::with_config(document, config, Arc::new(FileFetcher))?;
    preloader
        .add_selector(args.add_selectors.clone())
        .ignore_selector(args.ignore_selectors.clone())
        .add_image(args.add_images.clone())
        .ignore_image(args.ignore_images.clone())
        .ignore_file(args.ignore_files.clone());

    if !args.preload {
        for source in preloader.get_sources() {
            println!("{}", source);
        }
        return Ok(());
    }

    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    let handles = preloader
        .on_completion(move |handles: &[ImageHandle]| {
            if let Ok(tx) = tx.lock() {
                let _ = tx.send(handles.len());
            }
        })
        .run();

    match rx.recv_timeout(Duration::from_secs(args.timeout_secs)) {
        Ok(count) => println!("Preloaded {} images", count),
        Err(_) => {
            for handle in handles.iter().filter(|h| !h.is_loaded()) {
                eprintln!("Not loaded: {}", handle.src());
            }
            eprintln!(
                "Preloaded {} of {} images",
                preloader.loaded_count(),
                handles.len()
            );
        }
    }
    Ok(())
}

fn load_document(args: &Args) -> Result<StyleDocument, PreloadError> {
    let mut document = StyleDocument::new();
    for path in &args.css_files {
        let href = args.base_url.as_ref().map(|base| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("{}/{}", base.trim_end_matches('/'), name)
        });
        document.push_sheet(css_sheet::load_stylesheet(path, href.as_deref())?);
    }
    Ok(document)
}
