use clap::Parser;
use std::path::PathBuf;

/// Layered SVG avatar composer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Parts server base URL (e.g. http://localhost:8080)
    #[arg(short = 'u', long = "server", value_name = "URL")]
    pub server: Option<String>,

    /// Local parts directory (same layout as the server webroot)
    #[arg(short = 'd', long = "parts-dir", value_name = "DIR")]
    pub parts_dir: Option<PathBuf>,

    /// Select a variant (can be specified multiple times)
    #[arg(short = 's', long = "select", value_name = "CATEGORY=INDEX")]
    pub select: Vec<String>,

    /// Override a palette color (can be specified multiple times)
    #[arg(short = 'c', long = "color", value_name = "KEY=#RRGGBB")]
    pub color: Vec<String>,

    /// Output file; a .png extension exports a raster, anything else the SVG text
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Pixel width of PNG exports
    #[arg(long = "png-width", value_name = "PX", default_value_t = 512)]
    pub png_width: u32,

    /// Preload radius around each selection
    #[arg(long = "radius", value_name = "N")]
    pub preload_radius: Option<usize>,

    /// Per-category part cache capacity
    #[arg(long = "cache-capacity", value_name = "N")]
    pub cache_capacity: Option<usize>,

    /// Print categories and variants, then exit
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// Request a server-side render permalink (needs --server)
    #[arg(short = 'p', long = "permalink")]
    pub permalink: bool,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}
