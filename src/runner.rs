//! Application runner - builds the session from CLI arguments and
//! drives listing, selection, export and permalink requests.

use std::sync::Arc;

use anyhow::{Context, bail};
use log::{debug, info};

use crate::cli::Args;
use crate::config::Settings;
use crate::core::session::{Session, SessionEvent};
use crate::export;
use crate::fetch::{DirSource, HttpSource, PartSource};
use crate::permalink::{self, RenderRequest};

pub fn run_app(args: Args) -> anyhow::Result<()> {
    let source: Arc<dyn PartSource> = match (&args.server, &args.parts_dir) {
        (Some(_), Some(_)) => bail!("--server and --parts-dir are mutually exclusive"),
        (Some(url), None) => Arc::new(HttpSource::new(url)?),
        (None, Some(dir)) => Arc::new(DirSource::new(dir)),
        (None, None) => bail!("one of --server or --parts-dir is required"),
    };

    let mut settings = Settings::default();
    if let Some(radius) = args.preload_radius {
        settings.preload_radius = radius;
    }
    if let Some(capacity) = args.cache_capacity {
        settings.cache_capacity = capacity;
    }
    settings.png_width = args.png_width;

    let mut session = Session::connect(source, settings).context("session setup failed")?;
    let events = session.events();

    if args.list {
        let names: Vec<String> = session.category_names().map(str::to_string).collect();
        for name in names {
            let cat = session.category(&name)?;
            println!("{} ({} variants)", name, cat.len());
            for (index, variant) in cat.variants().iter().enumerate() {
                println!(
                    "  [{}] {} by {} ({})",
                    index,
                    variant.name,
                    variant.creator,
                    variant.tags.join(" ")
                );
            }
        }
        return Ok(());
    }

    for assignment in &args.select {
        let (category, index) = assignment
            .split_once('=')
            .with_context(|| format!("bad --select '{}', expected CATEGORY=INDEX", assignment))?;
        let index: usize = index
            .parse()
            .with_context(|| format!("bad index in --select '{}'", assignment))?;
        let landed = session.select_index(category, index)?;
        info!("{}: selection {}", category, landed);
    }

    for assignment in &args.color {
        let (key, value) = assignment
            .split_once('=')
            .with_context(|| format!("bad --color '{}', expected KEY=#RRGGBB", assignment))?;
        session.palette_mut().set(key, value)?;
    }

    for event in events.try_iter() {
        match event {
            SessionEvent::PartLoaded { category, index } => {
                debug!("loaded {}[{}]", category, index)
            }
            SessionEvent::PartFailed {
                category,
                index,
                reason,
            } => debug!("failed {}[{}]: {}", category, index, reason),
        }
    }

    if let Some(out) = &args.out {
        let document = session.compose()?;
        let is_png = out
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if is_png {
            export::export_png(&document, out, args.png_width)?;
        } else {
            export::export_svg(&document, out)?;
        }
    }

    if args.permalink {
        let Some(base) = &args.server else {
            bail!("--permalink requires --server");
        };
        let request = RenderRequest::from_session(&session);
        let path = permalink::request_render(base, &request)?;
        println!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
    }

    if args.out.is_none() && !args.permalink {
        // No sink requested: the composed document goes to stdout
        print!("{}", session.compose()?);
    }

    Ok(())
}
