use common::logger::MyLog;
use common::unwrap_or;
use log::LevelFilter;
use markings::{
    batch, CalcContext, FixedAdvanceRenderer, LodType, MarkingLod, Markings, MarkingsConfig, StyleProperties, TextCache,
};
use std::path::PathBuf;
use std::time::Instant;
use structopt::StructOpt;

mod scene;

use scene::Scene;

#[derive(StructOpt, Debug)]
#[structopt(name = "Markings headless", no_version)]
struct Opt {
    /// Scene to generate, a json file. The built-in demo intersection is used when absent.
    #[structopt(long, parse(from_os_str))]
    scene: Option<PathBuf>,

    /// Generation settings, a json file
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Writes the demo scene to this path and exits
    #[structopt(long, parse(from_os_str))]
    write_demo: Option<PathBuf>,

    /// Only log warnings and errors
    #[structopt(long)]
    quiet: bool,
}

fn main() {
    let opt: Opt = Opt::from_args();
    MyLog::init_with_level(if opt.quiet { LevelFilter::Warn } else { LevelFilter::Info });

    let config = match opt.config {
        Some(ref path) => match MarkingsConfig::load(path) {
            Ok(x) => x,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        },
        None => MarkingsConfig::default(),
    };

    let demo = || match Scene::demo() {
        Ok(x) => Some(x),
        Err(e) => {
            log::error!("could not build the demo scene: {}", e);
            None
        }
    };

    if let Some(ref path) = opt.write_demo {
        let scene = unwrap_or!(demo(), return);
        let json = unwrap_or!(serde_json::to_string_pretty(&scene).ok(), return);
        if let Err(e) = std::fs::write(path, json) {
            log::error!("could not write {}: {}", path.display(), e);
            return;
        }
        log::info!("demo scene written to {}", path.display());
        return;
    }

    let scene = match opt.scene {
        Some(ref path) => unwrap_or!(Scene::load(path), return),
        None => {
            log::info!("no scene given, using the demo intersection");
            unwrap_or!(demo(), return)
        }
    };

    let texts = TextCache::new(FixedAdvanceRenderer::default());
    let mut markings = Markings::new();
    let added = scene.populate(&mut markings);
    log::info!(
        "{} markings loaded ({} lines, {} fillers)",
        added,
        scene.lines.len(),
        scene.fillers.len()
    );

    let ctx = CalcContext {
        config: &config,
        texts: &texts,
        prefabs: &scene.catalog,
    };
    let start = Instant::now();
    let updated = markings.update(&ctx);
    log::info!(
        "calculated {} markings in {:.2}ms",
        updated.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    for (id, line) in markings.lines() {
        let n: usize = markings.data(id).unwrap_or_default().iter().map(|d| d.count()).sum();
        if n == 0 {
            log::warn!("{:?} line produced nothing", line.style.style_type());
        }
    }

    let batches = batch(markings.all_data(), &config);
    for lod in MarkingLod::ALL {
        let dashes: usize = batches.of_lod(lod).map(|b| b.dashes.len()).sum();
        log::info!(
            "{:?}: {} dashes in {} batches",
            lod,
            dashes,
            batches.of_lod(lod).count()
        );
        for t in [LodType::Mesh, LodType::Network, LodType::Prop, LodType::Tree] {
            let Some(data) = batches.others.get(&(t, lod)) else {
                continue;
            };
            let count: usize = data.iter().map(|d| d.count()).sum();
            log::info!("{:?}: {} {:?} items", lod, count, t);
        }
    }
    log::info!("{} text textures in use", texts.len());
}
