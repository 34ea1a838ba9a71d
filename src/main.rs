use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::{ anyhow, bail, Context };
use clap::{ ErrorKind, Parser };
use log::info;

use whitted_tracer::canvas::Canvas;
use whitted_tracer::consts::{ DEFAULT_HEIGHT, DEFAULT_MAX_DEPTH, DEFAULT_WIDTH };
use whitted_tracer::demo::{ self, DEMOS };
use whitted_tracer::raytracer::Raytracer;
use whitted_tracer::scene::Scene;

/// Renders a scene description (or a built-in demo) with a recursive ray
/// tracer.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Output image width
    #[clap(short = 'x', long, value_parser, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Output image height
    #[clap(short = 'y', long, value_parser, default_value_t = DEFAULT_HEIGHT)]
    height: usize,

    /// Cast several rays per pixel and average them
    #[clap(short, long, action)]
    antialiasing: bool,

    /// JSON scene description to render
    #[clap(short, long, value_parser)]
    scene: Option<PathBuf>,

    /// Where to save the image (.png, anything else is written as PPM)
    #[clap(short, long, value_parser)]
    output: Option<PathBuf>,

    /// Render a built-in demo (1 or 2) instead of a file
    #[clap(short, long, value_parser, conflicts_with = "scene")]
    demo: Option<u32>,

    /// Maximum depth of reflected and refracted rays
    #[clap(long, value_parser, default_value_t = DEFAULT_MAX_DEPTH)]
    depth: usize,
}

/// Exit status for a command line that didn't parse into a render.
///
/// Asking for help renders nothing, so it fails like a bad invocation.
fn parse_failure_code(e: &clap::Error) -> i32 {
    match e.kind() {
        ErrorKind::DisplayVersion => 0,
        ErrorKind::DisplayHelp => 1,
        _ => 2,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            e.print()?;
            process::exit(parse_failure_code(&e));
        },
    };

    let scene = match (&args.demo, &args.scene) {
        (Some(n), _) => {
            info!("Rendering demo {}", n);
            demo::demo(*n).ok_or_else(||
                anyhow!("Wrong demo specified. Possible values: {:?}", DEMOS))?
        },
        (None, Some(path)) => Scene::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        (None, None) => bail!("No scene given; use --scene <file> or --demo <n>"),
    };

    let mut canvas = Canvas::new(args.width, args.height);
    let tracer = Raytracer::new(&scene.world, &scene.camera)
        .antialiasing(args.antialiasing)
        .max_depth(args.depth);

    let start = Instant::now();
    tracer.render(&mut canvas);
    info!("Rendering took {:.3} seconds", start.elapsed().as_secs_f64());

    if let Some(path) = &args.output {
        canvas.save(path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
        info!("Saved {}", path.display());
    }

    Ok(())
}

#[test]
fn help_request_exits_nonzero() {
    let e = Args::try_parse_from(["whitted", "--help"]).unwrap_err();

    assert_eq!(e.kind(), ErrorKind::DisplayHelp);
    assert_eq!(parse_failure_code(&e), 1);
}

#[test]
fn bad_arguments_exit_nonzero() {
    let e = Args::try_parse_from(["whitted", "--width", "wide"]).unwrap_err();
    assert_ne!(parse_failure_code(&e), 0);

    let e = Args::try_parse_from(["whitted", "-d", "1", "-s", "a.json"])
        .unwrap_err();
    assert_ne!(parse_failure_code(&e), 0);
}

#[test]
fn arguments_parse() {
    let args = Args::try_parse_from(["whitted", "-x", "64", "-y", "48", "-a",
        "-d", "2", "--depth", "3"]).unwrap();

    assert_eq!((args.width, args.height), (64, 48));
    assert!(args.antialiasing);
    assert_eq!(args.demo, Some(2));
    assert_eq!(args.depth, 3);
}
