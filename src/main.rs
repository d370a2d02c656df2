#![warn(
    clippy::all,
    clippy::pedantic,
    anonymous_parameters,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    missing_debug_implementations,
    single_use_lifetimes,
    trivial_casts,
    unreachable_pub,
    unused_lifetimes
)]
#![allow(clippy::non_ascii_literal)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{debug, info, log_enabled, Level};
use logo_tasks::{
    arithmetic,
    catalog::LOW_RESOLUTION,
    compile,
    config::TrainerConfig,
    dataset::{self, DEFAULT_ROOT},
    eval::run_turtle,
    montage,
    primitives::logo_primitives,
    program::{
        arrow,
        json::{ExperimentInput, Grammar},
        Program, Type,
    },
    render::{self, Canvas},
    task::Value,
    typecheck,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[clap(version, author, about)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a LOGO s-expression and print the resulting program.
    Compile {
        /// The LOGO source, e.g. `"(loop i 4 (move 1d (/a 1a 4)))"`.
        source: String,
    },

    /// Draw a program and print its pixel intensities as comma-separated values.
    Draw {
        /// The side length of the image in pixels.
        #[clap(value_parser = parse_resolution)]
        resolution: usize,

        /// The program, e.g. `"(lambda (logo_FWRT logo_UL logo_ZA $0))"`.
        program: String,

        /// Print the drawing as ASCII art instead.
        #[clap(long)]
        pretty: bool,
    },

    /// Build the LOGO tasks and write their images.
    Logo {
        /// The task families to load from the data directory, or `all`.
        #[clap(default_value = "all")]
        folders: Vec<String>,

        /// The data directory.
        #[clap(long, parse(from_os_str), default_value = DEFAULT_ROOT)]
        data: PathBuf,

        /// The directory images are written to.
        #[clap(long, parse(from_os_str), default_value = "/tmp")]
        out: PathBuf,

        /// A prefix for the montage file names.
        #[clap(long, default_value = "")]
        prefix: String,

        /// Also write the experiment for the trainer to this file.
        #[clap(long, parse(from_os_str))]
        json: Option<PathBuf>,

        /// A JSON file overriding the default trainer options.
        #[clap(long, parse(from_os_str))]
        config: Option<PathBuf>,

        /// Seed for shuffling the random montage.
        #[clap(long)]
        seed: Option<u64>,
    },

    /// Write the arithmetic experiment for the trainer.
    Arith {
        /// The output file. If none is specified, writes to stdout.
        #[clap(long, parse(from_os_str))]
        out: Option<PathBuf>,

        /// A JSON file overriding the default trainer options.
        #[clap(long, parse(from_os_str))]
        config: Option<PathBuf>,

        /// Seed for generating examples.
        #[clap(long)]
        seed: Option<u64>,
    },
}

fn parse_resolution(s: &str) -> Result<usize, String> {
    let resolution: usize = s.parse().map_err(|e| format!("{}", e))?;
    if (1..=render::MAX_RESOLUTION).contains(&resolution) {
        Ok(resolution)
    } else {
        Err(format!(
            "resolution must be between 1 and {}",
            render::MAX_RESOLUTION
        ))
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TrainerConfig> {
    match path {
        Some(path) => TrainerConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(TrainerConfig::default()),
    }
}

fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, value)?;
            writer.flush()?;
            info!("wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer(&mut writer, value)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();

    match opts.command {
        Command::Compile { source } => {
            let program = compile(&source)?;
            println!("{}", program);
            match typecheck::check(&program, &arrow(Type::turtle(), Type::turtle())) {
                Ok(()) => println!("type: {}", arrow(Type::turtle(), Type::turtle())),
                Err(e) => println!("type error: {}", e),
            }
        }
        Command::Draw {
            resolution,
            program,
            pretty,
        } => {
            let program: Program = program.parse()?;
            let drawing = run_turtle(&program).context("drawing program")?;
            let canvas = Canvas::render(&drawing, resolution);
            if pretty {
                render::pretty_print(canvas.pixels(), canvas.resolution());
            } else {
                println!("{}", canvas.to_csv());
            }
        }
        Command::Logo {
            folders,
            data,
            out,
            prefix,
            json,
            config,
            seed,
        } => {
            let tasks = dataset::make_tasks(&data, &folders, false)
                .with_context(|| format!("building tasks from {}", data.display()))?;
            montage::write_task_images(&tasks, &out, &prefix, &mut rng(seed))
                .context("writing task images")?;
            let must_train = tasks.iter().filter(|t| t.must_train).count();
            info!("{} tasks", tasks.len());
            info!("{} need to be trained on", must_train);
            if log_enabled!(Level::Debug) {
                for task in &tasks {
                    if let Some(Value::Bitmap(shape)) = task.examples.first().map(|e| &e.output) {
                        debug!("{}\n{}", task.name, render::pretty_string(shape, LOW_RESOLUTION));
                    }
                }
            }

            if let Some(path) = json {
                let (train, test): (Vec<_>, Vec<_>) = tasks.into_iter().partition(|t| t.must_train);
                let input = ExperimentInput {
                    dsl: Grammar::uniform(logo_primitives()),
                    train,
                    test,
                    config: load_config(config.as_deref())?,
                };
                write_json(&input, Some(&path))?;
            }
        }
        Command::Arith { out, config, seed } => {
            let config = load_config(config.as_deref())?;
            if let Some(dir) = Path::new(&config.output_prefix).parent() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
            let input = arithmetic::experiment(config, &mut rng(seed));
            write_json(&input, out.as_deref())?;
        }
    }
    Ok(())
}
