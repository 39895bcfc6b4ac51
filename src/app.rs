use crate::cli::{Cli, Commands};
use ffnorm::engine::{self, EncodeJob, Orchestrator};
use ffnorm::{config, logging};
use std::path::PathBuf;
use std::process;

pub fn run(cli: Cli) {
    let config = config::Config::load().unwrap_or_default();

    if let Err(e) = logging::init(&config.paths.log_file) {
        eprintln!("Error setting up logging: {e:#}");
        process::exit(1);
    }

    let input_root = cli.input.unwrap_or_else(|| config.paths.input_dir.clone());
    let output_root = cli.output.unwrap_or_else(|| config.paths.output_dir.clone());
    let extensions = config.paths.video_extensions.clone();

    match cli.command {
        Some(Commands::CheckFfmpeg) => handle_check_ffmpeg(),
        Some(Commands::Probe { file }) => handle_probe(file),
        Some(Commands::Scan { directory }) => {
            handle_scan(directory.unwrap_or(input_root), &extensions)
        }
        Some(Commands::DryRun { directory }) => handle_dry_run(
            directory.unwrap_or(input_root),
            output_root,
            &extensions,
        ),
        Some(Commands::InitConfig) => handle_init_config(),
        Some(Commands::Run) | None => handle_run(input_root, output_root, extensions),
    }
}

fn handle_run(input_root: PathBuf, output_root: PathBuf, extensions: Vec<String>) {
    tracing::info!(
        "starting transcoding process for all files in {}",
        input_root.display()
    );

    let orchestrator = Orchestrator::new(input_root, output_root, extensions);
    match orchestrator.run() {
        Ok(stats) => {
            if stats.failed > 0 {
                process::exit(2);
            }
        }
        Err(e) => {
            tracing::error!("run aborted: {e:#}");
            process::exit(1);
        }
    }
}

fn handle_check_ffmpeg() {
    match engine::encode::ffmpeg_version() {
        Ok(version) => {
            println!("ffmpeg found: {}", version);
            match engine::probe::ffprobe_version() {
                Ok(probe_version) => {
                    println!("ffprobe found: {}", probe_version);
                }
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn handle_probe(file: PathBuf) {
    match engine::probe::analyze(&file) {
        Ok(result) => {
            let bitrate = engine::target_bitrate_kbps(result.resolution, result.fps);
            println!("{}", file.display());
            println!("  resolution class: {}", result.resolution);
            println!("  frame rate:       {:.3} fps", result.fps);
            println!("  duration:         {:.2}s", result.duration_secs);
            println!(
                "  color:            {}/{}/{}",
                result.color.primaries, result.color.transfer, result.color.matrix
            );
            println!("  target bitrate:   {} kbps", bitrate);
        }
        Err(e) => {
            eprintln!("Error probing {}: {}", file.display(), e);
            process::exit(1);
        }
    }
}

fn handle_scan(directory: PathBuf, extensions: &[String]) {
    match engine::scan(&directory, extensions) {
        Ok(files) => {
            for file in &files {
                println!("{}", file.display());
            }
            println!("{} candidate file(s) under {}", files.len(), directory.display());
        }
        Err(e) => {
            eprintln!("Error scanning {}: {:#}", directory.display(), e);
            process::exit(1);
        }
    }
}

fn handle_dry_run(directory: PathBuf, output_root: PathBuf, extensions: &[String]) {
    let files = match engine::scan(&directory, extensions) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error scanning {}: {:#}", directory.display(), e);
            process::exit(1);
        }
    };

    for file in files {
        match engine::probe::analyze(&file) {
            Ok(result) => {
                let bitrate = engine::target_bitrate_kbps(result.resolution, result.fps);
                let output = engine::relocate(
                    &directory,
                    &output_root,
                    &file,
                    engine::OUTPUT_EXTENSION,
                );
                let job = EncodeJob::build(&file, &output, bitrate, &result.color);
                println!("{}", job.display_command());
            }
            Err(e) => {
                println!("# skipped {}: {}", file.display(), e);
            }
        }
    }
}

fn handle_init_config() {
    let path = match config::Config::config_path() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    if config::Config::exists() {
        println!("Config file exists: {}", path.display());
        return;
    }

    match config::Config::ensure_default() {
        Ok(()) => println!("Created default config: {}", path.display()),
        Err(e) => {
            eprintln!("Error creating config: {:#}", e);
            process::exit(1);
        }
    }
}
