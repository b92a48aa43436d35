use std::path::PathBuf;
use std::time::Duration;

use cellar::catalog::Catalog;
use cellar::config::load_settings;
use cellar::launch::{LaunchOrchestrator, SessionState, TracingSink};
use cellar::scan::{PrefixScanner, ScanRoots, ScanTask};
use tracing::{error, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--help") {
        println!("{}", USAGE_TEXT);
        std::process::exit(0);
    }

    let code = if let Some(name) = arg_value(&args, "--launch") {
        let verbose = args.iter().any(|arg| arg == "--verbose");
        let export = arg_value(&args, "--export-log").map(PathBuf::from);
        launch(&name, verbose, export)
    } else if args.iter().any(|arg| arg == "--list") {
        list()
    } else {
        scan()
    };
    std::process::exit(code);
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let index = args.iter().position(|arg| arg == flag)?;
    match args.get(index + 1) {
        Some(value) => Some(value.clone()),
        None => {
            eprintln!("{}", USAGE_TEXT);
            std::process::exit(1);
        }
    }
}

fn scan() -> i32 {
    let settings = load_settings();
    let scanner = PrefixScanner::new(ScanRoots::system(&settings));
    let mut task = ScanTask::spawn(scanner);

    let report = loop {
        if let Some(report) = task.poll() {
            break report;
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    println!("Wine prefixes:");
    for prefix in &report.prefixes {
        println!("  {}  {}", prefix.display_name, prefix.path.display());
    }
    println!("Proton versions:");
    for proton in &report.protons {
        println!("  {}  {}", proton.name, proton.runner_binary.display());
    }
    0
}

fn list() -> i32 {
    let catalog = match Catalog::load_default() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("catalog: {}", e);
            return 1;
        }
    };
    for game in catalog.iter() {
        println!(
            "{}  [{}]  {}",
            game.name,
            game.compat_layer().label(),
            game.executable_path.display()
        );
    }
    0
}

fn launch(name: &str, verbose: bool, export: Option<PathBuf>) -> i32 {
    let mut catalog = match Catalog::load_default() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("catalog: {}", e);
            return 1;
        }
    };
    let Some(game) = catalog.get(name).cloned() else {
        error!("catalog: no game named '{}'", name);
        return 1;
    };

    let mut orchestrator = LaunchOrchestrator::new(load_settings(), TracingSink);
    if let Err(e) = orchestrator.start(&game, verbose) {
        error!("launch: {}", e);
        return 1;
    }
    if let Err(e) = catalog.record_launch(name) {
        warn!("catalog: could not record launch of {}: {}", name, e);
    }

    while orchestrator.is_active(name) {
        for summary in orchestrator.poll() {
            if let Err(e) =
                catalog.record_session(&summary.game_name, summary.duration, summary.is_crash())
            {
                warn!("catalog: could not record play time of {}: {}", summary.game_name, e);
            }
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    if let Some(path) = export {
        match orchestrator.export_log(name, &path) {
            Ok(()) => info!("launch: log written to {}", path.display()),
            Err(e) => error!("launch: {}", e),
        }
    }

    match orchestrator.state(name) {
        Some(SessionState::Finished) => 0,
        _ => 1,
    }
}

static USAGE_TEXT: &str = r#"
Usage: cellar [OPTIONS]

The cellar library is the primary interface; --list and --launch are
debugging conveniences for exercising it from a terminal.

Options:
    (none)                Scan for Wine prefixes and Proton versions
    --list                List games in the catalog (debugging)
    --launch <name>       Launch a catalog game and stream its output (debugging)
    --verbose             With --launch: enable full Wine debug output
    --export-log <path>   With --launch: write the output log to <path> afterwards
"#;
