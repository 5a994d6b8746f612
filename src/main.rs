//! CLI entry point for filebind
//!
//! Provides a command-line interface for inspecting the binding
//! configuration, running migrations, watching the settings file, and
//! invoking commands headlessly.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

use filebind::config::{
    migrate, CommandRegistry, FileSettingsStore, SettingsStore, SettingsWatcher,
    COMMANDS_SETTING_KEY,
};
use filebind::core::keyexpr::parse_key_expr;
use filebind::core::resolver::InputFocus;
use filebind::core::types::{Action, BuiltinCommand, CommandBinding};
use filebind::core::validator::validate_binding;
use filebind::exec::{
    resolve_script_body, template, BuiltinHandler, CommandEngine, ExecLog, ExecutionDispatcher,
    KeyDispatch, PaneState, PathSeparator, ShellInterpreter,
};

#[derive(Parser)]
#[command(name = "filebind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all command bindings
    List {
        /// Settings directory holding key_bind.json and command scripts
        #[arg(short, long, default_value = "~/.config/filebind")]
        settings_dir: PathBuf,
    },

    /// Check bindings: validation issues and shared key combinations
    Check {
        /// Settings directory holding key_bind.json and command scripts
        #[arg(short, long, default_value = "~/.config/filebind")]
        settings_dir: PathBuf,
    },

    /// Migrate the settings file to the latest schema version
    Migrate {
        /// Settings directory holding key_bind.json and command scripts
        #[arg(short, long, default_value = "~/.config/filebind")]
        settings_dir: PathBuf,
    },

    /// Resolve a key combination and execute the matched command
    Exec {
        /// Settings directory holding key_bind.json and command scripts
        #[arg(short, long, default_value = "~/.config/filebind")]
        settings_dir: PathBuf,

        /// Key combination to resolve (e.g. "ctrl+shift+A")
        key: String,

        /// Current directory of the invoking pane
        #[arg(long, default_value = ".")]
        dir: String,

        /// Companion-pane directory (defaults to --dir)
        #[arg(long)]
        opposite: Option<String>,

        /// Selected entry name; repeat for multiple selections
        #[arg(long = "select")]
        select: Vec<String>,

        /// Dialog input text for commands that collect it
        #[arg(long)]
        input: Option<String>,

        /// Resolve as if a text-entry field had focus
        #[arg(long)]
        addressbar: bool,

        /// Candidate to run when several bindings share the key (1-based)
        #[arg(long)]
        pick: Option<usize>,

        /// Print the templated script instead of executing it
        #[arg(long)]
        dry_run: bool,

        /// Interpreter program
        #[arg(long, default_value = "powershell")]
        shell: String,

        /// Interpreter flag preceding the script text
        #[arg(long, default_value = "-Command")]
        shell_flag: String,
    },

    /// Watch the settings file and re-check on every change
    Watch {
        /// Settings directory holding key_bind.json and command scripts
        #[arg(short, long, default_value = "~/.config/filebind")]
        settings_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { settings_dir } => list_bindings(&settings_dir)?,
        Commands::Check { settings_dir } => check_bindings(&settings_dir)?,
        Commands::Migrate { settings_dir } => migrate_settings(&settings_dir)?,
        Commands::Exec {
            settings_dir,
            key,
            dir,
            opposite,
            select,
            input,
            addressbar,
            pick,
            dry_run,
            shell,
            shell_flag,
        } => exec_command(ExecArgs {
            settings_dir,
            key,
            dir,
            opposite,
            select,
            input,
            addressbar,
            pick,
            dry_run,
            shell,
            shell_flag,
        })?,
        Commands::Watch { settings_dir } => watch_settings(&settings_dir)?,
    }

    Ok(())
}

/// Opens the settings store, expanding a leading tilde in the path
fn open_store(settings_dir: &Path) -> anyhow::Result<FileSettingsStore> {
    let expanded = shellexpand::tilde(
        settings_dir
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?,
    );
    Ok(FileSettingsStore::open(PathBuf::from(expanded.as_ref()))?)
}

/// List every binding in registry order
fn list_bindings(settings_dir: &Path) -> anyhow::Result<()> {
    let mut store = open_store(settings_dir)?;
    let registry = CommandRegistry::load(&mut store)?;

    println!("{}", format!("Bindings from: {}\n", store.root().display()).bold());

    let total = registry.bindings().len();

    for binding in registry.bindings() {
        let key = if binding.key.is_empty() {
            "(unbound)".dimmed().to_string()
        } else {
            binding.key.cyan().bold().to_string()
        };
        let addressbar_marker = if binding.valid_on_addressbar { " [addressbar]" } else { "" };

        println!(
            "{} → {} {}{}",
            key,
            binding.display_name.green(),
            binding.action.to_string().magenta(),
            addressbar_marker.dimmed(),
        );
    }

    println!("\n{} Total: {} bindings", "✓".green(), total);

    Ok(())
}

/// Validate every binding and report shared key combinations
fn check_bindings(settings_dir: &Path) -> anyhow::Result<()> {
    let invalid = run_check(settings_dir)?;
    if invalid > 0 {
        println!(
            "\n{} {} binding{} failed validation",
            "✗".red().bold(),
            invalid,
            if invalid == 1 { "" } else { "s" }
        );
        std::process::exit(1);
    }
    Ok(())
}

/// The check pass itself; returns the number of invalid bindings
fn run_check(settings_dir: &Path) -> anyhow::Result<usize> {
    let mut store = open_store(settings_dir)?;

    println!("{} Loading settings: {}", "→".cyan(), store.root().display());
    let registry = CommandRegistry::load(&mut store)?;
    println!("{} Found {} bindings\n", "✓".green(), registry.bindings().len());

    // Validation pass: issues here would block a save from the settings pane
    let mut invalid = 0;
    for (idx, binding) in registry.bindings().iter().enumerate() {
        if let Err(err) = validate_binding(binding) {
            invalid += 1;
            println!(
                "{} binding {}: {}",
                "✗".red().bold(),
                format!("{}", idx + 1).yellow(),
                err,
            );
        }
    }

    // Shared combinations open a disambiguation menu; legal, but worth knowing
    let overlaps = registry.overlap_index().find_overlaps();
    if overlaps.is_empty() {
        println!("{} {}", "✓".green().bold(), "No shared key combinations".bold());
    } else {
        println!(
            "{} {} key combination{} shared:\n",
            "⚠".yellow().bold(),
            overlaps.len(),
            if overlaps.len() == 1 { " is" } else { "s are" }
        );

        for overlap in &overlaps {
            println!("{}", overlap.key.cyan().bold());
            for (idx, binding) in overlap.bindings.iter().enumerate() {
                println!(
                    "  {} {} → {}",
                    format!("{}.", idx + 1).dimmed(),
                    binding.display_name,
                    binding.action.to_string().magenta(),
                );
            }
            println!();
        }

        println!("{}", "These combinations will open a disambiguation menu.".yellow());
    }

    Ok(invalid)
}

/// Run outstanding schema migrations and report the version change
fn migrate_settings(settings_dir: &Path) -> anyhow::Result<()> {
    let mut store = open_store(settings_dir)?;

    let Some(raw) = store.read(COMMANDS_SETTING_KEY)? else {
        println!("{}", "No settings file yet; defaults are in use.".yellow());
        return Ok(());
    };
    if raw.trim().is_empty() {
        println!("{}", "Settings file is blank; defaults are in use.".yellow());
        return Ok(());
    }

    let before: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("Malformed settings: {}", e))?;
    let found = before.get("version").and_then(|v| v.as_u64()).unwrap_or(0);

    if found > u64::from(migrate::LATEST) {
        println!(
            "{} Settings are at version {} but this build only understands {}.",
            "⚠".yellow().bold(),
            found,
            migrate::LATEST,
        );
        println!("Nothing was changed.");
        return Ok(());
    }

    // Loading runs and persists any outstanding migrations
    let registry = CommandRegistry::load(&mut store)?;

    if found == u64::from(migrate::LATEST) {
        println!("{} Already at version {}", "✓".green(), migrate::LATEST);
    } else {
        println!(
            "{} Migrated version {} → {} ({} bindings)",
            "✓".green().bold(),
            found,
            migrate::LATEST,
            registry.bindings().len(),
        );
    }

    Ok(())
}

/// Prints dispatched built-in operations; the CLI has no pane to drive
struct PrintingBuiltins;

impl BuiltinHandler for PrintingBuiltins {
    fn dispatch(&mut self, op: BuiltinCommand) {
        println!("{} builtin {}", "→".cyan(), op.to_string().green().bold());
    }
}

struct ExecArgs {
    settings_dir: PathBuf,
    key: String,
    dir: String,
    opposite: Option<String>,
    select: Vec<String>,
    input: Option<String>,
    addressbar: bool,
    pick: Option<usize>,
    dry_run: bool,
    shell: String,
    shell_flag: String,
}

/// Resolve a key expression and run the matched command
fn exec_command(args: ExecArgs) -> anyhow::Result<()> {
    let mut store = open_store(&args.settings_dir)?;
    let registry = CommandRegistry::load(&mut store)?;

    let chord = parse_key_expr(&args.key)
        .map_err(|e| anyhow::anyhow!("Cannot parse key expression '{}': {}", args.key, e))?;
    let input = chord.to_input();
    let focus = if args.addressbar {
        InputFocus::Addressbar
    } else {
        InputFocus::PaneList
    };
    let pane = PaneState {
        current_dir: args.dir.clone(),
        opposite_dir: args.opposite.clone().unwrap_or_else(|| args.dir.clone()),
        selected_names: args.select.clone(),
        separator: PathSeparator::platform_default(),
    };

    let candidates = filebind::core::resolver::resolve(registry.bindings(), &input, focus);

    let chosen: &CommandBinding = match (candidates.len(), args.pick) {
        (0, _) => {
            println!("{} nothing bound to {}", "✗".red(), input.canonical().cyan());
            return Ok(());
        }
        (1, _) => candidates[0],
        (n, Some(pick)) if pick >= 1 && pick <= n => candidates[pick - 1],
        (n, Some(pick)) => {
            anyhow::bail!("--pick {} is out of range (1..={})", pick, n);
        }
        (_, None) => {
            println!(
                "{} {} bindings share {}:\n",
                "⚠".yellow().bold(),
                candidates.len(),
                input.canonical().cyan().bold(),
            );
            for (idx, binding) in candidates.iter().enumerate() {
                println!(
                    "  {} {} → {}",
                    format!("{}.", idx + 1).dimmed(),
                    binding.display_name,
                    binding.action.to_string().magenta(),
                );
            }
            println!("\nRe-run with {} to choose one.", "--pick N".bold());
            return Ok(());
        }
    };

    println!(
        "{} {} matches {}",
        "→".cyan(),
        input.canonical().cyan().bold(),
        chosen.display_name.green().bold(),
    );

    if args.dry_run {
        return dry_run(chosen, &store, &pane, args.input.as_deref().unwrap_or(""));
    }

    let (events_tx, events_rx) = channel();
    let dispatcher =
        ExecutionDispatcher::spawn(ShellInterpreter::new(&args.shell, &args.shell_flag), events_tx);
    let mut engine = CommandEngine::new(PrintingBuiltins, dispatcher);

    match engine.execute(chosen, &store, &pane)? {
        KeyDispatch::Executed => {
            if chosen.action.is_shell() {
                report_result(&events_rx)?;
            }
        }
        KeyDispatch::DialogOpened => {
            if let Some(session) = engine.dialog().session() {
                println!("{} dialog '{}' opened", "→".cyan(), session.title.bold());
                if !session.reference_text.is_empty() {
                    println!("{}", "reference:".dimmed());
                    for line in session.reference_text.lines() {
                        println!("  {}", line.dimmed());
                    }
                }
            }
            if let Some(text) = &args.input {
                engine.edit_dialog_text(text);
            }
            // Headless invocation: confirm with whatever the dialog holds
            engine.confirm_dialog(&store)?;
            report_result(&events_rx)?;
        }
        other => anyhow::bail!("unexpected dispatch outcome: {:?}", other),
    }

    Ok(())
}

/// Template the script and print it without executing anything
fn dry_run(
    binding: &CommandBinding,
    store: &FileSettingsStore,
    pane: &PaneState,
    dialog_input: &str,
) -> anyhow::Result<()> {
    match &binding.action {
        Action::BuildIn(op) => {
            println!("{} would dispatch builtin {}", "→".cyan(), op.to_string().green());
        }
        Action::PowerShell(reference) => {
            let body = resolve_script_body(store, reference)?;
            let context = filebind::exec::ExecutionContext::for_binding(binding, reference, pane);
            let script = template::build_script(&body, &context, dialog_input);
            println!("{}", "--- templated script ---".dimmed());
            println!("{}", script);
        }
    }
    Ok(())
}

/// Wait for the execution result event and print it
fn report_result(events_rx: &Receiver<ExecLog>) -> anyhow::Result<()> {
    let log = events_rx
        .recv_timeout(Duration::from_secs(300))
        .map_err(|_| anyhow::anyhow!("timed out waiting for the execution result"))?;

    let rc = match log.rc {
        Some(0) => "rc:0".green().to_string(),
        Some(code) => format!("rc:{}", code).red().bold().to_string(),
        None => "rc:none (failed to start)".red().bold().to_string(),
    };
    println!("\n{} {} {}", log.title.bold(), format!("[{}]", log.id).dimmed(), rc);
    if !log.stdout.is_empty() {
        print!("{}", log.stdout);
    }
    if !log.stderr.is_empty() {
        eprint!("{}", log.stderr.red());
    }

    Ok(())
}

/// Watch key_bind.json and re-run the check on every change
fn watch_settings(settings_dir: &Path) -> anyhow::Result<()> {
    let store = open_store(settings_dir)?;
    let settings_path = store.root().join(COMMANDS_SETTING_KEY);

    if !settings_path.exists() {
        println!(
            "{} {} does not exist yet; waiting for it to appear",
            "⚠".yellow(),
            settings_path.display(),
        );
    }
    let watcher = SettingsWatcher::new(store.root())
        .map_err(|e| anyhow::anyhow!("cannot watch settings directory: {}", e))?;

    println!("{} Watching {}", "→".cyan(), settings_path.display());

    loop {
        std::thread::sleep(Duration::from_millis(500));
        if watcher.check_for_changes() {
            println!("\n{} settings changed", "→".cyan());
            if let Err(err) = run_check(settings_dir) {
                println!("{} {}", "✗".red(), err);
            }
        }
    }
}
