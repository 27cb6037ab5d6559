use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use millflow_dag::{
    demo, persist, run_simulator, Editor, EditorConfig, IdGenerator, RandomIds, SimulatorConfig,
    Workspace,
};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Command::new("millflow")
        .version(millflow_dag::VERSION)
        .about("MillFlow workflow graph tools")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Editor config (TOML)"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("demo")
                .about("Print the demo job workflow")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output the workspace as JSON"),
                ),
        )
        .subcommand(
            Command::new("levels")
                .about("Show display levels and lints of a saved workspace")
                .arg(
                    Arg::new("path")
                        .long("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Workspace JSON file"),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run the random edit simulator")
                .arg(
                    Arg::new("operations")
                        .long("ops")
                        .default_value("10000")
                        .value_parser(value_parser!(u64))
                        .help("Number of operations to simulate"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("stop-on-violation")
                        .long("stop-on-violation")
                        .action(ArgAction::SetTrue)
                        .help("Stop simulation on first violation"),
                ),
        );

    let matches = cli.get_matches();
    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("demo", args)) => {
            let workspace = demo::demo_workspace(&mut RandomIds)?;
            if args.get_flag("json") {
                let mut out = std::io::stdout().lock();
                persist::to_writer(&workspace, &mut out)?;
                writeln!(out)?;
            } else {
                print_levels(Editor::from_workspace(workspace, config, RandomIds))?;
            }
        }
        Some(("levels", args)) => {
            let path = args
                .get_one::<PathBuf>("path")
                .context("--path is required")?;
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            let workspace: Workspace = persist::from_reader(BufReader::new(file))
                .with_context(|| format!("loading {}", path.display()))?;
            tracing::info!(sheets = workspace.len(), "loaded {}", path.display());
            print_levels(Editor::from_workspace(workspace, config, RandomIds))?;
        }
        Some(("simulate", args)) => {
            let operations = args.get_one::<u64>("operations").copied().unwrap_or(10_000);
            let seed = args.get_one::<u64>("seed").copied().unwrap_or(42);
            let stop_on_violation = args.get_flag("stop-on-violation");

            tracing::info!(operations, seed, "running simulator");
            let report = run_simulator(SimulatorConfig {
                seed,
                total_operations: operations,
                stop_on_first_violation: stop_on_violation,
                editor: config,
                ..Default::default()
            });

            println!("{}", report.generate_text());
            std::process::exit(if report.passed() { 0 } else { 1 });
        }
        _ => unreachable!("subcommand_required"),
    }
    Ok(())
}

fn load_config(matches: &ArgMatches) -> Result<EditorConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            let config = EditorConfig::load(path)?;
            tracing::debug!(?config, "loaded {}", path.display());
            Ok(config)
        }
        None => Ok(EditorConfig::default()),
    }
}

fn print_levels<G: IdGenerator>(mut editor: Editor<G>) -> Result<()> {
    let sheets: Vec<_> = editor
        .workspace()
        .sheets()
        .map(|s| (s.id, s.job.clone(), s.name.clone()))
        .collect();
    for (id, job, name) in sheets {
        println!("{job} / {name}");
        for level in editor.levels(id)?.iter() {
            let names: Vec<String> = level
                .nodes
                .iter()
                .map(|n| {
                    editor
                        .node(id, *n)
                        .map(|node| format!("{} [{}]", node.name, node.status.label()))
                        .unwrap_or_else(|_| n.to_string())
                })
                .collect();
            println!("  {:>2}  {}", level.index, names.join(" | "));
        }
        for lint in editor.lints(id)? {
            println!("  warning: {lint}");
        }
        println!();
    }
    Ok(())
}
