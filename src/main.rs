use std::path::PathBuf;

use clap::{Parser, Subcommand};

use agent_skills_sync::{
    descriptor, install_all, list_installed, ConsumerRegistry, Scope, Skill,
};

#[derive(Parser)]
#[command(
    name = "agent-skills-sync",
    version,
    about = "Install and synchronize Agent Skills across tool directories"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install skills from local directories into consumer tools
    Install {
        /// Skill directories (each containing a SKILL.md)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Install into the user-global scope instead of the project
        #[arg(long)]
        global: bool,
        /// Restrict installation to specific tools (repeatable)
        #[arg(long = "agent", value_name = "ID")]
        agents: Vec<String>,
        /// Scope root override (defaults to the current directory, or the
        /// home directory with --global)
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },
    /// List installed skills and where they are visible
    List {
        /// List the user-global scope instead of the project
        #[arg(long)]
        global: bool,
        /// Only check visibility for one tool
        #[arg(long = "agent", value_name = "ID")]
        agent: Option<String>,
        /// Scope root override
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Install {
            paths,
            global,
            agents,
            root,
        } => run_install(paths, global, agents, root),
        Command::List {
            global,
            agent,
            root,
        } => run_list(global, agent, root),
    };

    std::process::exit(exit_code);
}

fn scope_root(global: bool, root: Option<PathBuf>) -> Option<(Scope, PathBuf)> {
    if let Some(root) = root {
        return Some((if global { Scope::Global } else { Scope::Project }, root));
    }
    if global {
        dirs::home_dir().map(|home| (Scope::Global, home))
    } else {
        std::env::current_dir().ok().map(|cwd| (Scope::Project, cwd))
    }
}

fn run_install(paths: Vec<PathBuf>, global: bool, agents: Vec<String>, root: Option<PathBuf>) -> i32 {
    let Some((scope, scope_root)) = scope_root(global, root) else {
        eprintln!("Could not determine the installation root.");
        return 1;
    };

    let mut skills = Vec::new();
    for path in &paths {
        match descriptor::read_descriptor(path) {
            Some(d) => skills.push(Skill::from_directory(d.name, d.description, path.clone())),
            None => {
                eprintln!("Not a skill (no readable SKILL.md): {}", path.display());
                return 1;
            }
        }
    }

    let registry = ConsumerRegistry::builtin();
    let targets = registry.targets(scope, &scope_root, &agents);
    if targets.is_empty() {
        eprintln!("No matching consumer tools.");
        return 1;
    }

    let results = install_all(&skills, &targets);
    let mut failed = false;
    for result in &results {
        if result.success {
            let mode = if result.link_failed {
                "copy (link unavailable)"
            } else {
                match result.mode {
                    agent_skills_sync::InstallMode::Link => "link",
                    agent_skills_sync::InstallMode::Copy => "copy",
                }
            };
            println!("Installed {} -> {} [{}]", result.skill, result.consumer, mode);
        } else {
            eprintln!(
                "Failed {} -> {}: {}",
                result.skill,
                result.consumer,
                result.error.as_deref().unwrap_or("unknown error")
            );
            failed = true;
        }
    }

    i32::from(failed)
}

fn run_list(global: bool, agent: Option<String>, root: Option<PathBuf>) -> i32 {
    let Some(scope_root) = scope_root(global, root) else {
        eprintln!("Could not determine the installation root.");
        return 1;
    };

    let registry = ConsumerRegistry::builtin();
    let views = list_installed(&[scope_root], &registry, agent.as_deref());

    if views.is_empty() {
        println!("No skills installed.");
        return 0;
    }

    for view in views {
        let consumers = if view.consumers.is_empty() {
            "not wired into any tool".to_string()
        } else {
            view.consumers.iter().cloned().collect::<Vec<_>>().join(", ")
        };
        println!("{} ({}) [{}]", view.name, view.scope, consumers);
        if !view.description.is_empty() {
            println!("    {}", view.description);
        }
    }

    0
}
