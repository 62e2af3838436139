//! `cisco`: a small router-like prompt built on promptr.
//!
//! ```text
//! ping
//! enable
//!   show
//!     startup-config
//!     running-config
//!     interface <intf> counters
//!   configure
//!     interface <intf>
//!       [no] shutdown
//! ```

use std::env;
use std::fs;
use std::process;

use promptr::{
    run_prompt_loop, Argument, CommandTree, NodeSpec, Prompt, PromptConfig, PromptrError,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const INTERFACES: [&str; 4] = ["g0", "g1", "g2", "g3"];

fn main() {
    init_logging();

    let tree = match build_tree() {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("cisco: {}", e);
            process::exit(1);
        }
    };

    let args: Vec<String> = env::args().collect();
    if args.get(1).map(String::as_str) == Some("--tree") {
        println!("{:#}", tree.describe(tree.root()));
        return;
    }

    let mut prompt = Prompt::new(tree, PromptConfig::from_env());

    if let Some(script_path) = args.get(1) {
        // Script mode
        let result = fs::read_to_string(script_path)
            .map_err(|e| PromptrError::Init(format!("cannot read '{}': {}", script_path, e)))
            .and_then(|text| prompt.run_text(&text));
        if let Err(e) = result {
            error!(error = %e, "Script failed");
            eprintln!("cisco: Error executing script '{}': {}", script_path, e);
            process::exit(1);
        }
    } else {
        // Interactive mode
        match run_prompt_loop(prompt) {
            Ok(end) => info!(?end, "Session finished"),
            Err(e) => {
                eprintln!("cisco: A critical error occurred: {}", e);
                process::exit(1);
            }
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("PROMPTR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn interface_arg() -> Argument {
    Argument::new("intf").completions_with(|| INTERFACES.iter().map(|s| s.to_string()).collect())
}

fn build_tree() -> Result<CommandTree, PromptrError> {
    let mut tree = CommandTree::new();
    let root = tree.root();

    tree.add(root, NodeSpec::command("ping").help("Send echo messages"))?;

    let enable = tree.add(
        root,
        NodeSpec::state("enable")
            .prompt("en")
            .help("Turn on privileged commands"),
    )?;

    let show = tree.add(enable, NodeSpec::group("show").help("Show running system information"))?;
    tree.add(
        show,
        NodeSpec::command("startup-config").callback(|_| {
            println!("Showing startup config");
            Ok(())
        }),
    )?;
    tree.add(
        show,
        NodeSpec::command("running-config").callback(|_| {
            println!("Showing running config");
            Ok(())
        }),
    )?;
    let show_intf = tree.add(show, NodeSpec::group("interface").argument(interface_arg()))?;
    tree.add(
        show_intf,
        NodeSpec::command("counters").callback(|call| {
            println!("Counters for {}", call.get_context("intf").unwrap_or("?"));
            Ok(())
        }),
    )?;

    let configure = tree.add(
        enable,
        NodeSpec::state("configure")
            .prompt("conf")
            .help("Enter configuration mode"),
    )?;
    let conf_intf = tree.add(
        configure,
        NodeSpec::state("interface")
            .prompt("{intf}")
            .argument(interface_arg())
            .help("Select an interface to configure"),
    )?;
    tree.add(
        conf_intf,
        NodeSpec::command("shutdown")
            .optional_prefix("no")
            .pass_called_name()
            .pass_context("intf")
            .callback(|call| {
                println!(
                    "Will {} {}",
                    call.called_name().unwrap_or("shutdown"),
                    call.get("intf").unwrap_or("?")
                );
                Ok(())
            }),
    )?;

    Ok(tree)
}
