//! Command tree

use crate::input::parse_pair;
use clap::{value_parser, Arg, ArgAction, Command};
use deck_scan::Tab;
use std::path::PathBuf;

/// Build the `agentdeck` command
pub fn command() -> Command {
    Command::new("agentdeck")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Operations console for backend-managed agents and their scan reports")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file (overrides AGENTDECK_CONFIG)"),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .help("Backend base URL, e.g. http://localhost:8000/api"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Raise log verbosity (-v debug, -vv trace)"),
        )
        .subcommand(Command::new("agents").about("List agents"))
        .subcommand(Command::new("integrations").about("List integrations"))
        .subcommand(
            Command::new("integration")
                .about("Manage integrations")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Connect a new integration")
                        .arg(Arg::new("name").required(true).help("Display name"))
                        .arg(
                            Arg::new("type")
                                .required(true)
                                .help("Service type, e.g. crm, email, slack"),
                        )
                        .arg(pairs_arg("set", "Service configuration as key=value")),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Remove an integration")
                        .arg(Arg::new("id").required(true).help("Integration id")),
                ),
        )
        .subcommand(
            Command::new("tasks")
                .about("List tasks with scan summaries")
                .arg(Arg::new("agent").long("agent").help("Only tasks of this agent"))
                .arg(limit_arg())
                .arg(
                    Arg::new("offset")
                        .long("offset")
                        .default_value("0")
                        .value_parser(value_parser!(u64))
                        .help("Tasks to skip"),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Show the scan report of a task")
                .arg(Arg::new("task-id").required(true).help("Task id"))
                .arg(
                    Arg::new("tab")
                        .long("tab")
                        .value_parser(|s: &str| s.parse::<Tab>())
                        .help("Show only this tab (overview, mcc, content-risk, domain, ...)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output the report as JSON"),
                ),
        )
        .subcommand(
            Command::new("execute")
                .about("Run an agent action")
                .arg(
                    Arg::new("agent-type")
                        .required(true)
                        .help("Agent type, e.g. site_scan, sales"),
                )
                .arg(
                    Arg::new("action")
                        .required(true)
                        .help("Action name, e.g. comprehensive_site_scan"),
                )
                .arg(pairs_arg("input", "Action input as key=value")),
        )
        .subcommand(
            Command::new("mcc")
                .about("Record the MCC code chosen for a scan")
                .arg(Arg::new("task-id").required(true).help("Task id"))
                .arg(Arg::new("code").required(true).help("Four digit MCC code"))
                .arg(
                    Arg::new("reason")
                        .long("reason")
                        .help("Override reason, required when not the primary suggestion"),
                )
                .arg(
                    Arg::new("selected-by")
                        .long("selected-by")
                        .help("Operator identity (defaults to the configured operator)"),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("Refresh the dashboard until interrupted")
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .value_parser(value_parser!(u64).range(1..))
                        .help("Seconds between refreshes (defaults to the configured interval)"),
                )
                .arg(Arg::new("agent").long("agent").help("Only tasks of this agent"))
                .arg(limit_arg()),
        )
}

fn limit_arg() -> Arg {
    Arg::new("limit")
        .long("limit")
        .value_parser(value_parser!(u32).range(1..))
        .help("Tasks per page (defaults to the configured page size)")
}

fn pairs_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .action(ArgAction::Append)
        .value_parser(parse_pair)
        .help(help)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn command_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn execute_collects_inputs() {
        let matches = command()
            .try_get_matches_from([
                "agentdeck",
                "execute",
                "site_scan",
                "kyc_site_scan",
                "--input",
                "url=shop.example",
                "--input",
                "business_name=Example Shop Ltd",
            ])
            .unwrap();

        let (_, args) = matches.subcommand().unwrap();
        let inputs: Vec<&(String, Value)> = args.get_many("input").unwrap().collect();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0], &("url".to_string(), json!("shop.example")));
    }

    #[test]
    fn malformed_input_is_a_usage_error() {
        let err = command()
            .try_get_matches_from(["agentdeck", "execute", "site_scan", "x", "--input", "nope"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn report_tab_accepts_aliases() {
        let matches = command()
            .try_get_matches_from(["agentdeck", "report", "t1", "--tab", "risk"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(args.get_one::<Tab>("tab"), Some(&Tab::ContentRisk));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = command()
            .try_get_matches_from(["agentdeck", "tasks", "--api-url", "http://h/api", "-vv"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("api-url").map(String::as_str),
            Some("http://h/api")
        );
        assert_eq!(matches.get_count("verbose"), 2);
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(command()
            .try_get_matches_from(["agentdeck", "watch", "--interval", "0"])
            .is_err());
    }
}
