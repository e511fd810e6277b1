#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn no_arguments_means_help() {
    let config = Config::from_args::<&str>(&[]).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.command, Command::Help);
}

#[test]
fn run_with_flags() {
    let config = Config::from_args(&["run", "arith.rkt", "--filter=Arith", "-v", "--trace-tree"]).unwrap();
    assert_eq!(
        config,
        Config {
            command: Command::Run,
            input: Some("arith.rkt".to_owned()),
            filter: Some("Arith".to_owned()),
            verbose: true,
            trace_tree: true,
        }
    );
}

#[test]
fn flags_may_precede_the_path() {
    let config = Config::from_args(&["check", "--verbose", "lang.rkt"]).unwrap();
    assert_eq!(config.command, Command::Check);
    assert_eq!(config.input.as_deref(), Some("lang.rkt"));
    assert!(config.verbose);
}

#[test]
fn explain_takes_a_code() {
    let config = Config::from_args(&["explain", "E2003"]).unwrap();
    assert_eq!(config.command, Command::Explain);
    assert_eq!(config.input.as_deref(), Some("E2003"));
}

#[test]
fn errors() {
    assert_eq!(Config::from_args(&["build"]).unwrap_err(), "unknown command `build`");
    assert_eq!(Config::from_args(&["run"]).unwrap_err(), "missing file path");
    assert_eq!(Config::from_args(&["explain"]).unwrap_err(), "missing error code");
    assert_eq!(Config::from_args(&["emit", "a", "b"]).unwrap_err(), "unexpected argument `b`");
    assert_eq!(Config::from_args(&["check", "a", "--fast"]).unwrap_err(), "unknown option `--fast`");
}
