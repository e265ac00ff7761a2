use super::*;
use crate::core::config::ConfigKey;
use crate::core::gateway::CompletionError;
use crate::core::message::Turn;
use crate::core::orchestrator::OrchestratorError;
use crate::core::threads::ThreadId;
use crate::utils::test_utils::{orchestrator_in, ScriptedGateway};
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;

mod test_helpers {
    use super::*;

    pub(super) fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
    }

    /// Runs `argv` against `orchestrator` with `stdin` as input, returning stdout.
    pub(super) async fn run_in(
        orchestrator: &mut Orchestrator<ScriptedGateway>,
        argv: &[&str],
        stdin: &str,
    ) -> Result<String, CliError> {
        let args = parse_args(argv);
        let mut out = Vec::new();
        let mut input = Cursor::new(stdin.as_bytes().to_vec());
        execute(args.command, orchestrator, &mut out, &mut input, false).await?;
        Ok(String::from_utf8(out).expect("output should be utf-8"))
    }
}

use test_helpers::{parse_args, run_in};

#[test]
fn ask_joins_words_and_applies_defaults() {
    let argv = ["cllm", "ask", "what", "is", "rust?"];
    match parse_args(&argv).command {
        Commands::Ask {
            message,
            model,
            temperature,
            max_tokens,
            thread,
            raw,
            markdown,
            no_markdown,
        } => {
            assert_eq!(message, vec!["what", "is", "rust?"]);
            assert_eq!(model, None);
            assert_eq!(temperature, 0.7);
            assert_eq!(max_tokens, 1000);
            assert_eq!(thread, None);
            assert!(!raw);
            assert!(!markdown);
            assert!(!no_markdown);
        }
        other => panic!("expected ask for argv={argv:?}, got {other:?}"),
    }
}

#[test]
fn ask_accepts_all_options() {
    let argv = [
        "cllm",
        "ask",
        "-m",
        "gpt-4o",
        "-t",
        "0.2",
        "--max-tokens",
        "50",
        "--thread-id",
        "work",
        "--raw",
        "--no-markdown",
        "hello",
    ];
    assert_eq!(
        parse_args(&argv).command,
        Commands::Ask {
            message: vec!["hello".to_string()],
            model: Some("gpt-4o".to_string()),
            temperature: 0.2,
            max_tokens: 50,
            thread: Some("work".to_string()),
            raw: true,
            markdown: false,
            no_markdown: true,
        }
    );
}

#[test]
fn last_markdown_switch_wins() {
    let argv = ["cllm", "ask", "--no-markdown", "--markdown", "hi"];
    match parse_args(&argv).command {
        Commands::Ask {
            markdown,
            no_markdown,
            ..
        } => {
            assert!(markdown);
            assert!(!no_markdown);
        }
        other => panic!("expected ask for argv={argv:?}, got {other:?}"),
    }
}

#[test]
fn ask_requires_a_message() {
    assert!(Args::try_parse_from(["cllm", "ask"]).is_err());
}

#[test]
fn verbose_flag_is_global() {
    let args = parse_args(&["cllm", "list-threads", "-v"]);
    assert!(args.verbose);
    assert_eq!(args.command, Commands::ListThreads);
}

#[test]
fn settings_subcommands_use_kebab_case() {
    assert_eq!(
        parse_args(&["cllm", "set-default-model", "gpt-4o"]).command,
        Commands::SetDefaultModel {
            model: "gpt-4o".to_string()
        }
    );
    assert_eq!(
        parse_args(&["cllm", "set-api-key"]).command,
        Commands::SetApiKey { key: None }
    );
    assert_eq!(
        parse_args(&["cllm", "show-thread"]).command,
        Commands::ShowThread { thread: None }
    );
    assert!(Args::try_parse_from(["cllm", "clear-thread"]).is_err());
}

#[tokio::test]
async fn ask_prints_header_and_reply() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator_in(
        dir.path(),
        ScriptedGateway::replying([Ok(Turn::assistant("Hi there"))]),
    );

    let out = run_in(&mut orchestrator, &["cllm", "ask", "hello"], "")
        .await
        .unwrap();
    assert_eq!(
        out,
        "── Response (gpt-3.5-turbo) · Thread: default ──\nHi there\n"
    );

    let stored = orchestrator
        .threads()
        .load(&ThreadId::parse("default").unwrap())
        .unwrap();
    assert_eq!(stored, vec![Turn::user("hello"), Turn::assistant("Hi there")]);
}

#[tokio::test]
async fn ask_raw_prints_only_the_reply() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator_in(
        dir.path(),
        ScriptedGateway::replying([Ok(Turn::assistant("42"))]),
    );

    let out = run_in(&mut orchestrator, &["cllm", "ask", "--raw", "answer?"], "")
        .await
        .unwrap();
    assert_eq!(out, "42\n");
}

const MARKDOWN_REPLY: &str = "**Steps**\n\n1. install\n2. run `cllm`\n\n> done";

#[tokio::test]
async fn ask_renders_markdown_by_default() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator_in(
        dir.path(),
        ScriptedGateway::replying([Ok(Turn::assistant(MARKDOWN_REPLY))]),
    );

    let out = run_in(&mut orchestrator, &["cllm", "ask", "how?"], "")
        .await
        .unwrap();
    assert_eq!(
        out,
        "── Response (gpt-3.5-turbo) · Thread: default ──\n\
         Steps\n\
         \n\
         1. install\n\
         2. run `cllm`\n\
         \n\
         │ done\n"
    );

    let stored = orchestrator
        .threads()
        .load(&ThreadId::parse("default").unwrap())
        .unwrap();
    assert_eq!(stored[1], Turn::assistant(MARKDOWN_REPLY));
}

#[tokio::test]
async fn no_markdown_prints_reply_as_received() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator_in(
        dir.path(),
        ScriptedGateway::replying([Ok(Turn::assistant(MARKDOWN_REPLY))]),
    );

    let out = run_in(&mut orchestrator, &["cllm", "ask", "--no-markdown", "how?"], "")
        .await
        .unwrap();
    assert_eq!(
        out,
        format!("── Response (gpt-3.5-turbo) · Thread: default ──\n{MARKDOWN_REPLY}\n")
    );
}

#[tokio::test]
async fn blank_message_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator_in(dir.path(), ScriptedGateway::default());

    let err = run_in(&mut orchestrator, &["cllm", "ask", "  "], "")
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Usage(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(orchestrator.gateway().calls().is_empty());
}

#[tokio::test]
async fn failed_ask_maps_to_exit_code_and_keeps_thread() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator_in(
        dir.path(),
        ScriptedGateway::replying([Err(CompletionError::RateLimited {
            message: "slow down".to_string(),
            retry_after: None,
        })]),
    );

    let err = run_in(&mut orchestrator, &["cllm", "ask", "--thread-id", "t1", "hi"], "")
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 4);
    assert!(!dir.path().join("threads").join("t1.json").exists());
}

#[tokio::test]
async fn set_api_key_reads_stdin_when_omitted() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator_in(dir.path(), ScriptedGateway::default());

    let out = run_in(&mut orchestrator, &["cllm", "set-api-key"], "sk-from-stdin\n")
        .await
        .unwrap();
    assert!(out.contains("API key saved"));
    assert_eq!(
        orchestrator.config().get(ConfigKey::ApiKey),
        Some("sk-from-stdin")
    );

    let saved = fs::read_to_string(dir.path().join("config.json")).unwrap();
    assert!(saved.contains("sk-from-stdin"));
}

#[tokio::test]
async fn set_api_key_rejects_empty_input() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator_in(dir.path(), ScriptedGateway::default());

    let err = run_in(&mut orchestrator, &["cllm", "set-api-key"], "\n")
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Usage(_)));
    assert!(!dir.path().join("config.json").exists());
}

#[tokio::test]
async fn default_thread_is_validated_before_saving() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator_in(dir.path(), ScriptedGateway::default());

    let err = run_in(&mut orchestrator, &["cllm", "set-default-thread", "../x"], "")
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::InvalidThreadId(_)));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(orchestrator.config().get(ConfigKey::DefaultThread), None);

    run_in(&mut orchestrator, &["cllm", "set-default-thread", "work"], "")
        .await
        .unwrap();
    assert_eq!(
        orchestrator.config().get(ConfigKey::DefaultThread),
        Some("work")
    );
}

#[tokio::test]
async fn unset_reports_whether_key_was_present() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator_in(dir.path(), ScriptedGateway::default());

    run_in(&mut orchestrator, &["cllm", "set-default-model", "gpt-4o"], "")
        .await
        .unwrap();
    let out = run_in(&mut orchestrator, &["cllm", "unset", "default-model"], "")
        .await
        .unwrap();
    assert_eq!(out, "✅ default_model unset.\n");

    let out = run_in(&mut orchestrator, &["cllm", "unset", "default_model"], "")
        .await
        .unwrap();
    assert_eq!(out, "default_model was not set.\n");

    let err = run_in(&mut orchestrator, &["cllm", "unset", "colour"], "")
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn list_config_never_prints_the_key() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator_in(dir.path(), ScriptedGateway::default());
    run_in(&mut orchestrator, &["cllm", "set-api-key", "sk-secret"], "")
        .await
        .unwrap();

    let out = run_in(&mut orchestrator, &["cllm", "list-config"], "")
        .await
        .unwrap();
    assert!(!out.contains("sk-secret"));
    assert!(out.contains("default_model: gpt-3.5-turbo (default)"));
    assert!(out.contains("default_thread: default (default)"));
}

#[tokio::test]
async fn thread_commands_list_show_and_clear() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator_in(
        dir.path(),
        ScriptedGateway::replying([Ok(Turn::assistant("pong"))]),
    );

    let out = run_in(&mut orchestrator, &["cllm", "list-threads"], "")
        .await
        .unwrap();
    assert_eq!(out, "No threads found.\n");

    run_in(&mut orchestrator, &["cllm", "ask", "--thread-id", "t1", "ping"], "")
        .await
        .unwrap();

    let out = run_in(&mut orchestrator, &["cllm", "list-threads"], "")
        .await
        .unwrap();
    assert!(out.starts_with("Available threads:\n"));
    assert!(out.contains("• t1 (2 turns, updated "));

    let out = run_in(&mut orchestrator, &["cllm", "show-thread", "t1"], "")
        .await
        .unwrap();
    assert_eq!(out, "[user] ping\n[assistant] pong\n");

    let out = run_in(&mut orchestrator, &["cllm", "clear-thread", "t1"], "")
        .await
        .unwrap();
    assert_eq!(out, "✅ Thread 't1' removed.\n");

    let out = run_in(&mut orchestrator, &["cllm", "clear-thread", "t1"], "")
        .await
        .unwrap();
    assert_eq!(out, "Thread 't1' not found.\n");

    let out = run_in(&mut orchestrator, &["cllm", "show-thread", "t1"], "")
        .await
        .unwrap();
    assert_eq!(out, "Thread 't1' has no messages.\n");
}

#[tokio::test]
async fn corrupt_thread_is_marked_in_listing() {
    let dir = TempDir::new().unwrap();
    let threads = dir.path().join("threads");
    fs::create_dir_all(&threads).unwrap();
    fs::write(threads.join("broken.json"), "{not json").unwrap();
    let mut orchestrator = orchestrator_in(dir.path(), ScriptedGateway::default());

    let out = run_in(&mut orchestrator, &["cllm", "list-threads"], "")
        .await
        .unwrap();
    assert!(out.contains("• broken (unreadable"));

    let err = run_in(&mut orchestrator, &["cllm", "show-thread", "broken"], "")
        .await
        .unwrap_err();
    assert!(err.describe().contains("cllm clear-thread broken"));
}

#[test]
fn exit_codes_follow_failure_kind() {
    let completion = |err: CompletionError| CliError::from(OrchestratorError::from(err));

    assert_eq!(completion(CompletionError::MissingCredential).exit_code(), 2);
    assert_eq!(
        completion(CompletionError::ModelNotFound {
            model: "x".to_string()
        })
        .exit_code(),
        3
    );
    assert_eq!(
        completion(CompletionError::Transport {
            message: "down".to_string(),
            timeout: true,
            status: None,
        })
        .exit_code(),
        5
    );
    assert_eq!(CliError::NoStateDir.exit_code(), 2);
    assert_eq!(
        CliError::from(crate::core::config::ConfigError::UnknownKey("x".to_string())).exit_code(),
        2
    );
}

#[test]
fn auth_failure_prints_quick_fixes() {
    let err = CliError::from(OrchestratorError::from(CompletionError::MissingCredential));
    let mut buf = Vec::new();
    err.print(&mut buf);
    let printed = String::from_utf8(buf).unwrap();

    assert!(printed.starts_with("❌ API key not configured!"));
    assert!(printed.contains("💡 Quick fixes:"));
    assert!(printed.contains("cllm set-api-key"));
}
