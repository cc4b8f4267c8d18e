use crate::support::{
    BrokenMemory, CountingExecutor, FakeModel, HangingModel, ScriptedTerminal, StalledTerminal,
};
use application::assistant::{HELP, WELCOME};
use application::{Assistant, LoopState, TurnOutcome};
use domain::entities::execution::ExecutionRecord;
use domain::entities::message::Role;
use infrastructure::WindowMemory;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const SYSTEM: &str = "You are a shell assistant.";
const RUNNABLE_LS: &str = r#"{"success": true, "multipleLines": false, "script": "ls"}"#;

fn assistant(
    model: FakeModel,
    executor: CountingExecutor,
    inputs: &[&str],
) -> Assistant<FakeModel, CountingExecutor, WindowMemory, ScriptedTerminal> {
    Assistant::new(
        model,
        executor,
        WindowMemory::new(10),
        ScriptedTerminal::new(inputs.iter().copied()),
        SYSTEM,
        CancellationToken::new(),
    )
}

fn record(output: &str) -> ExecutionRecord {
    ExecutionRecord {
        command: "ls".to_string(),
        output: output.to_string(),
        error: None,
        exit_code: 0,
        duration: "2ms".to_string(),
        success: true,
    }
}

#[tokio::test]
async fn test_confirmed_script_runs_and_feeds_next_request() {
    let model = FakeModel::new([
        vec!["<think>list the directory</think>", RUNNABLE_LS],
        vec![r#"{"success": false, "multipleLines": false, "script": "Which file?"}"#],
    ]);
    let mut assistant = assistant(
        model.clone(),
        CountingExecutor::with_output("Cargo.toml\n"),
        &["list files", "y", "open the first one"],
    );

    let state = assistant.run().await.unwrap();

    assert_eq!(assistant.executor().calls(), vec!["ls".to_string()]);
    let last = state.last_execution.expect("execution recorded");
    assert_eq!(last.command, "ls");
    assert_eq!(last.output, "Cargo.toml\n");

    let requests = model.requests();
    assert_eq!(requests.len(), 2);

    let first = &requests[0];
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].role, Role::System);
    assert_eq!(first[0].content, SYSTEM);
    assert_eq!(first[1].content, "list files");

    let second = &requests[1];
    assert_eq!(second.len(), 4);
    assert_eq!(second[1].role, Role::User);
    assert_eq!(second[1].content, "list files");
    assert_eq!(second[2].role, Role::Assistant);
    assert!(second[2].content.contains("</think>"));
    assert_eq!(
        second[3].content,
        "Last execution result: Cargo.toml\n\nopen the first one"
    );

    let output = &assistant.terminal().output;
    assert!(output.starts_with(WELCOME));
    assert!(output.contains("Bot: "));
    assert!(output.contains("Execute script directly? (y/n)"));
    assert!(output.contains("exit code: 0"));
    assert!(output.contains("AI did not provide a script: Which file?"));
    assert_eq!(assistant.memory().len(), 2);
}

#[tokio::test]
async fn test_declined_script_is_not_executed() {
    let model = FakeModel::new([vec![RUNNABLE_LS]]);
    let mut assistant = assistant(model, CountingExecutor::default(), &["list files", "n"]);

    let turn = assistant.turn(LoopState::default()).await.unwrap();

    assert_eq!(turn.outcome, TurnOutcome::Declined);
    assert!(turn.state.last_execution.is_none());
    assert!(assistant.executor().calls().is_empty());
    assert!(assistant.terminal().output.contains("Script not executed."));
}

#[tokio::test]
async fn test_confirmation_accepts_uppercase_y() {
    let model = FakeModel::new([vec![RUNNABLE_LS]]);
    let mut assistant = assistant(model, CountingExecutor::default(), &["list files", "  Y "]);

    let turn = assistant.turn(LoopState::default()).await.unwrap();

    assert_eq!(turn.outcome, TurnOutcome::Executed);
    assert_eq!(assistant.executor().calls().len(), 1);
}

#[tokio::test]
async fn test_multiline_script_is_shown_never_executed() {
    let model = FakeModel::new([vec![
        r#"{"success": true, "multipleLines": true, "script": "for f in *; do\n  echo $f\ndone"}"#,
    ]]);
    let mut assistant = assistant(
        model.clone(),
        CountingExecutor::default(),
        &["loop over files", "y"],
    );

    let turn = assistant.turn(LoopState::default()).await.unwrap();

    assert_eq!(turn.outcome, TurnOutcome::SaveSuggested);
    assert!(assistant.executor().calls().is_empty());
    let output = &assistant.terminal().output;
    assert!(output.contains("Please save the following content as a .sh script file"));
    assert!(output.contains("echo $f"));
    assert!(!output.contains("Execute script directly?"));
    assert_eq!(assistant.terminal().prompts.len(), 1);

    // A later "y" is an ordinary request, not a confirmation.
    let turn = assistant.turn(turn.state).await.unwrap();
    assert_eq!(turn.outcome, TurnOutcome::Idle);
    assert!(turn.state.last_execution.is_none());
    assert!(assistant.executor().calls().is_empty());
    assert_eq!(model.requests().len(), 2);
    assert_eq!(model.requests()[1].last().unwrap().content, "y");
}

#[tokio::test]
async fn test_clarification_keeps_previous_execution() {
    let model = FakeModel::new([vec![
        r#"{"success": false, "multipleLines": false, "script": "Which directory?"}"#,
    ]]);
    let mut assistant = assistant(model, CountingExecutor::default(), &["delete logs"]);
    let state = LoopState {
        last_execution: Some(record("old\n")),
    };

    let turn = assistant.turn(state).await.unwrap();

    assert_eq!(turn.outcome, TurnOutcome::Clarification);
    assert_eq!(turn.state.last_execution, Some(record("old\n")));
}

#[tokio::test]
async fn test_string_booleans_are_accepted() {
    let model = FakeModel::new([vec![
        r#"{"success": "true", "multipleLines": "false", "script": "pwd"}"#,
    ]]);
    let mut assistant = assistant(model, CountingExecutor::default(), &["where am i", "y"]);

    let turn = assistant.turn(LoopState::default()).await.unwrap();

    assert_eq!(turn.outcome, TurnOutcome::Executed);
    assert_eq!(assistant.executor().calls(), vec!["pwd".to_string()]);
}

#[tokio::test]
async fn test_clear_resets_memory_but_not_last_execution() {
    let model = FakeModel::new([vec![RUNNABLE_LS]]);
    let mut assistant = assistant(model, CountingExecutor::default(), &["list", "n", "clear"]);

    assistant.turn(LoopState::default()).await.unwrap();
    assert_eq!(assistant.memory().len(), 1);

    let state = LoopState {
        last_execution: Some(record("x\n")),
    };
    let turn = assistant.turn(state).await.unwrap();

    assert_eq!(turn.outcome, TurnOutcome::Cleared);
    assert_eq!(turn.state.last_execution, Some(record("x\n")));
    assert!(assistant.memory().is_empty());
    assert!(assistant.terminal().output.contains("Chat history cleared."));
}

#[tokio::test]
async fn test_clear_failure_is_reported_and_loop_continues() {
    let mut assistant = Assistant::new(
        FakeModel::default(),
        CountingExecutor::default(),
        BrokenMemory::default(),
        ScriptedTerminal::new(["clear"]),
        SYSTEM,
        CancellationToken::new(),
    );

    let turn = assistant.turn(LoopState::default()).await.unwrap();

    assert_eq!(turn.outcome, TurnOutcome::Idle);
    assert!(assistant.terminal().output.contains("read-only"));
}

#[tokio::test]
async fn test_control_tokens() {
    let mut assistant = assistant(
        FakeModel::default(),
        CountingExecutor::default(),
        &["help", "   ", "exit"],
    );

    let turn = assistant.turn(LoopState::default()).await.unwrap();
    assert_eq!(turn.outcome, TurnOutcome::HelpShown);
    assert!(assistant.terminal().output.contains(HELP));

    let turn = assistant.turn(turn.state).await.unwrap();
    assert_eq!(turn.outcome, TurnOutcome::Idle);

    let turn = assistant.turn(turn.state).await.unwrap();
    assert_eq!(turn.outcome, TurnOutcome::Exited);

    // Input exhausted behaves like end of file.
    let turn = assistant.turn(turn.state).await.unwrap();
    assert_eq!(turn.outcome, TurnOutcome::Exited);
}

#[tokio::test]
async fn test_capitalized_exit_goes_to_the_model() {
    let model = FakeModel::new([vec![
        r#"{"success": false, "multipleLines": false, "script": "Did you mean exit?"}"#,
    ]]);
    let mut assistant = assistant(model.clone(), CountingExecutor::default(), &["Exit"]);

    let turn = assistant.turn(LoopState::default()).await.unwrap();

    assert_eq!(turn.outcome, TurnOutcome::Clarification);
    assert_eq!(model.requests().len(), 1);
}

#[tokio::test]
async fn test_unparseable_answer_returns_to_input() {
    let model = FakeModel::new([vec!["I cannot help with that."]]);
    let mut assistant = assistant(model, CountingExecutor::default(), &["do something"]);

    let turn = assistant.turn(LoopState::default()).await.unwrap();

    assert_eq!(turn.outcome, TurnOutcome::ParseFailed);
    assert!(assistant.terminal().output.contains("Error:"));
    // The exchange is remembered even though it could not be parsed.
    assert_eq!(assistant.memory().len(), 1);
    assert!(assistant.executor().calls().is_empty());
}

#[tokio::test]
async fn test_model_failure_is_reported_and_loop_continues() {
    let mut assistant = assistant(FakeModel::default(), CountingExecutor::default(), &["hello"]);

    let turn = assistant.turn(LoopState::default()).await.unwrap();

    assert_eq!(turn.outcome, TurnOutcome::Idle);
    assert!(assistant.terminal().output.contains("no scripted response left"));
    assert!(assistant.memory().is_empty());
}

#[tokio::test]
async fn test_launch_failure_leaves_no_record() {
    let model = FakeModel::new([vec![RUNNABLE_LS]]);
    let mut assistant = assistant(model, CountingExecutor::failing(), &["list", "y"]);
    let state = LoopState {
        last_execution: Some(record("before\n")),
    };

    let turn = assistant.turn(state).await.unwrap();

    assert_eq!(turn.outcome, TurnOutcome::LaunchFailed);
    assert_eq!(turn.state.last_execution, Some(record("before\n")));
    assert!(assistant.terminal().output.contains("bash not found"));
}

#[tokio::test]
async fn test_memory_window_drops_oldest_exchange() {
    let clarify = r#"{"success": false, "multipleLines": false, "script": "?"}"#;
    let model = FakeModel::new([vec![clarify], vec![clarify], vec![clarify]]);
    let mut assistant = Assistant::new(
        model.clone(),
        CountingExecutor::default(),
        WindowMemory::new(1),
        ScriptedTerminal::new(["one", "two", "three"]),
        SYSTEM,
        CancellationToken::new(),
    );

    assistant.run().await.unwrap();

    let requests = model.requests();
    let last = &requests[2];
    assert_eq!(last.len(), 4);
    assert_eq!(last[1].content, "two");
    assert_eq!(last[3].content, "three");
}

#[tokio::test]
async fn test_cancellation_while_waiting_for_input_exits() {
    let cancel = CancellationToken::new();
    let mut assistant = Assistant::new(
        FakeModel::default(),
        CountingExecutor::default(),
        WindowMemory::new(10),
        StalledTerminal::default(),
        SYSTEM,
        cancel.clone(),
    );

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let state = tokio::time::timeout(Duration::from_secs(5), assistant.run())
        .await
        .expect("run returned after cancellation")
        .unwrap();
    assert!(state.last_execution.is_none());
}

#[tokio::test]
async fn test_cancellation_while_streaming_exits() {
    let cancel = CancellationToken::new();
    let mut assistant = Assistant::new(
        HangingModel,
        CountingExecutor::default(),
        WindowMemory::new(10),
        ScriptedTerminal::new(["list files"]),
        SYSTEM,
        cancel.clone(),
    );

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let turn = tokio::time::timeout(Duration::from_secs(5), assistant.turn(LoopState::default()))
        .await
        .expect("turn returned after cancellation")
        .unwrap();

    assert_eq!(turn.outcome, TurnOutcome::Exited);
    assert!(assistant.memory().is_empty());
    assert!(assistant.executor().calls().is_empty());
}
