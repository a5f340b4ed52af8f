// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Next,
}

fn msg() -> Message<()> {
    Message::new(())
}

#[parameterized(
    again = { Action::again(msg()), false, false, None },
    call_immediately = { Action::call_immediately(State::Next, msg()), false, false, Some(State::Next) },
    exit = { Action::exit(), false, true, None },
    release_and_exit = { Action::release_and_exit(msg()), false, true, None },
    wait_and_call = { Action::wait_and_call(State::Next, msg()), true, false, Some(State::Next) },
    yield_and_call = { Action::yield_and_call(State::Next, msg()), true, false, Some(State::Next) },
    timeout_and_call = { Action::timeout_and_call(State::Next, msg(), Duration::from_millis(5)), true, false, Some(State::Next) },
    suspend = { Action::suspend(State::Next, MessageId(1)), true, false, Some(State::Next) },
)]
fn action_classification(
    action: Action<State, ()>,
    suspension: bool,
    terminal: bool,
    next: Option<State>,
) {
    assert_eq!(action.is_suspension(), suspension);
    assert_eq!(action.is_terminal(), terminal);
    assert_eq!(action.next_state().copied(), next);
}

#[test]
fn suspending_actions_mark_item_in_process() {
    for action in [
        Action::wait_and_call(State::Next, msg()),
        Action::yield_and_call(State::Next, msg()),
        Action::timeout_and_call(State::Next, msg(), Duration::from_secs(1)),
    ] {
        let held = match action.kind {
            ActionKind::Wait(_, m) | ActionKind::Yield(_, m) | ActionKind::Timeout(_, m, _) => m,
            _ => unreachable!("suspending action expected"),
        };
        assert!(held.is_in_process());
    }
}

#[test]
fn tight_loop_actions_leave_item_fresh() {
    let action = Action::call_immediately(State::Next, msg());
    let ActionKind::Call(_, held) = action.kind else {
        unreachable!("call expected");
    };
    assert!(!held.is_in_process());
}

#[test]
fn timeout_keeps_period() {
    let action = Action::timeout_and_call(State::Next, msg(), Duration::from_millis(40));
    let ActionKind::Timeout(_, _, period) = action.kind else {
        unreachable!("timeout expected");
    };
    assert_eq!(period, Duration::from_millis(40));
}

#[test]
fn debug_names_the_action() {
    let action: Action<State, ()> = Action::exit();
    assert_eq!(format!("{:?}", action), "Action { kind: \"exit\", next: None }");
}
