//! Context assembly: system prompt, windowed history, new input.

use tripy_common::{Role, Turn};

use crate::Message;

/// The last `window` turns (all when `window == 0`). A window that would
/// open on an assistant turn drops it, so history starts with the human.
pub fn window_history(turns: &[Turn], window: usize) -> &[Turn] {
    let mut start = if window == 0 {
        0
    } else {
        turns.len().saturating_sub(window)
    };
    if start > 0 && turns.get(start).is_some_and(|t| t.role == Role::Assistant) {
        start += 1;
    }
    &turns[start..]
}

/// `[system] + windowed history + [human input]`.
pub fn build_context(system_prompt: &str, history: &[Turn], window: usize, input: &str) -> Vec<Message> {
    let history = window_history(history, window);
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system_prompt));
    messages.extend(
        history
            .iter()
            .map(|turn| Message::new(turn.role, turn.content.clone())),
    );
    messages.push(Message::human(input));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(pairs: usize) -> Vec<Turn> {
        (0..pairs)
            .flat_map(|i| [Turn::human(format!("q{i}")), Turn::assistant(format!("a{i}"))])
            .collect()
    }

    #[test]
    fn zero_window_keeps_everything() {
        let turns = conversation(30);
        assert_eq!(window_history(&turns, 0).len(), 60);
    }

    #[test]
    fn window_keeps_most_recent_turns() {
        let turns = conversation(10);
        let windowed = window_history(&turns, 4);
        let contents: Vec<&str> = windowed.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["q8", "a8", "q9", "a9"]);
    }

    #[test]
    fn window_never_opens_on_assistant() {
        let turns = conversation(10);
        let windowed = window_history(&turns, 3);
        assert_eq!(windowed[0].role, Role::Human);
        assert_eq!(windowed.len(), 2);
    }

    #[test]
    fn context_is_system_history_input() {
        let turns = conversation(1);
        let messages = build_context("You are Tripy", &turns, 40, "And day 2?");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "q0");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[3], Message::human("And day 2?"));
    }
}
