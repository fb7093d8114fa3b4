use crate::chat::{Origin, Timeline, TimelineChange, Turn};
use crate::locale::LocaleProfile;

const USER_LABEL: &str = "You";
const ASSISTANT_LABEL: &str = "PlantAI";

pub fn label(origin: Origin) -> &'static str {
    match origin {
        Origin::User => USER_LABEL,
        Origin::Assistant => ASSISTANT_LABEL,
    }
}

/// Renders one turn as a transcript block; pending turns show the thinking line.
pub fn format_turn(turn: &Turn, profile: &LocaleProfile) -> String {
    let body = if turn.is_pending() {
        profile.thinking
    } else {
        turn.body.as_str()
    };
    format!("{}: {}\n", label(turn.origin), body)
}

pub fn format_transcript(timeline: &Timeline, profile: &LocaleProfile) -> String {
    timeline
        .turns()
        .iter()
        .map(|turn| format_turn(turn, profile))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turns timeline changes into text for an append-only terminal.
///
/// Streamed fragments are written inline on one open line, which is closed
/// before anything else is printed.
#[derive(Debug, Default)]
pub struct TranscriptRenderer {
    line_open: bool,
}

impl TranscriptRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        timeline: &Timeline,
        change: &TimelineChange,
        profile: &LocaleProfile,
    ) -> String {
        match change {
            TimelineChange::Appended { index } | TimelineChange::Replaced { index } => {
                let mut out = self.finish();
                if let Some(turn) = timeline.turns().get(*index) {
                    out.push_str(&format_turn(turn, profile));
                }
                out
            }
            TimelineChange::Settled { .. } => {
                let mut out = self.finish();
                out.push_str(&self.open_line());
                out
            }
            TimelineChange::Extended { fragment, .. } => {
                let mut out = if self.line_open {
                    String::new()
                } else {
                    self.open_line()
                };
                out.push_str(fragment);
                out
            }
            TimelineChange::Reset => {
                let mut out = self.finish();
                out.push_str(&format_transcript(timeline, profile));
                out
            }
        }
    }

    /// Closes a streamed line if one is open.
    pub fn finish(&mut self) -> String {
        if std::mem::take(&mut self.line_open) {
            "\n".to_string()
        } else {
            String::new()
        }
    }

    fn open_line(&mut self) -> String {
        self.line_open = true;
        format!("{ASSISTANT_LABEL}: ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LanguageCode;

    #[test]
    fn pending_turn_shows_thinking_line() {
        let profile = LanguageCode::Te.profile();
        assert_eq!(
            format_turn(&Turn::placeholder(), profile),
            format!("PlantAI: {}\n", profile.thinking)
        );
    }

    #[test]
    fn streamed_answer_is_printed_inline() {
        let profile = LanguageCode::En.profile();
        let mut timeline = Timeline::new(Turn::assistant("hi"));
        let mut renderer = TranscriptRenderer::new();
        let mut out = String::new();

        let change = timeline.append(Turn::user("why?")).unwrap();
        out.push_str(&renderer.render(&timeline, &change, profile));
        let change = timeline.append(Turn::placeholder()).unwrap();
        out.push_str(&renderer.render(&timeline, &change, profile));
        let change = timeline.settle_last().unwrap();
        out.push_str(&renderer.render(&timeline, &change, profile));
        for fragment in ["Hello ", "world"] {
            let change = timeline.extend_last(fragment).unwrap();
            out.push_str(&renderer.render(&timeline, &change, profile));
        }
        out.push_str(&renderer.finish());

        assert_eq!(
            out,
            "You: why?\nPlantAI: Thinking...\nPlantAI: Hello world\n"
        );
        assert_eq!(renderer.finish(), "");
    }

    #[test]
    fn reset_reprints_the_whole_transcript() {
        let profile = LanguageCode::En.profile();
        let mut timeline = Timeline::new(Turn::assistant("old"));
        let change = timeline.reset(Turn::assistant(profile.greeting));

        let out = TranscriptRenderer::new().render(&timeline, &change, profile);
        assert_eq!(out, format!("PlantAI: {}\n", profile.greeting));
    }
}
