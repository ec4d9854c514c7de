//! One runner per pipeline step. Each builds its prompt from the campaign
//! context, calls the model and persists what came back.

mod create;
mod evaluation;
mod framing;
mod judge;
mod opinion;
mod strategist;
mod synthesis;

pub use create::CreatePhase;
pub use evaluation::EvaluationPhase;
pub use framing::FramingPhase;
pub use judge::JudgePhase;
pub use opinion::OpinionPhase;
pub use strategist::StrategistPhase;
pub use synthesis::SynthesisPhase;

/// Append a markdown list section, skipping empty lists.
pub(crate) fn push_section(out: &mut String, title: &str, items: &[String]) {
    let items: Vec<&str> = items
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect();
    if items.is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str(&format!("### {title}\n"));
    out.push_str(
        &items
            .iter()
            .map(|i| format!("- {i}"))
            .collect::<Vec<_>>()
            .join("\n"),
    );
}
