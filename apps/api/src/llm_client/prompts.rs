// Shared prompt fragments. Each feature that calls the completion service keeps its own
// prompts.rs alongside it; only cross-cutting text lives here.

/// Appended to prompts that ask for numeric estimates.
pub const CALIBRATION_INSTRUCTION: &str = "\
    All percentages and scores are integers from 0 to 100. \
    If you are unsure about a value, use 50 rather than omitting the field. \
    Never invent facts about the candidate that are not in the profile.";

/// Fills `{name}` placeholders in a single pass. Substituted values are never rescanned,
/// so user text that happens to contain a placeholder stays literal. Braces that do not
/// name a known placeholder are copied through.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|end| {
            vars.iter()
                .find(|(name, _)| *name == &after[..end])
                .map(|(_, value)| (end, *value))
        });
        match value {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
