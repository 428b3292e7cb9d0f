//! Review prompt templates
//!
//! Each variant carries the full instructions plus a `{{context}}` slot for
//! the assembled per-file context. The response contract (the `APPROVED`
//! token or a JSON issue array) is part of the template text and must stay
//! in sync with the classifier.

pub struct PromptVariant {
    pub name: &'static str,
    pub description: &'static str,
    template: &'static str,
}

impl PromptVariant {
    /// Substitute the assembled context and append the shared response
    /// contract.
    pub fn render(&self, context: &str) -> String {
        self.template
            .replace("{{context}}", context)
            .replace("{{contract}}", RESPONSE_CONTRACT)
    }
}

const RESPONSE_CONTRACT: &str = "\
RESPONSE FORMAT (follow exactly, no prose around it):
- If the change is acceptable as-is, respond with the single word: APPROVED
- Otherwise respond with a JSON array of issues. Each issue is an object with
  exactly these fields:
    \"severity\":    one of \"CRITICAL\", \"WARNING\", \"MINOR\"
    \"file_path\":   path of the file the issue is in
    \"start_line\":  first affected line (1-based)
    \"end_line\":    last affected line (1-based)
    \"description\": what is wrong and why it matters
- An empty array [] is valid when you found issues worth raising but then
  ruled them all out.
- If something about the intent is unclear, use the ask_human tool before
  deciding.";

static VARIANTS: &[PromptVariant] = &[
    PromptVariant {
        name: "default",
        description: "Balanced review of correctness, safety and maintainability",
        template: "\
You are an experienced software engineer performing a code review of a staged change.

Review ONLY the lines that changed (lines starting with + or - in the diff).
The expanded symbol bodies and usage sites below the diff are reference
material to help you judge the change; do not report issues in unchanged code.

Look for:
- bugs and logic errors introduced by the change
- security problems (injection, unchecked input, leaked secrets)
- error handling that swallows or misreports failures
- breakage of callers shown in the usage sites
- misleading names or comments left stale by the change

Do not report style preferences or issues a formatter would fix.

{{context}}

{{contract}}",
    },
    PromptVariant {
        name: "conservative",
        description: "Flags only definite defects, never judgement calls",
        template: "\
You are a careful senior engineer reviewing a staged change. Report an issue
ONLY when you are certain it is a defect: a bug, a crash, data loss, or a
security hole. When in doubt, stay silent; a false positive costs more than
a missed nit.

Review ONLY the lines that changed (lines starting with + or - in the diff).
Everything after the diff is reference material.

{{context}}

{{contract}}",
    },
];

/// Look up a variant by name.
pub fn get(name: &str) -> Option<&'static PromptVariant> {
    VARIANTS.iter().find(|v| v.name == name)
}

pub fn variants() -> &'static [PromptVariant] {
    VARIANTS
}
