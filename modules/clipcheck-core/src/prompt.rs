use clipcheck_common::RawVideoRecord;

pub const SYSTEM_PROMPT: &str = "\
You are a rigorous fact-checker for short-form video content. You receive a \
video's caption, author, engagement figures, and transcript when one exists. \
Identify the distinct factual claims the video makes, verify each one against \
current, reliable reporting via web search, and respond with structured JSON:\n\
- claims: each with the claim text, a verdict of \"true\", \"false\", or \
\"unknown\" (use \"unknown\" when verification is genuinely inconclusive), a \
short justification, an importance weight between 0 and 1 reflecting how \
central the claim is to the video's message, and the sources you relied on \
(title, publisher, and URL when you have one).\n\
- credibility_score: an overall score between 0 and 1 for the video.\n\
- summary: two or three sentences a viewer can read at a glance.\n\
Judge only what the video asserts; do not invent claims it never makes.";

/// Deterministic prompt built from the merged record. Same record, same
/// prompt — byte for byte.
pub fn build_prompt(record: &RawVideoRecord) -> String {
    let mut prompt = String::new();

    let author = record.author.as_deref().unwrap_or("unknown");
    prompt.push_str(&format!("Video by @{author}\n"));

    if let Some(title) = record.title.as_deref() {
        prompt.push_str(&format!("Caption: {title}\n"));
    }
    if let Some(description) = record.description.as_deref() {
        if record.title.as_deref() != Some(description) {
            prompt.push_str(&format!("Description: {description}\n"));
        }
    }

    let engagement: Vec<String> = [
        (record.views, "views"),
        (record.likes, "likes"),
        (record.shares, "shares"),
        (record.comments, "comments"),
    ]
    .into_iter()
    .filter_map(|(count, label)| count.map(|c| format!("{} {label}", format_count(c))))
    .collect();
    if !engagement.is_empty() {
        prompt.push_str(&format!("Engagement: {}\n", engagement.join(", ")));
    }

    match record.transcript.as_deref() {
        Some(transcript) => {
            prompt.push_str("\nTRANSCRIPT:\n");
            prompt.push_str(transcript);
            prompt.push('\n');
        }
        None => {
            prompt.push_str(
                "\nNo transcript available for this video. Base the analysis on the caption and description only.\n",
            );
        }
    }

    prompt
}

/// Thousands-separated count, e.g. 50000 -> "50,000".
fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
