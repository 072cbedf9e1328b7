//! Words of encouragement for a freshly appointed pope

const QUOTES: &[&str] = &[
    "It works on my machine.",
    "There are only two hard things in Computer Science: cache invalidation and naming things.",
    "Programs must be written for people to read, and only incidentally for machines to execute.",
    "Debugging is twice as hard as writing the code in the first place.",
    "First, solve the problem. Then, write the code.",
    "Make it work, make it right, make it fast.",
    "Simplicity is prerequisite for reliability.",
    "Weeks of coding can save you hours of planning.",
];

/// Pick a quote, varying with the clock
pub fn dev_quote() -> &'static str {
    let nanos = chrono::Utc::now().timestamp_subsec_nanos() as usize;
    QUOTES[nanos % QUOTES.len()]
}
